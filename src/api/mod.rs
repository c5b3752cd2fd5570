//! Typed access to the platform REST API
//!
//! [`ApiClient`] owns transport and authentication; the other modules add
//! resource-specific calls to it.

pub mod auth;
pub mod campaigns;
pub mod client;
pub mod help_requests;
pub mod institutions;
pub mod notifications;

pub use client::ApiClient;
