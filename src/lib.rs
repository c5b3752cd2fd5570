//! Solidario client - moderation and delegation workflows for the donation
//! platform API

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod moderation;
pub mod store;

pub use api::ApiClient;
pub use config::Config;
pub use error::{AppError, Result};
pub use store::SessionStore;
