//! Moderation and delegation workflow
//!
//! Decides which actions a user may take on a campaign, drives the
//! moderator → institution delegation handshake and keeps the participant
//! roster in sync after removals.

pub mod action;
pub mod delegation;
pub mod desk;
pub mod participants;
pub mod status;

pub use action::{allowed_actions, ensure_allowed, ActionSet, CampaignAction};
pub use delegation::{DelegationOffer, DelegationResponse};
pub use desk::{DeskEvent, ModerationDesk};
pub use participants::ParticipantRoster;
pub use status::{CampaignStatus, DelegationStatus, ParticipantStatus, UserRole};
