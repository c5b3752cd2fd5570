//! Local roster of campaign participants
//!
//! Removing a participant is the one place where the client patches its
//! cached list instead of reloading it.

use serde::{Deserialize, Serialize};

use super::status::ParticipantStatus;
use crate::error::{AppError, Result};
use crate::models::Participant;

/// Body of the removal endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalRequest {
    pub motivo: String,
}

impl RemovalRequest {
    /// A removal needs a non-blank reason
    pub fn new(reason: &str) -> Result<Self> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest(
                "a reason is required to remove a participant".to_string(),
            ));
        }
        Ok(Self {
            motivo: reason.to_string(),
        })
    }
}

/// Body of the warning endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningRequest {
    pub mensagem: String,
}

/// Participants of a single campaign
#[derive(Debug, Clone)]
pub struct ParticipantRoster {
    campaign_id: i64,
    participants: Vec<Participant>,
}

impl ParticipantRoster {
    pub fn new(campaign_id: i64, participants: Vec<Participant>) -> Self {
        Self {
            campaign_id,
            participants,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn get(&self, participant_id: i64) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    pub fn active(&self) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(|p| p.status == ParticipantStatus::Active)
    }

    /// Look up a participant that can still be removed
    pub fn ensure_removable(&self, participant_id: i64) -> Result<&Participant> {
        self.participants
            .iter()
            .find(|p| p.id == participant_id && p.status != ParticipantStatus::Removed)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no active participant {} in campaign {}",
                    participant_id, self.campaign_id
                ))
            })
    }

    /// Patch the local copy after the backend accepted a removal
    pub fn mark_removed(&mut self, participant_id: i64, reason: &str) -> Result<&Participant> {
        let campaign_id = self.campaign_id;
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id && p.status != ParticipantStatus::Removed)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no active participant {} in campaign {}",
                    participant_id, campaign_id
                ))
            })?;

        participant.status = ParticipantStatus::Removed;
        participant.exit_reason = Some(reason.to_string());
        Ok(participant)
    }
}
