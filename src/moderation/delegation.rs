//! Delegation handshake between moderators and institutions
//!
//! A moderator offers a pending campaign to an approved institution. The
//! backend turns the offer into a `delegacao_campanha` notification for the
//! institution's user, who accepts or declines it exactly once.

use serde::{Deserialize, Serialize};

use super::status::DelegationStatus;
use crate::error::{AppError, Result};
use crate::models::{Campaign, Institution, Notification};

/// Body of `POST /api/campanhas/{id}/delegar`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegationOffer {
    #[serde(rename = "instituicaoId")]
    pub institution_id: i64,
}

impl DelegationOffer {
    /// Validate that `campaign` can be offered to `institution`
    pub fn new(campaign: &Campaign, institution: &Institution) -> Result<Self> {
        if !campaign.status.is_pending() {
            return Err(AppError::InvalidTransition(format!(
                "campaign {} is {}, only pending campaigns can be delegated",
                campaign.id, campaign.status
            )));
        }

        if !institution.can_receive_delegation() {
            return Err(AppError::BadRequest(format!(
                "institution {} is {}, only approved institutions receive campaigns",
                institution.id,
                institution.status.as_str()
            )));
        }

        Ok(Self {
            institution_id: institution.id,
        })
    }
}

/// The institution's answer to an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationResponse {
    Accept,
    Decline,
}

impl DelegationResponse {
    pub fn from_accept(accept: bool) -> Self {
        if accept {
            DelegationResponse::Accept
        } else {
            DelegationResponse::Decline
        }
    }

    pub fn accepted(&self) -> bool {
        matches!(self, DelegationResponse::Accept)
    }

    /// Delegation status the notification ends up in
    pub fn resulting_status(&self) -> DelegationStatus {
        match self {
            DelegationResponse::Accept => DelegationStatus::Accepted,
            DelegationResponse::Decline => DelegationStatus::Declined,
        }
    }
}

/// Body of `POST /api/notificacoes/{id}/responder-delegacao`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegationReply {
    pub aceitar: bool,
}

impl From<DelegationResponse> for DelegationReply {
    fn from(response: DelegationResponse) -> Self {
        Self {
            aceitar: response.accepted(),
        }
    }
}

/// Check that `notification` is an unresolved delegation offer
pub fn ensure_respondable(notification: &Notification) -> Result<()> {
    if !notification.is_delegation() {
        return Err(AppError::InvalidTransition(format!(
            "notification {} is a '{}' notification, not a delegation",
            notification.id, notification.kind
        )));
    }

    let current = notification
        .delegation_status
        .unwrap_or(DelegationStatus::Pending);
    if current.is_terminal() {
        return Err(AppError::InvalidTransition(format!(
            "delegation {} was already {}",
            notification.id,
            current.as_str()
        )));
    }

    Ok(())
}

/// Apply a response to the local copy of a notification
///
/// The status only moves from pending to accepted/declined. Responding also
/// marks the notification read.
pub fn resolve(
    notification: &mut Notification,
    response: DelegationResponse,
) -> Result<DelegationStatus> {
    ensure_respondable(notification)?;

    let current = notification
        .delegation_status
        .unwrap_or(DelegationStatus::Pending);
    let next = response.resulting_status();
    if !current.can_transition_to(next) {
        return Err(AppError::InvalidTransition(format!(
            "cannot move delegation {} from {} to {}",
            notification.id,
            current.as_str(),
            next.as_str()
        )));
    }

    notification.delegation_status = Some(next);
    notification.read = true;
    Ok(next)
}

/// Delegation offers in `notifications` still waiting for an answer
pub fn pending_offers(notifications: &[Notification]) -> Vec<&Notification> {
    notifications.iter().filter(|n| n.awaits_response()).collect()
}
