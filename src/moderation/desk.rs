//! Moderation desk coordinating campaign, participant and delegation actions
//!
//! The desk handles:
//! - Guarding campaign actions with the status/role rules before calling the API
//! - Reloading the campaign list after every status change
//! - Optimistic participant removal
//! - Answering delegation offers from the notification feed
//! - Institution review and region assignment
//! - Event broadcasting

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use super::action::{ActionSet, CampaignAction};
use super::delegation::{self, DelegationOffer, DelegationResponse};
use super::participants::{ParticipantRoster, RemovalRequest, WarningRequest};
use super::status::{DelegationStatus, UserRole};
use crate::api::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{Campaign, CampaignUpdate, Notification, Participant, User};

/// Events emitted by the desk after the backend accepted a change
#[derive(Debug, Clone, PartialEq)]
pub enum DeskEvent {
    /// The campaign list was fetched again
    CampaignsReloaded { count: usize },
    /// A status-changing action succeeded
    CampaignActionPerformed {
        campaign_id: i64,
        action: CampaignAction,
    },
    /// A pending campaign was offered to an institution
    CampaignDelegated {
        campaign_id: i64,
        institution_id: i64,
    },
    /// A pending campaign was edited
    CampaignEdited { campaign_id: i64 },
    /// A participant was removed from a campaign
    ParticipantRemoved {
        campaign_id: i64,
        participant_id: i64,
        reason: String,
    },
    /// A participant received a warning
    ParticipantWarned {
        campaign_id: i64,
        participant_id: i64,
    },
    /// A delegation offer was accepted or declined
    DelegationResolved {
        notification_id: i64,
        campaign_id: Option<i64>,
        status: DelegationStatus,
    },
    /// A notification was marked read
    NotificationRead { notification_id: i64 },
    /// An institution account was approved or rejected
    InstitutionReviewed { institution_id: i64, approved: bool },
    /// A moderator was scoped to a region
    RegionModeratorAssigned { region_id: i64, user_id: i64 },
}

/// Client-side moderation workflow for one logged-in user
pub struct ModerationDesk {
    client: Arc<ApiClient>,
    user: User,
    /// Last fetched campaign list
    campaigns: RwLock<Vec<Campaign>>,
    /// Participant rosters by campaign ID
    rosters: RwLock<HashMap<i64, ParticipantRoster>>,
    /// Last fetched notification feed
    notifications: RwLock<Vec<Notification>>,
    event_tx: broadcast::Sender<DeskEvent>,
}

impl ModerationDesk {
    pub fn new(client: Arc<ApiClient>, user: User) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            client,
            user,
            campaigns: RwLock::new(Vec::new()),
            rosters: RwLock::new(HashMap::new()),
            notifications: RwLock::new(Vec::new()),
            event_tx,
        }
    }

    /// Build a desk for whoever is logged in
    pub async fn for_session(client: Arc<ApiClient>) -> Result<Self> {
        let user = client.session_user().await?;
        Ok(Self::new(client, user))
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    /// Subscribe to desk events
    pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: DeskEvent) {
        let _ = self.event_tx.send(event);
    }

    // Campaigns

    /// Fetch the full campaign list, replacing the cached one
    pub async fn refresh_campaigns(&self) -> Result<Vec<Campaign>> {
        let campaigns = self.client.list_campaigns().await?;
        let count = campaigns.len();

        {
            let mut cached = self.campaigns.write().await;
            *cached = campaigns.clone();
        }

        self.emit(DeskEvent::CampaignsReloaded { count });
        Ok(campaigns)
    }

    pub async fn campaigns(&self) -> Vec<Campaign> {
        self.campaigns.read().await.clone()
    }

    /// Cached campaign, fetched from the backend when not cached
    pub async fn campaign(&self, campaign_id: i64) -> Result<Campaign> {
        {
            let cached = self.campaigns.read().await;
            if let Some(campaign) = cached.iter().find(|c| c.id == campaign_id) {
                return Ok(campaign.clone());
            }
        }

        self.client.get_campaign(campaign_id).await
    }

    /// Actions the current user may take on a campaign
    pub async fn actions_for(&self, campaign_id: i64) -> Result<ActionSet> {
        let campaign = self.campaign(campaign_id).await?;
        Ok(campaign.allowed_actions(self.role()))
    }

    /// Perform a payload-free status action, then reload the list
    ///
    /// Covers approve, reject (without reason), pause, activate and finalize.
    pub async fn perform(&self, campaign_id: i64, action: CampaignAction) -> Result<Vec<Campaign>> {
        let campaign = self.campaign(campaign_id).await?;
        campaign.ensure_allowed(self.role(), action)?;

        match action {
            CampaignAction::Reject => self.client.reject_campaign(campaign_id, None).await?,
            CampaignAction::Delegate => {
                return Err(AppError::BadRequest(
                    "delegation needs an institution, use delegate()".to_string(),
                ))
            }
            CampaignAction::Edit => {
                return Err(AppError::BadRequest(
                    "editing needs the new fields, use edit()".to_string(),
                ))
            }
            CampaignAction::Manage | CampaignAction::ViewDetails => {
                return Err(AppError::BadRequest(format!(
                    "{} does not change the campaign",
                    action.label()
                )))
            }
            _ => self.client.campaign_action(campaign_id, action).await?,
        }

        tracing::info!(campaign_id, action = action.as_str(), "Campaign action performed");
        self.emit(DeskEvent::CampaignActionPerformed {
            campaign_id,
            action,
        });

        self.refresh_campaigns().await
    }

    /// Reject a pending campaign with an optional reason
    pub async fn reject(&self, campaign_id: i64, reason: Option<&str>) -> Result<Vec<Campaign>> {
        let campaign = self.campaign(campaign_id).await?;
        campaign.ensure_allowed(self.role(), CampaignAction::Reject)?;

        self.client.reject_campaign(campaign_id, reason).await?;

        tracing::info!(campaign_id, "Campaign rejected");
        self.emit(DeskEvent::CampaignActionPerformed {
            campaign_id,
            action: CampaignAction::Reject,
        });

        self.refresh_campaigns().await
    }

    /// Offer a pending campaign to an approved institution
    pub async fn delegate(&self, campaign_id: i64, institution_id: i64) -> Result<Vec<Campaign>> {
        let campaign = self.campaign(campaign_id).await?;
        campaign.ensure_allowed(self.role(), CampaignAction::Delegate)?;

        let institution = self.client.get_institution(institution_id).await?;
        let offer = DelegationOffer::new(&campaign, &institution)?;

        self.client.delegate_campaign(campaign_id, &offer).await?;

        tracing::info!(campaign_id, institution_id, "Campaign delegated");
        self.emit(DeskEvent::CampaignDelegated {
            campaign_id,
            institution_id,
        });

        self.refresh_campaigns().await
    }

    /// Edit a pending campaign
    pub async fn edit(&self, campaign_id: i64, update: &CampaignUpdate) -> Result<Vec<Campaign>> {
        let campaign = self.campaign(campaign_id).await?;
        campaign.ensure_allowed(self.role(), CampaignAction::Edit)?;

        self.client.update_campaign(campaign_id, update).await?;

        tracing::info!(campaign_id, "Campaign edited");
        self.emit(DeskEvent::CampaignEdited { campaign_id });

        self.refresh_campaigns().await
    }

    // Participants

    /// Fetch a campaign's participants, replacing the cached roster
    pub async fn load_participants(&self, campaign_id: i64) -> Result<Vec<Participant>> {
        let participants = self.client.list_participants(campaign_id).await?;

        let mut rosters = self.rosters.write().await;
        rosters.insert(
            campaign_id,
            ParticipantRoster::new(campaign_id, participants.clone()),
        );

        Ok(participants)
    }

    pub async fn participants(&self, campaign_id: i64) -> Option<Vec<Participant>> {
        let rosters = self.rosters.read().await;
        rosters.get(&campaign_id).map(|r| r.participants().to_vec())
    }

    /// Remove a participant with a mandatory reason
    ///
    /// On success the cached roster is patched in place instead of reloaded.
    /// The roster stays locked for the duration of the request, so a repeated
    /// removal waits and then finds no active participant.
    pub async fn remove_participant(
        &self,
        campaign_id: i64,
        participant_id: i64,
        reason: &str,
    ) -> Result<Participant> {
        let request = RemovalRequest::new(reason)?;

        if self.rosters.read().await.get(&campaign_id).is_none() {
            self.load_participants(campaign_id).await?;
        }

        let mut rosters = self.rosters.write().await;
        let roster = rosters
            .get_mut(&campaign_id)
            .ok_or_else(|| AppError::NotFound(format!("campaign {} roster", campaign_id)))?;

        roster.ensure_removable(participant_id)?;

        self.client
            .remove_participant(campaign_id, participant_id, &request)
            .await?;

        let removed = roster.mark_removed(participant_id, &request.motivo)?.clone();

        tracing::info!(campaign_id, participant_id, "Participant removed");
        self.emit(DeskEvent::ParticipantRemoved {
            campaign_id,
            participant_id,
            reason: request.motivo,
        });

        Ok(removed)
    }

    /// Send a warning; nothing changes locally
    pub async fn warn_participant(
        &self,
        campaign_id: i64,
        participant_id: i64,
        message: &str,
    ) -> Result<()> {
        let request = WarningRequest {
            mensagem: message.trim().to_string(),
        };

        self.client
            .warn_participant(campaign_id, participant_id, &request)
            .await?;

        tracing::info!(campaign_id, participant_id, "Participant warned");
        self.emit(DeskEvent::ParticipantWarned {
            campaign_id,
            participant_id,
        });

        Ok(())
    }

    // Notifications

    pub async fn refresh_notifications(&self) -> Result<Vec<Notification>> {
        let notifications = self.client.list_notifications().await?;

        let mut cached = self.notifications.write().await;
        *cached = notifications.clone();

        Ok(notifications)
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }

    pub async fn unread_count(&self) -> usize {
        self.notifications
            .read()
            .await
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    /// Delegation offers still waiting for this user's answer
    pub async fn pending_delegations(&self) -> Vec<Notification> {
        let notifications = self.notifications.read().await;
        delegation::pending_offers(&notifications)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Accept or decline a delegation offer
    ///
    /// Resolution is final: an already answered offer is refused locally
    /// without contacting the backend.
    pub async fn respond_delegation(
        &self,
        notification_id: i64,
        accept: bool,
    ) -> Result<DelegationStatus> {
        let response = DelegationResponse::from_accept(accept);

        if !self.has_notification(notification_id).await {
            self.refresh_notifications().await?;
        }

        let mut notifications = self.notifications.write().await;
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| AppError::NotFound(format!("notification {}", notification_id)))?;

        delegation::ensure_respondable(notification)?;

        self.client
            .respond_delegation(notification_id, response)
            .await?;

        let status = delegation::resolve(notification, response)?;
        let campaign_id = notification.campaign_id;

        tracing::info!(notification_id, status = status.as_str(), "Delegation answered");
        self.emit(DeskEvent::DelegationResolved {
            notification_id,
            campaign_id,
            status,
        });

        Ok(status)
    }

    pub async fn mark_read(&self, notification_id: i64) -> Result<()> {
        self.client.mark_notification_read(notification_id).await?;

        {
            let mut notifications = self.notifications.write().await;
            if let Some(n) = notifications.iter_mut().find(|n| n.id == notification_id) {
                n.read = true;
            }
        }

        self.emit(DeskEvent::NotificationRead { notification_id });
        Ok(())
    }

    async fn has_notification(&self, notification_id: i64) -> bool {
        self.notifications
            .read()
            .await
            .iter()
            .any(|n| n.id == notification_id)
    }

    // Institutions and regions

    /// Approve or reject an institution account
    pub async fn review_institution(&self, institution_id: i64, approve: bool) -> Result<()> {
        if !self.role().is_elevated() {
            return Err(AppError::ActionNotAllowed(format!(
                "{} cannot review institutions",
                self.role().as_str()
            )));
        }

        if approve {
            self.client.approve_institution(institution_id).await?;
        } else {
            self.client.reject_institution(institution_id).await?;
        }

        tracing::info!(institution_id, approve, "Institution reviewed");
        self.emit(DeskEvent::InstitutionReviewed {
            institution_id,
            approved: approve,
        });

        Ok(())
    }

    /// Scope a moderator to a region (admins only)
    pub async fn assign_region_moderator(&self, region_id: i64, user_id: i64) -> Result<()> {
        if self.role() != UserRole::Admin {
            return Err(AppError::ActionNotAllowed(
                "only admins assign regions".to_string(),
            ));
        }

        self.client.assign_region_moderator(region_id, user_id).await?;

        tracing::info!(region_id, user_id, "Region moderator assigned");
        self.emit(DeskEvent::RegionModeratorAssigned { region_id, user_id });

        Ok(())
    }
}
