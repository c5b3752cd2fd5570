//! Campaign, participant, donation and volunteering endpoints

use serde::Serialize;

use super::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{Campaign, CampaignUpdate, Participant};
use crate::moderation::action::CampaignAction;
use crate::moderation::delegation::DelegationOffer;
use crate::moderation::participants::{RemovalRequest, WarningRequest};

#[derive(Debug, Serialize)]
struct RejectionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    motivo: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DonationRequest {
    valor: f64,
}

impl ApiClient {
    pub async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        self.get_collection("/api/campanhas").await
    }

    pub async fn get_campaign(&self, campaign_id: i64) -> Result<Campaign> {
        self.get_json(&format!("/api/campanhas/{}", campaign_id))
            .await
    }

    /// POST a status-changing action with no payload
    ///
    /// `Delegate` and `Reject` carry bodies; use [`ApiClient::delegate_campaign`]
    /// and [`ApiClient::reject_campaign`] for those.
    pub async fn campaign_action(&self, campaign_id: i64, action: CampaignAction) -> Result<()> {
        let endpoint = action.endpoint().ok_or_else(|| {
            AppError::BadRequest(format!("{} has no backend endpoint", action.label()))
        })?;

        self.post_unit::<()>(
            &format!("/api/campanhas/{}/{}", campaign_id, endpoint),
            None,
        )
        .await
    }

    pub async fn reject_campaign(&self, campaign_id: i64, reason: Option<&str>) -> Result<()> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        self.post_unit(
            &format!("/api/campanhas/{}/rejeitar", campaign_id),
            Some(&RejectionRequest { motivo: reason }),
        )
        .await
    }

    pub async fn delegate_campaign(&self, campaign_id: i64, offer: &DelegationOffer) -> Result<()> {
        self.post_unit(
            &format!("/api/campanhas/{}/delegar", campaign_id),
            Some(offer),
        )
        .await
    }

    /// The backend may answer with the updated campaign or an empty body;
    /// callers reload either way
    pub async fn update_campaign(&self, campaign_id: i64, update: &CampaignUpdate) -> Result<()> {
        self.put_unit(&format!("/api/campanhas/{}", campaign_id), update)
            .await
    }

    pub async fn list_participants(&self, campaign_id: i64) -> Result<Vec<Participant>> {
        self.get_collection(&format!("/api/campanhas/{}/participantes", campaign_id))
            .await
    }

    pub async fn remove_participant(
        &self,
        campaign_id: i64,
        participant_id: i64,
        request: &RemovalRequest,
    ) -> Result<()> {
        self.post_unit(
            &format!(
                "/api/campanhas/{}/participantes/{}/remover",
                campaign_id, participant_id
            ),
            Some(request),
        )
        .await
    }

    pub async fn warn_participant(
        &self,
        campaign_id: i64,
        participant_id: i64,
        request: &WarningRequest,
    ) -> Result<()> {
        self.post_unit(
            &format!(
                "/api/campanhas/{}/participantes/{}/advertencia",
                campaign_id, participant_id
            ),
            Some(request),
        )
        .await
    }

    /// Donate `amount` to a campaign
    pub async fn donate(&self, campaign_id: i64, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::BadRequest(format!(
                "donation amount must be positive, got {}",
                amount
            )));
        }

        self.post_unit(
            &format!("/api/campanhas/{}/doacoes", campaign_id),
            Some(&DonationRequest { valor: amount }),
        )
        .await
    }

    /// Sign the current user up as a volunteer
    pub async fn volunteer(&self, campaign_id: i64) -> Result<()> {
        self.post_unit::<()>(&format!("/api/campanhas/{}/inscricoes", campaign_id), None)
            .await
    }
}
