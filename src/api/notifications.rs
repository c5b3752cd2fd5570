//! Notification feed endpoints

use super::ApiClient;
use crate::error::Result;
use crate::models::Notification;
use crate::moderation::delegation::{DelegationReply, DelegationResponse};

impl ApiClient {
    pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
        self.get_collection("/api/notificacoes").await
    }

    pub async fn mark_notification_read(&self, notification_id: i64) -> Result<()> {
        self.post_unit::<()>(&format!("/api/notificacoes/{}/lida", notification_id), None)
            .await
    }

    /// Answer a delegation offer (`responderDelegacao`)
    pub async fn respond_delegation(
        &self,
        notification_id: i64,
        response: DelegationResponse,
    ) -> Result<()> {
        self.post_unit(
            &format!("/api/notificacoes/{}/responder-delegacao", notification_id),
            Some(&DelegationReply::from(response)),
        )
        .await
    }
}
