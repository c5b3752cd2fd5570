//! Institution approval, regions and users

use serde::Serialize;

use super::ApiClient;
use crate::error::Result;
use crate::models::{Institution, Region, User};

#[derive(Debug, Serialize)]
struct ModeratorAssignment {
    #[serde(rename = "usuarioId")]
    user_id: i64,
}

impl ApiClient {
    pub async fn list_institutions(&self) -> Result<Vec<Institution>> {
        self.get_collection("/api/instituicoes").await
    }

    pub async fn get_institution(&self, institution_id: i64) -> Result<Institution> {
        self.get_json(&format!("/api/instituicoes/{}", institution_id))
            .await
    }

    pub async fn approve_institution(&self, institution_id: i64) -> Result<()> {
        self.post_unit::<()>(&format!("/api/instituicoes/{}/aprovar", institution_id), None)
            .await
    }

    pub async fn reject_institution(&self, institution_id: i64) -> Result<()> {
        self.post_unit::<()>(&format!("/api/instituicoes/{}/rejeitar", institution_id), None)
            .await
    }

    pub async fn list_regions(&self) -> Result<Vec<Region>> {
        self.get_collection("/api/regioes").await
    }

    /// Scope a moderator's authority to a region
    pub async fn assign_region_moderator(&self, region_id: i64, user_id: i64) -> Result<()> {
        self.post_unit(
            &format!("/api/regioes/{}/moderadores", region_id),
            Some(&ModeratorAssignment { user_id }),
        )
        .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.get_collection("/api/usuarios").await
    }
}
