//! Wire models for the platform backend
//!
//! Field names on the wire are Portuguese camelCase; collections arrive wrapped
//! in a `{ "data": [...] }` envelope, singletons as bare objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::moderation::action::{self, ActionSet, CampaignAction};
use crate::moderation::status::{
    deserialize_lenient, fold, CampaignStatus, DelegationStatus, ParticipantStatus, UserRole,
};

/// Notification type of a campaign delegation offer
pub const CAMPAIGN_DELEGATION: &str = "delegacao_campanha";

/// Collection envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Vec<T>,
}

/// A fundraising/volunteering campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: CampaignStatus,
    #[serde(rename = "ativa", default)]
    pub active: bool,
    #[serde(rename = "instituicaoId", default, skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<i64>,
    #[serde(rename = "regiaoId", default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<i64>,
    #[serde(rename = "metaArrecadacao", default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<f64>,
    #[serde(rename = "valorArrecadado", default, skip_serializing_if = "Option::is_none")]
    pub raised: Option<f64>,
    #[serde(
        rename = "dataCriacao",
        default,
        with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Campaign {
    /// Actions visible to `role` for this campaign
    pub fn allowed_actions(&self, role: UserRole) -> ActionSet {
        action::allowed_actions(self.status, self.active, role)
    }

    pub fn ensure_allowed(&self, role: UserRole, action: CampaignAction) -> Result<()> {
        action::ensure_allowed(self.status, self.active, role, action)
    }
}

/// Editable fields of a pending campaign
#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignUpdate {
    #[serde(rename = "titulo", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "metaArrecadacao", skip_serializing_if = "Option::is_none")]
    pub goal: Option<f64>,
}

/// A volunteer signed up to a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    #[serde(rename = "usuarioId")]
    pub user_id: i64,
    #[serde(rename = "nome", default)]
    pub name: String,
    pub status: ParticipantStatus,
    #[serde(rename = "motivoSaida", default, skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<String>,
    #[serde(
        rename = "dataInscricao",
        default,
        with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub joined_at: Option<DateTime<Utc>>,
}

/// Approval state of an institution account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstitutionStatus {
    Pending,
    Approved,
    Rejected,
    Unknown,
}

impl InstitutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstitutionStatus::Pending => "pendente",
            InstitutionStatus::Approved => "aprovada",
            InstitutionStatus::Rejected => "rejeitada",
            InstitutionStatus::Unknown => "desconhecida",
        }
    }
}

impl std::str::FromStr for InstitutionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match fold(s).as_str() {
            "pendente" => Ok(InstitutionStatus::Pending),
            "aprovada" | "aprovado" => Ok(InstitutionStatus::Approved),
            "rejeitada" | "rejeitado" => Ok(InstitutionStatus::Rejected),
            _ => Err(format!("Invalid institution status: {}", s)),
        }
    }
}

impl Serialize for InstitutionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InstitutionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_lenient(deserializer, "institution status", InstitutionStatus::Unknown)
    }
}

/// An organization account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub status: InstitutionStatus,
    /// User account that receives the institution's notifications
    #[serde(rename = "usuarioId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(rename = "regiaoId", default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<i64>,
}

impl Institution {
    /// Only approved institutions may receive delegated campaigns
    pub fn can_receive_delegation(&self) -> bool {
        self.status == InstitutionStatus::Approved
    }
}

/// Administrative region scoping moderator authority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "moderadorIds", default)]
    pub moderator_ids: Vec<i64>,
}

/// A platform user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "tipo")]
    pub role: UserRole,
    #[serde(rename = "instituicaoId", default, skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<i64>,
    #[serde(rename = "regiaoId", default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<i64>,
}

/// An entry in the user's notification feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "usuarioId", default)]
    pub user_id: i64,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "titulo", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "mensagem", default)]
    pub message: String,
    #[serde(rename = "lida", default)]
    pub read: bool,
    #[serde(rename = "statusDelegacao", default, skip_serializing_if = "Option::is_none")]
    pub delegation_status: Option<DelegationStatus>,
    #[serde(rename = "campanhaId", default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<i64>,
    #[serde(
        rename = "dataCriacao",
        default,
        with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn is_delegation(&self) -> bool {
        self.kind == CAMPAIGN_DELEGATION
    }

    /// A delegation offer still waiting for the institution's answer
    pub fn awaits_response(&self) -> bool {
        self.is_delegation()
            && self.delegation_status.unwrap_or(DelegationStatus::Pending)
                == DelegationStatus::Pending
    }
}

/// A help request (pedido de ajuda) with its own chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpRequest {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "usuarioId", default)]
    pub user_id: i64,
}

/// A chat message attached to a help request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    #[serde(rename = "autorId")]
    pub author_id: i64,
    #[serde(rename = "autorNome", default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(rename = "conteudo")]
    pub content: String,
    #[serde(
        rename = "dataEnvio",
        default,
        with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub sent_at: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 timestamps and the offset-less form the backend
/// sometimes emits (treated as UTC).
mod lenient_datetime {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }

        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Some(naive.and_utc()))
            .map_err(serde::de::Error::custom)
    }
}
