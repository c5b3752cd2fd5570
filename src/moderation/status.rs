//! Status enums shared by campaigns, participants and delegations
//!
//! The backend is not consistent about status spelling (`"Finalizada"` and
//! `"finalizada"`, `"ativa"` and `"Arrecadando doações"` all show up), so
//! every status here is parsed leniently and written back in one canonical
//! form. Values the client does not recognise decode to `Unknown` instead of
//! failing the whole payload.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle status of a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CampaignStatus {
    /// Awaiting moderation (approve, reject or delegate)
    Pending,
    /// Approved and collecting donations
    Active,
    /// Approved, volunteering work under way
    InProgress,
    /// Approved but paused
    Paused,
    /// Closed for good
    Finalized,
    /// Refused during moderation
    Rejected,
    /// A status string this client does not recognise
    Unknown,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Pending => "pendente",
            CampaignStatus::Active => "ativa",
            CampaignStatus::InProgress => "Em andamento",
            CampaignStatus::Paused => "pausada",
            CampaignStatus::Finalized => "Finalizada",
            CampaignStatus::Rejected => "rejeitada",
            CampaignStatus::Unknown => "desconhecida",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CampaignStatus::Pending)
    }

    /// Finalized and rejected campaigns never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Finalized | CampaignStatus::Rejected)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "pendente" => Ok(CampaignStatus::Pending),
            "ativa" | "ativo" | "arrecadando doacoes" => Ok(CampaignStatus::Active),
            "em andamento" => Ok(CampaignStatus::InProgress),
            "pausada" | "pausado" => Ok(CampaignStatus::Paused),
            "finalizada" | "finalizado" => Ok(CampaignStatus::Finalized),
            "rejeitada" | "rejeitado" => Ok(CampaignStatus::Rejected),
            _ => Err(format!("Invalid campaign status: {}", s)),
        }
    }
}

impl Serialize for CampaignStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CampaignStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_lenient(deserializer, "campaign status", CampaignStatus::Unknown)
    }
}

/// Decode a wire string through `FromStr`, logging and substituting
/// `fallback` when the value is not recognised
pub(crate) fn deserialize_lenient<'de, D, T>(
    deserializer: D,
    kind: &'static str,
    fallback: T,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|_| {
        tracing::warn!(value = %raw, "Unrecognised {}", kind);
        fallback
    }))
}

/// Lowercase, trim and strip the Portuguese diacritics the backend uses
pub(crate) fn fold(s: &str) -> String {
    s.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Status of a campaign participant (volunteer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantStatus {
    Active,
    Pending,
    Removed,
    Unknown,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Active => "ativo",
            ParticipantStatus::Pending => "pendente",
            ParticipantStatus::Removed => "removido",
            ParticipantStatus::Unknown => "desconhecido",
        }
    }
}

impl std::str::FromStr for ParticipantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "ativo" | "ativa" => Ok(ParticipantStatus::Active),
            "pendente" => Ok(ParticipantStatus::Pending),
            "removido" | "removida" => Ok(ParticipantStatus::Removed),
            _ => Err(format!("Invalid participant status: {}", s)),
        }
    }
}

impl Serialize for ParticipantStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ParticipantStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_lenient(deserializer, "participant status", ParticipantStatus::Unknown)
    }
}

/// Status of a delegation offer carried by a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationStatus {
    Pending,
    Accepted,
    Declined,
    /// Anything else the backend reports (expired, withdrawn, ...); never answerable
    Unknown,
}

impl DelegationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelegationStatus::Pending => "pendente",
            DelegationStatus::Accepted => "aceita",
            DelegationStatus::Declined => "recusada",
            DelegationStatus::Unknown => "desconhecida",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DelegationStatus::Pending)
    }

    /// Resolution only ever moves forward out of `Pending`
    pub fn can_transition_to(&self, next: DelegationStatus) -> bool {
        matches!(
            (self, next),
            (DelegationStatus::Pending, DelegationStatus::Accepted)
                | (DelegationStatus::Pending, DelegationStatus::Declined)
        )
    }
}

impl std::str::FromStr for DelegationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "pendente" => Ok(DelegationStatus::Pending),
            "aceita" | "aceito" => Ok(DelegationStatus::Accepted),
            "recusada" | "recusado" => Ok(DelegationStatus::Declined),
            _ => Err(format!("Invalid delegation status: {}", s)),
        }
    }
}

impl Serialize for DelegationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DelegationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_lenient(deserializer, "delegation status", DelegationStatus::Unknown)
    }
}

/// Account type of the acting user (`tipo` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Admin,
    Moderator,
    User,
    Institution,
    /// An account type this client does not know; gets no elevated rights
    Unknown,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Moderator => "moderador",
            UserRole::User => "usuario",
            UserRole::Institution => "instituicao",
            UserRole::Unknown => "desconhecido",
        }
    }

    /// Admins and moderators can moderate campaigns
    pub fn is_elevated(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Moderator)
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "admin" => Ok(UserRole::Admin),
            "moderador" => Ok(UserRole::Moderator),
            "usuario" => Ok(UserRole::User),
            "instituicao" => Ok(UserRole::Institution),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_lenient(deserializer, "user role", UserRole::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_status_from_str_variants() {
        assert_eq!("pendente".parse::<CampaignStatus>().unwrap(), CampaignStatus::Pending);
        assert_eq!("ativa".parse::<CampaignStatus>().unwrap(), CampaignStatus::Active);
        assert_eq!(
            "Arrecadando doações".parse::<CampaignStatus>().unwrap(),
            CampaignStatus::Active
        );
        assert_eq!(
            "Em andamento".parse::<CampaignStatus>().unwrap(),
            CampaignStatus::InProgress
        );
        assert_eq!("pausada".parse::<CampaignStatus>().unwrap(), CampaignStatus::Paused);
        assert_eq!("Finalizada".parse::<CampaignStatus>().unwrap(), CampaignStatus::Finalized);
        assert_eq!("finalizada".parse::<CampaignStatus>().unwrap(), CampaignStatus::Finalized);
        assert_eq!(" REJEITADA ".parse::<CampaignStatus>().unwrap(), CampaignStatus::Rejected);
        assert!("arquivada".parse::<CampaignStatus>().is_err());
    }

    #[test]
    fn test_campaign_status_deserialize_unknown() {
        let status: CampaignStatus = serde_json::from_str("\"arquivada\"").unwrap();
        assert_eq!(status, CampaignStatus::Unknown);
    }

    #[test]
    fn test_campaign_status_serializes_canonical() {
        let status: CampaignStatus = serde_json::from_str("\"finalizada\"").unwrap();
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Finalizada\"");

        let status: CampaignStatus = serde_json::from_str("\"Arrecadando doações\"").unwrap();
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"ativa\"");
    }

    #[test]
    fn test_campaign_status_predicates() {
        assert!(CampaignStatus::Pending.is_pending());
        assert!(!CampaignStatus::Active.is_pending());
        assert!(CampaignStatus::Finalized.is_terminal());
        assert!(CampaignStatus::Rejected.is_terminal());
        assert!(!CampaignStatus::Paused.is_terminal());
        assert!(!CampaignStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_participant_status_serde() {
        assert_eq!(
            serde_json::to_string(&ParticipantStatus::Removed).unwrap(),
            "\"removido\""
        );
        let status: ParticipantStatus = serde_json::from_str("\"Ativo\"").unwrap();
        assert_eq!(status, ParticipantStatus::Active);
        let status: ParticipantStatus = serde_json::from_str("\"suspenso\"").unwrap();
        assert_eq!(status, ParticipantStatus::Unknown);
    }

    #[test]
    fn test_unrecognised_delegation_status_is_not_answerable() {
        let status: DelegationStatus = serde_json::from_str("\"expirada\"").unwrap();
        assert_eq!(status, DelegationStatus::Unknown);
        assert!(status.is_terminal());
        assert!(!status.can_transition_to(DelegationStatus::Accepted));

        let status: DelegationStatus = serde_json::from_str("\"Aceita\"").unwrap();
        assert_eq!(status, DelegationStatus::Accepted);
    }

    #[test]
    fn test_unrecognised_role_decodes_without_rights() {
        let role: UserRole = serde_json::from_str("\"voluntario\"").unwrap();
        assert_eq!(role, UserRole::Unknown);
        assert!(!role.is_elevated());

        let role: UserRole = serde_json::from_str("\"Instituição\"").unwrap();
        assert_eq!(role, UserRole::Institution);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"instituicao\"");
    }

    #[test]
    fn test_delegation_status_monotonic() {
        use DelegationStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Declined));
        assert!(!Pending.can_transition_to(Pending));
        for terminal in [Accepted, Declined] {
            assert!(terminal.is_terminal());
            for next in [Pending, Accepted, Declined] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_user_role() {
        assert_eq!("moderador".parse::<UserRole>().unwrap(), UserRole::Moderator);
        assert_eq!("Usuário".parse::<UserRole>().unwrap(), UserRole::User);
        assert!(UserRole::Admin.is_elevated());
        assert!(UserRole::Moderator.is_elevated());
        assert!(!UserRole::User.is_elevated());
        assert!(!UserRole::Institution.is_elevated());
        assert!("root".parse::<UserRole>().is_err());
    }
}
