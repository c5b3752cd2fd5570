//! Campaign actions and the rules deciding which ones are available
//!
//! The decision depends on the campaign status, its `ativa` flag and the
//! role of the acting user.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::status::{CampaignStatus, UserRole};
use crate::error::{AppError, Result};

/// Actions that can be offered for a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignAction {
    /// Approve a pending campaign (aprovar)
    Approve,
    /// Hand a pending campaign to an institution (delegar)
    Delegate,
    /// Refuse a pending campaign (rejeitar)
    Reject,
    /// Edit a pending campaign (editar)
    Edit,
    /// Pause an active campaign (pausar)
    Pause,
    /// Resume a paused campaign (ativar)
    Activate,
    /// Close a campaign for good (finalizar)
    Finalize,
    /// Open the management view (gerenciar)
    Manage,
    /// Read-only view (ver detalhes)
    ViewDetails,
}

impl CampaignAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignAction::Approve => "approve",
            CampaignAction::Delegate => "delegate",
            CampaignAction::Reject => "reject",
            CampaignAction::Edit => "edit",
            CampaignAction::Pause => "pause",
            CampaignAction::Activate => "activate",
            CampaignAction::Finalize => "finalize",
            CampaignAction::Manage => "manage",
            CampaignAction::ViewDetails => "view_details",
        }
    }

    /// Portuguese label used by the platform UI
    pub fn label(&self) -> &'static str {
        match self {
            CampaignAction::Approve => "Aprovar",
            CampaignAction::Delegate => "Delegar",
            CampaignAction::Reject => "Rejeitar",
            CampaignAction::Edit => "Editar",
            CampaignAction::Pause => "Pausar",
            CampaignAction::Activate => "Ativar",
            CampaignAction::Finalize => "Finalizar",
            CampaignAction::Manage => "Gerenciar",
            CampaignAction::ViewDetails => "Ver detalhes",
        }
    }

    /// Whether performing the action changes campaign state on the backend
    pub fn is_mutating(&self) -> bool {
        !matches!(self, CampaignAction::Manage | CampaignAction::ViewDetails)
    }

    /// Path segment of the backend endpoint for status-changing actions
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            CampaignAction::Approve => Some("aprovar"),
            CampaignAction::Delegate => Some("delegar"),
            CampaignAction::Reject => Some("rejeitar"),
            CampaignAction::Pause => Some("pausar"),
            CampaignAction::Activate => Some("ativar"),
            CampaignAction::Finalize => Some("finalizar"),
            CampaignAction::Edit | CampaignAction::Manage | CampaignAction::ViewDetails => None,
        }
    }
}

impl std::str::FromStr for CampaignAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "aprovar" => Ok(CampaignAction::Approve),
            "delegate" | "delegar" => Ok(CampaignAction::Delegate),
            "reject" | "rejeitar" => Ok(CampaignAction::Reject),
            "edit" | "editar" => Ok(CampaignAction::Edit),
            "pause" | "pausar" => Ok(CampaignAction::Pause),
            "activate" | "ativar" => Ok(CampaignAction::Activate),
            "finalize" | "finalizar" => Ok(CampaignAction::Finalize),
            "manage" | "gerenciar" => Ok(CampaignAction::Manage),
            "view_details" | "view-details" | "ver_detalhes" => Ok(CampaignAction::ViewDetails),
            _ => Err(format!("Invalid campaign action: {}", s)),
        }
    }
}

impl std::fmt::Display for CampaignAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of campaign actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSet {
    actions: BTreeSet<CampaignAction>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self {
            actions: BTreeSet::new(),
        }
    }

    pub fn contains(&self, action: CampaignAction) -> bool {
        self.actions.contains(&action)
    }

    pub fn insert(&mut self, action: CampaignAction) {
        self.actions.insert(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = CampaignAction> + '_ {
        self.actions.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<CampaignAction> {
        self.iter().collect()
    }
}

impl From<Vec<CampaignAction>> for ActionSet {
    fn from(actions: Vec<CampaignAction>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[CampaignAction; N]> for ActionSet {
    fn from(actions: [CampaignAction; N]) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }
}

/// Compute the actions visible for a campaign
///
/// | status | ativa | actions |
/// |---|---|---|
/// | pendente | any | Approve, Delegate, Reject, Edit (moderators/admins only) |
/// | non-pending | true | Pause, Finalize, Manage, ViewDetails |
/// | non-pending, not finalized | false | Activate, Finalize, Manage, ViewDetails |
/// | Finalizada / rejeitada / unknown | any | ViewDetails |
///
/// Regular users and institutions only ever get `ViewDetails` on
/// non-pending campaigns and nothing on pending ones.
pub fn allowed_actions(status: CampaignStatus, active: bool, role: UserRole) -> ActionSet {
    use CampaignAction::*;

    if status.is_pending() {
        return if role.is_elevated() {
            [Approve, Delegate, Reject, Edit].into()
        } else {
            ActionSet::new()
        };
    }

    if status.is_terminal() || status == CampaignStatus::Unknown || !role.is_elevated() {
        return [ViewDetails].into();
    }

    if active {
        [Pause, Finalize, Manage, ViewDetails].into()
    } else {
        [Activate, Finalize, Manage, ViewDetails].into()
    }
}

/// Fail with `ActionNotAllowed` unless `action` is in the allowed set
pub fn ensure_allowed(
    status: CampaignStatus,
    active: bool,
    role: UserRole,
    action: CampaignAction,
) -> Result<()> {
    if allowed_actions(status, active, role).contains(action) {
        Ok(())
    } else {
        Err(AppError::ActionNotAllowed(format!(
            "{} is not available for a {} campaign (ativa={}) as {}",
            action.label(),
            status,
            active,
            role.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CampaignAction::*;

    const ALL_STATUSES: [CampaignStatus; 7] = [
        CampaignStatus::Pending,
        CampaignStatus::Active,
        CampaignStatus::InProgress,
        CampaignStatus::Paused,
        CampaignStatus::Finalized,
        CampaignStatus::Rejected,
        CampaignStatus::Unknown,
    ];

    const ALL_ROLES: [UserRole; 5] = [
        UserRole::Admin,
        UserRole::Moderator,
        UserRole::User,
        UserRole::Institution,
        UserRole::Unknown,
    ];

    fn expected(status: CampaignStatus, active: bool, role: UserRole) -> Vec<CampaignAction> {
        match (status, role.is_elevated()) {
            (CampaignStatus::Pending, true) => vec![Approve, Delegate, Reject, Edit],
            (CampaignStatus::Pending, false) => vec![],
            (CampaignStatus::Finalized | CampaignStatus::Rejected | CampaignStatus::Unknown, _) => {
                vec![ViewDetails]
            }
            (_, false) => vec![ViewDetails],
            (_, true) if active => vec![Pause, Finalize, Manage, ViewDetails],
            (_, true) => vec![Activate, Finalize, Manage, ViewDetails],
        }
    }

    #[test]
    fn test_decision_table_exhaustive() {
        for status in ALL_STATUSES {
            for active in [true, false] {
                for role in ALL_ROLES {
                    let got = allowed_actions(status, active, role);
                    let want: ActionSet = expected(status, active, role).into();
                    assert_eq!(got, want, "status={:?} active={} role={:?}", status, active, role);
                }
            }
        }
    }

    #[test]
    fn test_pending_for_moderator() {
        let actions = allowed_actions(CampaignStatus::Pending, false, UserRole::Moderator);
        assert_eq!(actions.to_vec(), vec![Approve, Delegate, Reject, Edit]);
    }

    #[test]
    fn test_pending_for_regular_user() {
        assert!(allowed_actions(CampaignStatus::Pending, false, UserRole::User).is_empty());
    }

    #[test]
    fn test_active_vs_paused() {
        let active = allowed_actions(CampaignStatus::Active, true, UserRole::Admin);
        assert!(active.contains(Pause));
        assert!(!active.contains(Activate));

        let paused = allowed_actions(CampaignStatus::Paused, false, UserRole::Admin);
        assert!(paused.contains(Activate));
        assert!(!paused.contains(Pause));
        assert!(paused.contains(Finalize));
    }

    #[test]
    fn test_finalized_is_read_only() {
        for active in [true, false] {
            let actions = allowed_actions(CampaignStatus::Finalized, active, UserRole::Admin);
            assert_eq!(actions.to_vec(), vec![ViewDetails]);
            assert!(actions.iter().all(|a| !a.is_mutating()));
        }
    }

    #[test]
    fn test_ensure_allowed() {
        assert!(ensure_allowed(CampaignStatus::Pending, false, UserRole::Moderator, Approve).is_ok());
        let err = ensure_allowed(CampaignStatus::Finalized, false, UserRole::Admin, Activate)
            .unwrap_err();
        assert!(matches!(err, AppError::ActionNotAllowed(_)));
    }

    #[test]
    fn test_action_from_str() {
        assert_eq!("aprovar".parse::<CampaignAction>().unwrap(), Approve);
        assert_eq!("Pause".parse::<CampaignAction>().unwrap(), Pause);
        assert_eq!("view-details".parse::<CampaignAction>().unwrap(), ViewDetails);
        assert!("explode".parse::<CampaignAction>().is_err());
    }

    #[test]
    fn test_action_endpoints() {
        assert_eq!(Approve.endpoint(), Some("aprovar"));
        assert_eq!(Finalize.endpoint(), Some("finalizar"));
        assert_eq!(Edit.endpoint(), None);
        assert_eq!(ViewDetails.endpoint(), None);
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&ViewDetails).unwrap();
        assert_eq!(json, "\"view_details\"");
        let back: CampaignAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ViewDetails);
    }
}
