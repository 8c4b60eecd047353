//! Fatal errors of the cloning pipeline.

use std::fmt;

use thiserror::Error;

use crate::document::DecodeError;
use crate::pagination::PaginationError;
use crate::service::ServiceError;

/// Progress of a clone through the pipeline.
///
/// `Start → RoleRead → PolicyInventoryCollected → RoleCreated →
/// PoliciesReplayed → Done`. Only the transitions up to `RoleCreated` can
/// fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CloneStage {
    Start,
    RoleRead,
    PolicyInventoryCollected,
    RoleCreated,
    PoliciesReplayed,
    Done,
}

impl fmt::Display for CloneStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CloneStage::Start => "start",
            CloneStage::RoleRead => "role read",
            CloneStage::PolicyInventoryCollected => "policy inventory collected",
            CloneStage::RoleCreated => "role created",
            CloneStage::PoliciesReplayed => "policies replayed",
            CloneStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// An error that aborts the clone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloneError {
    #[error("source and target role are both named {0}")]
    SameRole(String),

    #[error("failed to get role {role}")]
    GetRole { role: String, source: ServiceError },

    #[error("role {role} has no trust policy document")]
    MissingTrustPolicy { role: String },

    #[error("failed to list inline policies of role {role}")]
    ListInlinePolicies {
        role: String,
        source: PaginationError,
    },

    #[error("failed to get inline policy {policy} of role {role}")]
    GetInlinePolicy {
        role: String,
        policy: String,
        source: ServiceError,
    },

    #[error("failed to list managed policies of role {role}")]
    ListManagedPolicies {
        role: String,
        source: PaginationError,
    },

    #[error("failed to decode trust policy document of role {role}")]
    DecodeTrustPolicy { role: String, source: DecodeError },

    #[error("failed to create role {role}")]
    CreateRole { role: String, source: ServiceError },
}

impl CloneError {
    /// The stage the pipeline was trying to reach when it aborted.
    pub fn failed_stage(&self) -> CloneStage {
        match self {
            CloneError::SameRole(_) => CloneStage::Start,
            CloneError::GetRole { .. } | CloneError::MissingTrustPolicy { .. } => {
                CloneStage::RoleRead
            }
            CloneError::ListInlinePolicies { .. }
            | CloneError::GetInlinePolicy { .. }
            | CloneError::ListManagedPolicies { .. } => CloneStage::PolicyInventoryCollected,
            CloneError::DecodeTrustPolicy { .. } | CloneError::CreateRole { .. } => {
                CloneStage::RoleCreated
            }
        }
    }
}
