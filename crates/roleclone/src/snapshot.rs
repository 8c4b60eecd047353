//! Reading the source role and its policy inventory.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::CloneError;
use crate::pagination::collect_all;
use crate::service::IdentityService;
use crate::types::{InlinePolicy, ManagedPolicyRef, RoleDescription, RoleSnapshot};

/// Every policy association of a role, fully collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyInventory {
    pub inline: Vec<InlinePolicy>,
    pub managed: Vec<ManagedPolicyRef>,
}

impl PolicyInventory {
    pub fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.managed.is_empty()
    }
}

impl RoleSnapshot {
    /// Captures a role description, requiring a trust-policy document.
    pub fn from_description(description: RoleDescription) -> Result<Self, CloneError> {
        let RoleDescription {
            role_name,
            arn,
            path,
            description,
            max_session_duration,
            assume_role_policy_document,
            permissions_boundary,
            tags,
        } = description;

        let Some(assume_role_policy_document) = assume_role_policy_document else {
            return Err(CloneError::MissingTrustPolicy { role: role_name });
        };

        Ok(Self {
            role_name,
            arn,
            path,
            description,
            max_session_duration,
            assume_role_policy_document,
            permissions_boundary,
            tags,
        })
    }
}

/// Fetches the role definition with a single `GetRole` call.
pub fn read_role<S: IdentityService>(
    service: &S,
    role_name: &str,
) -> Result<RoleSnapshot, CloneError> {
    let description = service
        .get_role(role_name)
        .map_err(|source| CloneError::GetRole {
            role: role_name.to_string(),
            source,
        })?;

    let snapshot = RoleSnapshot::from_description(description)?;
    info!(role = %snapshot.role_name, arn = %snapshot.arn, "Read source role");
    Ok(snapshot)
}

/// Lists every inline policy name, then fetches each document.
pub fn read_inline_policies<S: IdentityService>(
    service: &S,
    role_name: &str,
) -> Result<Vec<InlinePolicy>, CloneError> {
    let names = collect_all(|marker| service.list_role_policies(role_name, marker)).map_err(
        |source| CloneError::ListInlinePolicies {
            role: role_name.to_string(),
            source,
        },
    )?;

    let mut policies = Vec::with_capacity(names.len());
    for name in names {
        let policy = service
            .get_role_policy(role_name, &name)
            .map_err(|source| CloneError::GetInlinePolicy {
                role: role_name.to_string(),
                policy: name.clone(),
                source,
            })?;
        debug!(role = %role_name, policy = %policy.name, "Fetched inline policy");
        policies.push(policy);
    }

    Ok(policies)
}

/// Lists every managed policy attached to the role.
pub fn read_managed_policies<S: IdentityService>(
    service: &S,
    role_name: &str,
) -> Result<Vec<ManagedPolicyRef>, CloneError> {
    collect_all(|marker| service.list_attached_role_policies(role_name, marker)).map_err(
        |source| CloneError::ListManagedPolicies {
            role: role_name.to_string(),
            source,
        },
    )
}

/// Collects the complete policy inventory of a role.
pub fn read_inventory<S: IdentityService>(
    service: &S,
    role_name: &str,
) -> Result<PolicyInventory, CloneError> {
    let inline = read_inline_policies(service, role_name)?;
    let managed = read_managed_policies(service, role_name)?;

    info!(
        role = %role_name,
        inline = inline.len(),
        managed = managed.len(),
        "Collected policy inventory"
    );

    Ok(PolicyInventory { inline, managed })
}
