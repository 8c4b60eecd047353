//! Orchestration of a clone: plan (reads only), then execute (writes).
//!
//! Errors from reading or creating are fatal and returned to the caller.
//! Once the target role exists, policy replication can only degrade the
//! result; it never aborts.

use serde::Serialize;
use tracing::{info, warn};

use crate::attach::{AttachmentReport, replicate_inline_policies, replicate_managed_policies};
use crate::error::{CloneError, CloneStage};
use crate::replicate::{build_create_request, create_role};
use crate::service::IdentityService;
use crate::snapshot::{PolicyInventory, read_inventory, read_role};
use crate::types::{CreateRoleRequest, RoleSnapshot};

/// Everything read from the source role, ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClonePlan {
    pub source: RoleSnapshot,
    pub inventory: PolicyInventory,
    pub request: CreateRoleRequest,
}

impl ClonePlan {
    pub fn target_name(&self) -> &str {
        &self.request.role_name
    }
}

/// Result of an executed clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloneReport {
    pub source: String,
    pub target: String,
    pub target_arn: String,
    pub inline: AttachmentReport,
    pub managed: AttachmentReport,
}

impl CloneReport {
    /// True when every policy was replicated.
    pub fn is_complete(&self) -> bool {
        self.inline.is_complete() && self.managed.is_complete()
    }

    pub fn failure_count(&self) -> usize {
        self.inline.failed.len() + self.managed.failed.len()
    }
}

/// Clones roles through an [`IdentityService`].
pub struct RoleCloner<S> {
    service: S,
}

impl<S: IdentityService> RoleCloner<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Reads the source role and its policies and prepares the create
    /// request. Issues no mutating calls.
    pub fn plan(&self, source: &str, target: &str) -> Result<ClonePlan, CloneError> {
        if source == target {
            return Err(CloneError::SameRole(source.to_string()));
        }

        let snapshot = read_role(&self.service, source)?;
        advance(CloneStage::RoleRead);

        let inventory = read_inventory(&self.service, source)?;
        advance(CloneStage::PolicyInventoryCollected);

        let request = build_create_request(&snapshot, target)?;

        Ok(ClonePlan {
            source: snapshot,
            inventory,
            request,
        })
    }

    /// Creates the target role, then replays its policies.
    ///
    /// Fails only if the role cannot be created, in which case no policy
    /// call is made.
    pub fn execute(&self, plan: &ClonePlan) -> Result<CloneReport, CloneError> {
        let created = create_role(&self.service, &plan.request)?;
        advance(CloneStage::RoleCreated);

        let inline =
            replicate_inline_policies(&self.service, &created.role_name, &plan.inventory.inline);
        let managed =
            replicate_managed_policies(&self.service, &created.role_name, &plan.inventory.managed);
        advance(CloneStage::PoliciesReplayed);

        let report = CloneReport {
            source: plan.source.role_name.clone(),
            target: created.role_name,
            target_arn: created.arn,
            inline,
            managed,
        };

        if report.is_complete() {
            info!(
                source = %report.source,
                target = %report.target,
                "Role cloned"
            );
        } else {
            warn!(
                source = %report.source,
                target = %report.target,
                failures = report.failure_count(),
                "Role cloned with policy replication failures"
            );
        }
        advance(CloneStage::Done);

        Ok(report)
    }

    /// Plans and executes a clone of `source` as `target`.
    pub fn run(&self, source: &str, target: &str) -> Result<CloneReport, CloneError> {
        let plan = self.plan(source, target)?;
        self.execute(&plan)
    }
}

fn advance(stage: CloneStage) {
    tracing::debug!(%stage, "Clone stage reached");
}
