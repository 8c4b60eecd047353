//! Replaying policy associations onto the target role.
//!
//! A failed item is logged and recorded; the loop moves on to the next one.
//! Nothing here returns an error to the caller.

use serde::Serialize;
use tracing::{info, warn};

use crate::document::decode_policy_document;
use crate::service::IdentityService;
use crate::types::{InlinePolicy, ManagedPolicyRef};

/// A policy that could not be replicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentFailure {
    /// Inline policy name or managed policy ARN.
    pub policy: String,
    pub reason: String,
}

/// Outcome of replaying one kind of policy association.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentReport {
    pub applied: Vec<String>,
    pub failed: Vec<AttachmentFailure>,
}

impl AttachmentReport {
    pub fn attempted(&self) -> usize {
        self.applied.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail(&mut self, policy: &str, reason: String) {
        self.failed.push(AttachmentFailure {
            policy: policy.to_string(),
            reason,
        });
    }
}

/// Copies every inline policy onto `target_role` under the same name.
///
/// A document that does not decode is skipped; the encoded form is never
/// submitted.
pub fn replicate_inline_policies<S: IdentityService>(
    service: &S,
    target_role: &str,
    policies: &[InlinePolicy],
) -> AttachmentReport {
    let mut report = AttachmentReport::default();

    for policy in policies {
        let document = match decode_policy_document(&policy.document) {
            Ok(document) => document,
            Err(e) => {
                warn!(
                    role = %target_role,
                    policy = %policy.name,
                    error = %e,
                    "Skipping inline policy with undecodable document"
                );
                report.fail(&policy.name, format!("document could not be decoded: {e}"));
                continue;
            }
        };

        match service.put_role_policy(target_role, &policy.name, &document) {
            Ok(()) => {
                info!(role = %target_role, policy = %policy.name, "Added inline policy");
                report.applied.push(policy.name.clone());
            }
            Err(e) => {
                warn!(
                    role = %target_role,
                    policy = %policy.name,
                    error = %e,
                    "Failed to add inline policy"
                );
                report.fail(&policy.name, e.to_string());
            }
        }
    }

    report
}

/// Attaches every managed policy to `target_role` by ARN.
pub fn replicate_managed_policies<S: IdentityService>(
    service: &S,
    target_role: &str,
    policies: &[ManagedPolicyRef],
) -> AttachmentReport {
    let mut report = AttachmentReport::default();

    for policy in policies {
        match service.attach_role_policy(target_role, &policy.arn) {
            Ok(()) => {
                info!(role = %target_role, policy = %policy.arn, "Attached managed policy");
                report.applied.push(policy.arn.clone());
            }
            Err(e) => {
                warn!(
                    role = %target_role,
                    policy = %policy.arn,
                    error = %e,
                    "Failed to attach managed policy"
                );
                report.fail(&policy.arn, e.to_string());
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryIdentityService, StoredRole};
    use crate::service::Operation;

    fn target() -> InMemoryIdentityService {
        InMemoryIdentityService::new().with_role(StoredRole::new("target", "%7B%7D"))
    }

    fn inline(n: usize) -> Vec<InlinePolicy> {
        (1..=n)
            .map(|i| InlinePolicy::new(format!("p{i}"), format!("%7B%22n%22%3A{i}%7D")))
            .collect()
    }

    #[test]
    fn inline_policies_are_stored_decoded() {
        let service = target();
        let report = replicate_inline_policies(&service, "target", &inline(2));

        assert_eq!(report.applied, ["p1", "p2"]);
        assert!(report.is_complete());

        let stored = service.role("target").unwrap();
        let decoded: Vec<String> = stored
            .inline_policies
            .iter()
            .map(|p| decode_policy_document(&p.document).unwrap())
            .collect();
        assert_eq!(decoded, [r#"{"n":1}"#, r#"{"n":2}"#]);
    }

    #[test]
    fn failed_inline_policy_does_not_stop_the_rest() {
        let service = target().fail_on(Operation::PutRolePolicy, "p2");
        let report = replicate_inline_policies(&service, "target", &inline(3));

        assert_eq!(report.applied, ["p1", "p3"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].policy, "p2");
        assert_eq!(report.attempted(), 3);
        assert_eq!(service.call_count(Operation::PutRolePolicy), 3);
    }

    #[test]
    fn undecodable_inline_policy_is_skipped_without_a_call() {
        let service = target();
        let policies = vec![
            InlinePolicy::new("good", "%7B%7D"),
            InlinePolicy::new("bad", "%7B%G0"),
        ];
        let report = replicate_inline_policies(&service, "target", &policies);

        assert_eq!(report.applied, ["good"]);
        assert_eq!(report.failed[0].policy, "bad");
        assert!(report.failed[0].reason.contains("could not be decoded"));
        assert_eq!(service.call_count(Operation::PutRolePolicy), 1);
    }

    #[test]
    fn managed_policies_attach_by_arn() {
        let service = target().fail_on(Operation::AttachRolePolicy, "arn:b");
        let policies = vec![
            ManagedPolicyRef::new("arn:a").with_name("a"),
            ManagedPolicyRef::new("arn:b"),
            ManagedPolicyRef::new("arn:c"),
        ];
        let report = replicate_managed_policies(&service, "target", &policies);

        assert_eq!(report.applied, ["arn:a", "arn:c"]);
        assert_eq!(report.failed[0].policy, "arn:b");

        let attached: Vec<String> = service
            .role("target")
            .unwrap()
            .managed_policies
            .into_iter()
            .map(|p| p.arn)
            .collect();
        assert_eq!(attached, ["arn:a", "arn:c"]);
    }

    #[test]
    fn empty_lists_issue_no_calls() {
        let service = target();
        assert_eq!(replicate_inline_policies(&service, "target", &[]).attempted(), 0);
        assert_eq!(replicate_managed_policies(&service, "target", &[]).attempted(), 0);
        assert_eq!(service.mutation_count(), 0);
    }
}
