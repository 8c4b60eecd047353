//! Conversions between IAM SDK shapes and the pipeline's data model.

use aws_sdk_iam::types::{self as iam, AttachedPolicy};
use roleclone::{ManagedPolicyRef, Operation, RoleDescription, ServiceError, Tag};

/// Converts an IAM `Role` into a [`RoleDescription`].
pub fn role_description(role: &iam::Role) -> RoleDescription {
    RoleDescription {
        role_name: role.role_name().to_string(),
        arn: role.arn().to_string(),
        path: role.path().to_string(),
        description: role.description().map(str::to_string),
        max_session_duration: role.max_session_duration(),
        assume_role_policy_document: role.assume_role_policy_document().map(str::to_string),
        permissions_boundary: role
            .permissions_boundary()
            .and_then(|b| b.permissions_boundary_arn())
            .map(str::to_string),
        tags: role
            .tags()
            .iter()
            .map(|t| Tag::new(t.key(), t.value()))
            .collect(),
    }
}

/// Converts an attachment into a [`ManagedPolicyRef`]; the ARN is required.
pub fn managed_policy_ref(attached: &AttachedPolicy) -> Result<ManagedPolicyRef, ServiceError> {
    let arn = attached.policy_arn().ok_or_else(|| {
        ServiceError::new(
            Operation::ListAttachedRolePolicies,
            format!(
                "attached policy {} has no ARN",
                attached.policy_name().unwrap_or("<unnamed>")
            ),
        )
    })?;

    let policy = ManagedPolicyRef::new(arn);
    Ok(match attached.policy_name() {
        Some(name) => policy.with_name(name),
        None => policy,
    })
}

/// Builds SDK tags for a `CreateRole` call. `None` when there are no tags.
pub fn sdk_tags(tags: &[Tag]) -> Result<Option<Vec<iam::Tag>>, ServiceError> {
    if tags.is_empty() {
        return Ok(None);
    }

    tags.iter()
        .map(|t| {
            iam::Tag::builder()
                .key(&t.key)
                .value(&t.value)
                .build()
                .map_err(|e| {
                    ServiceError::new(Operation::CreateRole, format!("invalid tag {}: {e}", t.key))
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use aws_sdk_iam::primitives::DateTime;
    use aws_sdk_iam::types::AttachedPermissionsBoundary;

    use super::*;

    fn role_builder() -> aws_sdk_iam::types::builders::RoleBuilder {
        iam::Role::builder()
            .path("/svc/")
            .role_name("web")
            .role_id("AROAEXAMPLE")
            .arn("arn:aws:iam::123456789012:role/svc/web")
            .create_date(DateTime::from_secs(0))
            .assume_role_policy_document("%7B%22a%22%3A1%7D")
    }

    #[test]
    fn role_with_all_attributes() {
        let role = role_builder()
            .description("d")
            .max_session_duration(3600)
            .permissions_boundary(
                AttachedPermissionsBoundary::builder()
                    .permissions_boundary_arn("arn:aws:iam::123456789012:policy/cap")
                    .build(),
            )
            .tags(iam::Tag::builder().key("env").value("prod").build().unwrap())
            .build()
            .unwrap();

        let description = role_description(&role);

        assert_eq!(description.role_name, "web");
        assert_eq!(description.path, "/svc/");
        assert_eq!(description.description.as_deref(), Some("d"));
        assert_eq!(description.max_session_duration, Some(3600));
        assert_eq!(
            description.assume_role_policy_document.as_deref(),
            Some("%7B%22a%22%3A1%7D")
        );
        assert_eq!(
            description.permissions_boundary.as_deref(),
            Some("arn:aws:iam::123456789012:policy/cap")
        );
        assert_eq!(description.tags, vec![Tag::new("env", "prod")]);
    }

    #[test]
    fn role_without_optional_attributes() {
        let role = role_builder().build().unwrap();
        let description = role_description(&role);

        assert!(description.description.is_none());
        assert!(description.max_session_duration.is_none());
        assert!(description.permissions_boundary.is_none());
        assert!(description.tags.is_empty());
    }

    #[test]
    fn attached_policy_keeps_name() {
        let attached = AttachedPolicy::builder()
            .policy_arn("arn:aws:iam::aws:policy/ReadOnlyAccess")
            .policy_name("ReadOnlyAccess")
            .build();

        let policy = managed_policy_ref(&attached).unwrap();
        assert_eq!(policy.arn, "arn:aws:iam::aws:policy/ReadOnlyAccess");
        assert_eq!(policy.label(), "ReadOnlyAccess");
    }

    #[test]
    fn attached_policy_without_arn_is_an_error() {
        let attached = AttachedPolicy::builder().policy_name("orphan").build();
        let err = managed_policy_ref(&attached).unwrap_err();
        assert_eq!(err.operation, Operation::ListAttachedRolePolicies);
        assert!(err.message.contains("orphan"));
    }

    #[test]
    fn tags_convert_in_order() {
        let tags = sdk_tags(&[Tag::new("a", "1"), Tag::new("b", "2")])
            .unwrap()
            .unwrap();
        let keys: Vec<&str> = tags.iter().map(iam::Tag::key).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn no_tags_sends_none() {
        assert!(sdk_tags(&[]).unwrap().is_none());
    }
}
