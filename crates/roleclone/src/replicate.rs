//! Creating the target role from a snapshot.

use tracing::info;

use crate::document::decode_policy_document;
use crate::error::CloneError;
use crate::service::IdentityService;
use crate::types::{CreateRoleRequest, CreatedRole, RoleSnapshot};

/// Builds the `CreateRole` payload for `target_name` from a snapshot.
///
/// Path, description, session duration and tags are copied as they are. The
/// trust policy is decoded to raw JSON. The permissions boundary is carried
/// over only when the source has one.
pub fn build_create_request(
    snapshot: &RoleSnapshot,
    target_name: &str,
) -> Result<CreateRoleRequest, CloneError> {
    let assume_role_policy_document =
        decode_policy_document(&snapshot.assume_role_policy_document).map_err(|source| {
            CloneError::DecodeTrustPolicy {
                role: snapshot.role_name.clone(),
                source,
            }
        })?;

    Ok(CreateRoleRequest {
        role_name: target_name.to_string(),
        path: snapshot.path.clone(),
        description: snapshot.description.clone(),
        max_session_duration: snapshot.max_session_duration,
        assume_role_policy_document,
        permissions_boundary: snapshot.permissions_boundary.clone(),
        tags: snapshot.tags.clone(),
    })
}

/// Submits a prepared `CreateRole` request.
pub fn create_role<S: IdentityService>(
    service: &S,
    request: &CreateRoleRequest,
) -> Result<CreatedRole, CloneError> {
    let created = service
        .create_role(request)
        .map_err(|source| CloneError::CreateRole {
            role: request.role_name.clone(),
            source,
        })?;

    info!(role = %created.role_name, arn = %created.arn, "Created target role");
    Ok(created)
}

/// Builds and submits the `CreateRole` request for `target_name`.
pub fn replicate_role<S: IdentityService>(
    service: &S,
    snapshot: &RoleSnapshot,
    target_name: &str,
) -> Result<CreatedRole, CloneError> {
    let request = build_create_request(snapshot, target_name)?;
    create_role(service, &request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DecodeError;
    use crate::memory::{InMemoryIdentityService, StoredRole};
    use crate::service::Operation;
    use crate::types::Tag;

    fn snapshot() -> RoleSnapshot {
        RoleSnapshot {
            role_name: "source".into(),
            arn: "arn:aws:iam::000000000000:role/svc/source".into(),
            path: "/svc/".into(),
            description: Some("d".into()),
            max_session_duration: Some(3600),
            assume_role_policy_document: "%7B%22a%22%3A1%7D".into(),
            permissions_boundary: None,
            tags: vec![Tag::new("env", "prod")],
        }
    }

    #[test]
    fn request_copies_attributes_and_decodes_trust_policy() {
        let request = build_create_request(&snapshot(), "target").unwrap();

        assert_eq!(
            request,
            CreateRoleRequest {
                role_name: "target".into(),
                path: "/svc/".into(),
                description: Some("d".into()),
                max_session_duration: Some(3600),
                assume_role_policy_document: r#"{"a":1}"#.into(),
                permissions_boundary: None,
                tags: vec![Tag::new("env", "prod")],
            }
        );
    }

    #[test]
    fn boundary_is_copied_when_present() {
        let mut source = snapshot();
        source.permissions_boundary = Some("arn:aws:iam::000000000000:policy/cap".into());

        let request = build_create_request(&source, "target").unwrap();
        assert_eq!(
            request.permissions_boundary.as_deref(),
            Some("arn:aws:iam::000000000000:policy/cap")
        );
    }

    #[test]
    fn boundary_is_not_inherited_between_requests() {
        let mut bounded = snapshot();
        bounded.permissions_boundary = Some("arn:aws:iam::000000000000:policy/cap".into());

        let first = build_create_request(&bounded, "one").unwrap();
        let second = build_create_request(&snapshot(), "two").unwrap();

        assert!(first.permissions_boundary.is_some());
        assert!(second.permissions_boundary.is_none());
    }

    #[test]
    fn optional_attributes_stay_absent() {
        let mut source = snapshot();
        source.description = None;
        source.max_session_duration = None;
        source.tags.clear();

        let request = build_create_request(&source, "target").unwrap();
        assert!(request.description.is_none());
        assert!(request.max_session_duration.is_none());
        assert!(request.tags.is_empty());
    }

    #[test]
    fn malformed_trust_policy_aborts_before_create() {
        let mut source = snapshot();
        source.assume_role_policy_document = "%7B%zz".into();
        let service = InMemoryIdentityService::new();

        let err = replicate_role(&service, &source, "target").unwrap_err();

        assert!(matches!(
            err,
            CloneError::DecodeTrustPolicy {
                source: DecodeError::InvalidEscape { offset: 3, .. },
                ..
            }
        ));
        assert_eq!(service.call_count(Operation::CreateRole), 0);
    }

    #[test]
    fn duplicate_target_is_rejected() {
        let service = InMemoryIdentityService::new().with_role(StoredRole::new("target", "%7B%7D"));

        let err = replicate_role(&service, &snapshot(), "target").unwrap_err();
        match err {
            CloneError::CreateRole { role, source } => {
                assert_eq!(role, "target");
                assert_eq!(source.code.as_deref(), Some("EntityAlreadyExists"));
            }
            other => panic!("expected CreateRole error, got {other:?}"),
        }
    }

    #[test]
    fn created_role_reads_back_with_same_attributes() {
        let service = InMemoryIdentityService::new();
        let created = replicate_role(&service, &snapshot(), "target").unwrap();
        assert_eq!(created.arn, "arn:aws:iam::000000000000:role/svc/target");

        let stored = service.role("target").unwrap().description;
        assert_eq!(stored.path, "/svc/");
        assert_eq!(stored.description.as_deref(), Some("d"));
        assert_eq!(stored.max_session_duration, Some(3600));
        assert_eq!(stored.tags, vec![Tag::new("env", "prod")]);
    }
}
