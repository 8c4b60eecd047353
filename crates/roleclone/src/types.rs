//! Data model shared by the identity service and the cloning pipeline.
//!
//! Wire-level shapes (`RoleDescription`, `ListPage`, `CreateRoleRequest`)
//! mirror the identity service's request/response fields. `RoleSnapshot`
//! and `InlinePolicy` are what the pipeline captures from the source role.

use serde::Serialize;

/// A key/value tag attached to a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Role attributes as returned by `GetRole`.
///
/// The trust-policy document is URL-encoded. The service models it as
/// optional, so a missing document is only rejected when the snapshot is
/// taken.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleDescription {
    pub role_name: String,
    pub arn: String,
    pub path: String,
    pub description: Option<String>,
    pub max_session_duration: Option<i32>,
    pub assume_role_policy_document: Option<String>,
    pub permissions_boundary: Option<String>,
    pub tags: Vec<Tag>,
}

/// Immutable capture of a source role at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSnapshot {
    pub role_name: String,
    pub arn: String,
    pub path: String,
    pub description: Option<String>,
    pub max_session_duration: Option<i32>,
    /// URL-encoded trust-policy document, exactly as the service stored it.
    pub assume_role_policy_document: String,
    pub permissions_boundary: Option<String>,
    pub tags: Vec<Tag>,
}

/// A policy document stored directly on a role.
///
/// The document is kept URL-encoded until it is replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlinePolicy {
    pub name: String,
    pub document: String,
}

impl InlinePolicy {
    pub fn new(name: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document: document.into(),
        }
    }
}

/// Reference to a standalone managed policy attached to a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ManagedPolicyRef {
    pub arn: String,
    pub name: Option<String>,
}

impl ManagedPolicyRef {
    pub fn new(arn: impl Into<String>) -> Self {
        Self {
            arn: arn.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name for display: the policy name when known, the ARN otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.arn)
    }
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub is_truncated: bool,
    pub marker: Option<String>,
}

impl<T> ListPage<T> {
    /// A final page: no further results.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            is_truncated: false,
            marker: None,
        }
    }

    /// A truncated page followed by the page at `marker`.
    pub fn truncated(items: Vec<T>, marker: impl Into<String>) -> Self {
        Self {
            items,
            is_truncated: true,
            marker: Some(marker.into()),
        }
    }
}

/// Payload of a `CreateRole` call.
///
/// `assume_role_policy_document` is the raw (decoded) JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRoleRequest {
    pub role_name: String,
    pub path: String,
    pub description: Option<String>,
    pub max_session_duration: Option<i32>,
    pub assume_role_policy_document: String,
    pub permissions_boundary: Option<String>,
    pub tags: Vec<Tag>,
}

/// Handle of a role returned by `CreateRole`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRole {
    pub role_name: String,
    pub arn: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managed_policy_label_prefers_name() {
        let named = ManagedPolicyRef::new("arn:aws:iam::aws:policy/ReadOnlyAccess")
            .with_name("ReadOnlyAccess");
        assert_eq!(named.label(), "ReadOnlyAccess");

        let bare = ManagedPolicyRef::new("arn:aws:iam::123456789012:policy/custom");
        assert_eq!(bare.label(), "arn:aws:iam::123456789012:policy/custom");
    }

    #[test]
    fn page_constructors_set_truncation() {
        let page = ListPage::truncated(vec!["a"], "m1");
        assert!(page.is_truncated);
        assert_eq!(page.marker.as_deref(), Some("m1"));

        let page: ListPage<&str> = ListPage::last(vec![]);
        assert!(!page.is_truncated);
        assert!(page.marker.is_none());
    }
}
