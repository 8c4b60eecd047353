//! The identity service consumed by the cloning pipeline.
//!
//! Every call blocks until the service answers. Implementations are passed
//! explicitly into the pipeline so tests can substitute
//! [`InMemoryIdentityService`](crate::memory::InMemoryIdentityService).

use std::fmt;

use thiserror::Error;

use crate::types::{
    CreateRoleRequest, CreatedRole, InlinePolicy, ListPage, ManagedPolicyRef, RoleDescription,
};

/// Remote operations used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetRole,
    ListRolePolicies,
    GetRolePolicy,
    ListAttachedRolePolicies,
    CreateRole,
    PutRolePolicy,
    AttachRolePolicy,
}

impl Operation {
    /// Returns true for operations that change state on the service.
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Operation::CreateRole | Operation::PutRolePolicy | Operation::AttachRolePolicy
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::GetRole => "GetRole",
            Operation::ListRolePolicies => "ListRolePolicies",
            Operation::GetRolePolicy => "GetRolePolicy",
            Operation::ListAttachedRolePolicies => "ListAttachedRolePolicies",
            Operation::CreateRole => "CreateRole",
            Operation::PutRolePolicy => "PutRolePolicy",
            Operation::AttachRolePolicy => "AttachRolePolicy",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by the identity service.
///
/// Opaque to the pipeline: it is only wrapped with the stage that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {}{message}", code_prefix(.code.as_deref()))]
pub struct ServiceError {
    pub operation: Operation,
    /// Service error code such as `NoSuchEntity`, when the service sent one.
    pub code: Option<String>,
    pub message: String,
}

fn code_prefix(code: Option<&str>) -> String {
    code.map(|c| format!("{c}: ")).unwrap_or_default()
}

impl ServiceError {
    pub fn new(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Blocking client for the identity service.
pub trait IdentityService {
    fn get_role(&self, role_name: &str) -> Result<RoleDescription, ServiceError>;

    /// Lists inline policy names, starting at `marker` when given.
    fn list_role_policies(
        &self,
        role_name: &str,
        marker: Option<&str>,
    ) -> Result<ListPage<String>, ServiceError>;

    fn get_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
    ) -> Result<InlinePolicy, ServiceError>;

    /// Lists managed policy attachments, starting at `marker` when given.
    fn list_attached_role_policies(
        &self,
        role_name: &str,
        marker: Option<&str>,
    ) -> Result<ListPage<ManagedPolicyRef>, ServiceError>;

    fn create_role(&self, request: &CreateRoleRequest) -> Result<CreatedRole, ServiceError>;

    /// Stores an inline policy; `policy_document` is the raw JSON.
    fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), ServiceError>;

    fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), ServiceError>;
}

impl<S: IdentityService + ?Sized> IdentityService for &S {
    fn get_role(&self, role_name: &str) -> Result<RoleDescription, ServiceError> {
        (**self).get_role(role_name)
    }

    fn list_role_policies(
        &self,
        role_name: &str,
        marker: Option<&str>,
    ) -> Result<ListPage<String>, ServiceError> {
        (**self).list_role_policies(role_name, marker)
    }

    fn get_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
    ) -> Result<InlinePolicy, ServiceError> {
        (**self).get_role_policy(role_name, policy_name)
    }

    fn list_attached_role_policies(
        &self,
        role_name: &str,
        marker: Option<&str>,
    ) -> Result<ListPage<ManagedPolicyRef>, ServiceError> {
        (**self).list_attached_role_policies(role_name, marker)
    }

    fn create_role(&self, request: &CreateRoleRequest) -> Result<CreatedRole, ServiceError> {
        (**self).create_role(request)
    }

    fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), ServiceError> {
        (**self).put_role_policy(role_name, policy_name, policy_document)
    }

    fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), ServiceError> {
        (**self).attach_role_policy(role_name, policy_arn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_code_when_present() {
        let err =
            ServiceError::new(Operation::GetRole, "role web not found").with_code("NoSuchEntity");
        assert_eq!(err.to_string(), "GetRole failed: NoSuchEntity: role web not found");

        let err = ServiceError::new(Operation::CreateRole, "connection reset");
        assert_eq!(err.to_string(), "CreateRole failed: connection reset");
    }

    #[test]
    fn only_writes_are_mutations() {
        assert!(Operation::CreateRole.is_mutation());
        assert!(Operation::PutRolePolicy.is_mutation());
        assert!(Operation::AttachRolePolicy.is_mutation());
        assert!(!Operation::GetRole.is_mutation());
        assert!(!Operation::ListRolePolicies.is_mutation());
        assert!(!Operation::ListAttachedRolePolicies.is_mutation());
        assert!(!Operation::GetRolePolicy.is_mutation());
    }
}
