//! In-memory identity service.
//!
//! Behaves like the remote service for the operations the pipeline uses:
//! listings are paginated with offset markers, documents are stored
//! URL-encoded, creating an existing role and writing to a missing role are
//! rejected. Failures can be injected per operation and key, and every call
//! is logged.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::service::{IdentityService, Operation, ServiceError};
use crate::types::{
    CreateRoleRequest, CreatedRole, InlinePolicy, ListPage, ManagedPolicyRef, RoleDescription, Tag,
};

const DEFAULT_PAGE_SIZE: usize = 100;

/// A role held by [`InMemoryIdentityService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRole {
    pub description: RoleDescription,
    /// Inline policies in insertion order; documents are URL-encoded.
    pub inline_policies: Vec<InlinePolicy>,
    pub managed_policies: Vec<ManagedPolicyRef>,
}

impl StoredRole {
    /// A role at path `/` with the given URL-encoded trust policy.
    pub fn new(role_name: impl Into<String>, encoded_trust_policy: impl Into<String>) -> Self {
        let role_name = role_name.into();
        Self {
            description: RoleDescription {
                arn: role_arn("/", &role_name),
                role_name,
                path: "/".to_string(),
                assume_role_policy_document: Some(encoded_trust_policy.into()),
                ..RoleDescription::default()
            },
            inline_policies: Vec::new(),
            managed_policies: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.description.path = path.into();
        self.description.arn = role_arn(&self.description.path, &self.description.role_name);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description.description = Some(description.into());
        self
    }

    pub fn with_max_session_duration(mut self, seconds: i32) -> Self {
        self.description.max_session_duration = Some(seconds);
        self
    }

    pub fn with_permissions_boundary(mut self, arn: impl Into<String>) -> Self {
        self.description.permissions_boundary = Some(arn.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.description.tags.push(Tag::new(key, value));
        self
    }

    pub fn without_trust_policy(mut self) -> Self {
        self.description.assume_role_policy_document = None;
        self
    }

    pub fn with_inline_policy(
        mut self,
        name: impl Into<String>,
        encoded_document: impl Into<String>,
    ) -> Self {
        self.inline_policies.push(InlinePolicy::new(name, encoded_document));
        self
    }

    pub fn with_managed_policy(mut self, arn: impl Into<String>) -> Self {
        self.managed_policies.push(ManagedPolicyRef::new(arn));
        self
    }
}

/// A call received by [`InMemoryIdentityService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    /// Role name, policy name or policy ARN, depending on the operation.
    pub key: String,
}

#[derive(Debug, Default)]
struct State {
    roles: HashMap<String, StoredRole>,
    failures: HashSet<(Operation, String)>,
    calls: Vec<Call>,
    create_requests: Vec<CreateRoleRequest>,
}

/// Identity service backed by a `HashMap`.
#[derive(Debug)]
pub struct InMemoryIdentityService {
    state: Mutex<State>,
    page_size: usize,
}

impl Default for InMemoryIdentityService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the number of items per listing page (at least 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_role(self, role: StoredRole) -> Self {
        self.lock()
            .roles
            .insert(role.description.role_name.clone(), role);
        self
    }

    /// Makes `operation` fail whenever it is called with `key`.
    ///
    /// The key is the role name for role-level operations, the policy name
    /// for `GetRolePolicy`/`PutRolePolicy` and the policy ARN for
    /// `AttachRolePolicy`.
    pub fn fail_on(self, operation: Operation, key: impl Into<String>) -> Self {
        self.lock().failures.insert((operation, key.into()));
        self
    }

    /// Returns a copy of a stored role.
    pub fn role(&self, role_name: &str) -> Option<StoredRole> {
        self.lock().roles.get(role_name).cloned()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Number of calls that would have changed service state.
    pub fn mutation_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation.is_mutation())
            .count()
    }

    /// Every `CreateRole` payload received, including rejected ones.
    pub fn create_requests(&self) -> Vec<CreateRoleRequest> {
        self.lock().create_requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Logs the call and applies any injected failure.
    fn enter(state: &mut State, operation: Operation, key: &str) -> Result<(), ServiceError> {
        state.calls.push(Call {
            operation,
            key: key.to_string(),
        });
        if state.failures.contains(&(operation, key.to_string())) {
            return Err(ServiceError::new(operation, format!("injected failure for {key}"))
                .with_code("ServiceFailure"));
        }
        Ok(())
    }

    fn page<T: Clone>(
        &self,
        items: &[T],
        marker: Option<&str>,
        operation: Operation,
    ) -> Result<ListPage<T>, ServiceError> {
        let start = match marker {
            None => 0,
            Some(m) => m.parse::<usize>().map_err(|_| {
                ServiceError::new(operation, format!("invalid marker {m:?}"))
                    .with_code("InvalidInput")
            })?,
        };
        let start = start.min(items.len());
        let end = (start + self.page_size).min(items.len());
        let page = items[start..end].to_vec();

        if end < items.len() {
            Ok(ListPage::truncated(page, end.to_string()))
        } else {
            Ok(ListPage::last(page))
        }
    }
}

fn role_arn(path: &str, role_name: &str) -> String {
    format!("arn:aws:iam::000000000000:role{path}{role_name}")
}

fn no_such_role(operation: Operation, role_name: &str) -> ServiceError {
    ServiceError::new(
        operation,
        format!("The role with name {role_name} cannot be found."),
    )
    .with_code("NoSuchEntity")
}

fn encode(document: &str) -> String {
    utf8_percent_encode(document, NON_ALPHANUMERIC).to_string()
}

impl IdentityService for InMemoryIdentityService {
    fn get_role(&self, role_name: &str) -> Result<RoleDescription, ServiceError> {
        let mut state = self.lock();
        Self::enter(&mut state, Operation::GetRole, role_name)?;
        state
            .roles
            .get(role_name)
            .map(|r| r.description.clone())
            .ok_or_else(|| no_such_role(Operation::GetRole, role_name))
    }

    fn list_role_policies(
        &self,
        role_name: &str,
        marker: Option<&str>,
    ) -> Result<ListPage<String>, ServiceError> {
        let mut state = self.lock();
        Self::enter(&mut state, Operation::ListRolePolicies, role_name)?;
        let role = state
            .roles
            .get(role_name)
            .ok_or_else(|| no_such_role(Operation::ListRolePolicies, role_name))?;
        let names: Vec<String> = role.inline_policies.iter().map(|p| p.name.clone()).collect();
        self.page(&names, marker, Operation::ListRolePolicies)
    }

    fn get_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
    ) -> Result<InlinePolicy, ServiceError> {
        let mut state = self.lock();
        Self::enter(&mut state, Operation::GetRolePolicy, policy_name)?;
        let role = state
            .roles
            .get(role_name)
            .ok_or_else(|| no_such_role(Operation::GetRolePolicy, role_name))?;
        role.inline_policies
            .iter()
            .find(|p| p.name == policy_name)
            .cloned()
            .ok_or_else(|| {
                ServiceError::new(
                    Operation::GetRolePolicy,
                    format!("The role policy with name {policy_name} cannot be found."),
                )
                .with_code("NoSuchEntity")
            })
    }

    fn list_attached_role_policies(
        &self,
        role_name: &str,
        marker: Option<&str>,
    ) -> Result<ListPage<ManagedPolicyRef>, ServiceError> {
        let mut state = self.lock();
        Self::enter(&mut state, Operation::ListAttachedRolePolicies, role_name)?;
        let role = state
            .roles
            .get(role_name)
            .ok_or_else(|| no_such_role(Operation::ListAttachedRolePolicies, role_name))?;
        let managed = role.managed_policies.clone();
        self.page(&managed, marker, Operation::ListAttachedRolePolicies)
    }

    fn create_role(&self, request: &CreateRoleRequest) -> Result<CreatedRole, ServiceError> {
        let mut state = self.lock();
        state.create_requests.push(request.clone());
        Self::enter(&mut state, Operation::CreateRole, &request.role_name)?;

        if state.roles.contains_key(&request.role_name) {
            return Err(ServiceError::new(
                Operation::CreateRole,
                format!("Role with name {} already exists.", request.role_name),
            )
            .with_code("EntityAlreadyExists"));
        }

        let description = RoleDescription {
            role_name: request.role_name.clone(),
            arn: role_arn(&request.path, &request.role_name),
            path: request.path.clone(),
            description: request.description.clone(),
            max_session_duration: request.max_session_duration,
            assume_role_policy_document: Some(encode(&request.assume_role_policy_document)),
            permissions_boundary: request.permissions_boundary.clone(),
            tags: request.tags.clone(),
        };
        let created = CreatedRole {
            role_name: description.role_name.clone(),
            arn: description.arn.clone(),
        };
        state.roles.insert(
            request.role_name.clone(),
            StoredRole {
                description,
                inline_policies: Vec::new(),
                managed_policies: Vec::new(),
            },
        );
        Ok(created)
    }

    fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), ServiceError> {
        let mut state = self.lock();
        Self::enter(&mut state, Operation::PutRolePolicy, policy_name)?;
        let role = state
            .roles
            .get_mut(role_name)
            .ok_or_else(|| no_such_role(Operation::PutRolePolicy, role_name))?;

        let encoded = encode(policy_document);
        match role.inline_policies.iter_mut().find(|p| p.name == policy_name) {
            Some(existing) => existing.document = encoded,
            None => role
                .inline_policies
                .push(InlinePolicy::new(policy_name, encoded)),
        }
        Ok(())
    }

    fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), ServiceError> {
        let mut state = self.lock();
        Self::enter(&mut state, Operation::AttachRolePolicy, policy_arn)?;
        let role = state
            .roles
            .get_mut(role_name)
            .ok_or_else(|| no_such_role(Operation::AttachRolePolicy, role_name))?;

        if !role.managed_policies.iter().any(|p| p.arn == policy_arn) {
            role.managed_policies.push(ManagedPolicyRef::new(policy_arn));
        }
        Ok(())
    }
}
