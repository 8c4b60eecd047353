//! Blocking [`IdentityService`] over the AWS IAM SDK.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_iam::Client;
use roleclone::{
    CreateRoleRequest, CreatedRole, IdentityService, InlinePolicy, ListPage, ManagedPolicyRef,
    Operation, RoleDescription, ServiceError,
};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::convert::{managed_policy_ref, role_description, sdk_tags};
use crate::error::{AwsError, Result, service_error};

/// Region used when neither flags, configuration nor the environment name
/// one. IAM is a global service, so any region reaches it.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Largest `MaxItems` IAM accepts on listing calls.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Overrides applied on top of the SDK's default credential and region
/// resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub profile: Option<String>,
    /// Alternative endpoint, e.g. a local IAM emulator.
    pub endpoint_url: Option<String>,
    /// `MaxItems` for listing calls; the service default when `None`.
    pub page_size: Option<u32>,
}

/// IAM client that blocks on a private current-thread runtime.
pub struct AwsIamService {
    runtime: Runtime,
    client: Client,
    page_size: Option<i32>,
}

impl AwsIamService {
    /// Resolves credentials and region from the environment, shared config
    /// files and `settings`, then builds the IAM client.
    pub fn connect(settings: &AwsSettings) -> Result<Self> {
        let page_size = match settings.page_size {
            None => None,
            Some(n @ 1..=MAX_PAGE_SIZE) => {
                Some(i32::try_from(n).map_err(|_| AwsError::InvalidPageSize(n))?)
            }
            Some(n) => return Err(AwsError::InvalidPageSize(n)),
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = runtime.block_on(loader.load());

        resolve_credentials(
            &runtime,
            sdk_config.credentials_provider().as_ref(),
            settings.profile.as_deref(),
        )?;

        let mut iam_config = aws_sdk_iam::config::Builder::from(&sdk_config);
        if sdk_config.region().is_none() {
            debug!(region = FALLBACK_REGION, "No region configured, using fallback");
            iam_config = iam_config.region(Region::new(FALLBACK_REGION));
        }
        let client = Client::from_conf(iam_config.build());

        info!(
            region = ?sdk_config.region().map(ToString::to_string),
            profile = ?settings.profile,
            "Connected to IAM"
        );

        Ok(Self {
            runtime,
            client,
            page_size,
        })
    }
}

/// Loads credentials once so a missing or broken setup fails before any
/// IAM call is made.
fn resolve_credentials(
    runtime: &Runtime,
    provider: Option<&SharedCredentialsProvider>,
    profile: Option<&str>,
) -> Result<()> {
    let profile = profile.unwrap_or("default").to_string();
    let Some(provider) = provider else {
        return Err(AwsError::NoCredentials { profile });
    };

    runtime
        .block_on(provider.provide_credentials())
        .map_err(|source| AwsError::Credentials {
            profile: profile.clone(),
            source,
        })?;
    debug!(profile = %profile, "Resolved AWS credentials");
    Ok(())
}

impl IdentityService for AwsIamService {
    fn get_role(&self, role_name: &str) -> std::result::Result<RoleDescription, ServiceError> {
        let output = self
            .runtime
            .block_on(self.client.get_role().role_name(role_name).send())
            .map_err(|e| service_error(Operation::GetRole, e))?;

        output.role().map(role_description).ok_or_else(|| {
            ServiceError::new(Operation::GetRole, format!("response for {role_name} has no role"))
        })
    }

    fn list_role_policies(
        &self,
        role_name: &str,
        marker: Option<&str>,
    ) -> std::result::Result<ListPage<String>, ServiceError> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .list_role_policies()
                    .role_name(role_name)
                    .set_marker(marker.map(str::to_string))
                    .set_max_items(self.page_size)
                    .send(),
            )
            .map_err(|e| service_error(Operation::ListRolePolicies, e))?;

        Ok(ListPage {
            items: output.policy_names().to_vec(),
            is_truncated: output.is_truncated(),
            marker: output.marker().map(str::to_string),
        })
    }

    fn get_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
    ) -> std::result::Result<InlinePolicy, ServiceError> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .get_role_policy()
                    .role_name(role_name)
                    .policy_name(policy_name)
                    .send(),
            )
            .map_err(|e| service_error(Operation::GetRolePolicy, e))?;

        Ok(InlinePolicy::new(
            output.policy_name(),
            output.policy_document(),
        ))
    }

    fn list_attached_role_policies(
        &self,
        role_name: &str,
        marker: Option<&str>,
    ) -> std::result::Result<ListPage<ManagedPolicyRef>, ServiceError> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .list_attached_role_policies()
                    .role_name(role_name)
                    .set_marker(marker.map(str::to_string))
                    .set_max_items(self.page_size)
                    .send(),
            )
            .map_err(|e| service_error(Operation::ListAttachedRolePolicies, e))?;

        let items = output
            .attached_policies()
            .iter()
            .map(managed_policy_ref)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ListPage {
            items,
            is_truncated: output.is_truncated(),
            marker: output.marker().map(str::to_string),
        })
    }

    fn create_role(
        &self,
        request: &CreateRoleRequest,
    ) -> std::result::Result<CreatedRole, ServiceError> {
        let tags = sdk_tags(&request.tags)?;

        let output = self
            .runtime
            .block_on(
                self.client
                    .create_role()
                    .role_name(&request.role_name)
                    .path(&request.path)
                    .assume_role_policy_document(&request.assume_role_policy_document)
                    .set_description(request.description.clone())
                    .set_max_session_duration(request.max_session_duration)
                    .set_permissions_boundary(request.permissions_boundary.clone())
                    .set_tags(tags)
                    .send(),
            )
            .map_err(|e| service_error(Operation::CreateRole, e))?;

        let role = output.role().ok_or_else(|| {
            ServiceError::new(
                Operation::CreateRole,
                format!("response for {} has no role", request.role_name),
            )
        })?;

        Ok(CreatedRole {
            role_name: role.role_name().to_string(),
            arn: role.arn().to_string(),
        })
    }

    fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> std::result::Result<(), ServiceError> {
        self.runtime
            .block_on(
                self.client
                    .put_role_policy()
                    .role_name(role_name)
                    .policy_name(policy_name)
                    .policy_document(policy_document)
                    .send(),
            )
            .map_err(|e| service_error(Operation::PutRolePolicy, e))?;
        Ok(())
    }

    fn attach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> std::result::Result<(), ServiceError> {
        self.runtime
            .block_on(
                self.client
                    .attach_role_policy()
                    .role_name(role_name)
                    .policy_arn(policy_arn)
                    .send(),
            )
            .map_err(|e| service_error(Operation::AttachRolePolicy, e))?;
        Ok(())
    }
}
