//! # roleclone-aws: AWS IAM binding
//!
//! [`AwsIamService`] implements [`roleclone::IdentityService`] with the
//! official IAM SDK. Credentials and region come from the SDK's default
//! chain (environment, shared config/credentials files, instance metadata),
//! optionally overridden through [`AwsSettings`].
//!
//! The SDK is async; each call is driven to completion on a
//! current-thread tokio runtime owned by the service, so the pipeline stays
//! sequential and blocking.
//!
//! ```no_run
//! use roleclone::RoleCloner;
//! use roleclone_aws::{AwsIamService, AwsSettings};
//!
//! let service = AwsIamService::connect(&AwsSettings {
//!     profile: Some("staging".into()),
//!     ..AwsSettings::default()
//! })?;
//! let report = RoleCloner::new(&service).run("web", "web-copy")?;
//! println!("created {}", report.target_arn);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod convert;
mod error;

pub use client::{AwsIamService, AwsSettings, FALLBACK_REGION, MAX_PAGE_SIZE};
pub use error::{AwsError, Result};
