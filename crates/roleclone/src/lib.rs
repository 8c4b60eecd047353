//! # roleclone: IAM role cloning
//!
//! Reads a source role, its inline policies and its managed policy
//! attachments, then creates an equivalent role under a new name.
//!
//! ## Pipeline
//!
//! ```text
//! Start ─▶ RoleRead ─▶ PolicyInventoryCollected ─▶ RoleCreated ─▶ PoliciesReplayed ─▶ Done
//!   │          │                 │
//!   └──────────┴─────────────────┴──▶ CloneError (fatal, nothing created)
//! ```
//!
//! - **Snapshot** ([`snapshot`]): `GetRole`, then every page of
//!   `ListRolePolicies` and `ListAttachedRolePolicies`, then one
//!   `GetRolePolicy` per inline policy. Any failure aborts.
//! - **Replicate** ([`replicate`]): `CreateRole` with the decoded trust
//!   policy. A failure aborts before any policy is touched.
//! - **Attach** ([`attach`]): `PutRolePolicy` / `AttachRolePolicy` per item.
//!   Failures are logged and reported, never fatal.
//!
//! ## Example
//!
//! ```
//! use roleclone::memory::{InMemoryIdentityService, StoredRole};
//! use roleclone::RoleCloner;
//!
//! let service = InMemoryIdentityService::new().with_role(
//!     StoredRole::new("web", "%7B%22Version%22%3A%222012-10-17%22%7D")
//!         .with_inline_policy("s3-read", "%7B%7D")
//!         .with_managed_policy("arn:aws:iam::aws:policy/ReadOnlyAccess"),
//! );
//!
//! let cloner = RoleCloner::new(&service);
//! let report = cloner.run("web", "web-copy")?;
//!
//! assert!(report.is_complete());
//! assert_eq!(report.inline.applied, ["s3-read"]);
//! # Ok::<(), roleclone::CloneError>(())
//! ```

pub mod attach;
pub mod document;
pub mod error;
pub mod memory;
pub mod pagination;
pub mod pipeline;
pub mod replicate;
pub mod service;
pub mod snapshot;
pub mod types;


pub use attach::{AttachmentFailure, AttachmentReport};
pub use document::{DecodeError, decode_policy_document};
pub use error::{CloneError, CloneStage};
pub use pagination::{PaginationError, Paginator, collect_all};
pub use pipeline::{ClonePlan, CloneReport, RoleCloner};
pub use service::{IdentityService, Operation, ServiceError};
pub use snapshot::PolicyInventory;
pub use types::{
    CreateRoleRequest, CreatedRole, InlinePolicy, ListPage, ManagedPolicyRef, RoleDescription,
    RoleSnapshot, Tag,
};
