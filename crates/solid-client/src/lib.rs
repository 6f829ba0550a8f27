//! # Solid Client
//!
//! This crate reads and edits the ACL documents that govern Linked-Data
//! resources over HTTP.
//!
//! ## Overview
//!
//! The solid-client crate handles:
//! - **Discovery**: Finding a resource's ACL through its `Link` header
//! - **Loading**: Fetching and parsing ACL documents into permission sets
//! - **Editing**: Merging new grants into the existing ACL and writing it back
//! - **Inheritance**: Detecting resources governed by a container's ACL
//!
//! ## Architecture
//!
//! ```text
//! AclManager
//!   ├─ ClientConfig (timeout, token, current user, ACL suffix)
//!   └─ ResourceClient ─→ HEAD / GET / PUT / DELETE
//!                           └─ solid_acl::PermissionSet <-> Turtle
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use solid_acl::AccessMode;
//! use solid_client::{AclManager, ClientConfig, Grant};
//!
//! # async fn run() -> Result<(), solid_client::ClientError> {
//! let manager = AclManager::new(ClientConfig::from_env())?;
//!
//! let current = manager.get_permissions("https://alice.example/docs/").await?;
//! println!("{} authorizations", current.count());
//!
//! manager
//!     .set_permissions(
//!         "https://alice.example/docs/",
//!         &[Grant::public([AccessMode::Read])],
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Writes replace the whole ACL document without a precondition. Concurrent
//! editors of the same ACL race, and the last write wins.

pub mod acl;
pub mod config;
pub mod error;
pub mod resource;

// Re-export main types for convenience
pub use acl::{AclManager, Grant, OWNER_MODES};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use resource::{parse_link_header, Link, RdfDocument, ResourceClient, ResourceMeta};
