//! # Solid ACL
//!
//! This crate provides the Web Access Control (WAC) policy model for
//! Linked-Data resources: the authorizations stored in a resource's ACL
//! document, and their RDF serialization.
//!
//! ## Overview
//!
//! The solid-acl crate handles:
//! - **Access Modes**: Read, Write, Append and Control
//! - **Authorizations**: One grant of modes to one principal for one resource
//! - **Permission Sets**: All authorizations governing a resource
//! - **RDF**: Reading and writing ACL documents as Turtle or N-Triples
//!
//! ## Architecture
//!
//! ```text
//! Authorization = Principal + Resource + Modes [+ inherited] [+ origins]
//! Identity key  = sha256(principal id + resource URL)
//!
//! PermissionSet { identity key -> Authorization }
//!      |  build_graph / serialize            ^  init_from_graph
//!      v                                      |
//!   Graph  --(Turtle writer)-->  text  --(Turtle reader)-->  Graph
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use solid_acl::{AccessMode, PermissionSet, RdfFormat, ResourceType, EVERYONE};
//!
//! let mut set = PermissionSet::new(
//!     "https://alice.example/docs/",
//!     Some("https://alice.example/docs/.acl".to_string()),
//!     ResourceType::Container,
//! );
//! set.add_permission("https://alice.example/profile#me", [AccessMode::Read, AccessMode::Control]).unwrap();
//! set.add_group_permission(EVERYONE, [AccessMode::Read]).unwrap();
//!
//! let turtle = set.serialize(RdfFormat::Turtle).unwrap();
//!
//! let mut reloaded = PermissionSet::new(
//!     "https://alice.example/docs/",
//!     Some("https://alice.example/docs/.acl".to_string()),
//!     ResourceType::Container,
//! );
//! reloaded.init_from_text(&turtle, "text/turtle").unwrap();
//! assert_eq!(reloaded, set);
//! ```
//!
//! ## Mode Implications
//!
//! - `Write` implies `Append`
//! - Nothing else is implied; `Control` does not grant `Read`
//!
//! ## Inheritance
//!
//! Authorizations added to a container's permission set are inherited by
//! the resources inside it. The flag is written as `acl:defaultForNew`;
//! both `acl:defaultForNew` and `acl:default` are recognised when reading.

pub mod authorization;
pub mod error;
pub mod modes;
pub mod permission_set;
pub mod rdf;
pub mod resources;
pub mod vocab;

// Re-export main types for convenience
pub use authorization::{identity_key_for, Authorization, Principal};
pub use error::{AclError, AclResult};
pub use modes::AccessMode;
pub use permission_set::PermissionSet;
pub use rdf::{Graph, RdfFormat, Term, Triple};
pub use resources::ResourceType;
pub use vocab::EVERYONE;
