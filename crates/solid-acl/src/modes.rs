//! # Access Modes
//!
//! Defines the access modes a Web Access Control authorization can grant.
//! Modes are written to ACL documents as `acl:Read`, `acl:Write`,
//! `acl:Append` and `acl:Control`.

use serde::{Deserialize, Serialize};

use crate::error::AclError;
use crate::rdf::Term;
use crate::vocab::ACL;

/// Access modes that can be granted on a resource.
///
/// - **Read**: View resource contents
/// - **Write**: Modify or replace resource contents
/// - **Append**: Add to resource contents without removing anything
/// - **Control**: Read and modify the resource's ACL document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Read resource contents.
    Read,

    /// Write resource contents.
    ///
    /// A principal holding Write is treated as also holding Append.
    Write,

    /// Append to resource contents.
    Append,

    /// Manage the resource's ACL.
    Control,
}

impl AccessMode {
    /// Get the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
            AccessMode::Append => "append",
            AccessMode::Control => "control",
        }
    }

    /// Local name of the mode in the `acl:` namespace.
    pub fn local_name(&self) -> &'static str {
        match self {
            AccessMode::Read => "Read",
            AccessMode::Write => "Write",
            AccessMode::Append => "Append",
            AccessMode::Control => "Control",
        }
    }

    /// Full IRI of the mode, e.g. `http://www.w3.org/ns/auth/acl#Read`.
    pub fn iri(&self) -> String {
        ACL.term(self.local_name())
    }

    /// Parse a mode from its full IRI.
    pub fn from_iri(iri: &str) -> Option<Self> {
        ACL.local_name(iri).and_then(Self::parse)
    }

    /// Parse mode from string representation.
    ///
    /// Accepts short names in any case, `acl:`-prefixed names and full IRIs.
    ///
    /// # Example
    ///
    /// ```
    /// use solid_acl::modes::AccessMode;
    ///
    /// assert_eq!(AccessMode::parse("read"), Some(AccessMode::Read));
    /// assert_eq!(AccessMode::parse("acl:Write"), Some(AccessMode::Write));
    /// assert_eq!(
    ///     AccessMode::parse("http://www.w3.org/ns/auth/acl#Control"),
    ///     Some(AccessMode::Control)
    /// );
    /// assert_eq!(AccessMode::parse("delete"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(local) = ACL.local_name(s) {
            return Self::parse(local);
        }
        let s = s.strip_prefix("acl:").unwrap_or(s);
        match s.to_lowercase().as_str() {
            "read" => Some(AccessMode::Read),
            "write" => Some(AccessMode::Write),
            "append" => Some(AccessMode::Append),
            "control" => Some(AccessMode::Control),
            _ => None,
        }
    }

    /// Get all modes.
    pub fn all() -> Vec<Self> {
        vec![
            AccessMode::Read,
            AccessMode::Write,
            AccessMode::Append,
            AccessMode::Control,
        ]
    }

    /// Check if holding this mode grants another.
    ///
    /// Every mode implies itself, and `Write` implies `Append`.
    /// Nothing else is implied: `Append` does not grant `Write`, and
    /// `Control` does not grant `Read`.
    ///
    /// # Example
    ///
    /// ```
    /// use solid_acl::modes::AccessMode;
    ///
    /// assert!(AccessMode::Write.implies(AccessMode::Append));
    /// assert!(!AccessMode::Append.implies(AccessMode::Write));
    /// ```
    pub fn implies(&self, other: AccessMode) -> bool {
        *self == other || (*self == AccessMode::Write && other == AccessMode::Append)
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&Term> for AccessMode {
    type Error = AclError;

    /// Decode the object of an `acl:mode` statement.
    fn try_from(term: &Term) -> Result<Self, Self::Error> {
        match term {
            Term::NamedNode(iri) => AccessMode::from_iri(iri)
                .ok_or_else(|| AclError::SerializationError(format!("unknown access mode <{}>", iri))),
            other => Err(AclError::SerializationError(format!(
                "access mode must be an IRI, found {}",
                other
            ))),
        }
    }
}
