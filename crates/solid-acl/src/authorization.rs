//! # Authorizations
//!
//! A single grant of access modes to one principal for one resource.
//! Authorizations are identified by a stable hash of principal and resource,
//! so two values describing the same grant always collide to the same key,
//! whether they were built in memory or parsed from an ACL document.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{AclError, AclResult};
use crate::modes::AccessMode;
use crate::rdf::{Term, Triple};
use crate::vocab::{
    ACL_ACCESS_TO, ACL_AGENT, ACL_AGENT_CLASS, ACL_AUTHORIZATION, ACL_DEFAULT_FOR_NEW, ACL_MODE,
    ACL_ORIGIN, EVERYONE, MAILTO_SCHEME, RDF_TYPE,
};

/// The entity a grant applies to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Principal {
    /// An individual agent, identified by its WebID.
    Agent(String),
    /// A class of agents. [`EVERYONE`] makes the grant public.
    Group(String),
}

impl Principal {
    /// The agent or group IRI.
    pub fn id(&self) -> &str {
        match self {
            Principal::Agent(id) | Principal::Group(id) => id,
        }
    }

    /// Check if this is an individual agent.
    pub fn is_agent(&self) -> bool {
        matches!(self, Principal::Agent(_))
    }

    /// Check if this is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Principal::Group(_))
    }

    /// The "everyone" group.
    pub fn everyone() -> Self {
        Principal::Group(EVERYONE.to_string())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Agent(id) => write!(f, "agent <{}>", id),
            Principal::Group(id) => write!(f, "group <{}>", id),
        }
    }
}

/// Compute the identity key of a grant.
///
/// The key is the hex SHA-256 digest of `principal_id + resource_url`, which
/// is deterministic across runs and processes.
///
/// # Example
///
/// ```
/// use solid_acl::authorization::identity_key_for;
///
/// let a = identity_key_for("https://bob.example/#me", "https://alice.example/file");
/// let b = identity_key_for("https://bob.example/#me", "https://alice.example/file");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn identity_key_for(principal_id: &str, resource_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(principal_id.as_bytes());
    // Separator keeps ("ab", "c") and ("a", "bc") apart
    hasher.update([0u8]);
    hasher.update(resource_url.as_bytes());
    hex::encode(hasher.finalize())
}

/// One access grant.
///
/// # Example
///
/// ```
/// use solid_acl::authorization::Authorization;
/// use solid_acl::modes::AccessMode;
///
/// let mut auth = Authorization::new("https://alice.example/file", false);
/// auth.set_agent("https://bob.example/#me").unwrap();
/// auth.add_mode(AccessMode::Write);
///
/// assert!(auth.is_valid());
/// assert!(auth.allows_append());
/// assert!(!auth.allows_read());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Authorization {
    /// Resource the grant applies to (never the ACL document itself).
    resource_url: String,
    /// Agent or group; unset while the authorization is being built.
    principal: Option<Principal>,
    /// Granted modes.
    access_modes: BTreeSet<AccessMode>,
    /// Whether the grant also covers resources inside a container.
    inherited: bool,
    /// `mailto:` identities treated as aliases of the agent.
    mail_to: BTreeSet<String>,
    /// Request origins the grant is restricted to; empty means any origin.
    allowed_origins: BTreeSet<String>,
}

impl Authorization {
    /// Create an authorization with no principal and no modes.
    pub fn new(resource_url: impl Into<String>, inherited: bool) -> Self {
        Self {
            resource_url: resource_url.into(),
            principal: None,
            access_modes: BTreeSet::new(),
            inherited,
            mail_to: BTreeSet::new(),
            allowed_origins: BTreeSet::new(),
        }
    }

    /// Resource the grant applies to.
    pub fn resource_url(&self) -> &str {
        &self.resource_url
    }

    /// The principal, if set.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// The agent or group IRI, if set.
    pub fn principal_id(&self) -> Option<&str> {
        self.principal.as_ref().map(Principal::id)
    }

    /// Whether the grant is inherited by contained resources.
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    /// Set the inheritance flag.
    pub fn set_inherited(&mut self, inherited: bool) {
        self.inherited = inherited;
    }

    /// Set the principal to an individual agent.
    ///
    /// A `mailto:` id is recorded as an alias instead, and the "everyone"
    /// class is treated as [`set_public`](Self::set_public).
    ///
    /// # Errors
    ///
    /// `ConflictingPrincipal` if a group is already set.
    pub fn set_agent(&mut self, agent: impl Into<String>) -> AclResult<()> {
        let agent = agent.into();
        if agent == EVERYONE {
            return self.set_public();
        }
        if agent.starts_with(MAILTO_SCHEME) {
            self.add_mail_to_alias(agent);
            return Ok(());
        }
        if let Some(existing @ Principal::Group(_)) = &self.principal {
            return Err(AclError::ConflictingPrincipal {
                existing: existing.to_string(),
                attempted: Principal::Agent(agent).to_string(),
            });
        }
        self.principal = Some(Principal::Agent(agent));
        Ok(())
    }

    /// Set the principal to a group of agents.
    ///
    /// # Errors
    ///
    /// `ConflictingPrincipal` if an agent is already set.
    pub fn set_group(&mut self, group: impl Into<String>) -> AclResult<()> {
        let group = group.into();
        if let Some(existing @ Principal::Agent(_)) = &self.principal {
            return Err(AclError::ConflictingPrincipal {
                existing: existing.to_string(),
                attempted: Principal::Group(group).to_string(),
            });
        }
        self.principal = Some(Principal::Group(group));
        Ok(())
    }

    /// Set the principal to either kind.
    pub fn set_principal(&mut self, principal: Principal) -> AclResult<()> {
        match principal {
            Principal::Agent(id) => self.set_agent(id),
            Principal::Group(id) => self.set_group(id),
        }
    }

    /// Grant to everyone.
    pub fn set_public(&mut self) -> AclResult<()> {
        self.set_group(EVERYONE)
    }

    /// Record a secondary `mailto:` identity for the agent.
    ///
    /// The scheme is added when missing.
    pub fn add_mail_to_alias(&mut self, address: impl Into<String>) {
        let address = address.into();
        let alias = if address.starts_with(MAILTO_SCHEME) {
            address
        } else {
            format!("{}{}", MAILTO_SCHEME, address)
        };
        self.mail_to.insert(alias);
    }

    /// The `mailto:` aliases, in sorted order.
    pub fn mail_to_aliases(&self) -> impl Iterator<Item = &str> {
        self.mail_to.iter().map(String::as_str)
    }

    /// Grant a mode. Granting a held mode is a no-op.
    pub fn add_mode(&mut self, mode: AccessMode) {
        self.access_modes.insert(mode);
    }

    /// Grant several modes.
    pub fn add_modes<I>(&mut self, modes: I)
    where
        I: IntoIterator<Item = AccessMode>,
    {
        self.access_modes.extend(modes);
    }

    /// Revoke a mode. Revoking a mode that is not held is a no-op.
    pub fn remove_mode(&mut self, mode: AccessMode) {
        self.access_modes.remove(&mode);
    }

    /// Revoke several modes.
    pub fn remove_modes<I>(&mut self, modes: I)
    where
        I: IntoIterator<Item = AccessMode>,
    {
        for mode in modes {
            self.remove_mode(mode);
        }
    }

    /// The granted modes, in canonical order.
    pub fn modes(&self) -> impl Iterator<Item = AccessMode> + '_ {
        self.access_modes.iter().copied()
    }

    /// The granted modes as a set.
    pub fn access_modes(&self) -> &BTreeSet<AccessMode> {
        &self.access_modes
    }

    /// Check if any granted mode implies `mode`.
    pub fn allows(&self, mode: AccessMode) -> bool {
        self.access_modes.iter().any(|held| held.implies(mode))
    }

    /// Check for Read.
    pub fn allows_read(&self) -> bool {
        self.allows(AccessMode::Read)
    }

    /// Check for Write.
    pub fn allows_write(&self) -> bool {
        self.allows(AccessMode::Write)
    }

    /// Check for Append, which Write also grants.
    pub fn allows_append(&self) -> bool {
        self.allows(AccessMode::Append)
    }

    /// Check for Control.
    pub fn allows_control(&self) -> bool {
        self.allows(AccessMode::Control)
    }

    /// Restrict the grant to requests from `origin`.
    pub fn add_origin(&mut self, origin: impl Into<String>) {
        self.allowed_origins.insert(origin.into());
    }

    /// Drop an origin restriction.
    pub fn remove_origin(&mut self, origin: &str) {
        self.allowed_origins.remove(origin);
    }

    /// The origin restrictions, in sorted order.
    pub fn allowed_origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins.iter().map(String::as_str)
    }

    /// Check if requests from `origin` are covered.
    ///
    /// An authorization without origin restrictions covers every origin.
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.contains(origin)
    }

    /// Check if the grant is to everyone.
    pub fn is_public(&self) -> bool {
        matches!(&self.principal, Some(Principal::Group(id)) if id == EVERYONE)
    }

    /// Check if the principal is an individual agent.
    pub fn is_agent(&self) -> bool {
        self.principal.as_ref().map_or(false, Principal::is_agent)
    }

    /// Check if the principal is a group.
    pub fn is_group(&self) -> bool {
        self.principal.as_ref().map_or(false, Principal::is_group)
    }

    /// Check if no modes are granted.
    pub fn is_empty(&self) -> bool {
        self.access_modes.is_empty()
    }

    /// Check if the authorization can be persisted: principal, resource
    /// and at least one mode are all present.
    pub fn is_valid(&self) -> bool {
        self.principal.is_some() && !self.resource_url.is_empty() && !self.access_modes.is_empty()
    }

    /// Identity key of this grant.
    ///
    /// # Errors
    ///
    /// `IncompleteAuthorization` if principal or resource URL is unset.
    pub fn identity_key(&self) -> AclResult<String> {
        let principal = self.principal_id().ok_or_else(|| {
            AclError::IncompleteAuthorization(format!(
                "no principal set for <{}>",
                self.resource_url
            ))
        })?;
        if self.resource_url.is_empty() {
            return Err(AclError::IncompleteAuthorization(format!(
                "no resource URL set for <{}>",
                principal
            )));
        }
        Ok(identity_key_for(principal, &self.resource_url))
    }

    /// Document-local name of this authorization's RDF subject.
    pub fn hash_fragment(&self) -> AclResult<String> {
        self.identity_key()
    }

    /// Merge another authorization for the same grant into this one.
    ///
    /// Modes, `mailto:` aliases and origin restrictions are unioned. The
    /// result is inherited if either side is.
    ///
    /// # Errors
    ///
    /// `IdentityMismatch` if the two describe different grants.
    pub fn merge_with(&mut self, other: &Authorization) -> AclResult<()> {
        let expected = self.identity_key()?;
        let found = other.identity_key()?;
        if expected != found {
            return Err(AclError::IdentityMismatch { expected, found });
        }
        self.access_modes.extend(other.access_modes.iter().copied());
        self.inherited |= other.inherited;
        self.mail_to.extend(other.mail_to.iter().cloned());
        self.allowed_origins
            .extend(other.allowed_origins.iter().cloned());
        Ok(())
    }

    /// RDF statements describing this authorization.
    ///
    /// Returns nothing for an invalid authorization.
    pub fn to_statements(&self) -> Vec<Triple> {
        let (Some(principal), Ok(fragment)) = (&self.principal, self.hash_fragment()) else {
            return Vec::new();
        };
        if !self.is_valid() {
            return Vec::new();
        }

        let subject = Term::named(format!("#{}", fragment));
        let statement = |predicate: &str, object: Term| {
            Triple::new(subject.clone(), Term::named(predicate), object)
        };

        let mut statements = vec![statement(RDF_TYPE, Term::named(ACL_AUTHORIZATION))];
        for alias in &self.mail_to {
            statements.push(statement(ACL_AGENT, Term::named(alias.clone())));
        }
        match principal {
            Principal::Agent(id) => statements.push(statement(ACL_AGENT, Term::named(id.clone()))),
            Principal::Group(id) => {
                statements.push(statement(ACL_AGENT_CLASS, Term::named(id.clone())))
            }
        }
        statements.push(statement(ACL_ACCESS_TO, Term::named(self.resource_url.clone())));
        for mode in &self.access_modes {
            statements.push(statement(ACL_MODE, Term::named(mode.iri())));
        }
        if self.inherited {
            statements.push(statement(
                ACL_DEFAULT_FOR_NEW,
                Term::named(self.resource_url.clone()),
            ));
        }
        for origin in &self.allowed_origins {
            statements.push(statement(ACL_ORIGIN, Term::named(origin.clone())));
        }
        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALICE_FILE: &str = "https://alice.example/docs/file";
    const BOB: &str = "https://bob.example/profile#me";

    fn bob_auth(modes: &[AccessMode]) -> Authorization {
        let mut auth = Authorization::new(ALICE_FILE, false);
        auth.set_agent(BOB).unwrap();
        auth.add_modes(modes.iter().copied());
        auth
    }

    #[test]
    fn test_group_after_agent_conflicts() {
        let mut auth = bob_auth(&[]);
        let err = auth.set_group("https://alice.example/groups#friends").unwrap_err();
        assert!(matches!(err, AclError::ConflictingPrincipal { .. }));
        assert_eq!(auth.principal(), Some(&Principal::Agent(BOB.to_string())));
    }

    #[test]
    fn test_agent_after_group_conflicts() {
        let mut auth = Authorization::new(ALICE_FILE, false);
        auth.set_public().unwrap();
        let err = auth.set_agent(BOB).unwrap_err();
        assert!(matches!(err, AclError::ConflictingPrincipal { .. }));
        assert!(auth.is_public());
    }

    #[test]
    fn test_everyone_agent_is_public() {
        let mut auth = Authorization::new(ALICE_FILE, false);
        auth.set_agent(EVERYONE).unwrap();
        assert!(auth.is_public());
        assert!(auth.is_group());
        assert!(!auth.is_agent());
    }

    #[test]
    fn test_mailto_agent_becomes_alias() {
        let mut auth = Authorization::new(ALICE_FILE, false);
        auth.set_agent("mailto:bob@example.com").unwrap();
        assert!(auth.principal().is_none());
        assert_eq!(auth.mail_to_aliases().collect::<Vec<_>>(), vec!["mailto:bob@example.com"]);

        auth.add_mail_to_alias("alice@example.com");
        assert_eq!(
            auth.mail_to_aliases().collect::<Vec<_>>(),
            vec!["mailto:alice@example.com", "mailto:bob@example.com"]
        );
    }

    #[test]
    fn test_mode_add_remove_idempotent() {
        let mut auth = bob_auth(&[AccessMode::Read]);
        auth.add_mode(AccessMode::Read);
        assert_eq!(auth.access_modes().len(), 1);

        auth.remove_mode(AccessMode::Control);
        assert_eq!(auth.access_modes().len(), 1);

        auth.remove_mode(AccessMode::Read);
        auth.remove_mode(AccessMode::Read);
        assert!(auth.is_empty());
        assert!(!auth.is_valid());
    }

    #[test]
    fn test_write_implies_append() {
        let auth = bob_auth(&[AccessMode::Write]);
        assert!(auth.allows_write());
        assert!(auth.allows_append());

        let auth = bob_auth(&[AccessMode::Append]);
        assert!(auth.allows_append());
        assert!(!auth.allows_write());
    }

    #[test]
    fn test_removing_append_keeps_implied_append() {
        let mut auth = bob_auth(&[AccessMode::Write, AccessMode::Append]);
        auth.remove_mode(AccessMode::Append);
        assert!(auth.allows_append());
    }

    #[test]
    fn test_removing_write_drops_implied_append() {
        let mut auth = bob_auth(&[AccessMode::Write, AccessMode::Read]);
        auth.remove_mode(AccessMode::Write);
        assert!(!auth.allows_append());
        assert!(auth.allows_read());
    }

    #[test]
    fn test_control_does_not_imply_read() {
        let auth = bob_auth(&[AccessMode::Control]);
        assert!(auth.allows_control());
        assert!(!auth.allows_read());
    }

    #[test]
    fn test_origins() {
        let mut auth = bob_auth(&[AccessMode::Read]);
        assert!(auth.allows_origin("https://app.example"));

        auth.add_origin("https://app.example");
        assert!(auth.allows_origin("https://app.example"));
        assert!(!auth.allows_origin("https://evil.example"));

        auth.remove_origin("https://app.example");
        assert!(auth.allows_origin("https://evil.example"));
    }

    #[test]
    fn test_identity_key_requires_principal() {
        let auth = Authorization::new(ALICE_FILE, false);
        assert!(matches!(
            auth.identity_key(),
            Err(AclError::IncompleteAuthorization(_))
        ));

        let mut auth = Authorization::new("", false);
        auth.set_agent(BOB).unwrap();
        assert!(matches!(
            auth.identity_key(),
            Err(AclError::IncompleteAuthorization(_))
        ));
    }

    #[test]
    fn test_identity_key_ignores_modes() {
        let a = bob_auth(&[AccessMode::Read]);
        let b = bob_auth(&[AccessMode::Write, AccessMode::Control]);
        assert_eq!(a.identity_key().unwrap(), b.identity_key().unwrap());
        assert_eq!(a.identity_key().unwrap(), identity_key_for(BOB, ALICE_FILE));

        let mut other = Authorization::new("https://alice.example/docs/other", false);
        other.set_agent(BOB).unwrap();
        assert_ne!(a.identity_key().unwrap(), other.identity_key().unwrap());
    }

    #[test]
    fn test_merge_unions_modes() {
        let mut a = bob_auth(&[AccessMode::Read]);
        let mut b = bob_auth(&[AccessMode::Write]);
        b.add_origin("https://app.example");
        a.merge_with(&b).unwrap();
        assert!(a.allows_read());
        assert!(a.allows_write());
        assert_eq!(a.allowed_origins().count(), 1);
    }

    #[test]
    fn test_merge_keeps_inheritance() {
        let mut direct = bob_auth(&[AccessMode::Read]);
        let mut inherited = bob_auth(&[AccessMode::Write]);
        inherited.set_inherited(true);

        direct.merge_with(&inherited).unwrap();
        assert!(direct.is_inherited());

        let mut inherited_first = inherited.clone();
        inherited_first.merge_with(&bob_auth(&[AccessMode::Read])).unwrap();
        assert!(inherited_first.is_inherited());
    }

    #[test]
    fn test_identity_key_separates_fields() {
        assert_ne!(
            identity_key_for("https://bob.example/a", "bc"),
            identity_key_for("https://bob.example/ab", "c")
        );
    }

    #[test]
    fn test_merge_rejects_different_grants() {
        let mut a = bob_auth(&[AccessMode::Read]);
        let mut b = Authorization::new(ALICE_FILE, false);
        b.set_public().unwrap();
        b.add_mode(AccessMode::Read);
        let err = a.merge_with(&b).unwrap_err();
        assert!(matches!(err, AclError::IdentityMismatch { .. }));
    }

    #[test]
    fn test_to_statements() {
        let mut auth = Authorization::new("https://alice.example/docs/", true);
        auth.set_agent(BOB).unwrap();
        auth.add_mail_to_alias("bob@example.com");
        auth.add_modes([AccessMode::Read, AccessMode::Write]);
        auth.add_origin("https://app.example");

        let statements = auth.to_statements();
        // type, alias, agent, accessTo, two modes, default, origin
        assert_eq!(statements.len(), 8);

        let subject = Term::named(format!("#{}", auth.hash_fragment().unwrap()));
        assert!(statements.iter().all(|t| t.subject == subject));
        assert!(statements
            .iter()
            .any(|t| t.predicate == Term::named(ACL_DEFAULT_FOR_NEW)));
        assert_eq!(
            statements
                .iter()
                .filter(|t| t.predicate == Term::named(ACL_AGENT))
                .count(),
            2
        );
    }

    #[test]
    fn test_group_statements_use_agent_class() {
        let mut auth = Authorization::new(ALICE_FILE, false);
        auth.set_public().unwrap();
        auth.add_mode(AccessMode::Read);
        let statements = auth.to_statements();
        assert!(statements.iter().any(|t| {
            t.predicate == Term::named(ACL_AGENT_CLASS) && t.object == Term::named(EVERYONE)
        }));
        assert!(!statements.iter().any(|t| t.predicate == Term::named(ACL_AGENT)));
    }

    #[test]
    fn test_invalid_authorization_has_no_statements() {
        assert!(bob_auth(&[]).to_statements().is_empty());
        let mut no_principal = Authorization::new(ALICE_FILE, false);
        no_principal.add_mode(AccessMode::Read);
        assert!(no_principal.to_statements().is_empty());
    }

    #[test]
    fn test_equality() {
        let a = bob_auth(&[AccessMode::Read, AccessMode::Write]);
        let b = bob_auth(&[AccessMode::Write, AccessMode::Read]);
        assert_eq!(a, b);

        let mut c = b.clone();
        c.set_inherited(true);
        assert_ne!(a, c);

        let mut d = b.clone();
        d.add_mail_to_alias("bob@example.com");
        assert_ne!(a, d);
    }

    fn arb_modes() -> impl Strategy<Value = Vec<AccessMode>> {
        proptest::sample::subsequence(AccessMode::all(), 0..=4)
    }

    proptest! {
        /// Holding Write always grants Append; Append alone never grants Write.
        #[test]
        fn prop_mode_implication(modes in arb_modes()) {
            let mut auth = bob_auth(&modes);
            auth.add_mode(AccessMode::Write);
            prop_assert!(auth.allows_append());
            auth.remove_mode(AccessMode::Append);
            prop_assert!(auth.allows_append());

            let append_only = bob_auth(&[AccessMode::Append]);
            prop_assert!(!append_only.allows_write());
        }

        /// Merge yields the union of modes, in either order.
        #[test]
        fn prop_merge_commutative(a in arb_modes(), b in arb_modes()) {
            let mut ab = bob_auth(&a);
            ab.merge_with(&bob_auth(&b)).unwrap();
            let mut ba = bob_auth(&b);
            ba.merge_with(&bob_auth(&a)).unwrap();

            let union: BTreeSet<AccessMode> = a.iter().chain(b.iter()).copied().collect();
            prop_assert_eq!(ab.access_modes(), &union);
            prop_assert_eq!(ab, ba);
        }

        /// Merging with itself changes nothing.
        #[test]
        fn prop_merge_idempotent(a in arb_modes()) {
            let original = bob_auth(&a);
            let mut merged = original.clone();
            merged.merge_with(&original).unwrap();
            prop_assert_eq!(merged, original);
        }
    }
}
