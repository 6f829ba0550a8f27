//! # Permission Sets
//!
//! The full set of authorizations governing one resource, as stored in the
//! resource's ACL document. Authorizations are keyed by identity, so adding a
//! grant for a principal that already has one merges the modes instead of
//! creating a duplicate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::authorization::{identity_key_for, Authorization, Principal};
use crate::error::{AclError, AclResult};
use crate::modes::AccessMode;
use crate::rdf::{Graph, RdfFormat, Term};
use crate::resources::ResourceType;
use crate::vocab::{
    ACL_ACCESS_TO, ACL_AGENT, ACL_AGENT_CLASS, ACL_AUTHORIZATION, ACL_DEFAULT, ACL_DEFAULT_FOR_NEW,
    ACL_MODE, ACL_ORIGIN, EVERYONE, MAILTO_SCHEME,
};

/// The authorizations for one resource.
///
/// # Example
///
/// ```
/// use solid_acl::{AccessMode, PermissionSet, ResourceType};
///
/// let mut set = PermissionSet::new(
///     "https://alice.example/docs/file",
///     Some("https://alice.example/docs/file.acl".to_string()),
///     ResourceType::Resource,
/// );
/// set.add_permission("https://bob.example/#me", [AccessMode::Read]).unwrap();
/// set.add_permission("https://bob.example/#me", [AccessMode::Write]).unwrap();
///
/// assert_eq!(set.count(), 1);
/// let auth = set.permission_for("https://bob.example/#me", None).unwrap();
/// assert!(auth.allows_read() && auth.allows_write());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionSet {
    /// Resource the ACL governs.
    resource_url: String,
    /// Location of the ACL document, once known.
    acl_url: Option<String>,
    /// Document or container.
    resource_type: ResourceType,
    /// Authorizations keyed by identity key.
    authorizations: HashMap<String, Authorization>,
}

impl PermissionSet {
    /// Create an empty permission set.
    pub fn new(
        resource_url: impl Into<String>,
        acl_url: Option<String>,
        resource_type: ResourceType,
    ) -> Self {
        Self {
            resource_url: resource_url.into(),
            acl_url,
            resource_type,
            authorizations: HashMap::new(),
        }
    }

    /// Create a permission set populated from a parsed ACL graph.
    pub fn from_graph(
        resource_url: impl Into<String>,
        acl_url: Option<String>,
        resource_type: ResourceType,
        graph: &Graph,
    ) -> AclResult<Self> {
        let mut set = Self::new(resource_url, acl_url, resource_type);
        set.init_from_graph(graph)?;
        Ok(set)
    }

    /// Resource the ACL governs.
    pub fn resource_url(&self) -> &str {
        &self.resource_url
    }

    /// Location of the ACL document.
    pub fn acl_url(&self) -> Option<&str> {
        self.acl_url.as_deref()
    }

    /// Record where the ACL document lives.
    pub fn set_acl_url(&mut self, acl_url: impl Into<String>) {
        self.acl_url = Some(acl_url.into());
    }

    /// Document or container.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Whether new authorizations default to inherited.
    ///
    /// Only container grants are inherited.
    pub fn is_auth_inherited(&self) -> bool {
        self.resource_type.is_container()
    }

    /// Add an authorization, merging it into an existing one for the same
    /// principal and resource.
    ///
    /// An authorization without modes is not stored.
    ///
    /// # Errors
    ///
    /// `IncompleteAuthorization` if the authorization has no principal or
    /// resource URL.
    pub fn add_authorization(&mut self, auth: Authorization) -> AclResult<()> {
        let key = auth.identity_key()?;
        match self.authorizations.get_mut(&key) {
            Some(existing) => existing.merge_with(&auth),
            None if auth.is_empty() => {
                debug!(resource = %auth.resource_url(), "Ignoring authorization without modes");
                Ok(())
            }
            None => {
                self.authorizations.insert(key, auth);
                Ok(())
            }
        }
    }

    /// Grant modes on this resource to an agent.
    ///
    /// # Arguments
    ///
    /// * `agent` - Agent WebID
    /// * `modes` - Modes to grant
    pub fn add_permission<I>(&mut self, agent: &str, modes: I) -> AclResult<()>
    where
        I: IntoIterator<Item = AccessMode>,
    {
        let mut auth = Authorization::new(self.resource_url.clone(), self.is_auth_inherited());
        auth.set_agent(agent)?;
        auth.add_modes(modes);
        self.add_authorization(auth)
    }

    /// Grant modes on this resource to a group of agents.
    pub fn add_group_permission<I>(&mut self, group: &str, modes: I) -> AclResult<()>
    where
        I: IntoIterator<Item = AccessMode>,
    {
        let mut auth = Authorization::new(self.resource_url.clone(), self.is_auth_inherited());
        auth.set_group(group)?;
        auth.add_modes(modes);
        self.add_authorization(auth)
    }

    /// Grant modes on this resource to everyone.
    pub fn add_public_permission<I>(&mut self, modes: I) -> AclResult<()>
    where
        I: IntoIterator<Item = AccessMode>,
    {
        self.add_group_permission(EVERYONE, modes)
    }

    /// Grant modes to either kind of principal.
    pub fn add_principal_permission<I>(&mut self, principal: &Principal, modes: I) -> AclResult<()>
    where
        I: IntoIterator<Item = AccessMode>,
    {
        match principal {
            Principal::Agent(id) => self.add_permission(id, modes),
            Principal::Group(id) => self.add_group_permission(id, modes),
        }
    }

    /// Revoke modes on this resource from a principal.
    ///
    /// An authorization left without modes is removed from the set.
    ///
    /// # Returns
    ///
    /// `true` if the principal had an authorization on this resource
    pub fn remove_permission<I>(&mut self, principal_id: &str, modes: I) -> bool
    where
        I: IntoIterator<Item = AccessMode>,
    {
        let key = identity_key_for(principal_id, &self.resource_url);
        let Some(auth) = self.authorizations.get_mut(&key) else {
            return false;
        };
        auth.remove_modes(modes);
        if auth.is_empty() {
            self.authorizations.remove(&key);
        }
        true
    }

    /// Remove an authorization entirely.
    ///
    /// # Returns
    ///
    /// `true` if a matching authorization was present
    pub fn remove_authorization(&mut self, auth: &Authorization) -> AclResult<bool> {
        let key = auth.identity_key()?;
        Ok(self.authorizations.remove(&key).is_some())
    }

    /// Look up the authorization for a principal.
    ///
    /// # Arguments
    ///
    /// * `principal_id` - Agent or group IRI
    /// * `resource_url` - Target resource; defaults to this set's resource
    pub fn permission_for(&self, principal_id: &str, resource_url: Option<&str>) -> Option<&Authorization> {
        let resource_url = resource_url.unwrap_or(&self.resource_url);
        self.authorizations
            .get(&identity_key_for(principal_id, resource_url))
    }

    /// Populate the set from an ACL graph.
    ///
    /// Every `acl:Authorization` subject yields one authorization per
    /// (principal, `acl:accessTo` target) pair, each carrying all of the
    /// subject's modes. Repeated grants are merged.
    pub fn init_from_graph(&mut self, graph: &Graph) -> AclResult<()> {
        for subject in graph.subjects_of_type(ACL_AUTHORIZATION) {
            let mut principals = Vec::new();
            let mut aliases = Vec::new();
            for agent in iris(graph.objects(subject, ACL_AGENT)) {
                if agent.starts_with(MAILTO_SCHEME) {
                    aliases.push(agent);
                } else {
                    principals.push(Principal::Agent(agent.to_string()));
                }
            }
            for group in iris(graph.objects(subject, ACL_AGENT_CLASS)) {
                principals.push(Principal::Group(group.to_string()));
            }
            if principals.is_empty() {
                warn!(subject = %subject, "Skipping authorization without a principal");
                continue;
            }

            let targets = iris(graph.objects(subject, ACL_ACCESS_TO));
            if targets.is_empty() {
                warn!(subject = %subject, "Skipping authorization without acl:accessTo");
                continue;
            }

            let mut modes = Vec::new();
            for term in graph.objects(subject, ACL_MODE) {
                match AccessMode::try_from(term) {
                    Ok(mode) => modes.push(mode),
                    Err(e) => warn!(subject = %subject, error = %e, "Ignoring access mode"),
                }
            }
            if modes.is_empty() {
                warn!(subject = %subject, "Skipping authorization without modes");
                continue;
            }

            let inherited = !graph.objects(subject, ACL_DEFAULT_FOR_NEW).is_empty()
                || !graph.objects(subject, ACL_DEFAULT).is_empty();
            let origins: Vec<&str> = graph
                .objects(subject, ACL_ORIGIN)
                .into_iter()
                .map(Term::value)
                .collect();

            for principal in &principals {
                for target in &targets {
                    let mut auth = Authorization::new(*target, inherited);
                    auth.set_principal(principal.clone())?;
                    auth.add_modes(modes.iter().copied());
                    if principal.is_agent() {
                        for alias in &aliases {
                            auth.add_mail_to_alias(*alias);
                        }
                    }
                    for origin in &origins {
                        auth.add_origin(*origin);
                    }
                    self.add_authorization(auth)?;
                }
            }
        }
        debug!(
            resource = %self.resource_url,
            count = self.authorizations.len(),
            "Loaded authorizations from graph"
        );
        Ok(())
    }

    /// Parse ACL document text and populate the set from it.
    ///
    /// Relative IRIs resolve against the ACL URL, or the resource URL when
    /// the ACL URL is unknown.
    pub fn init_from_text(&mut self, text: &str, content_type: &str) -> AclResult<()> {
        let base = self.acl_url.clone().unwrap_or_else(|| self.resource_url.clone());
        let graph = Graph::parse(text, Some(&base), content_type)?;
        self.init_from_graph(&graph)
    }

    /// Build the RDF graph for every valid authorization.
    pub fn build_graph(&self) -> Graph {
        let mut graph = Graph::new();
        for auth in self.all_authorizations() {
            graph.add_all(auth.to_statements());
        }
        graph
    }

    /// Serialize the set as an ACL document.
    ///
    /// # Errors
    ///
    /// `SerializationError` if no valid authorization remains or the writer
    /// fails.
    pub fn serialize(&self, format: RdfFormat) -> AclResult<String> {
        let graph = self.build_graph();
        if graph.is_empty() {
            return Err(AclError::SerializationError(format!(
                "no valid authorizations for <{}>",
                self.resource_url
            )));
        }
        graph.serialize(format, self.acl_url.as_deref())
    }

    /// Number of authorizations.
    pub fn count(&self) -> usize {
        self.authorizations.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.authorizations.is_empty()
    }

    /// Remove every authorization.
    pub fn clear(&mut self) {
        self.authorizations.clear();
    }

    /// Iterate over the authorizations in arbitrary order.
    pub fn authorizations(&self) -> impl Iterator<Item = &Authorization> {
        self.authorizations.values()
    }

    /// All authorizations, ordered by identity key.
    pub fn all_authorizations(&self) -> Vec<&Authorization> {
        let mut entries: Vec<(&String, &Authorization)> = self.authorizations.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, auth)| auth).collect()
    }

    /// Distinct group IRIs named by the set, sorted.
    pub fn group_uris(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = self
            .authorizations
            .values()
            .filter_map(|auth| match auth.principal() {
                Some(Principal::Group(id)) => Some(id.as_str()),
                _ => None,
            })
            .collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }
}

fn iris(terms: Vec<&Term>) -> Vec<&str> {
    terms.into_iter().filter_map(Term::as_iri).collect()
}
