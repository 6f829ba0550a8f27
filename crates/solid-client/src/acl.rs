//! ACL resource protocol.
//!
//! Locates a resource's ACL document, loads it into a [`PermissionSet`],
//! applies edits and writes it back. Updates follow read-merge-write:
//!
//! ```text
//! HEAD resource  ->  Link rel="acl"          (discover)
//! GET  acl       ->  PermissionSet           (load; 404 = empty set)
//! add grants     ->  union with loaded set   (merge)
//! owner grant    ->  current user keeps Control, Read, Write (augment)
//! PUT  acl       ->  full document replace   (persist)
//! ```
//!
//! No conditional request is made when persisting. Two editors updating the
//! same ACL concurrently both read the same prior state, and the last PUT
//! wins.

use serde::{Deserialize, Serialize};
use solid_acl::{AccessMode, PermissionSet, Principal, RdfFormat};
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::resource::{ResourceClient, ResourceMeta};

/// Modes granted to the acting user on every ACL it edits.
pub const OWNER_MODES: [AccessMode; 3] = [AccessMode::Control, AccessMode::Read, AccessMode::Write];

/// Modes to grant a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Who receives the modes.
    pub principal: Principal,
    /// Modes to add.
    pub modes: Vec<AccessMode>,
}

impl Grant {
    /// Grant to an individual agent.
    pub fn agent(webid: impl Into<String>, modes: impl IntoIterator<Item = AccessMode>) -> Self {
        Self {
            principal: Principal::Agent(webid.into()),
            modes: modes.into_iter().collect(),
        }
    }

    /// Grant to a group of agents.
    pub fn group(group: impl Into<String>, modes: impl IntoIterator<Item = AccessMode>) -> Self {
        Self {
            principal: Principal::Group(group.into()),
            modes: modes.into_iter().collect(),
        }
    }

    /// Grant to everyone.
    pub fn public(modes: impl IntoIterator<Item = AccessMode>) -> Self {
        Self {
            principal: Principal::everyone(),
            modes: modes.into_iter().collect(),
        }
    }
}

/// Reads and edits the ACL documents of remote resources.
///
/// # Example
///
/// ```rust,no_run
/// use solid_client::{AclManager, ClientConfig, Grant};
/// use solid_acl::AccessMode;
///
/// async fn share() -> Result<(), solid_client::ClientError> {
///     let manager = AclManager::new(ClientConfig::from_env())?
///         .with_current_user("https://alice.example/profile#me");
///
///     manager
///         .set_permissions(
///             "https://alice.example/docs/file",
///             &[Grant::agent("https://bob.example/profile#me", [AccessMode::Read])],
///         )
///         .await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct AclManager {
    /// Resource client.
    client: ResourceClient,

    /// Client configuration.
    config: ClientConfig,
}

impl AclManager {
    /// Create a manager with its own resource client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let client = ResourceClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// Create a manager around an existing resource client.
    pub fn with_client(client: ResourceClient, config: ClientConfig) -> Self {
        Self { client, config }
    }

    /// Set the acting user.
    pub fn with_current_user(mut self, webid: impl Into<String>) -> Self {
        self.config.current_user = Some(webid.into());
        self
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Find a resource's ACL URL.
    ///
    /// # Errors
    ///
    /// `NotFound` if the resource does not exist, `AclUrlNotFound` if it
    /// does not advertise an ACL.
    #[instrument(skip(self))]
    pub async fn discover(&self, resource_url: &str) -> ClientResult<(ResourceMeta, String)> {
        let meta = self.client.head(resource_url).await?;
        let acl_url = meta
            .acl_url
            .clone()
            .ok_or_else(|| ClientError::AclUrlNotFound(resource_url.to_string()))?;
        debug!(acl_url = %acl_url, "Discovered ACL");
        Ok((meta, acl_url))
    }

    /// Load the permissions currently governing a resource.
    ///
    /// A missing ACL document yields an empty set.
    #[instrument(skip(self))]
    pub async fn get_permissions(&self, resource_url: &str) -> ClientResult<PermissionSet> {
        let (meta, acl_url) = self.discover(resource_url).await?;
        self.load(resource_url, &meta, &acl_url).await
    }

    /// Grant modes on a resource, keeping every existing grant.
    ///
    /// The document is rewritten from the loaded set, so statements the
    /// model does not carry are dropped on write: subjects without
    /// `acl:accessTo` (including `acl:default`-only container rules),
    /// subjects whose only agents are `mailto:` addresses, and unknown
    /// modes or predicates.
    ///
    /// # Returns
    ///
    /// The permission set as written to the server
    #[instrument(skip(self, grants), fields(grants = grants.len()))]
    pub async fn set_permissions(
        &self,
        resource_url: &str,
        grants: &[Grant],
    ) -> ClientResult<PermissionSet> {
        let (meta, acl_url) = self.discover(resource_url).await?;
        let mut permissions = self.load(resource_url, &meta, &acl_url).await?;

        for grant in grants {
            permissions.add_principal_permission(&grant.principal, grant.modes.iter().copied())?;
        }
        if let Some(user) = &self.config.current_user {
            permissions.add_permission(user, OWNER_MODES)?;
        }
        debug!(count = permissions.count(), "Merged grants into ACL");

        self.save(&permissions, None).await?;
        Ok(permissions)
    }

    /// Write a permission set, replacing the whole ACL document.
    ///
    /// # Arguments
    ///
    /// * `permissions` - Set to write
    /// * `acl_url` - Target overriding the set's own ACL URL
    ///
    /// # Errors
    ///
    /// `NoTargetUrl` if neither URL is available
    #[instrument(skip(self, permissions), fields(resource = %permissions.resource_url()))]
    pub async fn save(&self, permissions: &PermissionSet, acl_url: Option<&str>) -> ClientResult<()> {
        let target = acl_url
            .or_else(|| permissions.acl_url())
            .ok_or(ClientError::NoTargetUrl)?;
        let body = permissions.serialize(RdfFormat::Turtle)?;
        self.client
            .put(target, body, RdfFormat::Turtle.content_type())
            .await?;
        debug!(acl_url = %target, "Saved ACL");
        Ok(())
    }

    /// Delete a resource's ACL document.
    #[instrument(skip(self))]
    pub async fn clear_permissions(&self, resource_url: &str) -> ClientResult<()> {
        let (_, acl_url) = self.discover(resource_url).await?;
        self.client.delete(&acl_url).await
    }

    /// Check if a resource relies on an ancestor container's ACL.
    ///
    /// True when the advertised ACL is not the one the naming convention
    /// gives the resource itself.
    #[instrument(skip(self))]
    pub async fn is_permissions_inherited(&self, resource_url: &str) -> ClientResult<bool> {
        let (_, acl_url) = self.discover(resource_url).await?;
        Ok(acl_url != self.config.default_acl_url(resource_url))
    }

    async fn load(
        &self,
        resource_url: &str,
        meta: &ResourceMeta,
        acl_url: &str,
    ) -> ClientResult<PermissionSet> {
        let mut permissions = PermissionSet::new(
            resource_url,
            Some(acl_url.to_string()),
            meta.resource_type(),
        );
        let Some(document) = self.client.get(acl_url).await? else {
            debug!(acl_url = %acl_url, "No ACL document yet");
            return Ok(permissions);
        };

        let content_type = document
            .content_type
            .as_deref()
            .and_then(RdfFormat::from_content_type)
            .unwrap_or(RdfFormat::Turtle)
            .content_type();
        permissions.init_from_text(&document.body, content_type)?;
        Ok(permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solid_acl::EVERYONE;

    #[test]
    fn test_grant_constructors() {
        let grant = Grant::agent("https://bob.example/#me", [AccessMode::Read]);
        assert_eq!(grant.principal, Principal::Agent("https://bob.example/#me".to_string()));
        assert_eq!(grant.modes, vec![AccessMode::Read]);

        let grant = Grant::public([AccessMode::Read, AccessMode::Append]);
        assert_eq!(grant.principal, Principal::Group(EVERYONE.to_string()));
        assert_eq!(grant.modes.len(), 2);

        let grant = Grant::group("https://alice.example/groups#team", Vec::new());
        assert!(grant.principal.is_group());
    }

    #[test]
    fn test_manager_rejects_invalid_config() {
        let config = ClientConfig {
            acl_suffix: String::new(),
            ..ClientConfig::default()
        };
        assert!(matches!(AclManager::new(config), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_with_current_user() {
        let manager = AclManager::new(ClientConfig::default())
            .unwrap()
            .with_current_user("https://alice.example/profile#me");
        assert_eq!(
            manager.config().current_user.as_deref(),
            Some("https://alice.example/profile#me")
        );
    }
}
