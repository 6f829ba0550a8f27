//! # Resource Types
//!
//! Linked-Data resources are either plain documents or containers holding
//! other resources. Only container authorizations can be inherited.

use serde::{Deserialize, Serialize};

/// Kind of resource an ACL governs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A document (non-container resource).
    #[default]
    Resource,
    /// A container of other resources.
    Container,
}

impl ResourceType {
    /// Get the string representation of the resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Resource => "resource",
            ResourceType::Container => "container",
        }
    }

    /// Guess the type from a URL: container URLs end in `/`.
    ///
    /// # Example
    ///
    /// ```
    /// use solid_acl::resources::ResourceType;
    ///
    /// assert_eq!(ResourceType::from_url("https://alice.example/docs/"), ResourceType::Container);
    /// assert_eq!(ResourceType::from_url("https://alice.example/docs/file"), ResourceType::Resource);
    /// ```
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.ends_with('/') {
            ResourceType::Container
        } else {
            ResourceType::Resource
        }
    }

    /// Check if this is a container.
    pub fn is_container(&self) -> bool {
        matches!(self, ResourceType::Container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_ignores_query_and_fragment() {
        assert_eq!(
            ResourceType::from_url("https://alice.example/docs/?page=2"),
            ResourceType::Container
        );
        assert_eq!(
            ResourceType::from_url("https://alice.example/docs/file#frag/"),
            ResourceType::Resource
        );
    }

    #[test]
    fn test_default_is_resource() {
        assert_eq!(ResourceType::default(), ResourceType::Resource);
        assert!(!ResourceType::default().is_container());
        assert_eq!(ResourceType::Container.as_str(), "container");
    }
}
