//! Linked-Data resource client.
//!
//! HTTP client for reading resource metadata and reading, replacing and
//! deleting RDF documents. ACL documents are discovered through the
//! `rel="acl"` relation of a resource's `Link` header.

use reqwest::header::{HeaderName, CONTENT_TYPE, ETAG, LINK};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use solid_acl::vocab::{LDP_BASIC_CONTAINER, LDP_CONTAINER};
use solid_acl::ResourceType;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// One entry of a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link target as written in the header.
    pub target: String,
    /// Relation types.
    pub rels: Vec<String>,
}

impl Link {
    /// Check if the link carries a relation type.
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rels.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

/// Parse a `Link` header value.
///
/// # Example
///
/// ```
/// use solid_client::resource::parse_link_header;
///
/// let links = parse_link_header(r#"<file.acl>; rel="acl", <http://www.w3.org/ns/ldp#Resource>; rel="type""#);
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].target, "file.acl");
/// assert!(links[1].has_rel("type"));
/// ```
pub fn parse_link_header(value: &str) -> Vec<Link> {
    split_outside_brackets(value)
        .into_iter()
        .filter_map(|entry| {
            let entry = entry.trim();
            let rest = entry.strip_prefix('<')?;
            let (target, params) = rest.split_once('>')?;
            let rels = params
                .split(';')
                .filter_map(|param| {
                    let (key, value) = param.split_once('=')?;
                    if key.trim().eq_ignore_ascii_case("rel") {
                        Some(value.trim().trim_matches('"').to_string())
                    } else {
                        None
                    }
                })
                .flat_map(|value| {
                    value
                        .split_whitespace()
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .collect();
            Some(Link {
                target: target.trim().to_string(),
                rels,
            })
        })
        .collect()
}

fn split_outside_brackets(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_target = false;
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '<' if !in_quotes => in_target = true,
            '>' if !in_quotes => in_target = false,
            '"' if !in_target => in_quotes = !in_quotes,
            ',' if !in_target && !in_quotes => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

/// Resolve a possibly relative reference against a base URL.
pub fn resolve_url(base: &str, reference: &str) -> ClientResult<String> {
    let base = Url::parse(base).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base, e)))?;
    base.join(reference)
        .map(|u| u.to_string())
        .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", reference, e)))
}

/// Metadata returned by a `HEAD` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMeta {
    /// Resource URL.
    pub url: String,
    /// Absolute URL of the resource's ACL, if advertised.
    pub acl_url: Option<String>,
    /// Whether the resource is a container.
    pub is_container: bool,
    /// Media type, if reported.
    pub content_type: Option<String>,
    /// Entity tag, if reported.
    pub etag: Option<String>,
    /// All parsed `Link` header entries.
    pub links: Vec<Link>,
}

impl ResourceMeta {
    /// Build metadata from response headers.
    fn from_response(url: &str, response: &Response) -> ClientResult<Self> {
        let headers = response.headers();
        let links: Vec<Link> = headers
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_link_header)
            .collect();

        let acl_url = match links.iter().find(|l| l.has_rel("acl")) {
            Some(link) => Some(resolve_url(url, &link.target)?),
            None => None,
        };
        let typed_container = links.iter().any(|l| {
            l.has_rel("type") && (l.target == LDP_CONTAINER || l.target == LDP_BASIC_CONTAINER)
        });
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Ok(Self {
            url: url.to_string(),
            acl_url,
            is_container: typed_container || ResourceType::from_url(url).is_container(),
            content_type: header(CONTENT_TYPE),
            etag: header(ETAG),
            links,
        })
    }

    /// Document or container.
    pub fn resource_type(&self) -> ResourceType {
        if self.is_container {
            ResourceType::Container
        } else {
            ResourceType::Resource
        }
    }
}

/// An RDF document fetched from a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfDocument {
    /// Document URL.
    pub url: String,
    /// Document body.
    pub body: String,
    /// Media type, if reported.
    pub content_type: Option<String>,
}

/// HTTP client for Linked-Data resources.
#[derive(Clone)]
pub struct ResourceClient {
    /// HTTP client instance.
    client: Client,

    /// Bearer token sent with every request.
    access_token: Option<String>,
}

impl ResourceClient {
    /// Create a new resource client.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            client,
            access_token: config.access_token.clone(),
        })
    }

    /// Fetch resource metadata.
    ///
    /// # Errors
    ///
    /// `NotFound` if the resource does not exist, `ApiError` for any other
    /// non-success status.
    #[instrument(skip(self))]
    pub async fn head(&self, url: &str) -> ClientResult<ResourceMeta> {
        let response = self.request(Method::HEAD, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(url.to_string()));
        }
        let response = Self::check_status(response, url).await?;
        let meta = ResourceMeta::from_response(url, &response)?;
        debug!(acl_url = ?meta.acl_url, is_container = meta.is_container, "Fetched resource metadata");
        Ok(meta)
    }

    /// Fetch a document, or `None` if it does not exist.
    #[instrument(skip(self))]
    pub async fn get(&self, url: &str) -> ClientResult<Option<RdfDocument>> {
        let response = self.request(Method::GET, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Document does not exist");
            return Ok(None);
        }
        let response = Self::check_status(response, url).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(Some(RdfDocument {
            url: url.to_string(),
            body,
            content_type,
        }))
    }

    /// Replace a document in full.
    #[instrument(skip(self, body), fields(bytes = body.len()))]
    pub async fn put(&self, url: &str, body: String, content_type: &str) -> ClientResult<()> {
        let response = self
            .request(Method::PUT, url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        Self::check_status(response, url).await?;
        Ok(())
    }

    /// Delete a document. A document that is already gone counts as deleted.
    #[instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> ClientResult<()> {
        let response = self.request(Method::DELETE, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Document already absent");
            return Ok(());
        }
        Self::check_status(response, url).await?;
        Ok(())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(response: Response, url: &str) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        warn!("Request to {} failed ({}): {}", url, status.as_u16(), message);
        Err(ClientError::ApiError {
            status: status.as_u16(),
            url: url.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_link_header_multiple_rels() {
        let links = parse_link_header(r#"<.acl>; rel="acl", <.meta>; rel="describedby meta""#);
        assert_eq!(links.len(), 2);
        assert!(links[0].has_rel("acl"));
        assert!(links[1].has_rel("describedby"));
        assert!(links[1].has_rel("meta"));
    }

    #[test]
    fn test_parse_link_header_unquoted_and_commas_in_target() {
        let links = parse_link_header("<https://a.example/x,y>; rel=acl; title=\"a, b\"");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "https://a.example/x,y");
        assert_eq!(links[0].rels, vec!["acl".to_string()]);
    }

    #[test]
    fn test_parse_link_header_ignores_garbage() {
        assert!(parse_link_header("").is_empty());
        assert!(parse_link_header("not a link").is_empty());
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://alice.example/docs/file", "file.acl").unwrap(),
            "https://alice.example/docs/file.acl"
        );
        assert_eq!(
            resolve_url("https://alice.example/docs/", ".acl").unwrap(),
            "https://alice.example/docs/.acl"
        );
        assert_eq!(
            resolve_url("https://alice.example/docs/file", "https://acl.example/x").unwrap(),
            "https://acl.example/x"
        );
        assert!(resolve_url("not a url", "x").is_err());
    }

    #[test]
    fn test_client_creation() {
        let config = ClientConfig {
            access_token: Some("token".to_string()),
            ..ClientConfig::default()
        };
        let client = ResourceClient::new(&config).unwrap();
        assert_eq!(client.access_token.as_deref(), Some("token"));
    }
}
