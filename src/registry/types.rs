//! Advertisement data model and error definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Role a server plays in the federation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    /// Holds the authoritative copy of objects under a namespace.
    Origin,
    /// Holds a replicated copy of objects under a namespace.
    Cache,
}

impl ServerType {
    /// Returns the wire representation of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerType::Origin => "origin",
            ServerType::Cache => "cache",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerType {
    type Err = AdvertisementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "origin" => Ok(ServerType::Origin),
            "cache" => Ok(ServerType::Cache),
            _ => Err(AdvertisementError::UnknownServerType(s.to_string())),
        }
    }
}

/// A logical path prefix exposed by the federation.
///
/// The path is stored exactly as first advertised; `/chtc` and `/chtc/` are
/// different namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceAd {
    /// Absolute namespace path.
    pub path: String,

    /// Whether reads require a bearer credential.
    #[serde(default)]
    pub require_token: bool,

    /// Authority trusted to mint credentials for this namespace.
    #[serde(default)]
    pub issuer: Option<Url>,
}

impl NamespaceAd {
    /// Create a public namespace with no issuer.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            require_token: false,
            issuer: None,
        }
    }

    /// Mark the namespace as token-protected by the given issuer.
    pub fn with_issuer(mut self, issuer: Url) -> Self {
        self.require_token = true;
        self.issuer = Some(issuer);
        self
    }
}

/// An origin or cache participating in the federation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerAd {
    /// Unique server identifier.
    pub name: String,

    #[serde(rename = "type")]
    pub server_type: ServerType,

    /// Public data endpoint.
    pub url: Url,

    /// Endpoint for token-protected operations.
    #[serde(default)]
    pub auth_url: Option<Url>,
}

impl ServerAd {
    pub fn new(name: impl Into<String>, server_type: ServerType, url: Url) -> Self {
        Self {
            name: name.into(),
            server_type,
            url,
            auth_url: None,
        }
    }

    pub fn with_auth_url(mut self, auth_url: Url) -> Self {
        self.auth_url = Some(auth_url);
        self
    }

    /// Endpoint to hand out for a namespace, preferring the auth endpoint
    /// when the namespace needs a token.
    pub fn endpoint_for(&self, namespace: &NamespaceAd) -> &Url {
        match (&self.auth_url, namespace.require_token) {
            (Some(auth_url), true) => auth_url,
            _ => &self.url,
        }
    }
}

/// Reasons an advertisement is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvertisementError {
    #[error("server name must not be empty")]
    EmptyServerName,

    #[error("unknown server type {0:?} (expected \"origin\" or \"cache\")")]
    UnknownServerType(String),

    #[error("advertisement from server {0:?} lists no namespaces")]
    NoNamespaces(String),

    #[error("namespace path must not be empty")]
    EmptyNamespacePath,

    #[error("namespace path {0:?} is not absolute")]
    RelativeNamespacePath(String),
}

/// Result type for advertisement handling.
pub type AdvertisementResult<T> = Result<T, AdvertisementError>;
