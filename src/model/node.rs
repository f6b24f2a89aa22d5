//! Site graph node definitions
//!
//! Every node kind carries its own identity rule, so external and group nodes never need
//! ad-hoc string prefixes at the call site.

use crate::url::{external_id, parse_http_url};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Classification of a node as seen by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    /// A same-site page that was fetched
    Internal,

    /// An off-site domain (all links to one domain share a node)
    External,

    /// A collapsed set of list-item pages sharing a base path
    Grouped,

    /// A same-site page that was discovered but not fetched yet
    Pending,
}

impl NodeClass {
    /// Returns a stable lowercase label for the classification
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Grouped => "grouped",
            Self::Pending => "pending",
        }
    }

    /// Returns all classifications
    pub fn all() -> [Self; 4] {
        [Self::Internal, Self::External, Self::Grouped, Self::Pending]
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a node together with the key its identity is derived from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Fetched page, identified by its URL
    Internal(String),

    /// Off-site domain, identified as `ext://<domain>`
    External(String),

    /// List group, identified by its base path URL
    Grouped(String),

    /// Discovered but unfetched page, identified by its URL
    Pending(String),
}

impl NodeKind {
    /// Returns the node identity
    pub fn id(&self) -> String {
        match self {
            Self::Internal(url) | Self::Pending(url) => url.clone(),
            Self::Grouped(base_path) => base_path.clone(),
            Self::External(domain) => external_id(domain),
        }
    }

    /// Returns the classification for this kind
    pub fn class(&self) -> NodeClass {
        match self {
            Self::Internal(_) => NodeClass::Internal,
            Self::External(_) => NodeClass::External,
            Self::Grouped(_) => NodeClass::Grouped,
            Self::Pending(_) => NodeClass::Pending,
        }
    }
}

/// A node of the site graph
///
/// Equality and hashing use the identity only: an `Internal` and a `Pending` node for the
/// same URL are the same entity, whatever their titles.
#[derive(Debug, Clone)]
pub struct SiteNode {
    kind: NodeKind,
    title: String,
}

impl SiteNode {
    /// Creates a node for a fetched page; an empty title falls back to the URL
    pub fn internal(url: impl Into<String>, title: Option<&str>) -> Self {
        let url = url.into();
        let title = non_empty_or(title, &url);
        Self {
            kind: NodeKind::Internal(url),
            title,
        }
    }

    /// Creates a node for a discovered, unfetched page; an empty label falls back to the URL
    pub fn pending(url: impl Into<String>, label: Option<&str>) -> Self {
        let url = url.into();
        let title = non_empty_or(label, &url);
        Self {
            kind: NodeKind::Pending(url),
            title,
        }
    }

    /// Creates a group node titled `List: <path>*`
    pub fn grouped(base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        let path = parse_http_url(&base_path)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| base_path.clone());
        Self {
            title: format!("List: {}*", path),
            kind: NodeKind::Grouped(base_path),
        }
    }

    /// Creates a node for an off-site domain, titled with the domain
    pub fn external(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            title: domain.clone(),
            kind: NodeKind::External(domain),
        }
    }

    /// Returns the node identity (URL or synthetic id)
    pub fn id(&self) -> String {
        self.kind.id()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn class(&self) -> NodeClass {
        self.kind.class()
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl PartialEq for SiteNode {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for SiteNode {}

impl Hash for SiteNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for SiteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.id())
    }
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
