//! Route classes and the table that assigns them to paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GuardError;

// ---------------------------------------------------------------------------
// RouteClass
// ---------------------------------------------------------------------------

/// What kind of page a path leads to.
///
/// Serialized in kebab-case: `"public"`, `"auth-only"`, `"protected"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum RouteClass {
    /// Anyone may see it (landing pages, docs).
    #[default]
    Public,
    /// Only makes sense when signed out (login, signup).
    AuthOnly,
    /// Requires a signed-in user (the dashboard).
    Protected,
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::AuthOnly => write!(f, "auth-only"),
            Self::Protected => write!(f, "protected"),
        }
    }
}

// ---------------------------------------------------------------------------
// RouteRule / RouteTable
// ---------------------------------------------------------------------------

/// Assigns a class to a path and everything below it.
///
/// `/dashboard` covers `/dashboard` and `/dashboard/customers`, but not
/// `/dashboards`. A rule for `/` covers only the root page itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub path: String,
    pub class: RouteClass,
}

impl RouteRule {
    pub fn new(path: impl Into<String>, class: RouteClass) -> Self {
        Self {
            path: path.into(),
            class,
        }
    }

    fn matches(&self, path: &str) -> bool {
        let rule = trim_path(&self.path);
        if rule == "/" {
            return path == "/";
        }
        path == rule
            || path
                .strip_prefix(rule)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Classifies paths by longest matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    default_class: RouteClass,
}

impl RouteTable {
    /// Builds a table, rejecting rules that are not absolute paths.
    pub fn new(
        rules: Vec<RouteRule>,
        default_class: RouteClass,
    ) -> Result<Self, GuardError> {
        for rule in &rules {
            require_absolute(&rule.path)?;
        }
        Ok(Self {
            rules,
            default_class,
        })
    }

    /// Returns the class for `path`.
    ///
    /// Query strings, fragments and trailing slashes are ignored.
    /// Paths no rule covers get the table's default class.
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize(path);
        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .max_by_key(|rule| trim_path(&rule.path).len())
            .map_or(self.default_class, |rule| rule.class)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn default_class(&self) -> RouteClass {
        self.default_class
    }
}

pub(crate) fn require_absolute(route: &str) -> Result<(), GuardError> {
    if route.starts_with('/') {
        Ok(())
    } else {
        Err(GuardError::InvalidRoute(route.to_string()))
    }
}

/// Strips `?query` / `#fragment` and any trailing slash (except root).
pub(crate) fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    trim_path(&path[..end])
}

fn trim_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}
