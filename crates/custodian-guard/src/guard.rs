//! The navigation guard: may this session see this page?
//!
//! The guard never changes pages itself. It answers with a
//! [`GuardDecision`], and when the answer is a redirect it hands the
//! destination to a [`Navigator`], the boundary with whatever routing
//! mechanism the app uses.

use std::fmt;

use custodian_session::SessionState;
use serde::{Deserialize, Serialize};

use crate::route::{RouteClass, RouteRule, RouteTable, normalize, require_absolute};
use crate::GuardError;

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Where a redirect should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A specific route, e.g. the login page.
    Route(String),
    /// "Back to where signed-in users belong": the configured home route.
    AuthenticatedHome,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route(route) => f.write_str(route),
            Self::AuthenticatedHome => f.write_str("<home>"),
        }
    }
}

/// The guard's verdict for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the page.
    Allow,
    /// The session is still `Unknown`: do nothing now and ask again once
    /// it resolves. Never a redirect.
    Defer,
    /// Send the user elsewhere.
    Redirect(Destination),
}

/// Performs the page change the guard asks for.
///
/// Implementations own the actual routing (history push, re-render,
/// etc.). The guard calls `navigate` at most once per decision.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &Destination);
}

impl<N: Navigator + ?Sized> Navigator for std::sync::Arc<N> {
    fn navigate(&self, destination: &Destination) {
        (**self).navigate(destination);
    }
}

// ---------------------------------------------------------------------------
// GuardConfig
// ---------------------------------------------------------------------------

/// Route layout and redirect targets.
///
/// The defaults describe the Custodian app: the login page lives at `/`,
/// sign-up at `/signup`, and everything under `/dashboard` needs a
/// signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Where anonymous users are sent when they hit a protected page.
    pub auth_route: String,
    /// Where signed-in users are sent when they hit an auth-only page.
    pub home_route: String,
    /// Class for paths no rule covers.
    pub default_class: RouteClass,
    pub rules: Vec<RouteRule>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            auth_route: "/".to_string(),
            home_route: "/dashboard".to_string(),
            default_class: RouteClass::Public,
            rules: vec![
                RouteRule::new("/", RouteClass::AuthOnly),
                RouteRule::new("/signup", RouteClass::AuthOnly),
                RouteRule::new("/dashboard", RouteClass::Protected),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// NavigationGuard
// ---------------------------------------------------------------------------

/// Applies the access policy:
///
/// | session       | public | auth-only        | protected         |
/// |---------------|--------|------------------|-------------------|
/// | Unknown       | allow  | allow            | defer             |
/// | Anonymous     | allow  | allow            | redirect → auth   |
/// | Authenticated | allow  | redirect → home  | allow             |
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    table: RouteTable,
    auth_route: String,
    home_route: String,
}

impl NavigationGuard {
    /// Builds a guard from `config`.
    ///
    /// # Errors
    /// - [`GuardError::InvalidRoute`]: a route is not absolute
    /// - [`GuardError::RedirectLoop`]: the auth route is itself
    ///   protected, or the home route is itself auth-only
    pub fn new(config: GuardConfig) -> Result<Self, GuardError> {
        require_absolute(&config.auth_route)?;
        require_absolute(&config.home_route)?;
        let table = RouteTable::new(config.rules, config.default_class)?;

        if table.classify(&config.auth_route) == RouteClass::Protected {
            return Err(GuardError::RedirectLoop(format!(
                "auth route {} is protected",
                config.auth_route
            )));
        }
        if table.classify(&config.home_route) == RouteClass::AuthOnly {
            return Err(GuardError::RedirectLoop(format!(
                "home route {} is auth-only",
                config.home_route
            )));
        }

        Ok(Self {
            table,
            auth_route: config.auth_route,
            home_route: config.home_route,
        })
    }

    /// The pure policy table.
    pub fn decide(&self, state: &SessionState, class: RouteClass) -> GuardDecision {
        match (state, class) {
            (_, RouteClass::Public) => GuardDecision::Allow,
            (SessionState::Unknown, RouteClass::AuthOnly) => GuardDecision::Allow,
            (SessionState::Unknown, RouteClass::Protected) => GuardDecision::Defer,
            (SessionState::Anonymous, RouteClass::AuthOnly) => GuardDecision::Allow,
            (SessionState::Anonymous, RouteClass::Protected) => {
                GuardDecision::Redirect(Destination::Route(self.auth_route.clone()))
            }
            (SessionState::Authenticated(_), RouteClass::AuthOnly) => {
                GuardDecision::Redirect(Destination::AuthenticatedHome)
            }
            (SessionState::Authenticated(_), RouteClass::Protected) => GuardDecision::Allow,
        }
    }

    /// Classifies `path` using the route table.
    pub fn classify(&self, path: &str) -> RouteClass {
        self.table.classify(path)
    }

    /// Decides whether `state` may visit `path`. No side effects.
    pub fn check(&self, state: &SessionState, path: &str) -> GuardDecision {
        let class = self.classify(path);
        let decision = self.decide(state, class);
        tracing::debug!(
            path = normalize(path),
            %class,
            %state,
            ?decision,
            "guard decision"
        );
        decision
    }

    /// Like [`check`](Self::check), and on a redirect asks `navigator` to
    /// go there, exactly once. `Allow` and `Defer` emit nothing.
    pub fn enforce<N>(&self, state: &SessionState, path: &str, navigator: &N) -> GuardDecision
    where
        N: Navigator + ?Sized,
    {
        let decision = self.check(state, path);
        if let GuardDecision::Redirect(destination) = &decision {
            tracing::info!(
                from = normalize(path),
                to = self.resolve(destination),
                "redirecting"
            );
            navigator.navigate(destination);
        }
        decision
    }

    /// The concrete route a destination stands for.
    pub fn resolve<'a>(&'a self, destination: &'a Destination) -> &'a str {
        match destination {
            Destination::Route(route) => route,
            Destination::AuthenticatedHome => &self.home_route,
        }
    }

    pub fn auth_route(&self) -> &str {
        &self.auth_route
    }

    pub fn home_route(&self) -> &str {
        &self.home_route
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}
