//! Navigation guarding for Custodian.
//!
//! Decides whether the current session may see a page, and asks the
//! app's router to go elsewhere when it may not.
//!
//! # Key types
//!
//! - [`RouteClass`] / [`RouteTable`]: which pages are public, auth-only
//!   (login, signup) or protected (dashboard)
//! - [`NavigationGuard`]: the allow / defer / redirect policy
//! - [`Navigator`]: the trait the app implements to change pages
//! - [`RouteWatcher`]: re-runs the guard whenever the session changes

mod error;
mod guard;
mod route;
mod watcher;

pub use error::GuardError;
pub use guard::{Destination, GuardConfig, GuardDecision, NavigationGuard, Navigator};
pub use route::{RouteClass, RouteRule, RouteTable};
pub use watcher::RouteWatcher;
