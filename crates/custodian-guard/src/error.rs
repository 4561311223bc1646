//! Error types for the guard layer.

/// Problems with a route configuration, caught when the guard is built.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// A configured route is not an absolute path.
    #[error("route {0:?} must start with '/'")]
    InvalidRoute(String),

    /// A redirect target would itself trigger a redirect for the same
    /// session state, sending the user around in circles.
    #[error("redirect loop: {0}")]
    RedirectLoop(String),
}
