//! Unified error type for the Custodian facade.

use custodian_guard::GuardError;
use custodian_session::SessionError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// Apps using the `custodian` facade deal with this one type; the `?`
/// operator converts layer errors through the `#[from]` impls. Store
/// and decode failures arrive wrapped in [`SessionError`] or
/// [`ConfigError`].
#[derive(Debug, thiserror::Error)]
pub enum CustodianError {
    /// A session transition failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The route layout is unusable.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// The configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
