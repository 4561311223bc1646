//! # Custodian
//!
//! Client-side authentication session core for the Custodian web app.
//!
//! Custodian holds the signed-in identity, derives it from a persisted
//! credential token, decides whether a page may be shown, and keeps every
//! interested consumer in step when the identity changes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use custodian::prelude::*;
//!
//! # async fn run() -> Result<(), CustodianError> {
//! let app = CustodianBuilder::new().build()?;
//! app.init().await?;
//!
//! // After the backend accepted the user's credentials:
//! // app.login(&token_from_backend).await?;
//! # Ok(())
//! # }
//! ```

mod app;
mod config;
mod error;

pub use app::{Custodian, CustodianBuilder};
pub use config::{ConfigError, CustodianConfig, StorageConfig};
pub use error::CustodianError;

/// Everything an app usually needs, in one import.
pub mod prelude {
    pub use crate::{ConfigError, Custodian, CustodianBuilder, CustodianConfig, CustodianError};
    pub use custodian_guard::{
        Destination, GuardConfig, GuardDecision, NavigationGuard, Navigator, RouteClass,
        RouteRule, RouteWatcher,
    };
    pub use custodian_session::{AuthContext, SessionError, SessionState, Subscription};
    pub use custodian_store::{FileTokenStore, MemoryTokenStore, StorageKey, StoreError, TokenStore};
    pub use custodian_token::{
        Clock, DecodeFailure, IdentityClaims, JwtDecoder, SubjectId, SystemClock, TokenDecoder,
    };
}
