//! The `Custodian` app object and its builder.
//!
//! This ties the layers together (store → decoder → session → guard)
//! as one explicitly constructed value. Build it at application start,
//! call [`Custodian::init`] once, and pass it (or the `Arc`s it hands
//! out) to whatever needs the session.

use std::sync::Arc;

use custodian_guard::{NavigationGuard, Navigator, RouteWatcher};
use custodian_session::{AuthContext, SessionState, Subscription};
use custodian_store::{FileTokenStore, TokenStore};
use custodian_token::{IdentityClaims, JwtDecoder, TokenDecoder};

use crate::{CustodianConfig, CustodianError};

/// Builder for configuring a [`Custodian`].
///
/// # Example
///
/// ```rust,no_run
/// use custodian::prelude::*;
///
/// # async fn run() -> Result<(), CustodianError> {
/// let app = CustodianBuilder::new()
///     .config(CustodianConfig::load("custodian.json")?)
///     .build()?;
/// let state = app.init().await?;
/// println!("session: {state}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CustodianBuilder {
    config: CustodianConfig,
}

impl CustodianBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn config(mut self, config: CustodianConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds an app that keeps its token in a file, as configured, and
    /// decodes JWTs against the wall clock.
    pub fn build(self) -> Result<Custodian, CustodianError> {
        let key = self.config.storage_key()?;
        let store = FileTokenStore::new(self.config.storage.dir.clone(), key);
        self.build_with(store, JwtDecoder::new())
    }

    /// Builds an app around the given store and decoder.
    pub fn build_with<S, D>(self, store: S, decoder: D) -> Result<Custodian<S, D>, CustodianError>
    where
        S: TokenStore,
        D: TokenDecoder,
    {
        let config = self.config.validated()?;
        let guard = NavigationGuard::new(config.routes.clone())?;
        Ok(Custodian {
            auth: Arc::new(AuthContext::new(store, decoder)),
            guard: Arc::new(guard),
            config,
        })
    }
}

/// The session core of one running app.
pub struct Custodian<S: TokenStore = FileTokenStore, D: TokenDecoder = JwtDecoder> {
    auth: Arc<AuthContext<S, D>>,
    guard: Arc<NavigationGuard>,
    config: CustodianConfig,
}

impl<S: TokenStore, D: TokenDecoder> Custodian<S, D> {
    /// Bootstraps the session from the persisted token.
    pub async fn init(&self) -> Result<SessionState, CustodianError> {
        Ok(self.auth.init().await?)
    }

    /// Signs in with a token from a successful credential exchange.
    pub async fn login(&self, token: &str) -> Result<IdentityClaims, CustodianError> {
        Ok(self.auth.login(token).await?)
    }

    /// Signs out.
    pub async fn logout(&self) -> Result<(), CustodianError> {
        Ok(self.auth.logout().await?)
    }

    /// Re-derives the session from the stored token.
    pub async fn revalidate(&self) -> Result<SessionState, CustodianError> {
        Ok(self.auth.revalidate().await?)
    }

    /// The current session state.
    pub fn current(&self) -> SessionState {
        self.auth.current()
    }

    /// Creates a [`RouteWatcher`] for `navigator` and attaches it to the
    /// session.
    ///
    /// Keep the returned `Subscription` to detach the watcher later.
    pub fn watch_routes<N>(&self, navigator: N) -> (Arc<RouteWatcher<N>>, Subscription)
    where
        N: Navigator + 'static,
    {
        let watcher = Arc::new(RouteWatcher::new(Arc::clone(&self.guard), navigator));
        let subscription = watcher.attach(&*self.auth);
        (watcher, subscription)
    }

    /// The auth context, for subscribing or sharing with other components.
    pub fn auth(&self) -> &Arc<AuthContext<S, D>> {
        &self.auth
    }

    pub fn guard(&self) -> &Arc<NavigationGuard> {
        &self.guard
    }

    pub fn config(&self) -> &CustodianConfig {
        &self.config
    }
}
