//! The auth context: sole owner of the session state.
//!
//! Everything that changes who is signed in goes through here:
//! - Bootstrapping the session from the persisted token
//! - Signing in with a freshly exchanged token
//! - Signing out
//! - Re-deriving the session when the stored token may have gone stale
//!
//! # Ordering
//!
//! Transitions are serialized by an async mutex. Tokio's mutex is fair
//! (FIFO), so a `login` issued while another transition is still doing
//! store I/O waits for it to finish completely, including the state write
//! and every subscriber callback, before it starts. Subscribers are
//! called synchronously, in registration order, before the transition
//! returns to its caller.

use std::sync::Arc;

use custodian_store::TokenStore;
use custodian_token::{IdentityClaims, JwtDecoder, TokenDecoder};
use tokio::sync::{Mutex, watch};

use crate::subscription::{self, SharedSubscribers};
use crate::{SessionError, SessionState, Subscription};

/// Bookkeeping guarded by the transition lock.
#[derive(Debug, Default)]
struct Lifecycle {
    /// Set once the session has been resolved by bootstrap, login,
    /// logout or revalidation. Bootstrap only runs while this is unset.
    resolved: bool,
}

/// Holds the current [`SessionState`] and broadcasts every change.
///
/// Construct one at application start, wrap it in an `Arc` if several
/// components need it, and call [`init`](Self::init) once. Until `init`
/// completes, [`current`](Self::current) returns
/// [`SessionState::Unknown`].
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ [Unknown] ──init()──→ [Anonymous | Authenticated]
///                                      │            ↑
///                                      └─login()────┘
///                                      ↑            │
///                                      └─logout()───┘
/// ```
pub struct AuthContext<S: TokenStore, D: TokenDecoder = JwtDecoder> {
    store: S,
    decoder: D,

    /// The state itself. Read through `borrow()`, fed to async
    /// consumers through `subscribe()`.
    state: watch::Sender<SessionState>,

    subscribers: SharedSubscribers,

    transitions: Mutex<Lifecycle>,
}

impl<S: TokenStore> AuthContext<S> {
    /// Creates a context that decodes JWTs against the wall clock.
    pub fn with_store(store: S) -> Self {
        Self::new(store, JwtDecoder::new())
    }
}

impl<S: TokenStore, D: TokenDecoder> AuthContext<S, D> {
    /// Creates a context in the `Unknown` state. No I/O happens here.
    pub fn new(store: S, decoder: D) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            store,
            decoder,
            state,
            subscribers: Arc::default(),
            transitions: Mutex::new(Lifecycle::default()),
        }
    }

    // =====================================================================
    // Reads
    // =====================================================================

    /// Returns the current session state.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Registers `callback` to run after every change of session state.
    ///
    /// The callback is not invoked with the current value; read
    /// [`current`](Self::current) for that.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        subscription::register(&self.subscribers, Arc::new(callback))
    }

    /// Returns a receiver that always holds the latest state.
    ///
    /// Unlike callbacks, a slow receiver may skip intermediate states and
    /// only observe the most recent one.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        subscription::lock(&self.subscribers).len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    // =====================================================================
    // Transitions
    // =====================================================================

    /// Bootstraps the session from the persisted token.
    ///
    /// Only the first call (or a call before any login/logout) touches
    /// the store; later calls return the current state unchanged.
    ///
    /// # Errors
    /// [`SessionError::Storage`] if the store cannot be read. The state
    /// then stays `Unknown`.
    pub async fn init(&self) -> Result<SessionState, SessionError> {
        let mut lifecycle = self.transitions.lock().await;
        if lifecycle.resolved {
            tracing::debug!("session already resolved, skipping bootstrap");
            return Ok(self.current());
        }

        let next = self.reload().await?;
        lifecycle.resolved = true;
        tracing::info!(state = %next, "session bootstrapped");
        Ok(next)
    }

    /// Signs in with a token obtained from a successful credential
    /// exchange.
    ///
    /// The token is persisted before it is decoded, so a reload in the
    /// middle of sign-in picks it up.
    ///
    /// # Errors
    /// - [`SessionError::Storage`]: the store failed
    /// - [`SessionError::PostLoginConsistency`]: the token did not
    ///   decode. The session state is untouched and the store is put
    ///   back to the token it held before.
    pub async fn login(&self, token: &str) -> Result<IdentityClaims, SessionError> {
        let mut lifecycle = self.transitions.lock().await;

        let previous = self.store.load().await?;
        self.store.save(token).await?;

        let claims = match self.decoder.decode(token) {
            Ok(claims) => claims,
            Err(failure) => {
                tracing::error!(
                    error = %failure,
                    "token from a successful sign-in failed to decode"
                );
                self.restore(previous.as_deref()).await?;
                return Err(SessionError::PostLoginConsistency(failure));
            }
        };

        if self.publish(SessionState::Authenticated(claims.clone())) {
            tracing::info!(subject = %claims.subject(), "signed in");
        } else {
            tracing::debug!(subject = %claims.subject(), "signed in again with identical claims");
        }
        lifecycle.resolved = true;
        Ok(claims)
    }

    /// Signs out: clears the store, then becomes `Anonymous`.
    ///
    /// Safe to call any number of times.
    ///
    /// # Errors
    /// [`SessionError::Storage`] if the store cannot be cleared. The
    /// state is left as it was.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let mut lifecycle = self.transitions.lock().await;

        self.store.clear().await?;
        if self.publish(SessionState::Anonymous) {
            tracing::info!("signed out");
        } else {
            tracing::debug!("sign-out while already anonymous");
        }
        lifecycle.resolved = true;
        Ok(())
    }

    /// Re-derives the session from whatever token is stored right now.
    ///
    /// Call this when the stored token may have stopped being valid, for
    /// example after its expiry passed while the app stayed open. An
    /// unusable token makes the session `Anonymous` but stays in the
    /// store; only [`logout`](Self::logout) removes it.
    ///
    /// # Errors
    /// [`SessionError::Storage`] if the store cannot be read.
    pub async fn revalidate(&self) -> Result<SessionState, SessionError> {
        let mut lifecycle = self.transitions.lock().await;
        let next = self.reload().await?;
        lifecycle.resolved = true;
        Ok(next)
    }

    // =====================================================================
    // Internals (call with the transition lock held)
    // =====================================================================

    async fn reload(&self) -> Result<SessionState, SessionError> {
        let token = self.store.load().await?;
        let next = SessionState::resolve(token.as_deref(), &self.decoder);
        self.publish(next.clone());
        Ok(next)
    }

    /// Puts the store back the way it was before a failed sign-in.
    async fn restore(&self, previous: Option<&str>) -> Result<(), SessionError> {
        match previous {
            Some(token) => self.store.save(token).await?,
            None => self.store.clear().await?,
        }
        Ok(())
    }

    /// Replaces the state and notifies subscribers if it changed.
    /// Returns whether it changed.
    fn publish(&self, next: SessionState) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if !changed {
            return false;
        }

        // Snapshot the value and the callbacks first so no lock or
        // borrow is held while user code runs.
        let snapshot = self.current();
        let callbacks = subscription::lock(&self.subscribers).snapshot();
        for callback in callbacks {
            callback(&snapshot);
        }
        true
    }
}
