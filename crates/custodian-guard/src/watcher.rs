//! Keeps the visible page consistent with the session as it changes.
//!
//! A guard decision is only as good as the session state it was made
//! with. When the user is on `/dashboard` during bootstrap the guard
//! defers; when bootstrap lands on `Anonymous` someone has to ask again.
//! Likewise a user who just signed up on `/signup` should end up on the
//! dashboard without the signup page having to know about it.
//!
//! [`RouteWatcher`] is that "someone": it remembers the current page and
//! the latest session state, and re-runs the guard whenever either one
//! changes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use custodian_session::{AuthContext, SessionState, Subscription};
use custodian_store::TokenStore;
use custodian_token::TokenDecoder;

use crate::{GuardDecision, NavigationGuard, Navigator};

#[derive(Debug, Default)]
struct Position {
    page: Option<String>,
    session: SessionState,
}

/// Re-enforces the [`NavigationGuard`] on every page visit and every
/// session change.
pub struct RouteWatcher<N: Navigator> {
    guard: Arc<NavigationGuard>,
    navigator: N,
    position: Mutex<Position>,
}

impl<N: Navigator> RouteWatcher<N> {
    /// Creates a watcher that starts on no page with an `Unknown`
    /// session.
    pub fn new(guard: Arc<NavigationGuard>, navigator: N) -> Self {
        Self {
            guard,
            navigator,
            position: Mutex::new(Position::default()),
        }
    }

    /// Starts following `context`.
    ///
    /// The watcher picks up the context's current state right away and
    /// then reacts to every change. It holds only a weak reference to
    /// itself inside the callback, so dropping the last `Arc` of the
    /// watcher silently ends the feed.
    pub fn attach<S, D>(self: &Arc<Self>, context: &AuthContext<S, D>) -> Subscription
    where
        S: TokenStore,
        D: TokenDecoder,
        N: 'static,
    {
        let weak = Arc::downgrade(self);
        let subscription = context.subscribe(move |state| {
            if let Some(watcher) = weak.upgrade() {
                watcher.session_changed(state);
            }
        });

        // Read after subscribing, under the position lock: a notification
        // racing with us either lands before (and we read the same or a
        // newer value) or waits for the lock and overwrites us.
        let decision = {
            let mut position = self.lock();
            position.session = context.current();
            self.pending(&position)
        };
        if let Some((page, decision)) = decision {
            self.apply(&page, decision);
        }
        subscription
    }

    /// Records that the user is now on `path` and enforces the guard.
    pub fn visit(&self, path: &str) -> GuardDecision {
        let (page, decision) = {
            let mut position = self.lock();
            position.page = Some(path.to_string());
            let decision = self.guard.check(&position.session, path);
            (path.to_string(), decision)
        };
        self.apply(&page, decision.clone());
        decision
    }

    /// Feeds a new session state in and re-enforces the guard on the
    /// current page. Returns `None` when no page has been visited yet.
    pub fn session_changed(&self, state: &SessionState) -> Option<GuardDecision> {
        let pending = {
            let mut position = self.lock();
            position.session = state.clone();
            self.pending(&position)
        };
        let (page, decision) = pending?;
        self.apply(&page, decision.clone());
        Some(decision)
    }

    /// The page the watcher believes is showing.
    pub fn current_page(&self) -> Option<String> {
        self.lock().page.clone()
    }

    /// The latest session state the watcher has seen.
    pub fn session(&self) -> SessionState {
        self.lock().session.clone()
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    fn pending(&self, position: &Position) -> Option<(String, GuardDecision)> {
        let page = position.page.clone()?;
        let decision = self.guard.check(&position.session, &page);
        Some((page, decision))
    }

    /// Acts on a decision. Called without the lock so the navigator may
    /// call back into [`visit`](Self::visit).
    fn apply(&self, page: &str, decision: GuardDecision) {
        let GuardDecision::Redirect(destination) = decision else {
            return;
        };
        let target = self.guard.resolve(&destination).to_string();
        tracing::info!(from = page, to = %target, "redirecting");
        // Assume the navigator honours the request; a later visit()
        // corrects this if it does not.
        self.lock().page = Some(target);
        self.navigator.navigate(&destination);
    }

    // Position is two plain fields; a panic elsewhere cannot leave it
    // half-updated.
    fn lock(&self) -> MutexGuard<'_, Position> {
        self.position.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
