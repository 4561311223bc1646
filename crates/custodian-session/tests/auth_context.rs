//! Integration tests for `AuthContext`: ordering, serialization and
//! storage failures, driven through the public API only.

use std::io;
use std::sync::{Arc, Mutex};

use custodian_session::{AuthContext, SessionError, SessionState};
use custodian_store::{MemoryTokenStore, StoreError, TokenStore};
use custodian_token::{FixedClock, JwtDecoder, TokenDecoder, mint_unsigned};
use serde_json::json;

const NOW: u64 = 1_700_000_000;

// =========================================================================
// Helpers
// =========================================================================

fn decoder() -> JwtDecoder<FixedClock> {
    JwtDecoder::with_clock(FixedClock(NOW))
}

fn token(sub: &str) -> String {
    mint_unsigned(&json!({"sub": sub, "exp": NOW + 600}))
}

type Journal = Arc<Mutex<Vec<String>>>;

/// A store that yields to the scheduler inside every operation and
/// writes what it did to a shared journal. Yielding gives a concurrent
/// transition every chance to interleave if the context let it.
struct JournalingStore {
    inner: MemoryTokenStore,
    journal: Journal,
}

impl TokenStore for JournalingStore {
    async fn save(&self, token: &str) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.journal.lock().unwrap().push(format!("save {}", subject_of(token)));
        self.inner.save(token).await
    }

    async fn load(&self) -> Result<Option<String>, StoreError> {
        tokio::task::yield_now().await;
        self.inner.load().await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.journal.lock().unwrap().push("clear".into());
        self.inner.clear().await
    }
}

fn subject_of(token: &str) -> String {
    decoder()
        .decode(token)
        .map(|claims| claims.subject().to_string())
        .unwrap_or_else(|_| "?".into())
}

/// A store whose backend is gone.
struct BrokenStore;

impl TokenStore for BrokenStore {
    async fn save(&self, _token: &str) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn load(&self) -> Result<Option<String>, StoreError> {
        Err(unavailable())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable(io::Error::new(io::ErrorKind::PermissionDenied, "quota"))
}

// =========================================================================
// Notification completeness
// =========================================================================

#[tokio::test]
async fn test_every_subscriber_sees_every_transition_in_same_order() {
    let ctx = AuthContext::new(MemoryTokenStore::new(), decoder());
    let logs: Vec<Arc<Mutex<Vec<SessionState>>>> =
        (0..4).map(|_| Arc::default()).collect();
    for log in &logs {
        let sink = Arc::clone(log);
        ctx.subscribe(move |s| sink.lock().unwrap().push(s.clone()));
    }

    ctx.init().await.unwrap();
    ctx.login(&token("a")).await.unwrap();
    ctx.login(&token("b")).await.unwrap();
    ctx.logout().await.unwrap();
    ctx.logout().await.unwrap();

    let first = logs[0].lock().unwrap().clone();
    assert_eq!(first.len(), 4, "init, login a, login b, logout");
    for log in &logs[1..] {
        assert_eq!(*log.lock().unwrap(), first);
    }
}

#[tokio::test]
async fn test_subscribers_are_called_in_registration_order() {
    let ctx = AuthContext::new(MemoryTokenStore::new(), decoder());
    let order: Arc<Mutex<Vec<usize>>> = Arc::default();
    for i in 0..3 {
        let sink = Arc::clone(&order);
        ctx.subscribe(move |_| sink.lock().unwrap().push(i));
    }

    ctx.init().await.unwrap();
    ctx.login(&token("a")).await.unwrap();

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 0, 1, 2]);
}

#[tokio::test]
async fn test_subscriber_added_later_only_sees_later_transitions() {
    let ctx = AuthContext::new(MemoryTokenStore::new(), decoder());
    ctx.init().await.unwrap();
    let late: Arc<Mutex<Vec<SessionState>>> = Arc::default();
    let sink = Arc::clone(&late);
    let sub = ctx.subscribe(move |s| sink.lock().unwrap().push(s.clone()));

    ctx.login(&token("a")).await.unwrap();
    sub.unsubscribe();
    ctx.logout().await.unwrap();

    let late = late.lock().unwrap();
    assert_eq!(late.len(), 1);
    assert!(late[0].is_authenticated());
}

#[tokio::test]
async fn test_subscriber_unsubscribing_itself_during_callback() {
    let ctx = AuthContext::new(MemoryTokenStore::new(), decoder());
    let calls: Arc<Mutex<usize>> = Arc::default();
    let slot: Arc<Mutex<Option<custodian_session::Subscription>>> = Arc::default();

    let (sink, own) = (Arc::clone(&calls), Arc::clone(&slot));
    let sub = ctx.subscribe(move |_| {
        *sink.lock().unwrap() += 1;
        if let Some(sub) = own.lock().unwrap().as_ref() {
            sub.unsubscribe();
        }
    });
    *slot.lock().unwrap() = Some(sub);

    ctx.init().await.unwrap();
    ctx.login(&token("a")).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), 1);
}

// =========================================================================
// Serialization
// =========================================================================

#[tokio::test]
async fn test_concurrent_transitions_never_interleave() {
    let journal: Journal = Arc::default();
    let ctx = Arc::new(AuthContext::new(
        JournalingStore {
            inner: MemoryTokenStore::new(),
            journal: Arc::clone(&journal),
        },
        decoder(),
    ));
    let sink = Arc::clone(&journal);
    ctx.subscribe(move |s| sink.lock().unwrap().push(format!("notify {s}")));

    let (token_a, token_b) = (token("a"), token("b"));
    let (a, b, c) = tokio::join!(
        ctx.login(&token_a),
        ctx.login(&token_b),
        ctx.logout()
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    // Each transition's store write is immediately followed by its own
    // notification, in call order.
    assert_eq!(
        *journal.lock().unwrap(),
        vec![
            "save a",
            "notify authenticated(a)",
            "save b",
            "notify authenticated(b)",
            "clear",
            "notify anonymous",
        ]
    );
    assert_eq!(ctx.current(), SessionState::Anonymous);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_spawned_login_completes_on_multi_thread_runtime() {
    let ctx = Arc::new(AuthContext::new(MemoryTokenStore::new(), decoder()));
    ctx.init().await.unwrap();

    let task = {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move { ctx.login(&token("spawned")).await })
    };
    let claims = task.await.expect("task should not panic").unwrap();

    assert_eq!(ctx.current(), SessionState::Authenticated(claims));
}

// =========================================================================
// Storage failures
// =========================================================================

#[tokio::test]
async fn test_init_storage_unavailable_is_surfaced_and_stays_unknown() {
    let ctx = AuthContext::new(BrokenStore, decoder());

    let result = ctx.init().await;

    assert!(matches!(
        result,
        Err(SessionError::Storage(StoreError::Unavailable(_)))
    ));
    assert_eq!(ctx.current(), SessionState::Unknown);
}

#[tokio::test]
async fn test_login_storage_unavailable_leaves_state_unchanged() {
    let ctx = AuthContext::new(BrokenStore, decoder());

    assert!(matches!(
        ctx.login(&token("a")).await,
        Err(SessionError::Storage(_))
    ));
    assert!(matches!(ctx.logout().await, Err(SessionError::Storage(_))));
    assert_eq!(ctx.current(), SessionState::Unknown);
}

// =========================================================================
// Bootstrap idempotence
// =========================================================================

#[tokio::test]
async fn test_bootstrap_twice_over_same_store_gives_same_state() {
    let expired = mint_unsigned(&json!({"sub": "old", "exp": NOW - 1}));
    for stored in [None, Some("not-a-token".to_string()), Some(expired), Some(token("z"))] {
        let store = match &stored {
            Some(t) => MemoryTokenStore::with_token(t.clone()),
            None => MemoryTokenStore::new(),
        };
        let first = AuthContext::new(store, decoder()).init().await.unwrap();

        let store = match &stored {
            Some(t) => MemoryTokenStore::with_token(t.clone()),
            None => MemoryTokenStore::new(),
        };
        let second = AuthContext::new(store, decoder()).init().await.unwrap();

        assert_eq!(first, second, "stored token {stored:?}");
    }
}
