use std::sync::{Arc, Mutex};

use custodian::prelude::*;
use custodian_token::mint_unsigned;
use serde_json::json;
use tracing_subscriber::{EnvFilter, fmt};

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Stands in for the browser router: prints where it was sent and keeps
/// a log of it.
#[derive(Default)]
struct ConsoleNavigator {
    history: Mutex<Vec<String>>,
}

impl ConsoleNavigator {
    fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, destination: &Destination) {
        println!("  -> redirect to {destination}");
        if let Ok(mut history) = self.history.lock() {
            history.push(destination.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

/// What the backend would hand back after a successful signup.
fn issue_token(email: &str, now: u64) -> String {
    mint_unsigned(&json!({
        "sub": email,
        "name": "Demo User",
        "email": email,
        "scopes": ["ROLE_USER"],
        "iat": now,
        "exp": now + 3600,
    }))
}

/// Reload on the dashboard, get bounced, sign up, land on the dashboard,
/// sign out. Returns the page the user ends on.
async fn walkthrough<S, D>(
    app: &Custodian<S, D>,
    navigator: Arc<ConsoleNavigator>,
    token: &str,
) -> Result<Option<String>, CustodianError>
where
    S: TokenStore,
    D: TokenDecoder,
{
    let (watcher, _subscription) = app.watch_routes(navigator);
    let mut changes = app.auth().watch();

    println!("open /dashboard before the session is known");
    let decision = watcher.visit("/dashboard");
    println!("  guard: {decision:?}");

    let state = app.init().await?;
    println!("bootstrapped: {state}");
    changes.mark_unchanged();

    println!("open /signup");
    watcher.visit("/signup");

    let claims = app.login(token).await?;
    println!(
        "signed in as {} (roles: {})",
        claims.display_name(),
        claims.roles().join(", ")
    );
    if changes.has_changed().unwrap_or(false) {
        println!("  watch feed now reads: {}", *changes.borrow_and_update());
    }

    println!("sign out");
    app.logout().await?;
    println!("session: {}", app.current());

    Ok(watcher.current_page())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = CustodianConfig::default();
    config.storage.dir = std::env::temp_dir().join("custodian-demo");
    tracing::info!(dir = %config.storage.dir.display(), "using token directory");

    let app = CustodianBuilder::new().config(config).build()?;
    let navigator = Arc::new(ConsoleNavigator::default());
    let token = issue_token("demo@example.com", SystemClock.now());

    let page = walkthrough(&app, Arc::clone(&navigator), &token).await?;

    println!("ended on {}", page.as_deref().unwrap_or("?"));
    println!("redirects: {}", navigator.history().join(", "));
    Ok(())
}
