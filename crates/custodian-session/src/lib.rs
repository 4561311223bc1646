//! Session management for Custodian.
//!
//! This crate owns the answer to "who is signed in right now?":
//!
//! 1. **State**: [`SessionState`]: `Unknown`, `Anonymous`, or
//!    `Authenticated` with decoded claims
//! 2. **Ownership**: [`AuthContext`]: the only writer of that state,
//!    driving bootstrap, login, logout and revalidation
//! 3. **Propagation**: [`Subscription`] callbacks and a `watch` feed
//!    that keep every consumer in step
//!
//! # How it fits in the stack
//!
//! ```text
//! Navigation Guard (above)  ← reads the state to allow/redirect/defer
//!     ↕
//! Session Layer (this crate)  ← owns and broadcasts the state
//!     ↕
//! Token Store + Token Decoder (below)  ← persisted string, parsed claims
//! ```

mod context;
mod error;
mod state;
mod subscription;

pub use context::AuthContext;
pub use error::SessionError;
pub use state::SessionState;
pub use subscription::Subscription;
