//! Session management for the web UI
//!
//! Each browser session owns one bounded spark history. The `SessionStore`
//! trait keeps the HTTP layer independent of where those histories live.

pub mod adapters;
pub mod store;

pub use adapters::InMemorySessionStore;
pub use store::{Session, SessionStore, SessionStoreError, SessionStoreRef};
