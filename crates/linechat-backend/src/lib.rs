//! Linechat backend — the contract between the client core and a messaging
//! transport, plus the I/O wrappers around it.
//!
//! This crate contains:
//! - **base**: the `MessagingBackend` trait and its wire-facing records
//! - **events**: the closed set of inbound real-time events
//! - **credentials**: credential acquisition (saved token → file → prompt)
//! - **token_store**: opaque session-token persistence
//! - **memory**: a deterministic in-memory backend for development and tests

pub mod base;
pub mod credentials;
pub mod events;
pub mod memory;
pub mod token_store;

pub use base::{ContactRecord, MessagingBackend, ProfileRecord, ThreadRecord};
pub use credentials::CredentialSource;
pub use events::{Event, EventKind};
pub use memory::MemoryBackend;
pub use token_store::SessionTokenStore;
