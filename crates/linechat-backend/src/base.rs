//! The `MessagingBackend` trait — the abstract interface every messaging
//! transport must implement.
//!
//! The client core consumes this contract only; the protocol behind it
//! (login handshake, wire format, delivery) lives entirely in the
//! implementing crate. `memory::MemoryBackend` is the reference
//! implementation used for development and tests.

use async_trait::async_trait;
use tokio::sync::mpsc;

use linechat_core::types::{Credentials, SessionToken};

use crate::events::Event;

/// Profile fields for a user, as reported by the backend.
///
/// All fields are optional; the bulk fetch merges whatever is present.
#[derive(Clone, Debug, Default)]
pub struct ProfileRecord {
    /// Display name.
    pub name: Option<String>,
    /// Canonical profile URL.
    pub profile_url: Option<String>,
    /// Avatar URL.
    pub photo_url: Option<String>,
}

/// One entry of the backend's friend/contact list.
#[derive(Clone, Debug)]
pub struct ContactRecord {
    /// Opaque user identifier.
    pub id: String,
    /// Primary display name. May be absent.
    pub name: Option<String>,
    /// Alternate full name, used when `name` is absent.
    pub full_name: Option<String>,
}

/// One entry of the backend's thread list.
#[derive(Clone, Debug)]
pub struct ThreadRecord {
    /// Opaque thread identifier.
    pub id: String,
    /// Thread display name. May be absent for unnamed threads.
    pub name: Option<String>,
}

/// Every messaging transport implements this trait.
///
/// The client holds an `Arc<dyn MessagingBackend>` and drives login, the
/// bulk fetch, on-demand lookups, sends, and the event stream through it.
/// All fallible operations report failures once; the core performs no
/// retries.
#[async_trait]
pub trait MessagingBackend: Send + Sync {
    /// Authenticate with the platform. Called exactly once, before any
    /// other operation.
    async fn login(&self, credentials: &Credentials) -> anyhow::Result<()>;

    /// The identifier of the authenticated user.
    async fn current_identity(&self) -> anyhow::Result<String>;

    /// Profile fields for a user id.
    async fn profile(&self, user_id: &str) -> anyhow::Result<ProfileRecord>;

    /// The full friend/contact list.
    async fn contacts(&self) -> anyhow::Result<Vec<ContactRecord>>;

    /// A page of the thread list.
    async fn threads(&self, offset: usize, limit: usize) -> anyhow::Result<Vec<ThreadRecord>>;

    /// A single thread by id.
    async fn thread(&self, thread_id: &str) -> anyhow::Result<ThreadRecord>;

    /// Send a text message to a thread.
    async fn send_message(&self, thread_id: &str, text: &str) -> anyhow::Result<()>;

    /// Begin delivering inbound events. The receiver yields events until
    /// the process ends; the stream is never closed by the backend on a
    /// per-event failure.
    async fn listen(&self) -> anyhow::Result<mpsc::Receiver<Event>>;

    /// Export the opaque session token for persistence and reuse on the
    /// next run.
    fn export_session_token(&self) -> anyhow::Result<SessionToken>;
}
