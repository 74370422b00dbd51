//! In-memory backend — deterministic `MessagingBackend` implementation.
//!
//! Used two ways: as the development transport for running the client
//! without a network, and as the test double across the workspace. Failure
//! injection and call counters exist for the latter.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use linechat_core::types::{Credentials, SessionToken};

use crate::base::{ContactRecord, MessagingBackend, ProfileRecord, ThreadRecord};
use crate::events::Event;

/// Buffer size for the event channel handed to the listener.
const EVENT_BUFFER: usize = 64;

/// A deterministic in-memory messaging backend.
///
/// Contacts and threads are fixed at construction. Events are injected via
/// [`MemoryBackend::push_event`] once a listener is attached.
pub struct MemoryBackend {
    identity: String,
    profile: ProfileRecord,
    contacts: Vec<ContactRecord>,
    threads: Vec<ThreadRecord>,
    latency: Option<Duration>,

    fail_login: Option<String>,
    fail_contacts: bool,
    fail_threads: bool,

    logged_in: AtomicBool,
    thread_fetches: AtomicUsize,
    total_calls: AtomicUsize,

    sent: Mutex<Vec<(String, String)>>,
    event_tx: Mutex<Option<mpsc::Sender<Event>>>,
}

impl MemoryBackend {
    /// Create a backend whose authenticated identity is `identity`.
    pub fn new(identity: impl Into<String>) -> Self {
        MemoryBackend {
            identity: identity.into(),
            profile: ProfileRecord::default(),
            contacts: Vec::new(),
            threads: Vec::new(),
            latency: None,
            fail_login: None,
            fail_contacts: false,
            fail_threads: false,
            logged_in: AtomicBool::new(false),
            thread_fetches: AtomicUsize::new(0),
            total_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            event_tx: Mutex::new(None),
        }
    }

    /// Set the authenticated user's profile fields.
    pub fn with_profile(mut self, name: &str) -> Self {
        self.profile.name = Some(name.to_string());
        self
    }

    /// Add a contact. Insertion order is the order the backend reports.
    pub fn with_contact(
        mut self,
        id: &str,
        name: Option<&str>,
        full_name: Option<&str>,
    ) -> Self {
        self.contacts.push(ContactRecord {
            id: id.to_string(),
            name: name.map(str::to_string),
            full_name: full_name.map(str::to_string),
        });
        self
    }

    /// Add a thread to the backing list. The first page serves from here;
    /// entries beyond the page are only reachable on demand.
    pub fn with_thread(mut self, id: &str, name: Option<&str>) -> Self {
        self.threads.push(ThreadRecord {
            id: id.to_string(),
            name: name.map(str::to_string),
        });
        self
    }

    /// Add artificial latency to every network-shaped call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make `login` fail with the given message.
    pub fn failing_login(mut self, message: &str) -> Self {
        self.fail_login = Some(message.to_string());
        self
    }

    /// Make `contacts` fail.
    pub fn failing_contacts(mut self) -> Self {
        self.fail_contacts = true;
        self
    }

    /// Make `threads` fail.
    pub fn failing_threads(mut self) -> Self {
        self.fail_threads = true;
        self
    }

    /// A small populated backend for offline runs of the binary.
    pub fn sample() -> Self {
        MemoryBackend::new("user-0")
            .with_profile("You")
            .with_contact("user-1", Some("Alice"), Some("Alice Liddell"))
            .with_contact("user-2", Some("alina"), None)
            .with_contact("user-3", None, Some("Bob Ross"))
            .with_thread("user-1", Some("Alice"))
            .with_thread("user-2", Some("alina"))
            .with_thread("group-1", Some("weekend plans"))
    }

    /// Inject an event into an attached listener. A no-op before `listen`
    /// is called or after the receiver is dropped.
    pub async fn push_event(&self, event: Event) {
        let tx = self.event_tx.lock().unwrap().clone();
        if let Some(tx) = tx {
            let _ = tx.send(event).await;
        }
    }

    /// Number of single-thread fetches issued so far.
    pub fn thread_fetch_count(&self) -> usize {
        self.thread_fetches.load(Ordering::SeqCst)
    }

    /// Total number of backend calls issued so far.
    pub fn call_count(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    /// Messages recorded by `send_message`, as `(thread_id, text)` pairs.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    async fn simulate_network(&self) {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl MessagingBackend for MemoryBackend {
    async fn login(&self, credentials: &Credentials) -> anyhow::Result<()> {
        self.simulate_network().await;
        if let Some(message) = &self.fail_login {
            bail!("{message}");
        }
        debug!(identifier = credentials.identifier(), "memory login");
        self.logged_in.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn current_identity(&self) -> anyhow::Result<String> {
        self.simulate_network().await;
        Ok(self.identity.clone())
    }

    async fn profile(&self, user_id: &str) -> anyhow::Result<ProfileRecord> {
        self.simulate_network().await;
        if user_id == self.identity {
            return Ok(self.profile.clone());
        }
        match self.contacts.iter().find(|c| c.id == user_id) {
            Some(contact) => Ok(ProfileRecord {
                name: contact.name.clone().or_else(|| contact.full_name.clone()),
                profile_url: None,
                photo_url: None,
            }),
            None => bail!("unknown user '{user_id}'"),
        }
    }

    async fn contacts(&self) -> anyhow::Result<Vec<ContactRecord>> {
        self.simulate_network().await;
        if self.fail_contacts {
            bail!("contact list unavailable");
        }
        Ok(self.contacts.clone())
    }

    async fn threads(&self, offset: usize, limit: usize) -> anyhow::Result<Vec<ThreadRecord>> {
        self.simulate_network().await;
        if self.fail_threads {
            bail!("thread list unavailable");
        }
        Ok(self
            .threads
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn thread(&self, thread_id: &str) -> anyhow::Result<ThreadRecord> {
        self.simulate_network().await;
        self.thread_fetches.fetch_add(1, Ordering::SeqCst);
        match self.threads.iter().find(|t| t.id == thread_id) {
            Some(record) => Ok(record.clone()),
            None => bail!("unknown thread '{thread_id}'"),
        }
    }

    async fn send_message(&self, thread_id: &str, text: &str) -> anyhow::Result<()> {
        self.simulate_network().await;
        self.sent
            .lock()
            .unwrap()
            .push((thread_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn listen(&self) -> anyhow::Result<mpsc::Receiver<Event>> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        *self.event_tx.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    fn export_session_token(&self) -> anyhow::Result<SessionToken> {
        Ok(SessionToken::new(format!("memory:{}", self.identity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use linechat_core::types::Secret;

    fn login_creds() -> Credentials {
        Credentials::Login {
            identifier: "alice".into(),
            secret: Secret::new("pw"),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let backend = MemoryBackend::new("user-0");
        backend.login(&login_creds()).await.unwrap();
        assert_eq!(backend.current_identity().await.unwrap(), "user-0");
    }

    #[tokio::test]
    async fn test_login_failure() {
        let backend = MemoryBackend::new("user-0").failing_login("bad password");
        let err = backend.login(&login_creds()).await.unwrap_err();
        assert!(err.to_string().contains("bad password"));
    }

    #[tokio::test]
    async fn test_thread_paging() {
        let backend = MemoryBackend::new("user-0")
            .with_thread("t1", Some("one"))
            .with_thread("t2", Some("two"))
            .with_thread("t3", Some("three"));

        let page = backend.threads(0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "t1");

        let rest = backend.threads(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, "t3");
    }

    #[tokio::test]
    async fn test_thread_fetch_counting() {
        let backend = MemoryBackend::new("user-0").with_thread("t1", Some("one"));
        assert_eq!(backend.thread_fetch_count(), 0);
        backend.thread("t1").await.unwrap();
        assert_eq!(backend.thread_fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_thread_errors() {
        let backend = MemoryBackend::new("user-0");
        assert!(backend.thread("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_event_injection() {
        let backend = MemoryBackend::new("user-0");
        let mut rx = backend.listen().await.unwrap();

        backend
            .push_event(Event::Message {
                thread_id: "t1".into(),
                sender_id: "u1".into(),
                sender_name: Some("Alice".into()),
                text: "hello".into(),
                timestamp: Utc::now(),
            })
            .await;

        match rx.recv().await.unwrap() {
            Event::Message { text, .. } => assert_eq!(text, "hello"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_push_event_without_listener_is_noop() {
        let backend = MemoryBackend::new("user-0");
        backend
            .push_event(Event::Presence {
                user_id: "u1".into(),
                online: true,
            })
            .await;
    }

    #[tokio::test]
    async fn test_send_message_recorded() {
        let backend = MemoryBackend::new("user-0");
        backend.send_message("t1", "hi there").await.unwrap();
        assert_eq!(
            backend.sent_messages(),
            vec![("t1".to_string(), "hi there".to_string())]
        );
    }

    #[test]
    fn test_export_token_is_deterministic() {
        let backend = MemoryBackend::new("user-0");
        let token = backend.export_session_token().unwrap();
        assert_eq!(token.as_str(), "memory:user-0");
    }
}
