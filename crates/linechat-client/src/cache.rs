//! Session-lifetime cache of threads and users, plus name resolution.
//!
//! Threads and users are never evicted. Thread inserts are first-write-wins:
//! a later insert for a known id is a no-op even when the backend reports a
//! different name. The name index is an insertion-ordered list so prefix
//! ties break by the order contacts arrived in the bulk fetch.
//!
//! Locks are short and never held across an await; the only operation that
//! spans a suspension point — the on-demand thread fetch — tracks its
//! in-flight work in an explicit pending map instead.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::OnceCell;
use tracing::debug;

use linechat_backend::base::MessagingBackend;
use linechat_core::error::{ClientError, FetchStage, Result};
use linechat_core::types::{Thread, User};

/// Outcome of a deduplicated fetch, shared by all concurrent callers.
type FetchOutcome = std::result::Result<Thread, String>;

/// Cached projections of threads and users, keyed by backend id.
pub struct ThreadCache {
    backend: Arc<dyn MessagingBackend>,
    threads: RwLock<HashMap<String, Thread>>,
    users: RwLock<HashMap<String, User>>,
    /// `(display name, thread id)` pairs in contact-list order.
    name_index: RwLock<Vec<(String, String)>>,
    /// One cell per id with an outstanding backend fetch.
    pending: Mutex<HashMap<String, Arc<OnceCell<FetchOutcome>>>>,
}

impl ThreadCache {
    /// Create an empty cache backed by the given transport.
    pub fn new(backend: Arc<dyn MessagingBackend>) -> Self {
        ThreadCache {
            backend,
            threads: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
            name_index: RwLock::new(Vec::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    // ─────────────────────────────────────────────
    // Inserts
    // ─────────────────────────────────────────────

    /// Idempotent insert. If the id is already cached the call is a no-op,
    /// deliberately keeping the first-seen name.
    pub fn cache_thread(&self, thread: Thread) {
        let mut threads = self.threads.write().unwrap();
        threads.entry(thread.id.clone()).or_insert(thread);
    }

    /// Insert a user projection. First write wins, matching thread inserts.
    pub fn cache_user(&self, user: User) {
        let mut users = self.users.write().unwrap();
        users.entry(user.id.clone()).or_insert(user);
    }

    /// Record a display-name → thread-id mapping. Position in the index is
    /// fixed by first insertion; a repeated name only updates the id.
    pub fn index_name(&self, display_name: &str, thread_id: &str) {
        let mut index = self.name_index.write().unwrap();
        match index.iter_mut().find(|(name, _)| name == display_name) {
            Some((_, id)) => *id = thread_id.to_string(),
            None => index.push((display_name.to_string(), thread_id.to_string())),
        }
    }

    // ─────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────

    /// Resolve a thread by display-name prefix, case-insensitively. Ties
    /// break by index insertion order. If the resolved thread's stored name
    /// is empty it is back-filled from the matched display name.
    ///
    /// A query with no match, or an indexed contact whose thread is not in
    /// the cache, resolves to `LookupNotFound`.
    pub fn thread_by_name(&self, query: &str) -> Result<Thread> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ClientError::LookupNotFound(query.to_string()));
        }

        let matched = {
            let index = self.name_index.read().unwrap();
            index
                .iter()
                .find(|(name, _)| name.to_lowercase().starts_with(&needle))
                .cloned()
        };
        let (display_name, thread_id) =
            matched.ok_or_else(|| ClientError::LookupNotFound(query.to_string()))?;

        let mut threads = self.threads.write().unwrap();
        match threads.get_mut(&thread_id) {
            Some(thread) => {
                if thread.name.is_empty() {
                    debug!(thread = %thread_id, name = %display_name, "back-filling thread name");
                    thread.name = display_name;
                }
                Ok(thread.clone())
            }
            None => Err(ClientError::LookupNotFound(query.to_string())),
        }
    }

    /// Resolve a thread by id. Cached entries are served without touching
    /// the backend; a miss fetches, caches, and returns. Concurrent misses
    /// for one id share a single backend request.
    pub async fn thread_by_id(&self, thread_id: &str) -> Result<Thread> {
        if let Some(thread) = self.threads.read().unwrap().get(thread_id) {
            return Ok(thread.clone());
        }

        let cell = {
            let mut pending = self.pending.lock().unwrap();
            pending
                .entry(thread_id.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let outcome = cell
            .get_or_init(|| async {
                debug!(thread = %thread_id, "fetching thread on demand");
                match self.backend.thread(thread_id).await {
                    Ok(record) => Ok(Thread::new(record.id, record.name.unwrap_or_default())),
                    Err(e) => Err(e.to_string()),
                }
            })
            .await
            .clone();

        self.pending.lock().unwrap().remove(thread_id);

        match outcome {
            Ok(thread) => {
                self.cache_thread(thread.clone());
                Ok(thread)
            }
            Err(message) => Err(ClientError::Fetch {
                stage: FetchStage::Thread,
                message,
            }),
        }
    }

    // ─────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────

    /// The cached thread for an id, if any. Never touches the backend.
    pub fn cached_thread(&self, thread_id: &str) -> Option<Thread> {
        self.threads.read().unwrap().get(thread_id).cloned()
    }

    /// The cached user for an id, if any.
    pub fn user(&self, user_id: &str) -> Option<User> {
        self.users.read().unwrap().get(user_id).cloned()
    }

    /// All cached users, sorted by display name.
    pub fn users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.read().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        users
    }

    /// All cached threads, sorted by display name.
    pub fn threads(&self) -> Vec<Thread> {
        let mut threads: Vec<Thread> = self.threads.read().unwrap().values().cloned().collect();
        threads.sort_by(|a, b| a.name.cmp(&b.name));
        threads
    }

    /// Number of cached threads.
    pub fn thread_count(&self) -> usize {
        self.threads.read().unwrap().len()
    }

    /// Number of cached users.
    pub fn user_count(&self) -> usize {
        self.users.read().unwrap().len()
    }

    /// Indexed display names, in insertion order.
    pub fn indexed_names(&self) -> Vec<String> {
        self.name_index
            .read()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linechat_backend::memory::MemoryBackend;
    use std::time::Duration;

    fn empty_cache() -> ThreadCache {
        ThreadCache::new(Arc::new(MemoryBackend::new("user-0")))
    }

    #[test]
    fn test_cache_thread_idempotent() {
        let cache = empty_cache();
        cache.cache_thread(Thread::new("t1", "first name"));
        cache.cache_thread(Thread::new("t1", "second name"));

        let thread = cache.cached_thread("t1").unwrap();
        assert_eq!(thread.name, "first name");
        assert_eq!(cache.thread_count(), 1);
    }

    #[test]
    fn test_prefix_match_case_insensitive_insertion_order() {
        let cache = empty_cache();
        cache.cache_thread(Thread::new("t-alice", "Alice"));
        cache.cache_thread(Thread::new("t-alina", "alina"));
        cache.index_name("Alice", "t-alice");
        cache.index_name("alina", "t-alina");

        let thread = cache.thread_by_name("ali").unwrap();
        assert_eq!(thread.id, "t-alice");

        // Exact-case and upper-case queries resolve the same way.
        let thread = cache.thread_by_name("ALI").unwrap();
        assert_eq!(thread.id, "t-alice");
    }

    #[test]
    fn test_no_match_is_not_found() {
        let cache = empty_cache();
        cache.index_name("Alice", "t-alice");
        cache.cache_thread(Thread::new("t-alice", "Alice"));

        match cache.thread_by_name("zeb") {
            Err(ClientError::LookupNotFound(query)) => assert_eq!(query, "zeb"),
            other => panic!("expected LookupNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_query_is_not_found() {
        let cache = empty_cache();
        assert!(matches!(
            cache.thread_by_name("   "),
            Err(ClientError::LookupNotFound(_))
        ));
    }

    #[test]
    fn test_indexed_contact_without_thread_is_an_error() {
        let cache = empty_cache();
        cache.index_name("Alice", "t-alice");
        // No thread cached for t-alice.
        assert!(matches!(
            cache.thread_by_name("alice"),
            Err(ClientError::LookupNotFound(_))
        ));
    }

    #[test]
    fn test_name_backfill_on_lookup() {
        let cache = empty_cache();
        cache.cache_thread(Thread::new("t1", ""));
        cache.index_name("Alice", "t1");

        let thread = cache.thread_by_name("ali").unwrap();
        assert_eq!(thread.name, "Alice");
        // The back-fill persisted.
        assert_eq!(cache.cached_thread("t1").unwrap().name, "Alice");
    }

    #[test]
    fn test_backfill_does_not_overwrite_existing_name() {
        let cache = empty_cache();
        cache.cache_thread(Thread::new("t1", "group chat"));
        cache.index_name("Alice", "t1");

        let thread = cache.thread_by_name("ali").unwrap();
        assert_eq!(thread.name, "group chat");
    }

    #[tokio::test]
    async fn test_thread_by_id_served_from_cache() {
        let backend = Arc::new(MemoryBackend::new("user-0").with_thread("t1", Some("one")));
        let cache = ThreadCache::new(backend.clone());
        cache.cache_thread(Thread::new("t1", "one"));

        let thread = cache.thread_by_id("t1").await.unwrap();
        assert_eq!(thread.name, "one");
        assert_eq!(backend.thread_fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_thread_by_id_fetches_on_miss() {
        let backend = Arc::new(MemoryBackend::new("user-0").with_thread("t1", Some("one")));
        let cache = ThreadCache::new(backend.clone());

        let thread = cache.thread_by_id("t1").await.unwrap();
        assert_eq!(thread.name, "one");
        assert_eq!(backend.thread_fetch_count(), 1);

        // Second call served from cache.
        cache.thread_by_id("t1").await.unwrap();
        assert_eq!(backend.thread_fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let backend = Arc::new(
            MemoryBackend::new("user-0")
                .with_thread("t1", Some("one"))
                .with_latency(Duration::from_millis(20)),
        );
        let cache = Arc::new(ThreadCache::new(backend.clone()));

        let (a, b, c) = tokio::join!(
            cache.thread_by_id("t1"),
            cache.thread_by_id("t1"),
            cache.thread_by_id("t1"),
        );
        assert_eq!(a.unwrap().name, "one");
        assert_eq!(b.unwrap().name, "one");
        assert_eq!(c.unwrap().name, "one");
        assert_eq!(backend.thread_fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_thread_by_id_unknown_is_fetch_error() {
        let backend = Arc::new(MemoryBackend::new("user-0"));
        let cache = ThreadCache::new(backend);

        match cache.thread_by_id("missing").await {
            Err(ClientError::Fetch { stage, .. }) => assert_eq!(stage, FetchStage::Thread),
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let backend = Arc::new(MemoryBackend::new("user-0"));
        let cache = ThreadCache::new(backend);

        assert!(cache.thread_by_id("missing").await.is_err());
        assert!(cache.cached_thread("missing").is_none());
        assert_eq!(cache.thread_count(), 0);
    }

    #[test]
    fn test_index_name_repeated_updates_id_keeps_position() {
        let cache = empty_cache();
        cache.index_name("Alice", "t1");
        cache.index_name("Bob", "t2");
        cache.index_name("Alice", "t3");

        assert_eq!(cache.indexed_names(), vec!["Alice", "Bob"]);
        cache.cache_thread(Thread::new("t3", "Alice"));
        assert_eq!(cache.thread_by_name("alice").unwrap().id, "t3");
    }

    #[test]
    fn test_users_sorted_by_name() {
        let cache = empty_cache();
        cache.cache_user(User::new("u2", "Bob"));
        cache.cache_user(User::new("u1", "Alice"));

        let users = cache.users();
        assert_eq!(users[0].name, "Alice");
        assert_eq!(users[1].name, "Bob");
    }
}
