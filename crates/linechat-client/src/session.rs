//! Login and the ordered post-login bulk fetch, plus the session aggregate.
//!
//! The bulk fetch is a strict pipeline: identity, then profile, then the
//! full contact list (which populates the name index), then the first page
//! of threads. Contacts must complete before thread registration runs, and
//! every step must complete before the session is considered ready. A
//! failing step aborts startup; state written by completed steps is kept.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use linechat_backend::base::MessagingBackend;
use linechat_backend::token_store::SessionTokenStore;
use linechat_core::error::{ClientError, FetchStage, Result};
use linechat_core::history::ThreadHistory;
use linechat_core::types::{Credentials, Thread, User};

use crate::cache::ThreadCache;

/// Fixed size of the initial thread page fetched at login.
pub const THREAD_PAGE_SIZE: usize = 20;

// ─────────────────────────────────────────────
// SessionManager
// ─────────────────────────────────────────────

/// Turns a credential into an authenticated session and a warm cache.
pub struct SessionManager {
    backend: Arc<dyn MessagingBackend>,
    token_store: SessionTokenStore,
}

impl SessionManager {
    /// Create a manager for the given transport and token store.
    pub fn new(backend: Arc<dyn MessagingBackend>, token_store: SessionTokenStore) -> Self {
        SessionManager {
            backend,
            token_store,
        }
    }

    /// Log in, persist the session token, and run the bulk fetch.
    ///
    /// On login failure the error carries the identifying credential field
    /// and the backend's message — never the secret. A token persistence
    /// failure is logged and tolerated; the session itself is unaffected.
    pub async fn authenticate(self, credentials: &Credentials) -> Result<Session> {
        self.backend
            .login(credentials)
            .await
            .map_err(|e| ClientError::Auth {
                identifier: credentials.identifier().to_string(),
                message: e.to_string(),
            })?;
        info!(identifier = credentials.identifier(), "logged in");

        match self.backend.export_session_token() {
            Ok(token) => {
                if let Err(e) = self.token_store.save(&token) {
                    warn!("failed to persist session token: {}", e);
                }
            }
            Err(e) => warn!("backend did not export a session token: {}", e),
        }

        let cache = ThreadCache::new(self.backend.clone());
        let user = Self::fetch_current_user(self.backend.as_ref(), &cache).await?;
        info!(
            user = %user.name,
            threads = cache.thread_count(),
            contacts = cache.user_count(),
            "session ready"
        );

        Ok(Session {
            user,
            cache,
            history: Mutex::new(ThreadHistory::new()),
            backend: self.backend,
        })
    }

    /// The ordered bulk fetch. Public so tests can drive it against a bare
    /// cache; `authenticate` is the production entry point.
    pub async fn fetch_current_user(
        backend: &dyn MessagingBackend,
        cache: &ThreadCache,
    ) -> Result<User> {
        // Step 1: resolve the authenticated identity.
        let user_id = backend
            .current_identity()
            .await
            .map_err(|e| ClientError::fetch(FetchStage::Identity, e))?;

        // Step 2: retrieve and merge profile fields.
        let profile = backend
            .profile(&user_id)
            .await
            .map_err(|e| ClientError::fetch(FetchStage::Profile, e))?;
        let mut user = User::new(user_id, profile.name.unwrap_or_default());
        user.profile_url = profile.profile_url;
        user.photo_url = profile.photo_url;

        // Step 3: the full contact list populates the name index and the
        // user cache. This must finish before any thread registration.
        let contacts = backend
            .contacts()
            .await
            .map_err(|e| ClientError::fetch(FetchStage::Contacts, e))?;
        let contact_count = contacts.len();
        for contact in contacts {
            let display = contact
                .name
                .or(contact.full_name)
                .unwrap_or_default();
            if !display.is_empty() {
                cache.index_name(&display, &contact.id);
            }
            cache.cache_user(User::new(contact.id, display));
        }
        debug!(contacts = contact_count, "contact list indexed");

        // Step 4: register the first page of threads.
        let page = backend
            .threads(0, THREAD_PAGE_SIZE)
            .await
            .map_err(|e| ClientError::fetch(FetchStage::ThreadPage, e))?;
        for record in page {
            cache.cache_thread(Thread::new(record.id, record.name.unwrap_or_default()));
        }

        cache.cache_user(user.clone());
        Ok(user)
    }
}

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// The aggregate root: one authenticated user, one cache, one navigation
/// history, one backend handle. Created once per process run and never torn
/// down explicitly.
pub struct Session {
    user: User,
    cache: ThreadCache,
    history: Mutex<ThreadHistory>,
    backend: Arc<dyn MessagingBackend>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// The authenticated user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// The thread/user cache.
    pub fn cache(&self) -> &ThreadCache {
        &self.cache
    }

    /// The backend handle.
    pub fn backend(&self) -> &Arc<dyn MessagingBackend> {
        &self.backend
    }

    /// Record a navigation to a thread.
    pub fn visit_thread(&self, thread_id: &str) {
        self.history.lock().unwrap().visit(thread_id);
    }

    /// The implicit current thread, if any has been visited.
    pub fn current_thread(&self) -> Option<String> {
        self.history
            .lock()
            .unwrap()
            .current()
            .map(str::to_string)
    }

    /// All visited thread ids, oldest first.
    pub fn visited_threads(&self) -> Vec<String> {
        self.history.lock().unwrap().entries().to_vec()
    }
}
