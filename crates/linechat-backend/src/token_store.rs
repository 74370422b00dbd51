//! Opaque session-token persistence.
//!
//! The token is an opaque blob exported by the backend after login; it is
//! written to a fixed location and replayed on the next run so the user does
//! not have to re-enter credentials.

use std::path::PathBuf;

use tracing::{debug, warn};

use linechat_core::types::SessionToken;
use linechat_core::utils;

/// Persists the opaque session token to a fixed path on disk.
pub struct SessionTokenStore {
    path: PathBuf,
}

impl SessionTokenStore {
    /// Create a store. `path` defaults to `~/.linechat/session_token.json`
    /// if `None`.
    pub fn new(path: Option<PathBuf>) -> Self {
        SessionTokenStore {
            path: path.unwrap_or_else(utils::get_token_path),
        }
    }

    /// Persist the token, creating parent directories as needed.
    pub fn save(&self, token: &SessionToken) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(token)?;
        std::fs::write(&self.path, json)?;
        debug!("saved session token to {}", self.path.display());
        Ok(())
    }

    /// Load a previously saved token, if any. A malformed or unreadable
    /// file is treated as no token (the caller falls back to credentials).
    pub fn load(&self) -> Option<SessionToken> {
        if !self.path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to read session token file: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(token) => {
                debug!("loaded session token from {}", self.path.display());
                Some(token)
            }
            Err(e) => {
                warn!("ignoring malformed session token file: {}", e);
                None
            }
        }
    }
}
