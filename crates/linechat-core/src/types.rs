//! Core data model — users, threads, credentials.
//!
//! Identifiers are opaque strings assigned by the messaging backend; the
//! client never interprets them beyond equality and map keying.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// User
// ─────────────────────────────────────────────

/// A user known to the session — the authenticated user or a contact.
///
/// Immutable once fetched, except for the in-place profile merge performed
/// during the post-login bulk fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    /// Opaque backend identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Canonical profile URL, when the backend reports one.
    pub profile_url: Option<String>,
    /// Avatar URL, when the backend reports one.
    pub photo_url: Option<String>,
}

impl User {
    /// Create a user with just an id and a display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        User {
            id: id.into(),
            name: name.into(),
            profile_url: None,
            photo_url: None,
        }
    }
}

// ─────────────────────────────────────────────
// Thread
// ─────────────────────────────────────────────

/// A conversation thread — a minimal projection of the backend record.
///
/// Only id and name are retained. Created on first observation and never
/// evicted; the name is only ever written once (plus the lazy back-fill of
/// an empty name during name resolution).
#[derive(Clone, Debug, PartialEq)]
pub struct Thread {
    /// Opaque backend identifier.
    pub id: String,
    /// Display name. May be empty when the backend omits it.
    pub name: String,
}

impl Thread {
    /// Create a thread projection.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Thread {
            id: id.into(),
            name: name.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────

/// A login secret. `Debug` and `Display` never reveal the value.
#[derive(Clone, PartialEq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    /// Access the underlying value. Only the backend login path should
    /// ever call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// What the credential source resolved — either a token saved by a previous
/// run, or an identifier/secret pair from a file or interactive prompt.
#[derive(Clone, Debug)]
pub enum Credentials {
    /// A previously persisted opaque session token.
    SavedToken(SessionToken),
    /// An identifier/secret pair.
    Login {
        /// Account identifier (email, phone, username — backend-defined).
        identifier: String,
        /// The login secret. Never logged, never echoed.
        secret: Secret,
    },
}

impl Credentials {
    /// The identifying (non-secret) half of the credential, for error
    /// messages and logs.
    pub fn identifier(&self) -> &str {
        match self {
            Credentials::SavedToken(_) => "saved session",
            Credentials::Login { identifier, .. } => identifier,
        }
    }
}

// ─────────────────────────────────────────────
// Session token
// ─────────────────────────────────────────────

/// The opaque session blob issued by the backend at login.
///
/// Persisted as-is and replayed on the next run; the client never inspects
/// its contents.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a backend-issued blob.
    pub fn new(blob: impl Into<String>) -> Self {
        SessionToken(blob.into())
    }

    /// The raw blob, for handing back to the backend.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<opaque>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_never_printed() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{secret}"), "<redacted>");
        assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
    }

    #[test]
    fn test_secret_expose() {
        let secret = Secret::new("hunter2");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_credentials_identifier_login() {
        let creds = Credentials::Login {
            identifier: "alice@example.com".into(),
            secret: Secret::new("pw"),
        };
        assert_eq!(creds.identifier(), "alice@example.com");
    }

    #[test]
    fn test_credentials_identifier_token() {
        let creds = Credentials::SavedToken(SessionToken::new("blob"));
        assert_eq!(creds.identifier(), "saved session");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::Login {
            identifier: "alice".into(),
            secret: Secret::new("hunter2"),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("alice"));
    }

    #[test]
    fn test_session_token_opaque_debug() {
        let token = SessionToken::new("very-secret-blob");
        assert_eq!(format!("{token:?}"), "SessionToken(<opaque>)");
        assert_eq!(token.as_str(), "very-secret-blob");
    }

    #[test]
    fn test_thread_new() {
        let t = Thread::new("t1", "General");
        assert_eq!(t.id, "t1");
        assert_eq!(t.name, "General");
    }

    #[test]
    fn test_user_new_defaults() {
        let u = User::new("u1", "Alice");
        assert!(u.profile_url.is_none());
        assert!(u.photo_url.is_none());
    }
}
