//! Error taxonomy shared by every crate.
//!
//! Fatal-to-startup variants (`Auth`, `Fetch`) stop the process before the
//! read-eval loop starts. `Command` and `LookupNotFound` are recovered at the
//! dispatcher boundary. `UnhandledEvent` signals a wiring mistake and is
//! fatal. Nothing is retried automatically.

use std::fmt;

use thiserror::Error;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Which step of a fetch failed. Rendered into the single-line error text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStage {
    /// Resolving the authenticated identity.
    Identity,
    /// Retrieving and merging profile fields.
    Profile,
    /// Retrieving the full contact list.
    Contacts,
    /// Retrieving the first page of threads.
    ThreadPage,
    /// An on-demand single-thread lookup.
    Thread,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchStage::Identity => "identity",
            FetchStage::Profile => "profile",
            FetchStage::Contacts => "contacts",
            FetchStage::ThreadPage => "thread page",
            FetchStage::Thread => "thread",
        };
        f.write_str(s)
    }
}

/// All error categories the client core produces.
///
/// Every rendered message is a single readable line and never contains a
/// secret — `Auth` carries the identifying credential field only.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Login rejected by the backend. Fatal to startup.
    #[error("authentication failed for {identifier}: {message}")]
    Auth {
        /// The non-secret half of the credential.
        identifier: String,
        /// The backend's failure message.
        message: String,
    },

    /// A step of the post-login bulk fetch (or an on-demand lookup) failed.
    /// Fatal to startup when raised during the bulk fetch.
    #[error("fetch failed at {stage}: {message}")]
    Fetch {
        /// Which fetch step failed.
        stage: FetchStage,
        /// The backend's failure message.
        message: String,
    },

    /// A command handler failed. Recovered at the dispatcher; the loop
    /// continues.
    #[error("{0}")]
    Command(String),

    /// A name or identifier did not resolve in the cache or name index.
    #[error("no thread matching '{0}'")]
    LookupNotFound(String),

    /// A delivered event signaled a stream-level problem. The event is
    /// dropped; the stream continues.
    #[error("event transport error: {0}")]
    EventTransport(String),

    /// No handler registered for an event kind. A wiring mistake, fatal.
    #[error("no handler registered for event kind '{0}'")]
    UnhandledEvent(String),
}

impl ClientError {
    /// Shorthand for a fetch failure at a given stage.
    pub fn fetch(stage: FetchStage, err: impl fmt::Display) -> Self {
        ClientError::Fetch {
            stage,
            message: err.to_string(),
        }
    }

    /// Shorthand for a command failure.
    pub fn command(message: impl Into<String>) -> Self {
        ClientError::Command(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_renders_identifier_only() {
        let err = ClientError::Auth {
            identifier: "alice@example.com".into(),
            message: "wrong password".into(),
        };
        let line = err.to_string();
        assert!(line.contains("alice@example.com"));
        assert!(line.contains("wrong password"));
        // Single readable line.
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_fetch_error_names_stage() {
        let err = ClientError::fetch(FetchStage::Contacts, "timeout");
        assert_eq!(err.to_string(), "fetch failed at contacts: timeout");
    }

    #[test]
    fn test_lookup_not_found_message() {
        let err = ClientError::LookupNotFound("ali".into());
        assert_eq!(err.to_string(), "no thread matching 'ali'");
    }

    #[test]
    fn test_unhandled_event_message() {
        let err = ClientError::UnhandledEvent("typing".into());
        assert!(err.to_string().contains("typing"));
    }
}
