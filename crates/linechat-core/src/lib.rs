//! Linechat core — shared types, error taxonomy, and path utilities.
//!
//! This crate contains:
//! - **types**: User, Thread, Credentials, and the opaque session token
//! - **history**: the per-session record of visited threads
//! - **error**: the typed error taxonomy shared by all crates
//! - **utils**: data-directory path resolution

pub mod error;
pub mod history;
pub mod types;
pub mod utils;

pub use error::{ClientError, FetchStage, Result};
pub use history::ThreadHistory;
pub use types::{Credentials, Secret, SessionToken, Thread, User};
