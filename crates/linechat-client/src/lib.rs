//! Linechat client — the session state manager.
//!
//! This crate contains:
//! - **cache**: thread/user projections and name-to-thread resolution
//! - **session**: login, the ordered bulk fetch, and the session aggregate
//! - **dispatch**: the line-to-command registry and its built-in commands
//! - **events**: per-kind event routing and the listener loop

pub mod cache;
pub mod commands;
pub mod dispatch;
pub mod events;
pub mod session;

pub use cache::ThreadCache;
pub use dispatch::{Command, CommandDispatcher};
pub use events::{run_listener, EventHandler, EventRouter};
pub use session::{Session, SessionManager, THREAD_PAGE_SIZE};
