//! Event routing — consumes the backend's event stream and routes each
//! event to the handler registered for its kind.
//!
//! Transport-failure events are dropped before routing and never close the
//! stream. A kind with no registered handler is a wiring mistake and is
//! fatal; the built-in set covers every routed kind.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use tracing::{debug, error, info, warn};

use linechat_backend::events::{Event, EventKind};
use linechat_core::error::{ClientError, Result};

use crate::session::Session;

/// A per-kind event handler.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// React to one event. A failure here is logged by the listener loop
    /// and does not stop the stream.
    async fn handle(&self, session: &Session, event: Event) -> Result<()>;
}

/// Registry mapping event kinds to handlers.
pub struct EventRouter {
    handlers: HashMap<EventKind, Arc<dyn EventHandler>>,
}

impl EventRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        EventRouter {
            handlers: HashMap::new(),
        }
    }

    /// The router with the built-in handler for every routed kind.
    pub fn with_default_handlers() -> Self {
        let mut router = EventRouter::new();
        let receipts = Arc::new(ReceiptHandler);
        let activity = Arc::new(ActivityHandler);
        router.register(EventKind::Message, Arc::new(MessageHandler));
        router.register(EventKind::Delivered, receipts.clone());
        router.register(EventKind::Read, receipts);
        router.register(EventKind::ThreadRenamed, Arc::new(RenameHandler));
        router.register(EventKind::Typing, activity.clone());
        router.register(EventKind::Presence, activity);
        router
    }

    /// Register a handler for a kind. Overwrites any previous handler.
    pub fn register(&mut self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        debug!(kind = %kind, "registered event handler");
        self.handlers.insert(kind, handler);
    }

    /// Whether a kind has a registered handler.
    pub fn has_handler(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Route one event. Transport errors are dropped here (warned, `Ok`);
    /// a missing handler surfaces as `UnhandledEvent`.
    pub async fn route(&self, session: &Session, event: Event) -> Result<()> {
        if let Event::TransportError { message } = &event {
            warn!(error = %message, "dropping transport-error event");
            return Ok(());
        }

        let kind = event.kind();
        let handler = self
            .handlers
            .get(&kind)
            .cloned()
            .ok_or_else(|| ClientError::UnhandledEvent(kind.to_string()))?;
        handler.handle(session, event).await
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Consume the backend event stream until it closes.
///
/// Handler failures are logged and the stream continues; an unregistered
/// kind aborts the loop — that is a configuration error, not a runtime
/// condition.
pub async fn run_listener(session: Arc<Session>, router: Arc<EventRouter>) -> Result<()> {
    let mut rx = session
        .backend()
        .listen()
        .await
        .map_err(|e| ClientError::EventTransport(e.to_string()))?;
    info!("listening for backend events");

    while let Some(event) = rx.recv().await {
        match router.route(&session, event).await {
            Ok(()) => {}
            Err(e @ ClientError::UnhandledEvent(_)) => {
                error!(error = %e, "event router misconfigured");
                return Err(e);
            }
            Err(e) => error!(error = %e, "event handler failed"),
        }
    }

    info!("event stream closed");
    Ok(())
}

// ─────────────────────────────────────────────
// Built-in handlers
// ─────────────────────────────────────────────

/// Prints inbound messages, resolving the thread on demand so messages in
/// never-seen threads still display a name once fetched.
pub struct MessageHandler;

#[async_trait]
impl EventHandler for MessageHandler {
    async fn handle(&self, session: &Session, event: Event) -> Result<()> {
        let Event::Message {
            thread_id,
            sender_id,
            sender_name,
            text,
            timestamp,
        } = event
        else {
            return Ok(());
        };

        let thread = session.cache().thread_by_id(&thread_id).await?;
        let sender = sender_name
            .or_else(|| session.cache().user(&sender_id).map(|u| u.name))
            .filter(|name| !name.is_empty())
            .unwrap_or(sender_id);
        let place = if thread.name.is_empty() {
            thread.id.clone()
        } else {
            thread.name.clone()
        };

        println!(
            "{} {} @ {}: {}",
            timestamp.format("[%H:%M]").to_string().dimmed(),
            sender.cyan().bold(),
            place,
            text
        );
        Ok(())
    }
}

/// Logs delivery and read receipts at debug level.
pub struct ReceiptHandler;

#[async_trait]
impl EventHandler for ReceiptHandler {
    async fn handle(&self, _session: &Session, event: Event) -> Result<()> {
        match event {
            Event::Delivered {
                thread_id,
                message_id,
            } => debug!(thread = %thread_id, message = %message_id, "delivered"),
            Event::Read {
                thread_id,
                reader_id,
            } => debug!(thread = %thread_id, reader = %reader_id, "read"),
            _ => {}
        }
        Ok(())
    }
}

/// Prints thread rename notices. The cache deliberately keeps the
/// first-seen name; the notice is display-only.
pub struct RenameHandler;

#[async_trait]
impl EventHandler for RenameHandler {
    async fn handle(&self, session: &Session, event: Event) -> Result<()> {
        let Event::ThreadRenamed {
            thread_id,
            new_name,
        } = event
        else {
            return Ok(());
        };

        let known = session
            .cache()
            .cached_thread(&thread_id)
            .map(|t| t.name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| thread_id.clone());
        println!("{}", format!("✳ '{known}' was renamed to '{new_name}'").dimmed());
        Ok(())
    }
}

/// Suppresses typing and presence chatter at default verbosity.
pub struct ActivityHandler;

#[async_trait]
impl EventHandler for ActivityHandler {
    async fn handle(&self, _session: &Session, event: Event) -> Result<()> {
        match event {
            Event::Typing {
                thread_id,
                user_id,
                active,
            } => debug!(thread = %thread_id, user = %user_id, active, "typing"),
            Event::Presence { user_id, online } => {
                debug!(user = %user_id, online, "presence")
            }
            _ => {}
        }
        Ok(())
    }
}
