//! Inbound real-time events — the closed set delivered by the backend.
//!
//! Each event carries a kind tag (`EventKind`) used by the router to pick a
//! handler. The set is fixed by the backend contract; new kinds require a
//! new variant and a registered handler.

use std::fmt;

use chrono::{DateTime, Utc};

/// An inbound event from the messaging backend.
#[derive(Clone, Debug)]
pub enum Event {
    /// A message arrived in a thread.
    Message {
        /// Thread the message belongs to.
        thread_id: String,
        /// Sender's user id.
        sender_id: String,
        /// Sender's display name, when the backend includes it.
        sender_name: Option<String>,
        /// Message text.
        text: String,
        /// Delivery timestamp.
        timestamp: DateTime<Utc>,
    },
    /// A previously sent message was delivered.
    Delivered {
        /// Thread the receipt belongs to.
        thread_id: String,
        /// Backend id of the delivered message.
        message_id: String,
    },
    /// A participant read the thread.
    Read {
        /// Thread the receipt belongs to.
        thread_id: String,
        /// Who read it.
        reader_id: String,
    },
    /// A thread's display name changed.
    ThreadRenamed {
        /// The renamed thread.
        thread_id: String,
        /// The new name reported by the backend.
        new_name: String,
    },
    /// A typing indicator started or stopped.
    Typing {
        /// Thread the indicator belongs to.
        thread_id: String,
        /// Who is typing.
        user_id: String,
        /// Whether typing started (`true`) or stopped (`false`).
        active: bool,
    },
    /// A contact's presence changed.
    Presence {
        /// The contact.
        user_id: String,
        /// Whether they are now online.
        online: bool,
    },
    /// The stream itself reported a problem with this delivery. The event
    /// is dropped; the stream continues.
    TransportError {
        /// The transport's failure message.
        message: String,
    },
}

impl Event {
    /// The kind tag used for handler routing.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Message { .. } => EventKind::Message,
            Event::Delivered { .. } => EventKind::Delivered,
            Event::Read { .. } => EventKind::Read,
            Event::ThreadRenamed { .. } => EventKind::ThreadRenamed,
            Event::Typing { .. } => EventKind::Typing,
            Event::Presence { .. } => EventKind::Presence,
            Event::TransportError { .. } => EventKind::TransportError,
        }
    }
}

/// The closed set of event kinds. Known at build time; routing an event
/// whose kind has no registered handler is a configuration error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `Event::Message`
    Message,
    /// `Event::Delivered`
    Delivered,
    /// `Event::Read`
    Read,
    /// `Event::ThreadRenamed`
    ThreadRenamed,
    /// `Event::Typing`
    Typing,
    /// `Event::Presence`
    Presence,
    /// `Event::TransportError`
    TransportError,
}

impl EventKind {
    /// All kinds a router must cover (transport errors are dropped before
    /// routing, so they need no handler).
    pub const ROUTED: &'static [EventKind] = &[
        EventKind::Message,
        EventKind::Delivered,
        EventKind::Read,
        EventKind::ThreadRenamed,
        EventKind::Typing,
        EventKind::Presence,
    ];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Message => "message",
            EventKind::Delivered => "delivered",
            EventKind::Read => "read",
            EventKind::ThreadRenamed => "thread_renamed",
            EventKind::Typing => "typing",
            EventKind::Presence => "presence",
            EventKind::TransportError => "transport_error",
        };
        f.write_str(s)
    }
}
