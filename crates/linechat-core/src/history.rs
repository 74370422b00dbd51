//! Thread navigation history for one terminal session.

/// Ordered record of thread ids the user has navigated to, most-recent last.
///
/// Append-only during the session; cleared only by process restart. The last
/// entry is the implicit "current thread" for commands that omit a target.
#[derive(Debug, Default)]
pub struct ThreadHistory {
    entries: Vec<String>,
}

impl ThreadHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a navigation to a thread. Consecutive repeats collapse so the
    /// record reads as a trail, not a keystroke log.
    pub fn visit(&mut self, thread_id: impl Into<String>) {
        let id = thread_id.into();
        if self.entries.last().map(String::as_str) != Some(id.as_str()) {
            self.entries.push(id);
        }
    }

    /// The implicit current thread — the most recent entry.
    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// All visited thread ids, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of recorded navigations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been visited yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
