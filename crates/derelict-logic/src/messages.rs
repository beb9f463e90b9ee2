//! Player-facing message queue, newest first.
//!
//! Actions push human-readable outcomes here; the render collaborator drains
//! the queue once per frame.

use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: VecDeque<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message in front of everything already queued.
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push_front(message.into());
    }

    /// Most recent message, if any.
    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take every queued message, most recent first, leaving the log empty.
    pub fn drain(&mut self) -> Vec<String> {
        self.entries.drain(..).collect()
    }
}
