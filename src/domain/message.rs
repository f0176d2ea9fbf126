use std::sync::Arc;

use crate::domain::room::Participant;

/// A formatted chat line, shared unchanged by every delivery of one broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    bytes: Arc<[u8]>,
}

impl Message {
    /// Formats `text` as `[<room>] <sender>: <text>\n`.
    ///
    /// Returns `None` for empty or whitespace-only input; such lines are
    /// discarded without a broadcast.
    pub fn compose(sender: &Participant, text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }

        let formatted = format!("[{}] {}: {}\n", sender.room, sender.username, text);
        Some(Self {
            bytes: Arc::from(formatted.into_bytes()),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}
