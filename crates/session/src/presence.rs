//! Users currently viewing the active channel.

use huddle_chats::PresenceEntry;

/// Set of presence entries keyed by user id, scoped to one channel.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    entries: Vec<PresenceEntry>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Add the entry unless the user is already present
    pub fn upsert(&mut self, entry: PresenceEntry) -> bool {
        if self.contains(&entry.user_id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, user_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.user_id != user_id);
        self.entries.len() != before
    }

    /// Overwrite with the server's roster
    pub fn replace_all(&mut self, entries: Vec<PresenceEntry>) {
        self.entries.clear();
        for entry in entries {
            self.upsert(entry);
        }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.iter().any(|entry| entry.user_id == user_id)
    }

    pub fn entries(&self) -> &[PresenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
