//! Ordered message list for the active channel.

use huddle_chats::{normalize_receipts, Message, ReadReceipt};

/// Which side of a hydration won
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationSource {
    Cached,
    Fetched,
}

/// Outcome of merging a cache snapshot with a fresh fetch.
///
/// The same list is displayed and written back to the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydration {
    pub messages: Vec<Message>,
    pub source: HydrationSource,
}

impl Hydration {
    pub fn persist(&self) -> &[Message] {
        &self.messages
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    dedupe_by_id: bool,
}

impl MessageStore {
    pub fn new(dedupe_by_id: bool) -> Self {
        Self {
            messages: Vec::new(),
            dedupe_by_id,
        }
    }

    /// The fetched list wins only when it is strictly longer than the cached
    /// one; a missing cache entry counts as empty.
    ///
    /// ```
    /// use huddle_session::{HydrationSource, MessageStore};
    ///
    /// let hydration = MessageStore::hydrate(None, Vec::new());
    /// assert_eq!(hydration.source, HydrationSource::Cached);
    /// assert!(hydration.messages.is_empty());
    /// ```
    pub fn hydrate(cached: Option<Vec<Message>>, fetched: Vec<Message>) -> Hydration {
        let cached = cached.unwrap_or_default();
        if fetched.len() > cached.len() {
            Hydration {
                messages: fetched,
                source: HydrationSource::Fetched,
            }
        } else {
            Hydration {
                messages: cached,
                source: HydrationSource::Cached,
            }
        }
    }

    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Add a live message at the end. Returns `false` when the id is already
    /// present and deduplication is on.
    pub fn append(&mut self, message: Message) -> bool {
        if self.dedupe_by_id && self.contains(&message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Put an older page in front of the list, returning how many were added
    pub fn prepend_history(&mut self, older: Vec<Message>) -> usize {
        let older: Vec<Message> = if self.dedupe_by_id {
            let mut seen = std::collections::HashSet::new();
            older
                .into_iter()
                .filter(|message| !self.contains(&message.id) && seen.insert(message.id.clone()))
                .collect()
        } else {
            older
        };

        let added = older.len();
        if added > 0 {
            self.messages.splice(0..0, older);
        }
        added
    }

    /// Replace the receipts of one message with the server's list. Unknown
    /// ids are ignored; returns whether anything changed.
    pub fn reconcile_read_receipt(&mut self, message_id: &str, receipts: Vec<ReadReceipt>) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) else {
            return false;
        };

        let receipts = normalize_receipts(receipts);
        if message.read_by == receipts {
            return false;
        }
        message.read_by = receipts;
        true
    }

    /// History offset for the next page: the count currently held
    pub fn cursor(&self) -> usize {
        self.messages.len()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == message_id)
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.get(message_id).is_some()
    }

    /// Messages from other senders that `user_id` has not read yet
    pub fn unread_from_others<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Message> {
        self.messages
            .iter()
            .filter(move |message| !message.is_from(user_id) && !message.is_read_by(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use huddle_chats::UserRef;

    fn message(id: &str) -> Message {
        Message {
            id: id.to_string(),
            channel: Some("c1".to_string()),
            sender: Some(UserRef::new("u1").with_username("ada")),
            content: format!("message {id}"),
            created_at: Utc.timestamp_opt(1_714_557_600, 0).unwrap(),
            read_by: Vec::new(),
        }
    }

    fn messages(prefix: &str, count: usize) -> Vec<Message> {
        (0..count).map(|n| message(&format!("{prefix}{n}"))).collect()
    }

    fn receipt(user: &str, minute: u32) -> ReadReceipt {
        ReadReceipt::new(
            UserRef::new(user),
            Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap(),
        )
    }

    #[test]
    fn hydrate_prefers_longer_fetch() {
        let hydration = MessageStore::hydrate(Some(messages("c", 10)), messages("f", 12));
        assert_eq!(hydration.source, HydrationSource::Fetched);
        assert_eq!(hydration.messages, messages("f", 12));
        assert_eq!(hydration.persist(), messages("f", 12).as_slice());
    }

    #[test]
    fn hydrate_keeps_cache_when_fetch_is_shorter() {
        let hydration = MessageStore::hydrate(Some(messages("c", 10)), messages("f", 8));
        assert_eq!(hydration.source, HydrationSource::Cached);
        assert_eq!(hydration.messages, messages("c", 10));
    }

    #[test]
    fn hydrate_law_over_distinct_lengths() {
        for cached_len in 0..6 {
            for fetched_len in 0..6 {
                if cached_len == fetched_len {
                    continue;
                }
                let cached = messages("c", cached_len);
                let fetched = messages("f", fetched_len);
                let hydration = MessageStore::hydrate(Some(cached.clone()), fetched.clone());
                let expected = if fetched_len > cached_len { fetched } else { cached };
                assert_eq!(hydration.messages, expected, "{cached_len} vs {fetched_len}");
            }
        }
    }

    #[test]
    fn hydrate_equal_lengths_keeps_cache() {
        let hydration = MessageStore::hydrate(Some(messages("c", 3)), messages("f", 3));
        assert_eq!(hydration.messages, messages("c", 3));
    }

    #[test]
    fn hydrate_without_cache_uses_fetch() {
        let hydration = MessageStore::hydrate(None, messages("f", 2));
        assert_eq!(hydration.source, HydrationSource::Fetched);
        assert_eq!(hydration.messages.len(), 2);
    }

    #[test]
    fn append_dedupes_by_id_when_enabled() {
        let mut store = MessageStore::new(true);
        assert!(store.append(message("m1")));
        assert!(!store.append(message("m1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn append_keeps_duplicates_when_disabled() {
        let mut store = MessageStore::new(false);
        store.append(message("m1"));
        store.append(message("m1"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn prepend_history_puts_older_page_first() {
        let mut store = MessageStore::new(true);
        store.replace(vec![message("m3"), message("m4")]);
        assert_eq!(store.cursor(), 2);

        let added = store.prepend_history(vec![message("m1"), message("m2"), message("m3")]);

        assert_eq!(added, 2);
        let ids: Vec<_> = store.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3", "m4"]);
        assert_eq!(store.cursor(), 4);
    }

    #[test]
    fn prepend_empty_page_is_a_no_op() {
        let mut store = MessageStore::new(true);
        store.replace(messages("m", 3));
        assert_eq!(store.prepend_history(Vec::new()), 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn reconcile_replaces_receipts_of_one_message() {
        let mut store = MessageStore::new(true);
        let mut stale = message("m1");
        stale.read_by = vec![receipt("u3", 0)];
        store.replace(vec![stale, message("m2")]);

        assert!(store.reconcile_read_receipt("m1", vec![receipt("u2", 1)]));

        assert_eq!(store.get("m1").unwrap().read_by, vec![receipt("u2", 1)]);
        assert!(store.get("m2").unwrap().read_by.is_empty());
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut store = MessageStore::new(true);
        store.replace(messages("m", 2));
        let receipts = vec![receipt("u2", 1), receipt("u3", 2)];

        assert!(store.reconcile_read_receipt("m0", receipts.clone()));
        let once = store.messages().to_vec();
        assert!(!store.reconcile_read_receipt("m0", receipts));
        assert_eq!(store.messages(), once.as_slice());
    }

    #[test]
    fn reconcile_unknown_message_is_ignored() {
        let mut store = MessageStore::new(true);
        store.replace(messages("m", 2));
        let before = store.messages().to_vec();
        assert!(!store.reconcile_read_receipt("missing", vec![receipt("u2", 1)]));
        assert_eq!(store.messages(), before.as_slice());
    }

    #[test]
    fn reconcile_collapses_duplicate_readers() {
        let mut store = MessageStore::new(true);
        store.replace(vec![message("m1")]);
        store.reconcile_read_receipt("m1", vec![receipt("u2", 1), receipt("u2", 5)]);
        assert_eq!(store.get("m1").unwrap().read_by, vec![receipt("u2", 1)]);
    }

    #[test]
    fn growing_server_lists_keep_receipts_monotonic() {
        let mut store = MessageStore::new(true);
        store.replace(vec![message("m1")]);

        let updates = [
            vec![receipt("u2", 1)],
            vec![receipt("u2", 1), receipt("u3", 2)],
            vec![receipt("u2", 1), receipt("u3", 2)],
            vec![receipt("u2", 1), receipt("u3", 2), receipt("u4", 3)],
        ];
        let mut previous = 0;
        for update in updates {
            store.reconcile_read_receipt("m1", update);
            let size = store.get("m1").unwrap().read_by.len();
            assert!(size >= previous);
            previous = size;
        }
        assert_eq!(previous, 3);
    }

    #[test]
    fn unread_from_others_skips_own_and_read_messages() {
        let mut store = MessageStore::new(true);
        let mut own = message("mine");
        own.sender = Some(UserRef::new("me"));
        let mut read = message("read");
        read.read_by = vec![receipt("me", 1)];
        let mut anonymous = message("ghost");
        anonymous.sender = None;
        store.replace(vec![own, read, message("fresh"), anonymous]);

        let unread: Vec<_> = store.unread_from_others("me").map(|m| m.id.as_str()).collect();
        assert_eq!(unread, vec!["fresh", "ghost"]);
    }
}
