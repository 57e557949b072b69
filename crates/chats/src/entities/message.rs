use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::user::{UserRef, UNKNOWN_USER};

/// Record that a specific user has read a specific message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    #[serde(rename = "userId")]
    pub user: UserRef,
    pub read_at: DateTime<Utc>,
}

impl ReadReceipt {
    pub fn new(user: UserRef, read_at: DateTime<Utc>) -> Self {
        Self { user, read_at }
    }
}

/// Represents a message within a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Channel the message belongs to
    #[serde(
        default,
        alias = "channelId",
        deserialize_with = "deserialize_channel_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel: Option<String>,
    /// Sender; absent when the account no longer exists
    #[serde(default)]
    pub sender: Option<UserRef>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// History payloads may omit receipts entirely
    #[serde(default)]
    pub read_by: Vec<ReadReceipt>,
}

impl Message {
    pub fn sender_name(&self) -> &str {
        self.sender
            .as_ref()
            .map(UserRef::display_name)
            .unwrap_or(UNKNOWN_USER)
    }

    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender.as_ref().is_some_and(|sender| sender.id == user_id)
    }

    pub fn is_read_by(&self, user_id: &str) -> bool {
        self.read_by.iter().any(|receipt| receipt.user.id == user_id)
    }

    pub fn belongs_to(&self, channel_id: &str) -> bool {
        self.channel.as_deref().map_or(true, |channel| channel == channel_id)
    }
}

/// Collapse a receipt list to at most one entry per reader, keeping the first.
pub fn normalize_receipts(receipts: Vec<ReadReceipt>) -> Vec<ReadReceipt> {
    let mut normalized: Vec<ReadReceipt> = Vec::with_capacity(receipts.len());
    for receipt in receipts {
        if !normalized
            .iter()
            .any(|existing| existing.user.id == receipt.user.id)
        {
            normalized.push(receipt);
        }
    }
    normalized
}

fn deserialize_channel_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ChannelRef {
        Id(String),
        Populated {
            #[serde(rename = "_id", alias = "id")]
            id: String,
        },
    }

    Ok(Option::<ChannelRef>::deserialize(deserializer)?.map(|reference| match reference {
        ChannelRef::Id(id) | ChannelRef::Populated { id } => id,
    }))
}
