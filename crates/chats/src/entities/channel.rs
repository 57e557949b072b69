use serde::{Deserialize, Serialize};

use super::user::UserRef;

/// Snapshot of a server-owned channel.
///
/// Replaced wholesale whenever the server returns a fresh copy (fetch,
/// invite, remove); never patched field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub created_by: Option<UserRef>,
    #[serde(default)]
    pub members: Vec<UserRef>,
}

impl Channel {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|member| member.id == user_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_decodes_populated_members() {
        let channel: Channel = serde_json::from_str(
            r#"{
                "_id": "c1",
                "name": "general",
                "isPrivate": true,
                "createdBy": {"_id": "u1", "username": "ada"},
                "members": ["u1", {"_id": "u2", "username": "bo"}]
            }"#,
        )
        .unwrap();

        assert_eq!(channel.id, "c1");
        assert!(channel.is_private);
        assert_eq!(channel.created_by.as_ref().map(|u| u.id.as_str()), Some("u1"));
        assert!(channel.has_member("u2"));
        assert!(!channel.has_member("u9"));
        assert_eq!(channel.member_count(), 2);
    }

    #[test]
    fn channel_defaults_optional_fields() {
        let channel: Channel = serde_json::from_str(r#"{"_id":"c2","name":"random"}"#).unwrap();
        assert!(!channel.is_private);
        assert!(channel.created_by.is_none());
        assert!(channel.members.is_empty());
    }
}
