//! Request bodies for the REST endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_private: bool,
    /// User ids to invite; only meaningful for private channels
    #[serde(default)]
    pub members: Vec<String>,
}

impl CreateChannelRequest {
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_private: false,
            members: Vec::new(),
        }
    }

    pub fn private(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_private: true,
            members,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Body of the invite and remove calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub channel_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}
