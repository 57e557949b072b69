use serde::{Deserialize, Serialize};

/// Display name used wherever the server omits or nulls a user reference.
pub const UNKNOWN_USER: &str = "Unknown";

/// An authenticated account as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id.clone(),
            username: Some(self.username.clone()),
        }
    }
}

/// Reference to a user.
///
/// The server sends either a bare identifier or a populated `{_id, username}`
/// object depending on the endpoint; both decode into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UserRefRepr")]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserRefRepr {
    Id(String),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default)]
        username: Option<String>,
    },
}

impl From<UserRefRepr> for UserRef {
    fn from(repr: UserRefRepr) -> Self {
        match repr {
            UserRefRepr::Id(id) => Self { id, username: None },
            UserRefRepr::Populated { id, username } => Self { id, username },
        }
    }
}

impl UserRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(UNKNOWN_USER)
    }
}

/// A user currently viewing (or typing in) a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl PresenceEntry {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: Some(username.into()),
        }
    }

    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(UNKNOWN_USER)
    }
}
