use serde::{Deserialize, Serialize};

// -- Envelope --

/// Every Slack Web API response carries `ok`; failures set `error` and omit
/// the method payload, so payload fields must all default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackResponse<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

// -- users.list --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersList {
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub profile: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub image_72: String,
    #[serde(default)]
    pub image_192: String,
}

impl Profile {
    /// Slack leaves `display_name` empty for users who never set one.
    pub fn name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.real_name
        } else {
            &self.display_name
        }
    }
}

// -- conversations.history --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Absent on bot and some system messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}
