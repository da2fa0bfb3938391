use serde::{Deserialize, Serialize};

/// Identity of a chat-platform user as delivered with each inbound message.
///
/// The persistence layer stamps `last_interaction` itself on every append;
/// name and handle are optional because the platform does not guarantee them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: i64,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

impl ChatUser {
    pub fn new(id: i64) -> Self {
        Self { id, first_name: None, username: None }
    }

    pub fn with_names(
        id: i64,
        first_name: Option<String>,
        username: Option<String>,
    ) -> Self {
        Self { id, first_name, username }
    }
}
