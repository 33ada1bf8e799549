use std::fmt;

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UserId {
    /// Key used in the `admin_access.tele_id` column.
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl ChatId {
    /// Key used in the `whitelist.chat_id` and `log.chat_id` columns.
    pub fn key(&self) -> String {
        self.0.to_string()
    }

    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(ChatId)
    }
}

/// Telegram user as seen in a single request. Never persisted as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeleUser {
    pub tele_id: String,
    pub tele_name: String,
    pub tele_tag: String,
}

impl TeleUser {
    pub fn new(id: UserId, first_name: &str, username: Option<&str>) -> Self {
        Self {
            tele_id: id.key(),
            tele_name: first_name.to_string(),
            tele_tag: username.map(|u| format!("@{u}")).unwrap_or_default(),
        }
    }
}
