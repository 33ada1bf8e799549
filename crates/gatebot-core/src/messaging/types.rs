use crate::domain::{ChatId, MessageRef, UserId};

/// Incoming chat command (`/menu`, `/add`, ...).
#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub first_name: String,
    pub username: Option<String>,
    pub name: String,
    pub args: String,
    /// Author of the message this command replies to, if any.
    pub reply_to: Option<ReplyTarget>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyTarget {
    pub user_id: UserId,
    pub first_name: String,
    pub username: Option<String>,
}

/// Inline-keyboard button press.
#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub callback_id: String,
    pub data: String,
    /// Message carrying the keyboard that was pressed.
    pub message: Option<MessageRef>,
}

/// Inline keyboard laid out as rows of buttons.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row with a single button.
    pub fn button(mut self, label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        self.rows.push(vec![InlineButton::new(label, callback_data)]);
        self
    }

    /// Append a row of buttons.
    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        self.rows.push(buttons);
        self
    }

    /// All callback payloads, in layout order.
    pub fn callback_data(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.callback_data.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_rows_in_order() {
        let kb = InlineKeyboard::new()
            .button("Chats", "list_groups")
            .row(vec![
                InlineButton::new("Team", "none"),
                InlineButton::new("Delete", "delete_ch_-100"),
            ])
            .button("Cancel", "cancel");

        assert_eq!(kb.rows.len(), 3);
        assert_eq!(kb.rows[1].len(), 2);
        assert_eq!(
            kb.callback_data(),
            vec!["list_groups", "none", "delete_ch_-100", "cancel"]
        );
    }
}
