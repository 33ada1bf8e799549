use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef, UserId},
    messaging::types::InlineKeyboard,
    Result,
};

/// Outbound side of the chat platform.
///
/// Besides sending and deleting messages, the admin menus need to resolve
/// display names for the ids kept in the database.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    async fn delete_message(&self, msg: MessageRef) -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;

    /// Title of a group/channel chat.
    async fn chat_title(&self, chat_id: ChatId) -> Result<String>;

    /// First name of a user, as the platform reports it.
    async fn user_display_name(&self, user_id: UserId) -> Result<String>;
}
