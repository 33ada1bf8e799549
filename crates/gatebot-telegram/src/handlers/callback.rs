use std::sync::Arc;

use teloxide::prelude::*;

use gatebot_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::CallbackQuery as GateCallback,
};

use crate::router::AppState;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let data = q.data.clone().unwrap_or_default();

    // Inline-mode callbacks carry no message; nothing here can handle them.
    let Some(message) = q.message.as_ref() else {
        let _ = bot.answer_callback_query(q.id.clone()).await;
        return Ok(());
    };
    if data.is_empty() {
        let _ = bot.answer_callback_query(q.id.clone()).await;
        return Ok(());
    }

    let chat_id = ChatId(message.chat.id.0);
    let callback = GateCallback {
        chat_id,
        user_id: UserId(q.from.id.0 as i64),
        callback_id: q.id.clone(),
        data,
        message: Some(MessageRef {
            chat_id,
            message_id: MessageId(message.id.0),
        }),
    };

    state.dispatcher.handle_callback(callback).await;
    Ok(())
}
