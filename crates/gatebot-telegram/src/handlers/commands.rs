use std::sync::Arc;

use teloxide::prelude::*;
use tracing::debug;

use gatebot_core::{
    domain::{ChatId, UserId},
    messaging::types::{Command, ReplyTarget},
};

use crate::router::AppState;

/// Split `/cmd@botname args...` into a lowercase command name and its arguments.
fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

fn reply_target(msg: &Message) -> Option<ReplyTarget> {
    let author = msg.reply_to_message()?.from()?;
    Some(ReplyTarget {
        user_id: UserId(author.id.0 as i64),
        first_name: author.first_name.clone(),
        username: author.username.clone(),
    })
}

pub async fn handle_command(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let (name, args) = parse_command(text);
    debug!(command = %name, chat_id = msg.chat.id.0, "received command");

    let cmd = Command {
        chat_id: ChatId(msg.chat.id.0),
        user_id: UserId(user.id.0 as i64),
        first_name: user.first_name.clone(),
        username: user.username.clone(),
        name,
        args,
        reply_to: reply_target(&msg),
    };

    state.dispatcher.handle_command(cmd).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_with_bot_suffix_and_args() {
        assert_eq!(
            parse_command("/send@gate_bot -100 hello world"),
            ("send".to_string(), "-100 hello world".to_string())
        );
        assert_eq!(parse_command("/Menu"), ("menu".to_string(), String::new()));
        assert_eq!(
            parse_command("  /grant   super "),
            ("grant".to_string(), "super".to_string())
        );
    }
}
