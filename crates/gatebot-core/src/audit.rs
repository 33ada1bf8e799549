use chrono::Local;

use crate::domain::ChatId;

// ============== Causes ==============

pub const CAUSE_ACCESS_DENIED: &str = "access_denied";
pub const CAUSE_WRONG_CALL: &str = "wrong_call";

/// Cause recorded when a chat command is refused, e.g. `access_denied command: /menu`.
pub fn denied_command(command: &str) -> String {
    format!("{CAUSE_ACCESS_DENIED} command: /{command}")
}

/// Cause recorded when a button callback is refused.
pub fn denied_callback(data: &str) -> String {
    format!("{CAUSE_ACCESS_DENIED} callback: {data}")
}

// ============== Timestamp ==============

const LOG_TIME_FORMAT: &str = "%d.%m.%y - %H:%M:%S";

/// Local wall-clock time in the format stored in `log.cur_time`.
pub fn log_timestamp() -> String {
    Local::now().format(LOG_TIME_FORMAT).to_string()
}

// ============== Entries ==============

/// One append-only row of the `log` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub chat_id: String,
    pub cause: String,
    pub timestamp: String,
}

impl LogEntry {
    pub fn new(chat_id: impl Into<String>, cause: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            cause: cause.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Entry stamped with the current local time.
    pub fn now(chat_id: ChatId, cause: impl Into<String>) -> Self {
        Self::new(chat_id.key(), cause, log_timestamp())
    }
}
