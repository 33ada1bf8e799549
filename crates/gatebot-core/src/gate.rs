use std::sync::Arc;

use crate::{
    audit::{LogEntry, CAUSE_ACCESS_DENIED},
    domain::ChatId,
    messaging::port::MessagingPort,
    ports::{AuditLog, WhitelistStore},
    Result,
};

/// Reply sent to any chat or user that fails an access check.
pub const ACCESS_DENIED_TEXT: &str = "Access denied";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    Delivered,
    Denied,
}

/// Relays bot messages only to whitelisted chats.
#[derive(Clone)]
pub struct MessageGate {
    whitelist: Arc<dyn WhitelistStore>,
    audit: Arc<dyn AuditLog>,
    messenger: Arc<dyn MessagingPort>,
}

impl MessageGate {
    pub fn new(
        whitelist: Arc<dyn WhitelistStore>,
        audit: Arc<dyn AuditLog>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            whitelist,
            audit,
            messenger,
        }
    }

    /// Deliver `text` to `target` if it is whitelisted.
    ///
    /// Otherwise the target gets [`ACCESS_DENIED_TEXT`] and an
    /// `access_denied` row is appended to the audit log, even when the
    /// denial itself could not be delivered.
    pub async fn send(&self, target: ChatId, text: &str) -> Result<GateOutcome> {
        if self.whitelist.contains(&target.key()).await? {
            self.messenger.send_text(target, text).await?;
            return Ok(GateOutcome::Delivered);
        }

        let sent = self.messenger.send_text(target, ACCESS_DENIED_TEXT).await;
        self.audit
            .record(LogEntry::now(target, CAUSE_ACCESS_DENIED))
            .await;
        sent?;
        Ok(GateOutcome::Denied)
    }
}
