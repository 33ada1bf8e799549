//! Capability ports the dispatcher is composed from.
//!
//! Each store is an independent trait so the SQL adapter, test fakes and any
//! future backend can be injected separately.

use async_trait::async_trait;

use crate::{
    access::{Comparator, RemoveOutcome, Tier},
    audit::LogEntry,
    domain::TeleUser,
    Result,
};

/// Append-only audit sink.
///
/// `record` never fails outward: implementations log their own errors.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: LogEntry);
}

/// Set of chat ids allowed to receive relayed messages.
#[async_trait]
pub trait WhitelistStore: Send + Sync {
    /// Every whitelisted chat id, unordered.
    async fn list(&self) -> Result<Vec<String>>;

    async fn contains(&self, chat_id: &str) -> Result<bool> {
        Ok(self.list().await?.iter().any(|id| id == chat_id))
    }

    /// Returns `false` when the chat was already whitelisted.
    async fn add(&self, chat_id: &str) -> Result<bool>;

    /// Removing an absent id is a no-op.
    async fn remove(&self, chat_id: &str) -> Result<()>;
}

/// Mapping from Telegram user id to access tier.
#[async_trait]
pub trait AccessStore: Send + Sync {
    /// Ids of users whose tier satisfies `access <comparator> tier`.
    async fn list(&self, comparator: Comparator, tier: Tier) -> Result<Vec<String>>;

    /// Returns `false` when the user already had an entry.
    async fn add(&self, user: &TeleUser, tier: Tier) -> Result<bool>;

    /// Unconditional delete by exact id; callers go through [`AccessStore::remove`].
    async fn delete(&self, tele_id: &str) -> Result<()>;

    /// Delete `target_id` if `acting_id` is in the super-admin set.
    async fn remove(&self, acting_id: &str, target_id: &str) -> Result<RemoveOutcome> {
        let super_admins = self.list(Comparator::AtMost, Tier::SUPER_ADMIN).await?;
        if !super_admins.iter().any(|id| id == acting_id) {
            return Ok(RemoveOutcome::Denied);
        }
        self.delete(target_id).await?;
        Ok(RemoveOutcome::Removed)
    }
}
