use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use gatebot_core::{audit::LogEntry, ports::AuditLog};

use crate::{connection::ConnectionManager, db_err};

/// Audit log backed by the `log` table.
#[derive(Clone)]
pub struct SqlAuditLog {
    db: Arc<ConnectionManager>,
}

impl SqlAuditLog {
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditLog for SqlAuditLog {
    async fn record(&self, entry: LogEntry) {
        info!(
            chat_id = %entry.chat_id,
            cause = %entry.cause,
            cur_time = %entry.timestamp,
            "audit"
        );

        let LogEntry {
            chat_id,
            cause,
            timestamp,
        } = entry;
        let res = self
            .db
            .with_session(|conn| {
                Box::pin(async move {
                    sqlx::query("INSERT INTO log (chat_id, cause, cur_time) VALUES ($1, $2, $3)")
                        .bind(chat_id)
                        .bind(cause)
                        .bind(timestamp)
                        .execute(conn)
                        .await
                        .map_err(db_err)?;
                    Ok(())
                })
            })
            .await;

        if let Err(e) = res {
            error!(error = %e, "failed to write audit log row");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{count_rows, scratch_db};

    #[tokio::test]
    async fn duplicate_records_produce_duplicate_rows() {
        let db = scratch_db().await;
        let audit = SqlAuditLog::new(db.clone());

        let entry = LogEntry::new("200", "access_denied", "01.03.24 - 12:30:00");
        audit.record(entry.clone()).await;
        audit.record(entry).await;

        assert_eq!(count_rows(&db, "SELECT chat_id FROM log WHERE chat_id = '200'").await, 2);
    }

    #[tokio::test]
    async fn record_swallows_connection_failures() {
        let db = Arc::new(ConnectionManager::new(
            crate::connection::DbTarget::Url("sqlite:///nonexistent-dir/gatebot/x.db".to_string()),
            Arc::new(crate::auth::NoToken),
        ));
        // Must not panic or propagate.
        SqlAuditLog::new(db)
            .record(LogEntry::new("1", "wrong_call", "now"))
            .await;
    }
}
