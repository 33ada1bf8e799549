use std::sync::Arc;

use async_trait::async_trait;

use gatebot_core::{ports::WhitelistStore, Result};

use crate::{connection::ConnectionManager, db_err};

/// Whitelist backed by the `whitelist` table.
#[derive(Clone)]
pub struct SqlWhitelist {
    db: Arc<ConnectionManager>,
}

impl SqlWhitelist {
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WhitelistStore for SqlWhitelist {
    async fn list(&self) -> Result<Vec<String>> {
        self.db
            .with_session(|conn| {
                Box::pin(async move {
                    sqlx::query_scalar::<_, String>("SELECT chat_id FROM whitelist")
                        .fetch_all(conn)
                        .await
                        .map_err(db_err)
                })
            })
            .await
    }

    async fn contains(&self, chat_id: &str) -> Result<bool> {
        let chat_id = chat_id.to_string();
        self.db
            .with_session(|conn| {
                Box::pin(async move {
                    let found = sqlx::query_scalar::<_, String>(
                        "SELECT chat_id FROM whitelist WHERE chat_id = $1 LIMIT 1",
                    )
                    .bind(chat_id)
                    .fetch_optional(conn)
                    .await
                    .map_err(db_err)?;
                    Ok(found.is_some())
                })
            })
            .await
    }

    async fn add(&self, chat_id: &str) -> Result<bool> {
        let chat_id = chat_id.to_string();
        self.db
            .with_session(|conn| {
                Box::pin(async move {
                    let res = sqlx::query(
                        r#"
                        INSERT INTO whitelist (chat_id)
                        SELECT CAST($1 AS TEXT)
                        WHERE NOT EXISTS (SELECT 1 FROM whitelist WHERE chat_id = $2)
                        "#,
                    )
                    .bind(chat_id.clone())
                    .bind(chat_id)
                    .execute(conn)
                    .await
                    .map_err(db_err)?;
                    Ok(res.rows_affected() > 0)
                })
            })
            .await
    }

    async fn remove(&self, chat_id: &str) -> Result<()> {
        let chat_id = chat_id.to_string();
        self.db
            .with_session(|conn| {
                Box::pin(async move {
                    sqlx::query("DELETE FROM whitelist WHERE chat_id = $1")
                        .bind(chat_id)
                        .execute(conn)
                        .await
                        .map_err(db_err)?;
                    Ok(())
                })
            })
            .await
    }
}
