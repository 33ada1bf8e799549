use std::sync::Arc;

use async_trait::async_trait;

use gatebot_core::{
    access::{Comparator, Tier},
    domain::TeleUser,
    ports::AccessStore,
    Result,
};

use crate::{connection::ConnectionManager, db_err};

/// Access tiers backed by the `admin_access` table.
#[derive(Clone)]
pub struct SqlAccessStore {
    db: Arc<ConnectionManager>,
}

impl SqlAccessStore {
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self { db }
    }
}

/// Only the operator comes from the enum; the tier is always bound.
fn list_query(comparator: Comparator) -> String {
    format!(
        "SELECT tele_id FROM admin_access WHERE access {} $1",
        comparator.as_sql()
    )
}

#[async_trait]
impl AccessStore for SqlAccessStore {
    async fn list(&self, comparator: Comparator, tier: Tier) -> Result<Vec<String>> {
        let sql = list_query(comparator);
        self.db
            .with_session(|conn| {
                Box::pin(async move {
                    sqlx::query_scalar::<_, String>(&sql)
                        .bind(tier.value())
                        .fetch_all(conn)
                        .await
                        .map_err(db_err)
                })
            })
            .await
    }

    async fn add(&self, user: &TeleUser, tier: Tier) -> Result<bool> {
        let user = user.clone();
        self.db
            .with_session(|conn| {
                Box::pin(async move {
                    let res = sqlx::query(
                        r#"
                        INSERT INTO admin_access (tele_id, tele_name, tele_tag, access)
                        SELECT CAST($1 AS TEXT), CAST($2 AS TEXT), CAST($3 AS TEXT), CAST($4 AS INTEGER)
                        WHERE NOT EXISTS (SELECT 1 FROM admin_access WHERE tele_id = $5)
                        "#,
                    )
                    .bind(user.tele_id.clone())
                    .bind(user.tele_name)
                    .bind(user.tele_tag)
                    .bind(tier.value())
                    .bind(user.tele_id)
                    .execute(conn)
                    .await
                    .map_err(db_err)?;
                    Ok(res.rows_affected() > 0)
                })
            })
            .await
    }

    async fn delete(&self, tele_id: &str) -> Result<()> {
        let tele_id = tele_id.to_string();
        self.db
            .with_session(|conn| {
                Box::pin(async move {
                    sqlx::query("DELETE FROM admin_access WHERE tele_id = $1")
                        .bind(tele_id)
                        .execute(conn)
                        .await
                        .map_err(db_err)?;
                    Ok(())
                })
            })
            .await
    }
}
