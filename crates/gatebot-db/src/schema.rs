//! Table definitions for the `log`, `whitelist` and `admin_access` tables.
//!
//! The tables carry no constraints; uniqueness is handled by the stores.

use tracing::info;

use gatebot_core::Result;

use crate::{connection::ConnectionManager, db_err};

const TABLES: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS log (chat_id TEXT, cause TEXT, cur_time TEXT)",
    "CREATE TABLE IF NOT EXISTS whitelist (chat_id TEXT)",
    "CREATE TABLE IF NOT EXISTS admin_access (tele_id TEXT, tele_name TEXT, tele_tag TEXT, access INTEGER)",
];

/// Create any missing tables.
pub async fn ensure(db: &ConnectionManager) -> Result<()> {
    db.with_session(|conn| {
        Box::pin(async move {
            for ddl in TABLES {
                sqlx::query(ddl).execute(&mut *conn).await.map_err(db_err)?;
            }
            Ok(())
        })
    })
    .await?;

    info!(db = %db.target(), "database schema checked/created");
    Ok(())
}
