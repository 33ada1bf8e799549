//! Scratch SQLite databases for store tests.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crate::{
    auth::NoToken,
    connection::{ConnectionManager, DbTarget},
    schema,
};

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Fresh file-backed database with the schema applied.
///
/// A file (not `:memory:`) is required: every operation opens its own connection.
pub async fn scratch_db() -> Arc<ConnectionManager> {
    let id = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "gatebot-db-{}-{}.sqlite",
        std::process::id(),
        id
    ));
    let _ = std::fs::remove_file(&path);

    let db = Arc::new(ConnectionManager::new(
        DbTarget::Url(format!("sqlite://{}?mode=rwc", path.display())),
        Arc::new(NoToken),
    ));
    schema::ensure(&db).await.unwrap();
    db
}

pub async fn count_rows(db: &ConnectionManager, sql: &str) -> usize {
    let sql = sql.to_string();
    db.with_session(|conn| {
        Box::pin(async move {
            let rows = sqlx::query_scalar::<_, String>(&sql)
                .fetch_all(conn)
                .await
                .map_err(crate::db_err)?;
            Ok(rows.len())
        })
    })
    .await
    .unwrap()
}
