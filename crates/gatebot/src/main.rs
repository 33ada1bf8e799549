use std::sync::Arc;

use tracing::{info, warn};

use gatebot_core::{access::Tier, config::Config, domain::TeleUser, ports::AccessStore};
use gatebot_db::Database;

#[tokio::main]
async fn main() -> Result<(), gatebot_core::Error> {
    gatebot_core::logging::init("gatebot")?;

    let cfg = Arc::new(Config::load()?);
    let db = Database::from_config(&cfg.database);

    if cfg.ensure_schema {
        db.ensure_schema().await?;
    }

    if let Some(owner) = cfg.owner_id {
        match db.access().add(&TeleUser::new(owner, "owner", None), Tier::OWNER).await {
            Ok(true) => info!(tele_id = %owner, "seeded bot owner"),
            Ok(false) => {}
            Err(e) => warn!(tele_id = %owner, error = %e, "failed to seed bot owner"),
        }
    }

    gatebot_telegram::router::run_polling(cfg, db.stores())
        .await
        .map_err(|e| gatebot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
