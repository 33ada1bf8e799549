//! Database adapter (sqlx).
//!
//! Implements the `gatebot-core` store ports over the `log`, `whitelist` and
//! `admin_access` tables. Each operation opens and closes its own connection.

use std::sync::Arc;

use gatebot_core::{
    config::{DatabaseConfig, DbAuth},
    dispatcher::Stores,
    errors::Error,
    Result,
};

pub mod access;
pub mod audit;
pub mod auth;
pub mod connection;
pub mod schema;
pub mod whitelist;

#[cfg(test)]
mod testing;

pub use access::SqlAccessStore;
pub use audit::SqlAuditLog;
pub use whitelist::SqlWhitelist;

use auth::{AwsCredentials, NoToken, RdsIamTokenProvider, StaticPassword, TokenProvider};
use connection::{ConnectionManager, DbTarget};

pub(crate) fn db_err(e: sqlx::Error) -> Error {
    Error::Database(e.to_string())
}

/// Entry point: builds the connection manager and the three stores.
#[derive(Clone)]
pub struct Database {
    manager: Arc<ConnectionManager>,
}

impl Database {
    pub fn new(manager: ConnectionManager) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }

    pub fn from_config(cfg: &DatabaseConfig) -> Self {
        let (target, tokens) = match cfg {
            DatabaseConfig::Url(url) => (
                DbTarget::Url(url.clone()),
                Arc::new(NoToken) as Arc<dyn TokenProvider>,
            ),
            DatabaseConfig::Postgres {
                host,
                port,
                user,
                dbname,
                ssl_mode,
                auth,
            } => {
                let tokens: Arc<dyn TokenProvider> = match auth {
                    DbAuth::Password(p) => Arc::new(StaticPassword::new(p.clone())),
                    DbAuth::RdsIam {
                        region,
                        access_key_id,
                        secret_access_key,
                        session_token,
                    } => Arc::new(RdsIamTokenProvider::new(
                        AwsCredentials {
                            access_key_id: access_key_id.clone(),
                            secret_access_key: secret_access_key.clone(),
                            session_token: session_token.clone(),
                        },
                        region.clone(),
                        host.clone(),
                        *port,
                        user.clone(),
                    )),
                };
                let target = DbTarget::Postgres {
                    host: host.clone(),
                    port: *port,
                    user: user.clone(),
                    dbname: dbname.clone(),
                    ssl_mode: ssl_mode.clone(),
                };
                (target, tokens)
            }
        };
        Self::new(ConnectionManager::new(target, tokens))
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        schema::ensure(&self.manager).await
    }

    pub fn audit(&self) -> SqlAuditLog {
        SqlAuditLog::new(self.manager.clone())
    }

    pub fn whitelist(&self) -> SqlWhitelist {
        SqlWhitelist::new(self.manager.clone())
    }

    pub fn access(&self) -> SqlAccessStore {
        SqlAccessStore::new(self.manager.clone())
    }

    pub fn stores(&self) -> Stores {
        Stores {
            audit: Arc::new(self.audit()),
            whitelist: Arc::new(self.whitelist()),
            access: Arc::new(self.access()),
        }
    }
}
