//! Per-operation database sessions.
//!
//! Every store call opens its own connection, authenticated with a freshly
//! generated token, and closes it again when the operation finishes.

use std::{fmt, future::Future, pin::Pin, sync::Arc, sync::Once};

use sqlx::{AnyConnection, Connection};
use tracing::{debug, warn};

use gatebot_core::Result;

use crate::{auth::TokenProvider, db_err};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

static INSTALL_DRIVERS: Once = Once::new();

#[derive(Clone, PartialEq, Eq)]
pub enum DbTarget {
    /// Full sqlx URL, credentials included.
    Url(String),
    Postgres {
        host: String,
        port: u16,
        user: String,
        dbname: String,
        ssl_mode: String,
    },
}

impl DbTarget {
    /// Connection URL with `password` (if any) as the credential.
    pub fn connect_url(&self, password: Option<&str>) -> String {
        match self {
            DbTarget::Url(url) => url.clone(),
            DbTarget::Postgres {
                host,
                port,
                user,
                dbname,
                ssl_mode,
            } => {
                let user = urlencoding::encode(user);
                let auth = match password {
                    Some(p) => format!("{user}:{}", urlencoding::encode(p)),
                    None => user.into_owned(),
                };
                format!(
                    "postgres://{auth}@{host}:{port}/{}?sslmode={}",
                    urlencoding::encode(dbname),
                    urlencoding::encode(ssl_mode)
                )
            }
        }
    }
}

/// Never prints credentials.
impl fmt::Display for DbTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbTarget::Url(url) => {
                let scheme = url.split("://").next().unwrap_or("db");
                let rest = url.rsplit('@').next().unwrap_or(url);
                let rest = rest.split_once("://").map(|(_, r)| r).unwrap_or(rest);
                write!(f, "{scheme}://{rest}")
            }
            DbTarget::Postgres {
                host, port, dbname, ..
            } => write!(f, "postgres://{host}:{port}/{dbname}"),
        }
    }
}

impl fmt::Debug for DbTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DbTarget({self})")
    }
}

pub struct ConnectionManager {
    target: DbTarget,
    tokens: Arc<dyn TokenProvider>,
}

impl ConnectionManager {
    pub fn new(target: DbTarget, tokens: Arc<dyn TokenProvider>) -> Self {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
        Self { target, tokens }
    }

    pub fn target(&self) -> &DbTarget {
        &self.target
    }

    /// Open a new authenticated connection.
    ///
    /// Failures are logged here; callers only need to stop what they were doing.
    pub async fn acquire(&self) -> Result<Session> {
        let token = self.tokens.token().await.map_err(|e| {
            warn!(db = %self.target, error = %e, "failed to obtain database token");
            e
        })?;

        let url = self.target.connect_url(token.as_deref());
        match AnyConnection::connect(&url).await {
            Ok(conn) => {
                debug!(db = %self.target, "database session opened");
                Ok(Session { conn })
            }
            Err(e) => {
                warn!(db = %self.target, error = %e, "failed to open database connection");
                Err(db_err(e))
            }
        }
    }

    /// Run `op` on a fresh session and release it on every exit path.
    ///
    /// A panic inside `op` drops the connection, which closes the socket.
    pub async fn with_session<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut AnyConnection) -> BoxFuture<'c, Result<T>> + Send,
    {
        let mut session = self.acquire().await?;
        let out = op(session.conn()).await;
        session.release().await;
        out
    }
}

/// One open connection; release with [`Session::release`].
pub struct Session {
    conn: AnyConnection,
}

impl Session {
    pub fn conn(&mut self) -> &mut AnyConnection {
        &mut self.conn
    }

    pub async fn release(self) {
        if let Err(e) = self.conn.close().await {
            debug!(error = %e, "error while closing database session");
        }
    }
}
