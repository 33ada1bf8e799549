use std::{env, fs, path::Path};

use crate::{access::Authorizer, domain::UserId, errors::Error, Result};

/// Where the database lives and how to authenticate to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// Full sqlx URL (`postgres://...`, `sqlite://...`), used verbatim.
    Url(String),
    /// Postgres endpoint; the password comes from [`DbAuth`] on every connect.
    Postgres {
        host: String,
        port: u16,
        user: String,
        dbname: String,
        ssl_mode: String,
        auth: DbAuth,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub enum DbAuth {
    Password(String),
    /// Short-lived RDS IAM token, regenerated per connection.
    RdsIam {
        region: String,
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    },
}

impl std::fmt::Debug for DbAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbAuth::Password(_) => f.write_str("Password(<redacted>)"),
            DbAuth::RdsIam { region, .. } => f
                .debug_struct("RdsIam")
                .field("region", region)
                .finish_non_exhaustive(),
        }
    }
}

/// Typed configuration, read from the environment (and `.env` if present).
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database: DatabaseConfig,
    /// Create the three tables at startup if they are missing.
    pub ensure_schema: bool,
    /// Seeded as tier 0 at startup so an empty database is usable.
    pub owner_id: Option<UserId>,
    pub access_authorizer: Authorizer,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in `load`).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| get(key).and_then(non_empty);

        let telegram_bot_token = var("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;

        let database = match var("DATABASE_URL") {
            Some(url) => DatabaseConfig::Url(url),
            None => postgres_from(&var)?,
        };

        let ensure_schema = var("DB_ENSURE_SCHEMA").map(|s| is_truthy(&s)).unwrap_or(false);

        let owner_id = match var("BOT_OWNER_ID") {
            Some(raw) => Some(UserId(raw.trim().parse::<i64>().map_err(|_| {
                Error::Config(format!("BOT_OWNER_ID is not a numeric user id: {raw}"))
            })?)),
            None => None,
        };

        let access_authorizer = match var("ACCESS_REMOVAL_AUTHORIZER") {
            Some(id) => Authorizer::Fixed(id.trim().to_string()),
            None => Authorizer::Caller,
        };

        Ok(Self {
            telegram_bot_token,
            database,
            ensure_schema,
            owner_id,
            access_authorizer,
        })
    }
}

fn postgres_from(var: &impl Fn(&str) -> Option<String>) -> Result<DatabaseConfig> {
    let required = |key: &str| {
        var(key).ok_or_else(|| {
            Error::Config(format!(
                "{key} environment variable is required when DATABASE_URL is not set"
            ))
        })
    };

    let host = required("DB_ENDPOINT")?;
    let user = required("DB_USER")?;
    let dbname = required("DB_NAME")?;
    let port = match var("DB_PORT") {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|_| Error::Config(format!("DB_PORT is not a valid port: {raw}")))?,
        None => 5432,
    };
    let ssl_mode = var("DB_SSL_MODE").unwrap_or_else(|| "require".to_string());

    let auth = match var("DB_PASSWORD") {
        Some(password) => DbAuth::Password(password),
        None => DbAuth::RdsIam {
            region: required("AWS_REGION")?,
            access_key_id: required("AWS_ACCESS_KEY_ID")?,
            secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
            session_token: var("AWS_SESSION_TOKEN"),
        },
    };

    Ok(DatabaseConfig::Postgres {
        host,
        port,
        user,
        dbname,
        ssl_mode,
        auth,
    })
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn is_truthy(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn requires_bot_token() {
        let err = load(&[("DATABASE_URL", "sqlite://x.db")]).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn database_url_wins() {
        let cfg = load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("DATABASE_URL", "sqlite://bot.db"),
            ("DB_ENDPOINT", "ignored"),
        ])
        .unwrap();
        assert_eq!(cfg.database, DatabaseConfig::Url("sqlite://bot.db".to_string()));
        assert_eq!(cfg.access_authorizer, Authorizer::Caller);
        assert!(!cfg.ensure_schema);
    }

    #[test]
    fn falls_back_to_rds_iam_without_password() {
        let cfg = load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("DB_ENDPOINT", "db.example.rds.amazonaws.com"),
            ("DB_USER", "bot"),
            ("DB_NAME", "bot"),
            ("AWS_REGION", "eu-central-1"),
            ("AWS_ACCESS_KEY_ID", "AKID"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ])
        .unwrap();
        match cfg.database {
            DatabaseConfig::Postgres {
                port,
                ssl_mode,
                auth: DbAuth::RdsIam { region, .. },
                ..
            } => {
                assert_eq!(port, 5432);
                assert_eq!(ssl_mode, "require");
                assert_eq!(region, "eu-central-1");
            }
            other => panic!("unexpected database config: {other:?}"),
        }
    }

    #[test]
    fn missing_postgres_fields_are_reported() {
        let err = load(&[("TELEGRAM_BOT_TOKEN", "t"), ("DB_ENDPOINT", "h")]).unwrap_err();
        assert!(err.to_string().contains("DB_USER"));
    }

    #[test]
    fn parses_owner_and_legacy_authorizer() {
        let cfg = load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("DATABASE_URL", "sqlite://bot.db"),
            ("BOT_OWNER_ID", "12345"),
            ("ACCESS_REMOVAL_AUTHORIZER", "1337"),
            ("DB_ENSURE_SCHEMA", "yes"),
        ])
        .unwrap();
        assert_eq!(cfg.owner_id, Some(UserId(12345)));
        assert_eq!(cfg.access_authorizer, Authorizer::Fixed("1337".to_string()));
        assert!(cfg.ensure_schema);

        assert!(load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("DATABASE_URL", "sqlite://bot.db"),
            ("BOT_OWNER_ID", "me"),
        ])
        .is_err());
    }

    #[test]
    fn password_debug_is_redacted() {
        let auth = DbAuth::Password("hunter2".to_string());
        assert!(!format!("{auth:?}").contains("hunter2"));
    }

    #[test]
    fn strips_matching_quotes_only() {
        assert_eq!(strip_quotes("\"abc\""), "abc");
        assert_eq!(strip_quotes("'abc'"), "abc");
        assert_eq!(strip_quotes("\"abc'"), "\"abc'");
    }
}
