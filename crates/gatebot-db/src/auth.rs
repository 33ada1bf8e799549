//! Credentials handed to the database on every connect.
//!
//! RDS IAM tokens are presigned SigV4 URLs for the `rds-db:connect` action,
//! valid for 15 minutes, so a fresh one is generated per connection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use gatebot_core::{errors::Error, Result};

type HmacSha256 = Hmac<Sha256>;

const SERVICE: &str = "rds-db";
const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const TOKEN_TTL_SECS: u32 = 900;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Password for the next connection, `None` if the target URL carries its own.
    async fn token(&self) -> Result<Option<String>>;
}

/// Target URL is used as-is.
pub struct NoToken;

#[async_trait]
impl TokenProvider for NoToken {
    async fn token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

pub struct StaticPassword(String);

impl StaticPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

#[async_trait]
impl TokenProvider for StaticPassword {
    async fn token(&self) -> Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// Generates RDS IAM authentication tokens.
pub struct RdsIamTokenProvider {
    credentials: AwsCredentials,
    region: String,
    host: String,
    port: u16,
    user: String,
}

impl RdsIamTokenProvider {
    pub fn new(
        credentials: AwsCredentials,
        region: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            region: region.into(),
            host: host.into(),
            port,
            user: user.into(),
        }
    }

    /// Token signed for the given instant.
    pub fn generate_at(&self, now: DateTime<Utc>) -> Result<String> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let endpoint = format!("{}:{}", self.host, self.port);
        let scope = format!("{date}/{}/{SERVICE}/aws4_request", self.region);

        let mut params: Vec<(&str, String)> = vec![
            ("Action", "connect".to_string()),
            ("DBUser", self.user.clone()),
            ("X-Amz-Algorithm", ALGORITHM.to_string()),
            (
                "X-Amz-Credential",
                format!("{}/{scope}", self.credentials.access_key_id),
            ),
            ("X-Amz-Date", amz_date.clone()),
            ("X-Amz-Expires", TOKEN_TTL_SECS.to_string()),
            ("X-Amz-SignedHeaders", "host".to_string()),
        ];
        if let Some(t) = &self.credentials.session_token {
            params.push(("X-Amz-Security-Token", t.clone()));
        }
        params.sort_by(|a, b| a.0.cmp(b.0));

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request = format!(
            "GET\n/\n{query}\nhost:{endpoint}\n\nhost\n{}",
            sha256_hex(b"")
        );
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let key = signing_key(
            &self.credentials.secret_access_key,
            &date,
            &self.region,
        )?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        Ok(format!("{endpoint}/?{query}&X-Amz-Signature={signature}"))
    }
}

#[async_trait]
impl TokenProvider for RdsIamTokenProvider {
    async fn token(&self) -> Result<Option<String>> {
        self.generate_at(Utc::now()).map(Some)
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| Error::External(format!("hmac key rejected: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn signing_key(secret: &str, date: &str, region: &str) -> Result<Vec<u8>> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}
