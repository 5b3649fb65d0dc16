//! Google OAuth access for the Sheets backend.
//!
//! A service account key is traded for a short-lived bearer token with the
//! JWT bearer grant: an RS256-signed assertion naming the account, the
//! requested [`SCOPES`] and the token endpoint. Tokens are cached and minted
//! again shortly before they expire. A ready-made access token can be used
//! instead, e.g. from an environment variable.

use std::cell::RefCell;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, Result};

/// OAuth scopes requested for the service account
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime asked for in the assertion; Google caps it at one hour
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// A cached token this close to expiry is replaced
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service account key file this crate needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

/// A bearer token and when it stops being accepted
#[derive(Debug, Clone)]
struct AccessToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

impl ServiceAccountKey {
    /// Signed JWT asking for [`SCOPES`] on behalf of the account.
    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SCOPES.join(" "),
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(|e| {
            InventoryError::Credentials(format!("invalid service account private key: {e}"))
        })?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| InventoryError::Credentials(format!("failed to sign assertion: {e}")))
    }

    /// Exchanges a fresh assertion for an access token.
    fn fetch_token(&self, client: &Client) -> Result<AccessToken> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;
        log::debug!("Requesting access token for {} at {}", self.client_email, self.token_uri);

        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InventoryError::Credentials(format!(
                "token exchange for {} failed with {status}: {body}",
                self.client_email
            )));
        }
        let token: TokenResponse = response.json()?;
        Ok(AccessToken {
            secret: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

/// Shapes of credentials file accepted by [`Credentials::from_file`]
#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    Token { access_token: String },
}

/// How the Sheets backend authenticates
#[derive(Clone)]
pub enum Credentials {
    /// A bearer token minted elsewhere, used as-is
    AccessToken(String),
    /// A service account key, traded for tokens as needed
    ServiceAccount(ServiceAccountKey),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::AccessToken(token) => f
                .debug_tuple("AccessToken")
                .field(&format!("<{} chars>", token.len()))
                .finish(),
            Credentials::ServiceAccount(key) => f.debug_tuple("ServiceAccount").field(key).finish(),
        }
    }
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Credentials::AccessToken(access_token.into())
    }

    /// Reads a service account key file, or a JSON secret with an `access_token` field.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let credentials = match serde_json::from_str::<CredentialsFile>(content)? {
            CredentialsFile::ServiceAccount(key) => Credentials::ServiceAccount(key),
            CredentialsFile::Token { access_token } => Credentials::AccessToken(access_token),
        };
        credentials.checked()
    }

    /// Takes a token from `env_var` if set, else reads `file`.
    pub fn resolve(env_var: &str, file: Option<&Path>) -> Result<Self> {
        if let Ok(token) = std::env::var(env_var) {
            log::debug!("Using access token from ${env_var}");
            return Self::new(token).checked();
        }
        match file {
            Some(path) => {
                log::debug!("Using credentials from {}", path.display());
                Self::from_file(path)
            }
            None => Err(InventoryError::Credentials(format!(
                "configure a service account key file or set ${env_var} (scopes: {})",
                SCOPES.join(", ")
            ))),
        }
    }

    fn checked(self) -> Result<Self> {
        let empty = match &self {
            Credentials::AccessToken(token) => token.trim().is_empty(),
            Credentials::ServiceAccount(key) => {
                key.client_email.trim().is_empty() || key.private_key.trim().is_empty()
            }
        };
        if empty {
            return Err(InventoryError::Credentials(
                "credentials are empty".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Hands out bearer tokens for a set of credentials, caching minted ones.
pub struct TokenSource {
    credentials: Credentials,
    cached: RefCell<Option<AccessToken>>,
}

impl TokenSource {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            cached: RefCell::new(None),
        }
    }

    /// Returns a token valid for at least [`REFRESH_MARGIN_SECS`] more seconds.
    pub fn bearer(&self, client: &Client) -> Result<String> {
        let key = match &self.credentials {
            Credentials::AccessToken(token) => return Ok(token.clone()),
            Credentials::ServiceAccount(key) => key,
        };

        let cached = self
            .cached
            .borrow()
            .as_ref()
            .filter(|token| token.is_fresh(Utc::now()))
            .map(|token| token.secret.clone());
        if let Some(secret) = cached {
            return Ok(secret);
        }

        let token = key.fetch_token(client)?;
        log::info!(
            "Obtained access token for {} (valid until {})",
            key.client_email,
            token.expires_at
        );
        let secret = token.secret.clone();
        *self.cached.borrow_mut() = Some(token);
        Ok(secret)
    }
}
