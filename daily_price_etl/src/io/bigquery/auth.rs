//! OAuth access tokens for the BigQuery API.
//!
//! Three credential sources are understood, mirroring Google's application
//! default credentials closely enough for a scheduled job:
//!
//! - a pre-minted bearer token (`BQ_ACCESS_TOKEN`), used verbatim;
//! - a credentials file (`GOOGLE_APPLICATION_CREDENTIALS`) holding either a
//!   `service_account` key, exchanged through a signed JWT assertion, or an
//!   `authorized_user` refresh token;
//! - the metadata server of the VM or container the job runs on.
//!
//! Minted tokens are cached and reused until shortly before they expire.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shared_utils::config::ConfigError;
use tokio::sync::Mutex;
use tracing::debug;

use crate::io::sink::LoadError;

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";
const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens this close to expiry are treated as already expired.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Where store credentials come from, as resolved from the environment.
#[derive(Debug)]
pub enum CredentialsSource {
    AccessToken(SecretString),
    KeyFile(PathBuf),
    MetadataServer { host: String },
}

impl CredentialsSource {
    pub fn describe(&self) -> &'static str {
        match self {
            CredentialsSource::AccessToken(_) => "access token",
            CredentialsSource::KeyFile(_) => "credentials file",
            CredentialsSource::MetadataServer { .. } => "metadata server",
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CredentialsFile {
    ServiceAccount {
        client_email: String,
        private_key: String,
        #[serde(default)]
        private_key_id: Option<String>,
        #[serde(default = "default_token_uri")]
        token_uri: String,
    },
    AuthorizedUser {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

enum Grant {
    Static(SecretString),
    ServiceAccount {
        client_email: String,
        key: EncodingKey,
        key_id: Option<String>,
        token_uri: String,
    },
    AuthorizedUser {
        client_id: String,
        client_secret: SecretString,
        refresh_token: SecretString,
        token_uri: String,
    },
    Metadata {
        url: String,
    },
}

struct CachedToken {
    token: SecretString,
    expires_at: Instant,
}

/// Hands out bearer tokens, minting and caching them as needed.
pub struct TokenProvider {
    grant: Grant,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    fn with_grant(grant: Grant) -> Self {
        Self {
            grant,
            cached: Mutex::new(None),
        }
    }

    pub fn static_token(token: SecretString) -> Self {
        Self::with_grant(Grant::Static(token))
    }

    /// Resolves `source` into a provider.
    ///
    /// Credentials files are read and validated here, so a broken file fails
    /// at startup rather than after the first symbol has been fetched.
    pub fn from_source(source: &CredentialsSource) -> Result<Self, ConfigError> {
        let grant = match source {
            CredentialsSource::AccessToken(token) => {
                Grant::Static(SecretString::new(token.expose_secret().into()))
            }
            CredentialsSource::KeyFile(path) => read_credentials_file(path)?,
            CredentialsSource::MetadataServer { host } => Grant::Metadata {
                url: format!(
                    "http://{host}/computeMetadata/v1/instance/service-accounts/default/token"
                ),
            },
        };
        Ok(Self::with_grant(grant))
    }

    /// Overrides the token endpoint of a credentials-file grant.
    pub fn with_token_uri(mut self, uri: impl Into<String>) -> Self {
        match &mut self.grant {
            Grant::ServiceAccount { token_uri, .. } | Grant::AuthorizedUser { token_uri, .. } => {
                *token_uri = uri.into();
            }
            Grant::Static(_) | Grant::Metadata { .. } => {}
        }
        self
    }

    /// Returns a token valid for at least [`REFRESH_MARGIN`].
    pub async fn access_token(&self, client: &Client) -> Result<SecretString, LoadError> {
        if let Grant::Static(token) = &self.grant {
            return Ok(SecretString::new(token.expose_secret().into()));
        }

        let mut cached = self.cached.lock().await;
        if let Some(current) = cached.as_ref() {
            if current.expires_at > Instant::now() + REFRESH_MARGIN {
                return Ok(SecretString::new(current.token.expose_secret().into()));
            }
        }

        let fresh = self.mint(client).await?;
        let token = SecretString::new(fresh.token.expose_secret().into());
        *cached = Some(fresh);
        Ok(token)
    }

    async fn mint(&self, client: &Client) -> Result<CachedToken, LoadError> {
        let request = self.token_request(client)?;
        let response = request
            .send()
            .await
            .map_err(|e| LoadError::Auth(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LoadError::Auth(format!(
                "token endpoint returned HTTP {status}: {body}"
            )));
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|e| LoadError::Auth(format!("unreadable token response: {e}")))?;
        let lifetime = Duration::from_secs(payload.expires_in.unwrap_or(3600));
        debug!(lifetime_secs = lifetime.as_secs(), "minted access token");

        Ok(CachedToken {
            token: SecretString::new(payload.access_token.into()),
            expires_at: Instant::now() + lifetime,
        })
    }

    fn token_request(&self, client: &Client) -> Result<RequestBuilder, LoadError> {
        let request = match &self.grant {
            Grant::ServiceAccount {
                client_email,
                key,
                key_id,
                token_uri,
            } => {
                let now = Utc::now().timestamp();
                let claims = AssertionClaims {
                    iss: client_email,
                    scope: BIGQUERY_SCOPE,
                    aud: token_uri,
                    iat: now,
                    exp: now + ASSERTION_LIFETIME_SECS,
                };
                let mut header = Header::new(Algorithm::RS256);
                header.kid = key_id.clone();
                let assertion = jsonwebtoken::encode(&header, &claims, key)
                    .map_err(|e| LoadError::Auth(format!("failed to sign assertion: {e}")))?;
                client
                    .post(token_uri)
                    .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            }
            Grant::AuthorizedUser {
                client_id,
                client_secret,
                refresh_token,
                token_uri,
            } => client.post(token_uri).form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.expose_secret()),
                ("refresh_token", refresh_token.expose_secret()),
            ]),
            Grant::Metadata { url } => client.get(url).header("Metadata-Flavor", "Google"),
            Grant::Static(_) => {
                return Err(LoadError::Auth(
                    "static tokens are never minted".to_string(),
                ));
            }
        };
        Ok(request)
    }
}

fn read_credentials_file(path: &Path) -> Result<Grant, ConfigError> {
    const VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::invalid(VAR, format!("cannot read {}: {e}", path.display())))?;
    let file: CredentialsFile = serde_json::from_str(&raw).map_err(|e| {
        ConfigError::invalid(VAR, format!("cannot parse {}: {e}", path.display()))
    })?;

    let grant = match file {
        CredentialsFile::ServiceAccount {
            client_email,
            private_key,
            private_key_id,
            token_uri,
        } => Grant::ServiceAccount {
            key: EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(|e| {
                ConfigError::invalid(VAR, format!("invalid private key in {}: {e}", path.display()))
            })?,
            client_email,
            key_id: private_key_id,
            token_uri,
        },
        CredentialsFile::AuthorizedUser {
            client_id,
            client_secret,
            refresh_token,
        } => Grant::AuthorizedUser {
            client_id,
            client_secret: SecretString::new(client_secret.into()),
            refresh_token: SecretString::new(refresh_token.into()),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
        },
    };
    Ok(grant)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn static_token_is_returned_verbatim() {
        let provider = TokenProvider::static_token(SecretString::new("abc".into()));
        let token = provider.access_token(&Client::new()).await.unwrap();
        assert_eq!(token.expose_secret(), "abc");
    }

    #[test]
    fn authorized_user_file_is_accepted() {
        let file = write_file(
            r#"{"type": "authorized_user", "client_id": "id", "client_secret": "s", "refresh_token": "r"}"#,
        );
        let provider =
            TokenProvider::from_source(&CredentialsSource::KeyFile(file.path().to_path_buf()))
                .unwrap();
        assert!(matches!(provider.grant, Grant::AuthorizedUser { .. }));
    }

    #[test]
    fn unreadable_or_unknown_files_are_config_errors() {
        let missing = CredentialsSource::KeyFile(PathBuf::from("/nonexistent/adc.json"));
        assert!(matches!(
            TokenProvider::from_source(&missing),
            Err(ConfigError::InvalidValue { .. })
        ));

        let file = write_file(r#"{"type": "external_account"}"#);
        let unknown = CredentialsSource::KeyFile(file.path().to_path_buf());
        assert!(matches!(
            TokenProvider::from_source(&unknown),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn service_account_with_bad_key_is_rejected_up_front() {
        let file = write_file(
            r#"{"type": "service_account", "client_email": "etl@p.iam.gserviceaccount.com", "private_key": "not a pem"}"#,
        );
        let source = CredentialsSource::KeyFile(file.path().to_path_buf());
        match TokenProvider::from_source(&source) {
            Err(ConfigError::InvalidValue { message, .. }) => {
                assert!(message.contains("invalid private key"));
            }
            _ => panic!("expected an invalid private key error"),
        }
    }
}
