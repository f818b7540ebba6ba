//! OAuth authentication for Gmail API
//!
//! Handles OAuth 2.0 authentication flow including:
//! - Loading client credentials
//! - Interactive browser-based authentication
//! - Token storage and refresh

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{AuthError, MailPalError, Result};

/// Refresh tokens this many seconds before they expire
const EXPIRY_MARGIN_SECS: i64 = 300;

/// OAuth client credentials
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthKeys {
    /// Client ID
    pub client_id: String,

    /// Client secret
    pub client_secret: String,

    /// Auth URI
    pub auth_uri: String,

    /// Token URI
    pub token_uri: String,
}

/// OAuth keys file format (can be "installed" or "web")
#[derive(Debug, Deserialize)]
struct OAuthKeysFile {
    #[serde(alias = "web")]
    installed: Option<OAuthKeys>,
}

/// Stored credentials (tokens)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Access token
    pub access_token: String,

    /// Refresh token
    pub refresh_token: Option<String>,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Expiry timestamp (Unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,

    /// Scopes
    #[serde(default)]
    pub scope: String,
}

impl StoredCredentials {
    /// Whether the access token is expired or about to expire
    pub fn needs_refresh(&self, now: i64) -> bool {
        matches!(self.expiry_date, Some(expiry) if expiry - now < EXPIRY_MARGIN_SECS)
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Token response from OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: Option<i64>,
    #[serde(default)]
    scope: String,
}

impl TokenResponse {
    fn into_credentials(self, fallback_refresh: Option<String>) -> StoredCredentials {
        let now = chrono::Utc::now().timestamp();
        StoredCredentials {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(fallback_refresh),
            token_type: self.token_type,
            expiry_date: self.expires_in.map(|e| now + e),
            scope: self.scope,
        }
    }
}

/// OAuth authenticator
pub struct Authenticator {
    /// Configuration
    config: Config,

    /// HTTP client
    http_client: reqwest::Client,

    /// OAuth client credentials
    keys: OAuthKeys,

    /// Current credentials (tokens)
    credentials: Arc<RwLock<Option<StoredCredentials>>>,
}

impl Authenticator {
    /// Create a new authenticator from the files named in `config`
    pub async fn new(config: Config) -> Result<Self> {
        config.find_and_copy_oauth_keys()?;

        let keys = Self::load_oauth_keys(&config.oauth_path)?;

        let credentials = if config.credentials_exist() {
            match Self::load_credentials(&config.credentials_path).await {
                Ok(creds) => Some(creds),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable credentials file: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self::with_credentials(config, keys, credentials))
    }

    /// Create an authenticator from already-loaded keys and tokens
    pub fn with_credentials(
        config: Config,
        keys: OAuthKeys,
        credentials: Option<StoredCredentials>,
    ) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            keys,
            credentials: Arc::new(RwLock::new(credentials)),
        }
    }

    /// Load OAuth keys from file
    fn load_oauth_keys(path: &Path) -> Result<OAuthKeys> {
        if !path.exists() {
            return Err(MailPalError::Auth(AuthError::KeysFileNotFound {
                path: path.display().to_string(),
            }));
        }

        let content = std::fs::read_to_string(path)?;
        let keys_file: OAuthKeysFile = serde_json::from_str(&content)?;

        keys_file
            .installed
            .ok_or(MailPalError::Auth(AuthError::InvalidKeysFormat))
    }

    /// Load stored credentials from file
    async fn load_credentials(path: &Path) -> Result<StoredCredentials> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save credentials to file
    async fn save_credentials(&self, credentials: &StoredCredentials) -> Result<()> {
        let content = serde_json::to_string_pretty(credentials)?;
        tokio::fs::write(&self.config.credentials_path, content).await?;
        Ok(())
    }

    /// Check if we have credentials
    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Get a valid access token, refreshing if necessary
    pub async fn get_access_token(&self) -> Result<String> {
        let refresh_token = {
            let guard = self.credentials.read().await;
            let Some(creds) = guard.as_ref() else {
                return Err(MailPalError::Auth(AuthError::CredentialsNotFound {
                    path: self.config.credentials_path.display().to_string(),
                }));
            };

            if !creds.needs_refresh(chrono::Utc::now().timestamp()) {
                return Ok(creds.access_token.clone());
            }

            creds.refresh_token.clone()
        };

        let refresh_token = refresh_token.ok_or_else(|| {
            MailPalError::Auth(AuthError::TokenRefreshFailed {
                message: "No refresh token available".to_string(),
            })
        })?;

        self.refresh_token(refresh_token).await
    }

    /// Refresh the access token using the refresh token
    async fn refresh_token(&self, refresh_token: String) -> Result<String> {
        tracing::info!("Refreshing Gmail access token");

        let params = [
            ("client_id", self.keys.client_id.as_str()),
            ("client_secret", self.keys.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.keys.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MailPalError::Auth(AuthError::TokenRefreshFailed {
                message: text,
            }));
        }

        let token_response: TokenResponse = response.json().await?;
        let new_credentials = token_response.into_credentials(Some(refresh_token));

        self.save_credentials(&new_credentials).await?;
        let access_token = new_credentials.access_token.clone();
        *self.credentials.write().await = Some(new_credentials);

        Ok(access_token)
    }

    /// Generate the authorization URL
    pub fn generate_auth_url(&self) -> String {
        let scopes = self.config.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.keys.auth_uri,
            urlencoding::encode(&self.keys.client_id),
            urlencoding::encode(&self.config.oauth_callback_url),
            urlencoding::encode(&scopes)
        )
    }

    /// Exchange authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<StoredCredentials> {
        let params = [
            ("client_id", self.keys.client_id.as_str()),
            ("client_secret", self.keys.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.oauth_callback_url.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.keys.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MailPalError::Auth(AuthError::TokenExchangeFailed {
                message: text,
            }));
        }

        let token_response: TokenResponse = response.json().await?;
        let credentials = token_response.into_credentials(None);

        self.save_credentials(&credentials).await?;
        *self.credentials.write().await = Some(credentials.clone());

        Ok(credentials)
    }

    /// Run interactive authentication flow with local HTTP server
    pub async fn authenticate_interactive(&self) -> Result<()> {
        use axum::{extract::Query, response::Html, routing::get, Router};
        use std::collections::HashMap;
        use tokio::sync::oneshot;

        let auth_url = self.generate_auth_url();
        eprintln!("\nPlease visit this URL to authenticate:");
        eprintln!("{}\n", auth_url);

        if let Err(e) = open::that(&auth_url) {
            eprintln!("Could not open browser automatically: {}", e);
            eprintln!("Please open the URL manually.");
        }

        let (tx, rx) = oneshot::channel::<String>();
        let tx = Arc::new(std::sync::Mutex::new(Some(tx)));

        let callback_handler = move |Query(params): Query<HashMap<String, String>>| async move {
            let Some(code) = params.get("code") else {
                return Html("<html><body><h1>Authentication failed</h1><p>No authorization code received.</p></body></html>");
            };
            let sender = match tx.lock() {
                Ok(mut slot) => slot.take(),
                Err(poisoned) => poisoned.into_inner().take(),
            };
            if let Some(sender) = sender {
                let _ = sender.send(code.clone());
            }
            Html("<html><body><h1>MailPal is connected!</h1><p>You can close this window.</p></body></html>")
        };

        let app = Router::new().route("/oauth2callback", get(callback_handler));

        let addr = std::net::SocketAddr::from(([127, 0, 0, 1], self.config.oauth_callback_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        eprintln!(
            "Waiting for authentication callback on port {}...",
            self.config.oauth_callback_port
        );

        let server = axum::serve(listener, app);

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    return Err(MailPalError::Auth(AuthError::CallbackError {
                        message: e.to_string(),
                    }));
                }
            }
            code = rx => {
                let code = code.map_err(|_| MailPalError::Auth(AuthError::NoAuthCode))?;
                eprintln!("Received authorization code, exchanging for tokens...");
                self.exchange_code(&code).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keys() -> OAuthKeys {
        OAuthKeys {
            client_id: "test-client-id".to_string(),
            client_secret: "test-secret".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        }
    }

    #[test]
    fn test_oauth_keys_deserialize() {
        let json = r#"{
            "web": {
                "client_id": "test-client-id",
                "client_secret": "test-secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost"]
            }
        }"#;

        let keys_file: OAuthKeysFile = serde_json::from_str(json).unwrap();
        assert_eq!(keys_file.installed.unwrap().client_id, "test-client-id");
    }

    #[test]
    fn test_needs_refresh() {
        let mut creds = StoredCredentials {
            access_token: "token".to_string(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            expiry_date: None,
            scope: String::new(),
        };
        assert!(!creds.needs_refresh(1_000));

        creds.expiry_date = Some(1_000 + 3_600);
        assert!(!creds.needs_refresh(1_000));

        creds.expiry_date = Some(1_000 + 60);
        assert!(creds.needs_refresh(1_000));
    }

    #[test]
    fn test_auth_url_contains_scope_and_callback() {
        let config = Config::with_config_dir("/tmp/mailpal-auth-test");
        let auth = Authenticator::with_credentials(config, test_keys(), None);
        let url = auth.generate_auth_url();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?client_id=test-client-id"));
        assert!(url.contains(&*urlencoding::encode("https://www.googleapis.com/auth/gmail.modify")));
        assert!(url.contains("access_type=offline"));
    }

    #[tokio::test]
    async fn test_access_token_without_credentials() {
        let config = Config::with_config_dir("/tmp/mailpal-auth-test");
        let auth = Authenticator::with_credentials(config, test_keys(), None);
        assert!(!auth.is_authenticated().await);
        let err = auth.get_access_token().await.unwrap_err();
        assert!(matches!(err, MailPalError::Auth(AuthError::CredentialsNotFound { .. })));
    }

    #[tokio::test]
    async fn test_fresh_token_returned_without_refresh() {
        let config = Config::with_config_dir("/tmp/mailpal-auth-test");
        let creds = StoredCredentials {
            access_token: "fresh".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_type: "Bearer".to_string(),
            expiry_date: Some(chrono::Utc::now().timestamp() + 3_600),
            scope: String::new(),
        };
        let auth = Authenticator::with_credentials(config, test_keys(), Some(creds));
        assert_eq!(auth.get_access_token().await.unwrap(), "fresh");
    }
}
