//! OAuth2 installed-app authentication for Google Drive.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, Url};
use tokio::sync::RwLock;

use crate::config::ClientConfig;
use crate::credentials::{Credential, CredentialStore};
use crate::error::{DriveError, Result};
use crate::models::{OAuthErrorResponse, TokenResponse};
use crate::prompt::Prompter;

/// Google Drive API scope.
///
/// Changing it requires deleting the cached credential.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

const STATE_TOKEN: &str = "state-token";

/// Refresh this long before the access token actually expires.
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// Talks to the remote authorization service.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// URL the user visits to grant access and obtain a one-time code.
    fn authorization_url(&self) -> Result<String>;

    /// Trade a one-time code for a credential.
    async fn exchange_code(&self, code: &str) -> Result<Credential>;

    /// Obtain a fresh access token from a refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<Credential>;
}

/// Supplies the one-time authorization code for a given authorization URL.
pub trait CodePrompt {
    fn prompt_code(&mut self, authorization_url: &str) -> Result<String>;
}

/// [`TokenExchange`] against Google's OAuth2 endpoints.
pub struct OAuthClient {
    config: ClientConfig,
    http: Client,
}

impl OAuthClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    async fn request_token(
        &self,
        params: &[(&str, &str)],
        on_error: fn(String) -> DriveError,
    ) -> Result<Credential> {
        let response = self
            .http
            .post(&self.config.token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| on_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OAuthErrorResponse>(&body)
                .map(|e| e.to_string())
                .unwrap_or(body);
            return Err(on_error(format!("Status {}: {}", status, message)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| on_error(e.to_string()))?;

        let expiry = match token.expires_in {
            Some(secs) => Some(
                Duration::try_seconds(secs)
                    .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
                    .ok_or_else(|| on_error(format!("expires_in out of range: {}", secs)))?,
            ),
            None => None,
        };

        Ok(Credential {
            access_token: token.access_token,
            token_type: token.token_type,
            refresh_token: token.refresh_token,
            expiry,
        })
    }
}

#[async_trait]
impl TokenExchange for OAuthClient {
    fn authorization_url(&self) -> Result<String> {
        let url = Url::parse_with_params(
            &self.config.auth_uri,
            &[
                ("access_type", "offline"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri()),
                ("response_type", "code"),
                ("scope", DRIVE_SCOPE),
                ("state", STATE_TOKEN),
            ],
        )
        .map_err(|e| DriveError::ConfigError(format!("auth_uri: {}", e)))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri()),
        ];
        self.request_token(&params, DriveError::AuthenticationError)
            .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        self.request_token(&params, DriveError::TokenRefreshError)
            .await
    }
}

const CODE_PROMPT: &str = "Authorization code";

/// Prints the authorization URL and asks for the code through a [`Prompter`].
///
/// The terminal prompter reads from the controlling terminal, so signing in
/// still works after piped stdin has been consumed.
pub struct InteractiveCodePrompt<'a> {
    prompter: &'a dyn Prompter,
}

impl<'a> InteractiveCodePrompt<'a> {
    pub fn new(prompter: &'a dyn Prompter) -> Self {
        Self { prompter }
    }
}

impl CodePrompt for InteractiveCodePrompt<'_> {
    fn prompt_code(&mut self, authorization_url: &str) -> Result<String> {
        println!(
            "Go to the following link in your browser then type the authorization code: \n{}",
            authorization_url
        );

        let input = self.prompter.ask(CODE_PROMPT, "").map_err(|e| {
            DriveError::AuthenticationError(format!("Unable to read authorization code: {}", e))
        })?;
        extract_code(&input)
    }
}

/// Accept either the bare code or the full redirect URL the browser landed on.
pub fn extract_code(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DriveError::AuthenticationError(
            "empty authorization code".to_string(),
        ));
    }

    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, code)| code.into_owned())
            .ok_or_else(|| {
                DriveError::AuthenticationError(format!("no code parameter in {}", trimmed))
            }),
        _ => Ok(trimmed.to_string()),
    }
}

/// Produces authenticated sessions from the cache or an interactive exchange.
pub struct Authenticator {
    exchange: Arc<dyn TokenExchange>,
    store: CredentialStore,
}

impl Authenticator {
    /// Create an authenticator using Google's endpoints from the client configuration.
    pub fn new(config: ClientConfig, store: CredentialStore) -> Self {
        Self::with_exchange(Arc::new(OAuthClient::new(config)), store)
    }

    pub fn with_exchange(exchange: Arc<dyn TokenExchange>, store: CredentialStore) -> Self {
        Self { exchange, store }
    }

    /// Load the cached credential, or run the code exchange and cache its result.
    pub async fn get_session(&self, prompt: &mut dyn CodePrompt) -> Result<Session> {
        let credential = match self.store.load() {
            Ok(credential) => {
                tracing::debug!(path = %self.store.path().display(), "using cached credential");
                credential
            }
            Err(_) => {
                tracing::info!("no cached credential, starting authorization");
                let url = self.exchange.authorization_url()?;
                let code = prompt.prompt_code(&url)?;
                let credential = self.exchange.exchange_code(&code).await?;

                println!("Saving credential file to: {}", self.store.path().display());
                self.store.save(&credential)?;
                credential
            }
        };

        Ok(Session {
            credential: Arc::new(RwLock::new(credential)),
            exchange: Arc::clone(&self.exchange),
            store: self.store.clone(),
        })
    }
}

/// A credential bound to the authorization service, refreshed on demand.
#[derive(Clone)]
pub struct Session {
    credential: Arc<RwLock<Credential>>,
    exchange: Arc<dyn TokenExchange>,
    store: CredentialStore,
}

impl Session {
    /// Get a valid access token, refreshing if necessary.
    pub async fn access_token(&self) -> Result<String> {
        let leeway = Duration::seconds(EXPIRY_LEEWAY_SECS);

        {
            let cached = self.credential.read().await;
            if !cached.expires_within(leeway) {
                return Ok(cached.access_token.clone());
            }
        }

        let mut cached = self.credential.write().await;
        let refresh_token = cached.refresh_token.clone().ok_or_else(|| {
            DriveError::AuthenticationError(format!(
                "access token expired and no refresh token is cached; delete {} and sign in again",
                self.store.path().display()
            ))
        })?;

        tracing::info!("access token expired, refreshing");
        let mut refreshed = self.exchange.refresh(&refresh_token).await?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token);
        }

        if let Err(e) = self.store.save(&refreshed) {
            tracing::warn!(error = %e, "failed to cache refreshed credential");
        }

        *cached = refreshed;
        Ok(cached.access_token.clone())
    }
}
