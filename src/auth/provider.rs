use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, error, info, warn};
use serde::Deserialize;

use super::models::{Account, AuthenticationResult, DeviceCodePrompt, TokenInfo};
use crate::config::GraphAuthConfig;

/// Rendering hook for the sign-in instructions, injected at construction so
/// sign-in logic stays free of console formatting.
pub type PromptCallback = dyn Fn(&DeviceCodePrompt) + Send + Sync;

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Tokens this close to expiry are renewed instead of reused.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Identity provider built on the OAuth 2.0 device authorization grant.
///
/// Holds the signed-in account in memory only; nothing is persisted across
/// runs.
pub struct DeviceCodeAuthProvider {
    http_client: reqwest::Client,
    config: GraphAuthConfig,
    account: Option<Account>,
    on_prompt: Box<PromptCallback>,
}

#[derive(Deserialize)]
struct DeviceAuthorizationResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default = "default_poll_interval")]
    interval: u64,
    #[serde(default)]
    message: Option<String>,
}

fn default_poll_interval() -> u64 {
    5
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
}

fn default_token_lifetime() -> u64 {
    3600
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl DeviceCodeAuthProvider {
    pub fn new(config: GraphAuthConfig, on_prompt: Box<PromptCallback>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("m365-assistant/0.1")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            config,
            account: None,
            on_prompt,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.account.is_some()
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    fn device_code_url(&self) -> String {
        format!(
            "{}/oauth2/v2.0/devicecode",
            self.config.authority.trim_end_matches('/')
        )
    }

    fn token_url(&self) -> String {
        format!(
            "{}/oauth2/v2.0/token",
            self.config.authority.trim_end_matches('/')
        )
    }

    /// Interactive device-code sign-in. Surfaces the verification URL and
    /// user code through the prompt callback, then polls the token endpoint
    /// until the user completes the flow or the code expires.
    pub async fn authenticate_device_code(&mut self) -> Result<AuthenticationResult> {
        info!(
            "Starting device code authentication against {}",
            self.config.authority
        );

        let scope = self.config.scopes.join(" ");
        let response = self
            .http_client
            .post(self.device_code_url())
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .context("Device authorization request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Device authorization request returned {status}: {body}");
            anyhow::bail!("Device authorization failed with status {}: {}", status, body);
        }

        let authorization: DeviceAuthorizationResponse = response
            .json()
            .await
            .context("Failed to parse device authorization response")?;

        let prompt = DeviceCodePrompt {
            verification_uri: authorization.verification_uri.clone(),
            user_code: authorization.user_code.clone(),
            expires_in_secs: authorization.expires_in,
            message: authorization.message.clone(),
        };
        (self.on_prompt)(&prompt);

        let tokens = self.poll_for_tokens(&authorization).await?;
        let result = AuthenticationResult {
            access_token: tokens.access_token.clone(),
            expires_on: tokens.expires_at,
            account: Account { tokens },
        };

        self.account = Some(result.account.clone());
        info!("Device code authentication succeeded");
        Ok(result)
    }

    async fn poll_for_tokens(
        &self,
        authorization: &DeviceAuthorizationResponse,
    ) -> Result<TokenInfo> {
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(authorization.expires_in);
        let mut interval = authorization.interval;

        loop {
            tokio::time::sleep(Duration::from_secs(interval)).await;

            if tokio::time::Instant::now() >= deadline {
                anyhow::bail!("Device code expired before sign-in completed");
            }

            let response = self
                .http_client
                .post(self.token_url())
                .form(&[
                    ("grant_type", DEVICE_CODE_GRANT),
                    ("client_id", self.config.client_id.as_str()),
                    ("device_code", authorization.device_code.as_str()),
                ])
                .send()
                .await
                .context("Token request failed")?;

            if response.status().is_success() {
                let tokens: TokenResponse = response
                    .json()
                    .await
                    .context("Failed to parse token response")?;
                return Ok(token_info_from(tokens));
            }

            let error: TokenErrorResponse = response
                .json()
                .await
                .context("Failed to parse token error response")?;

            match error.error.as_str() {
                "authorization_pending" => {
                    debug!("Sign-in not completed yet, polling again in {interval}s");
                }
                "slow_down" => {
                    interval += 5;
                    debug!("Identity provider asked to slow down, polling every {interval}s");
                }
                _ => {
                    let description = error
                        .error_description
                        .unwrap_or_else(|| error.error.clone());
                    error!("Device code sign-in failed: {description}");
                    anyhow::bail!("Authentication failed: {description}");
                }
            }
        }
    }

    /// Renew the access token from the cached account without user
    /// interaction. `Ok(None)` means no usable token is available and a
    /// full sign-in is required; that condition is expected, not an error.
    pub async fn get_access_token_silent(&mut self) -> Result<Option<String>> {
        let Some(account) = self.account.as_ref() else {
            return Ok(None);
        };

        if !is_near_expiry(&account.tokens) {
            debug!("Using cached access token");
            return Ok(Some(account.tokens.access_token.clone()));
        }

        let Some(refresh_token) = account.tokens.refresh_token.clone() else {
            warn!("Cached token expired and no refresh token is available");
            return Ok(None);
        };

        debug!("Cached token expired, attempting refresh");
        match self.redeem_refresh_token(&refresh_token).await {
            Ok(tokens) => {
                let access_token = tokens.access_token.clone();
                self.account = Some(Account { tokens });
                Ok(Some(access_token))
            }
            Err(err) => {
                warn!("Silent token renewal failed, re-authentication needed: {err:#}");
                Ok(None)
            }
        }
    }

    async fn redeem_refresh_token(&self, refresh_token: &str) -> Result<TokenInfo> {
        let scope = self.config.scopes.join(" ");
        let response = self
            .http_client
            .post(self.token_url())
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.config.client_id.as_str()),
                ("refresh_token", refresh_token),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .context("Refresh token request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Refresh token request failed with status {}: {}", status, body);
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .context("Failed to parse refresh token response")?;
        Ok(token_info_from(tokens))
    }

    /// Silent renewal first, interactive device-code sign-in as fallback.
    pub async fn get_access_token(&mut self) -> Result<String> {
        if let Some(token) = self.get_access_token_silent().await? {
            return Ok(token);
        }

        let result = self.authenticate_device_code().await?;
        Ok(result.access_token)
    }

    /// Drop the cached account. No-op when nobody is signed in.
    pub fn sign_out(&mut self) {
        if self.account.take().is_some() {
            info!("Signed out, cached account cleared");
        }
    }
}

fn token_info_from(response: TokenResponse) -> TokenInfo {
    TokenInfo {
        access_token: response.access_token,
        expires_at: Utc::now() + chrono::Duration::seconds(response.expires_in as i64),
        refresh_token: response.refresh_token,
    }
}

fn is_near_expiry(tokens: &TokenInfo) -> bool {
    Utc::now() + chrono::Duration::seconds(EXPIRY_MARGIN_SECS) >= tokens.expires_at
}
