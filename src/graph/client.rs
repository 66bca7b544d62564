use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::auth::DeviceCodeAuthProvider;

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com";

/// Basic profile fields from the `/me` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

impl UserProfile {
    /// Preferred address for display, falling back to the UPN.
    pub fn address(&self) -> Option<&str> {
        self.mail.as_deref().or(self.user_principal_name.as_deref())
    }
}

/// Microsoft Graph client. Every authorized call obtains a fresh access
/// token from the shared identity provider, so silent renewal and the
/// interactive fallback both happen transparently.
#[derive(Clone)]
pub struct GraphClient {
    http_client: reqwest::Client,
    base_url: String,
    auth: Arc<Mutex<DeviceCodeAuthProvider>>,
}

impl GraphClient {
    pub fn new(auth: Arc<Mutex<DeviceCodeAuthProvider>>, base_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("m365-assistant/0.1")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url,
            auth,
        }
    }

    /// Read the signed-in user's profile.
    pub async fn me(&self) -> Result<UserProfile> {
        let token = {
            let mut auth = self.auth.lock().await;
            auth.get_access_token().await?
        };

        let url = format!("{}/v1.0/me", self.base_url.trim_end_matches('/'));
        debug!("GET {url}");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Graph request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Graph /me returned {status}: {body}");
            anyhow::bail!("Graph request failed with status {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse user profile response")
    }
}
