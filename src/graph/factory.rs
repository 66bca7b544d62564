use std::sync::Arc;

use colored::Colorize;
use log::error;
use tokio::sync::Mutex;

use super::client::{GraphClient, DEFAULT_GRAPH_BASE_URL};
use crate::auth::DeviceCodeAuthProvider;
use crate::ui;

/// Lazily constructs the Graph client, once, bound to the shared identity
/// provider that supplies its bearer tokens.
pub struct GraphClientFactory {
    auth: Arc<Mutex<DeviceCodeAuthProvider>>,
    base_url: String,
    client: Option<GraphClient>,
}

impl GraphClientFactory {
    pub fn new(auth: Arc<Mutex<DeviceCodeAuthProvider>>) -> Self {
        Self {
            auth,
            base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            client: None,
        }
    }

    /// Point the factory at a different Graph host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get or create the memoized Graph client.
    pub fn get_client(&mut self) -> &GraphClient {
        let auth = self.auth.clone();
        let base_url = self.base_url.clone();
        self.client
            .get_or_insert_with(|| GraphClient::new(auth, base_url))
    }

    /// Diagnostic connectivity check against the current-user profile
    /// endpoint. Failures are logged and reported as `false`, never raised.
    pub async fn test_connection(&mut self) -> bool {
        println!("🔍 Testing Microsoft Graph connection...");

        let client = self.get_client().clone();
        let result = ui::with_spinner("Contacting Microsoft Graph...", client.me()).await;

        match result {
            Ok(profile) => {
                println!("{}", "✅ Microsoft Graph connection successful!".green());
                let name = profile.display_name.as_deref().unwrap_or("(unknown)");
                match profile.address() {
                    Some(address) => println!("   User: {name} ({address})\n"),
                    None => println!("   User: {name}\n"),
                }
                true
            }
            Err(err) => {
                error!("Microsoft Graph connectivity test failed: {err:#}");
                println!("{} {err:#}", "❌ Microsoft Graph connection failed:".red());
                false
            }
        }
    }
}
