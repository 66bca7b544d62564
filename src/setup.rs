//! The four-step setup sequence: validate configuration, test the Azure
//! OpenAI deployment, sign in, test Microsoft Graph. Strictly sequential;
//! the first failing step aborts the run. Nothing is retried and nothing
//! is rolled back.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::sync::Mutex;

use crate::ai::AzureOpenAIClient;
use crate::auth::DeviceCodeAuthProvider;
use crate::config::AppConfig;
use crate::graph::{GraphClientFactory, DEFAULT_GRAPH_BASE_URL};
use crate::ui;

/// Run the full check sequence with a console-rendering identity provider.
pub async fn run(config: &AppConfig) -> Result<()> {
    let auth = Arc::new(Mutex::new(DeviceCodeAuthProvider::new(
        config.graph.clone(),
        Box::new(ui::render_device_code_prompt),
    )));
    run_checks(config, auth, DEFAULT_GRAPH_BASE_URL).await
}

/// Check sequence against explicit collaborators. Integration tests drive
/// this seam with mock endpoints and a capturing prompt callback.
pub async fn run_checks(
    config: &AppConfig,
    auth: Arc<Mutex<DeviceCodeAuthProvider>>,
    graph_base_url: &str,
) -> Result<()> {
    ui::banner("Personal Microsoft 365 Assistant - Setup");

    ui::step(1, "Validating configuration");
    let report = config.validate();
    if !report.is_valid() {
        ui::failure("Configuration validation failed:");
        for error in report.errors() {
            println!("   - {error}");
        }
        anyhow::bail!("configuration is incomplete");
    }
    ui::success("Configuration is valid");

    ui::step(2, "Testing Azure OpenAI connection");
    let ai_client = AzureOpenAIClient::new(&config.azure_openai);
    if !ai_client.test_connection().await {
        println!("   Please check your credentials in the .env file");
        anyhow::bail!("Azure OpenAI is unreachable");
    }

    ui::step(3, "Authenticating with Microsoft 365");
    let result = auth
        .lock()
        .await
        .authenticate_device_code()
        .await
        .context("failed to authenticate with Microsoft 365")?;
    info!("Access token valid until {}", result.expires_on);
    ui::success("Authentication successful");

    ui::step(4, "Testing Microsoft Graph API connection");
    let mut graph = GraphClientFactory::new(auth.clone()).with_base_url(graph_base_url);
    if !graph.test_connection().await {
        anyhow::bail!("Microsoft Graph is unreachable");
    }

    ui::banner("✅ Setup complete!");
    println!("Next steps:");
    println!("  • Connect mailbox, calendar and task data");
    println!("  • Wire the assistant loop on top of the verified endpoints\n");
    Ok(())
}
