//! Environment-backed application configuration.
//!
//! All settings come from environment variables, optionally seeded from a
//! local `.env` file. The configuration is read once at startup and never
//! mutated afterwards.

use std::env;

/// Azure CLI's well-known public client id. Using it lets the device code
/// flow run without a dedicated app registration.
pub const DEFAULT_GRAPH_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

/// Multi-tenant authority endpoint.
pub const DEFAULT_GRAPH_AUTHORITY: &str = "https://login.microsoftonline.com/common";

/// Delegated permissions requested at sign-in.
pub const GRAPH_SCOPES: &[&str] = &[
    "User.Read",
    "Mail.ReadWrite",
    "Calendars.ReadWrite",
    "Tasks.ReadWrite",
    "offline_access",
];

#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub polling_interval_minutes: u64,
    pub log_level: String,
    pub data_retention_days: u32,
}

#[derive(Debug, Clone)]
pub struct GraphAuthConfig {
    pub client_id: String,
    pub authority: String,
    pub scopes: Vec<String>,
}

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub azure_openai: AzureOpenAiConfig,
    pub app: AppSettings,
    pub graph: GraphAuthConfig,
}

impl AppConfig {
    /// Load `.env` if one is present, then read the environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    fn from_env() -> Self {
        Self {
            azure_openai: AzureOpenAiConfig {
                endpoint: env_or("AZURE_OPENAI_ENDPOINT", ""),
                api_key: env_or("AZURE_OPENAI_API_KEY", ""),
                deployment: env_or("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
                api_version: env_or("AZURE_OPENAI_API_VERSION", "2025-01-01-preview"),
            },
            app: AppSettings {
                polling_interval_minutes: env_parsed("POLLING_INTERVAL_MINUTES", 15),
                log_level: env_or("LOG_LEVEL", "info"),
                data_retention_days: env_parsed("DATA_RETENTION_DAYS", 90),
            },
            graph: GraphAuthConfig {
                client_id: env_or("MS_GRAPH_CLIENT_ID", DEFAULT_GRAPH_CLIENT_ID),
                authority: env_or("MS_GRAPH_AUTHORITY", DEFAULT_GRAPH_AUTHORITY),
                scopes: GRAPH_SCOPES.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    /// Report every missing required field. Missing values are surfaced to
    /// the caller as messages, never as errors.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        if self.azure_openai.endpoint.is_empty() {
            errors.push("AZURE_OPENAI_ENDPOINT is not set in .env file".to_string());
        }
        if self.azure_openai.api_key.is_empty() {
            errors.push("AZURE_OPENAI_API_KEY is not set in .env file".to_string());
        }
        if self.azure_openai.deployment.is_empty() {
            errors.push("AZURE_OPENAI_DEPLOYMENT is not set in .env file".to_string());
        }

        ValidationReport { errors }
    }
}

/// Outcome of checking the configuration for required fields.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> AppConfig {
        AppConfig {
            azure_openai: AzureOpenAiConfig {
                endpoint: "https://example.openai.azure.com".to_string(),
                api_key: "key".to_string(),
                deployment: "gpt-4o".to_string(),
                api_version: "2025-01-01-preview".to_string(),
            },
            app: AppSettings {
                polling_interval_minutes: 15,
                log_level: "info".to_string(),
                data_retention_days: 90,
            },
            graph: GraphAuthConfig {
                client_id: DEFAULT_GRAPH_CLIENT_ID.to_string(),
                authority: DEFAULT_GRAPH_AUTHORITY.to_string(),
                scopes: GRAPH_SCOPES.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    #[test]
    fn complete_config_is_valid() {
        let report = complete_config().validate();
        assert!(report.is_valid());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn missing_endpoint_is_reported() {
        let mut config = complete_config();
        config.azure_openai.endpoint = String::new();

        let report = config.validate();
        assert!(!report.is_valid());
        assert_eq!(report.errors().len(), 1);
        assert!(report.errors()[0].contains("AZURE_OPENAI_ENDPOINT"));
    }

    #[test]
    fn each_missing_field_gets_its_own_message() {
        let mut config = complete_config();
        config.azure_openai.endpoint = String::new();
        config.azure_openai.api_key = String::new();
        config.azure_openai.deployment = String::new();

        let report = config.validate();
        assert_eq!(report.errors().len(), 3);
        assert!(report.errors()[0].contains("AZURE_OPENAI_ENDPOINT"));
        assert!(report.errors()[1].contains("AZURE_OPENAI_API_KEY"));
        assert!(report.errors()[2].contains("AZURE_OPENAI_DEPLOYMENT"));
    }
}
