use chrono::{DateTime, Utc};

/// Cached token material for the signed-in account.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub refresh_token: Option<String>,
}

/// In-memory handle for the signed-in user. The provider holds at most one
/// at a time; sign-out drops it.
#[derive(Debug, Clone)]
pub struct Account {
    pub tokens: TokenInfo,
}

/// Outcome of a completed device-code sign-in.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    pub access_token: String,
    pub expires_on: DateTime<Utc>,
    pub account: Account,
}

/// Sign-in instructions surfaced to the user while the flow waits for them
/// to enter the code in a browser.
#[derive(Debug, Clone)]
pub struct DeviceCodePrompt {
    pub verification_uri: String,
    pub user_code: String,
    pub expires_in_secs: u64,
    /// Canned instruction text from the identity provider, when it sends one.
    pub message: Option<String>,
}
