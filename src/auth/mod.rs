mod models;
mod provider;

pub use models::{Account, AuthenticationResult, DeviceCodePrompt, TokenInfo};
pub use provider::{DeviceCodeAuthProvider, PromptCallback};
