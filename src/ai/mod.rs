mod client;
mod models;

pub use client::AzureOpenAIClient;
pub use models::{AiResponse, ChatOptions, TokenUsage};
