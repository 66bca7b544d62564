/// Sampling parameters for a chat call. Unset fields fall back to the
/// client defaults.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Token counters as reported by the provider. Zero when the provider
/// omits usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt: u32,
    pub completion: u32,
    pub total: u32,
}

/// Generated text plus usage counters for a single chat call.
#[derive(Debug, Clone)]
pub struct AiResponse {
    pub content: String,
    pub tokens_used: TokenUsage,
}
