//! Provider name constants

/// OpenAI provider
pub const OPENAI: &str = "openai";
