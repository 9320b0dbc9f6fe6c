//! Text completion provider boundary
//!
//! The model is an untrusted, non-deterministic text generator. Everything it
//! returns goes through the parser and schema before use.

use crate::error::ProviderError;
use async_trait::async_trait;

/// Opaque text-in/text-out model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextCompletionProvider: Send + Sync {
    /// Complete `prompt`, returning the raw model text
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

