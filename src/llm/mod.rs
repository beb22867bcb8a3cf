//! Completion service client.
//!
//! A minimal client for OpenAI-compatible text-completion endpoints
//! (vLLM, Ollama). Every transport failure is logged and surfaces as an
//! empty completion; consumers treat that as unparseable output and fall
//! back to their defaults.

mod client;
mod types;

pub use client::*;
pub use types::*;

use async_trait::async_trait;

/// A stateless text-generation provider.
///
/// The LLM-hybrid strategy depends on this trait rather than on
/// [`CompletionClient`] so that tests can substitute a scripted provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete `prompt`, returning the generated text or an empty string on
    /// any failure.
    async fn generate(&self, prompt: &str) -> String;

    /// Lightweight health probe of the completion service.
    async fn is_available(&self) -> bool;
}
