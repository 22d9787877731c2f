// Narrative summaries via the Anthropic Messages API.

pub mod client;
pub mod prompt;

pub use client::LlmClient;
