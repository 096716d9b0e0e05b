//! Prompt construction and response parsing for content-critic.
//!
//! The highlight engine in `content-critic` consumes
//! [`HighlightDescriptor`](content_critic::HighlightDescriptor) batches;
//! this crate produces them. It renders the task prompts (critique,
//! translation, suggestion), parses the model's replies into typed data, and
//! builds the vendor-specific request envelopes, with actual network I/O
//! left behind the [`Transport`] trait.

mod backend;
mod client;
mod error;
mod prompt;

pub use backend::{
    build_request, extract_reply, ApiRequest, RequestOptions, Transport, Vendor, ANTHROPIC_URL,
    OPENAI_URL,
};
pub use client::AnalysisClient;
pub use error::AnalysisError;
pub use prompt::{
    Analysis, CriticPrompt, Critique, PromptOptions, SuggestionPrompt, TranslationPrompt,
    MAX_SUGGESTION_CHARS,
};
