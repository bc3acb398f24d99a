//! TextGenerator trait definition.
//!
//! The core abstraction over the hosted model API: an opaque function from
//! an ordered context to text. Uses native async fn in traits (RPITIT,
//! Rust 2024 edition). The concrete implementation lives in charla-infra
//! (`GeminiClient`).

use charla_types::llm::{ContextEntry, GenerationError};

/// Trait for text-generation backends.
///
/// Implementations receive the full replayed context verbatim; no
/// truncation or summarization happens on either side of this boundary.
/// The caller is responsible for the deadline around the call.
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for the given ordered context.
    fn generate(
        &self,
        context: &[ContextEntry],
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;

    /// Generate a reply where the final user turn travels out-of-band next
    /// to a binary attachment (e.g. a PDF) instead of as a context entry.
    fn generate_with_attachment(
        &self,
        context: &[ContextEntry],
        prompt: &str,
        data: &[u8],
        mime_type: &str,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}
