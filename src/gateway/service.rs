//! The seam to the external generative-AI model.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::model::AnalysisResult;

/// Instruction sent alongside the document for the initial extraction.
pub const EXTRACTION_PROMPT: &str = "Analyze the attached PDF document.
1. Extract the full text content nicely formatted.
2. Create a concise summary.
3. Analyze the sentiment (0-100 score).
4. Extract top 5 keywords with their frequency count.
5. Extract top 4 main topics with an estimated relevance percentage (total 100).
6. Count total named entities (people, orgs, places).
7. Estimate reading time in minutes.";

/// Build the prompt for a text transformation.
pub fn transform_prompt(text: &str, instruction: &str) -> String {
    format!(
        "Context text: {}\n\nTask: {}\n\nOutput only the result.",
        text, instruction
    )
}

/// A remote model able to analyze documents and rewrite text.
///
/// Implementations make exactly one attempt per call; callers never retry.
#[async_trait]
pub trait AiService: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str {
        "ai-service"
    }

    /// Extract text and statistics from a PDF.
    async fn analyze(&self, document: &[u8]) -> Result<AnalysisResult>;

    /// Apply an instruction to plain text and return the service's text.
    async fn transform(&self, text: &str, instruction: &str) -> Result<String>;
}

#[async_trait]
impl<T: AiService + ?Sized> AiService for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn analyze(&self, document: &[u8]) -> Result<AnalysisResult> {
        (**self).analyze(document).await
    }

    async fn transform(&self, text: &str, instruction: &str) -> Result<String> {
        (**self).transform(text, instruction).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_prompt() {
        assert_eq!(
            transform_prompt("Hi", "Translate this text to French."),
            "Context text: Hi\n\nTask: Translate this text to French.\n\nOutput only the result."
        );
    }

    #[test]
    fn test_extraction_prompt_mentions_limits() {
        assert!(EXTRACTION_PROMPT.contains("top 5 keywords"));
        assert!(EXTRACTION_PROMPT.contains("top 4 main topics"));
    }
}
