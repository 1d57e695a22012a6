//! Transformation gateway.
//!
//! One contract for running an external text transformation over the
//! plain-text projection of the content and rebuilding the content from the
//! result:
//!
//! 1. project the content model to plain text
//! 2. map the [`Action`] to its fixed instruction
//! 3. make one service call and wait for one textual answer
//! 4. re-segment the answer into a brand-new [`ContentModel`]
//!
//! Marks, images and structure of the input are discarded; the input model
//! itself is never mutated.

mod action;
#[cfg(feature = "gemini")]
mod gemini;
mod normalize;
mod service;

pub use action::{Action, ActionGroup, DEFAULT_INSTRUCTION};
#[cfg(feature = "gemini")]
pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use normalize::{normalize_json, normalize_text, NormalizeOptions, Normalizer};
pub use service::{transform_prompt, AiService, EXTRACTION_PROMPT};

use std::sync::Arc;

use crate::error::Result;
use crate::model::ContentModel;

/// Text produced by one transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    /// Normalized text that will back the new content model
    pub text: String,

    /// The service returned nothing usable and the original text was kept
    pub fell_back: bool,
}

impl TransformOutcome {
    /// Build the replacement content model.
    pub fn into_content(self) -> ContentModel {
        ContentModel::from_text(&self.text)
    }
}

/// Runs actions against an [`AiService`].
#[derive(Clone)]
pub struct TransformGateway {
    service: Arc<dyn AiService>,
    normalizer: Arc<Normalizer>,
}

impl TransformGateway {
    /// Create a gateway over a service.
    pub fn new(service: Arc<dyn AiService>) -> Self {
        Self {
            service,
            normalizer: Arc::new(Normalizer::text()),
        }
    }

    /// Use a custom normalization pipeline for service output.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// The underlying service.
    pub fn service(&self) -> &Arc<dyn AiService> {
        &self.service
    }

    /// Transform content and return the replacement model.
    pub async fn transform(&self, content: &ContentModel, action: &Action) -> Result<ContentModel> {
        let outcome = self.transform_text(&content.plain_text(), action).await?;
        Ok(outcome.into_content())
    }

    /// Transform an already projected text.
    ///
    /// An empty or whitespace-only answer falls back to the input text.
    pub async fn transform_text(&self, text: &str, action: &Action) -> Result<TransformOutcome> {
        let instruction = action.instruction();
        log::info!(
            "transform '{}' via {} ({} chars)",
            action,
            self.service.name(),
            text.chars().count()
        );

        let raw = self.service.transform(text, instruction).await?;
        if raw.trim().is_empty() {
            log::warn!("'{}' returned no text, keeping the original content", action);
            return Ok(TransformOutcome {
                text: text.to_string(),
                fell_back: true,
            });
        }

        Ok(TransformOutcome {
            text: self.normalizer.process(&raw),
            fell_back: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{AnalysisResult, DocRange, MarkKind};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers every transform with a fixed reply and records the calls.
    struct EchoService {
        reply: Option<String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl EchoService {
        fn replying(reply: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AiService for EchoService {
        async fn analyze(&self, _document: &[u8]) -> Result<AnalysisResult> {
            Err(Error::Service("not scripted".into()))
        }

        async fn transform(&self, text: &str, instruction: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), instruction.to_string()));
            self.reply
                .clone()
                .ok_or_else(|| Error::Service("offline".into()))
        }
    }

    #[tokio::test]
    async fn test_transform_replaces_content() {
        let service = EchoService::replying(Some("Hola\r\n\r\nMundo"));
        let gateway = TransformGateway::new(service.clone());

        let mut content = ContentModel::from_text("Hello\n\nWorld");
        content.apply_mark(DocRange::within(0, 0, 5), MarkKind::Bold);
        let before = content.clone();

        let result = gateway
            .transform(&content, &Action::TranslateSpanish)
            .await
            .unwrap();

        assert_eq!(result.plain_text(), "Hola\n\nMundo");
        assert_eq!(content, before);

        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Hello\n\nWorld");
        assert_eq!(calls[0].1, "Translate this text to Spanish.");
    }

    #[tokio::test]
    async fn test_blank_answer_falls_back() {
        let gateway = TransformGateway::new(EchoService::replying(Some("  \n ")));
        let outcome = gateway
            .transform_text("Keep me", &Action::Summarize)
            .await
            .unwrap();
        assert!(outcome.fell_back);
        assert_eq!(outcome.into_content().plain_text(), "Keep me");
    }

    #[tokio::test]
    async fn test_unknown_action_uses_default_instruction() {
        let service = EchoService::replying(Some("better"));
        let gateway = TransformGateway::new(service.clone());
        gateway
            .transform_text("text", &Action::parse("Polish"))
            .await
            .unwrap();
        assert_eq!(service.calls.lock().unwrap()[0].1, DEFAULT_INSTRUCTION);
    }

    #[tokio::test]
    async fn test_service_failure_propagates() {
        let gateway = TransformGateway::new(EchoService::replying(None));
        let err = gateway
            .transform(&ContentModel::from_text("x"), &Action::Summarize)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Service(_)));
    }
}
