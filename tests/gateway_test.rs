//! Integration tests for actions, prompts and service output handling.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use smartpdf::error::{Error, ErrorKind, Result};
use smartpdf::gateway::{
    normalize_json, normalize_text, transform_prompt, Action, ActionGroup, AiService,
    TransformGateway, DEFAULT_INSTRUCTION,
};
use smartpdf::model::{AnalysisResult, ContentModel, DocRange, MarkKind};

/// Records the instructions it receives and answers with a fixed reply.
struct RecordingService {
    reply: String,
    instructions: Mutex<Vec<String>>,
}

impl RecordingService {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            instructions: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AiService for RecordingService {
    async fn analyze(&self, _document: &[u8]) -> Result<AnalysisResult> {
        Err(Error::Service("not used".into()))
    }

    async fn transform(&self, _text: &str, instruction: &str) -> Result<String> {
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());
        Ok(self.reply.clone())
    }
}

const VALID_ANALYSIS: &str = r#"{
    "fullText": "Line one\nLine two",
    "summary": "A short document.",
    "sentimentScore": 72,
    "sentimentLabel": "Positive",
    "keywords": [{"name": "rust", "value": 12}, {"name": "pdf", "value": 7}],
    "topics": [{"name": "Engineering", "value": 60}, {"name": "Docs", "value": 45}],
    "entityCount": 4,
    "readingTimeMin": 1.5
}"#;

#[test]
fn test_action_table() {
    let all = Action::all();
    assert_eq!(all.len(), 27);

    let labels: HashSet<&str> = all.iter().map(|a| a.label()).collect();
    assert_eq!(labels.len(), 27);

    let instructions: HashSet<&str> = all.iter().map(|a| a.instruction()).collect();
    assert_eq!(instructions.len(), 27);
    assert!(!instructions.contains(DEFAULT_INSTRUCTION));
}

#[test]
fn test_label_round_trip() {
    for action in Action::all() {
        assert_eq!(Action::parse(action.label()), action);
    }
    assert_eq!(Action::parse("  redact pii "), Action::RedactPii);
    assert_eq!(Action::parse("Extract Phone #"), Action::ExtractPhone);

    let other = Action::parse("Write a haiku");
    assert_eq!(other, Action::Other("Write a haiku".to_string()));
    assert_eq!(other.instruction(), DEFAULT_INSTRUCTION);
    assert!(other.group().is_none());
}

#[test]
fn test_groups_cover_every_action() {
    let sizes: Vec<usize> = ActionGroup::ALL
        .iter()
        .map(|g| g.actions().len())
        .collect();
    assert_eq!(sizes, vec![3, 4, 6, 6, 6, 2]);
    assert_eq!(sizes.iter().sum::<usize>(), Action::all().len());
    assert_eq!(
        ActionGroup::CleanUpAndSecurity.actions(),
        vec![Action::RemoveWatermark, Action::RedactPii]
    );
}

#[test]
fn test_action_serde_uses_labels() {
    let json = serde_json::to_string(&Action::TranslateFrench).unwrap();
    assert_eq!(json, "\"Translate (French)\"");
    let parsed: Action = serde_json::from_str("\"summarize\"").unwrap();
    assert_eq!(parsed, Action::Summarize);
}

#[test]
fn test_transform_prompt_format() {
    assert_eq!(
        transform_prompt("Some text", "Translate this text to German."),
        "Context text: Some text\n\nTask: Translate this text to German.\n\nOutput only the result."
    );
}

#[test]
fn test_normalization() {
    assert_eq!(normalize_text("a\r\nb  \r\n\r\n"), "a\nb  \n\n");
    // NFC leaves compatibility ligatures alone
    assert_eq!(normalize_text("\u{FB01}le"), "\u{FB01}le");
    assert_eq!(normalize_text("cafe\u{301}"), "caf\u{e9}");
    assert_eq!(normalize_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
}

#[tokio::test]
async fn test_transform_rebuilds_without_marks() {
    let service = RecordingService::new("Uno\r\n\r\nDos");
    let gateway = TransformGateway::new(service.clone());

    let mut content = ContentModel::from_text("One\n\nTwo");
    content.apply_mark(DocRange::within(0, 0, 3), MarkKind::Bold);
    content.apply_mark(DocRange::within(2, 0, 3), MarkKind::Redact);

    let result = gateway
        .transform(&content, &Action::TranslateSpanish)
        .await
        .unwrap();
    assert_eq!(result.plain_text(), "Uno\n\nDos");
    assert_eq!(result.markup_snapshot(), "<p>Uno</p>\n<p><br></p>\n<p>Dos</p>\n");
    assert_eq!(
        *service.instructions.lock().unwrap(),
        vec!["Translate this text to Spanish.".to_string()]
    );
}

#[tokio::test]
async fn test_transform_segments_like_extraction() {
    let reply = "a\r\n   \n\nb";
    let gateway = TransformGateway::new(RecordingService::new(reply));

    let result = gateway
        .transform(&ContentModel::from_text("x"), &Action::Expand)
        .await
        .unwrap();
    assert_eq!(result.blocks(), ContentModel::from_text("a\n   \n\nb").blocks());
    assert!(result.blocks()[1].as_paragraph().is_some());
    assert!(result.blocks()[2].as_paragraph().is_none());
    assert_eq!(result.plain_text(), "a\n   \n\nb");
}

#[tokio::test]
async fn test_blank_reply_keeps_text() {
    let gateway = TransformGateway::new(RecordingService::new("\n   \n"));
    let outcome = gateway
        .transform_text("keep me", &Action::Shorten)
        .await
        .unwrap();
    assert!(outcome.fell_back);
    assert_eq!(outcome.text, "keep me");
}

#[test]
fn test_analysis_from_json() {
    let analysis = AnalysisResult::from_json(VALID_ANALYSIS).unwrap();
    assert_eq!(analysis.full_text(), "Line one\nLine two");
    assert_eq!(analysis.sentiment_score(), 72.0);
    assert_eq!(analysis.keywords().len(), 2);
    assert_eq!(analysis.entity_count(), 4);
    assert_eq!(analysis.reading_time_min(), 1.5);

    // topic values are passed through, not rescaled
    assert_eq!(analysis.topics_total(), 105.0);

    let reparsed = AnalysisResult::from_json(&analysis.to_json().unwrap()).unwrap();
    assert_eq!(reparsed, analysis);
}

#[test]
fn test_analysis_rejects_bad_shapes() {
    let missing = VALID_ANALYSIS.replace("\"summary\": \"A short document.\",", "");
    let err = AnalysisResult::from_json(&missing).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
    assert_eq!(err.kind(), ErrorKind::Service);

    let negative = VALID_ANALYSIS.replace("\"entityCount\": 4", "\"entityCount\": -2");
    assert!(AnalysisResult::from_json(&negative).is_err());

    let wrong_type =
        VALID_ANALYSIS.replace("\"readingTimeMin\": 1.5", "\"readingTimeMin\": \"soon\"");
    assert!(AnalysisResult::from_json(&wrong_type).is_err());

    assert!(AnalysisResult::from_json("not json").is_err());
}

#[test]
fn test_analysis_limits() {
    let json = VALID_ANALYSIS
        .replace(
            r#"[{"name": "rust", "value": 12}, {"name": "pdf", "value": 7}]"#,
            r#"[{"name":"a","value":1},{"name":"b","value":1},{"name":"c","value":1},
               {"name":"d","value":1},{"name":"e","value":1},{"name":"f","value":1}]"#,
        )
        .replace("\"sentimentScore\": 72", "\"sentimentScore\": 140");
    let analysis = AnalysisResult::from_json(&json).unwrap();
    assert_eq!(analysis.keywords().len(), 5);
    assert_eq!(analysis.sentiment_score(), 100.0);
}

#[cfg(feature = "gemini")]
mod gemini {
    use smartpdf::gateway::{GeminiConfig, DEFAULT_MODEL};

    #[test]
    fn test_generate_url() {
        let config = GeminiConfig::new().with_endpoint("https://example.test/v1beta/");
        assert_eq!(
            config.generate_url(),
            format!("https://example.test/v1beta/models/{}:generateContent", DEFAULT_MODEL)
        );

        let custom = config.with_model("gemini-pro");
        assert!(custom.generate_url().ends_with("/models/gemini-pro:generateContent"));
    }
}
