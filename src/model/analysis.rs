//! Structured result of the initial AI extraction.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of keywords kept, in relevance order.
pub const MAX_KEYWORDS: usize = 5;

/// Maximum number of topics kept.
pub const MAX_TOPICS: usize = 4;

/// A named value used for keyword and topic charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartItem {
    /// Label
    pub name: String,

    /// Frequency or relevance
    pub value: f64,
}

impl ChartItem {
    /// Create a chart item.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Analysis of an uploaded PDF.
///
/// Immutable once built: construction goes through validation, either from
/// the service's JSON (see [`AnalysisResult::from_json`]) or through the
/// builder methods. Transformations never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawAnalysis")]
pub struct AnalysisResult {
    full_text: String,
    summary: String,
    sentiment_score: f64,
    sentiment_label: String,
    keywords: Vec<ChartItem>,
    topics: Vec<ChartItem>,
    entity_count: u64,
    reading_time_min: f64,
}

/// Wire shape before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    full_text: String,
    summary: String,
    sentiment_score: f64,
    sentiment_label: String,
    keywords: Vec<ChartItem>,
    topics: Vec<ChartItem>,
    entity_count: f64,
    reading_time_min: f64,
}

impl TryFrom<RawAnalysis> for AnalysisResult {
    type Error = Error;

    fn try_from(raw: RawAnalysis) -> Result<Self> {
        if !raw.entity_count.is_finite() || raw.entity_count < 0.0 || raw.entity_count.fract() != 0.0
        {
            return Err(Error::MalformedResponse(format!(
                "entityCount must be a non-negative integer (got {})",
                raw.entity_count
            )));
        }
        if !raw.reading_time_min.is_finite() || raw.reading_time_min < 0.0 {
            return Err(Error::MalformedResponse(format!(
                "readingTimeMin must be a non-negative number (got {})",
                raw.reading_time_min
            )));
        }
        if !raw.sentiment_score.is_finite() {
            return Err(Error::MalformedResponse(
                "sentimentScore must be a finite number".to_string(),
            ));
        }
        if let Some(item) = raw
            .keywords
            .iter()
            .chain(raw.topics.iter())
            .find(|item| !item.value.is_finite())
        {
            return Err(Error::MalformedResponse(format!(
                "chart value for '{}' must be a finite number",
                item.name
            )));
        }

        Ok(AnalysisResult::new(raw.full_text, raw.summary)
            .with_sentiment(raw.sentiment_score, raw.sentiment_label)
            .with_keywords(raw.keywords)
            .with_topics(raw.topics)
            .with_entity_count(raw.entity_count as u64)
            .with_reading_time(raw.reading_time_min))
    }
}

impl AnalysisResult {
    /// Start building a result from extracted text and a summary.
    pub fn new(full_text: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            full_text: full_text.into(),
            summary: summary.into(),
            sentiment_score: 50.0,
            sentiment_label: "Neutral".to_string(),
            keywords: Vec::new(),
            topics: Vec::new(),
            entity_count: 0,
            reading_time_min: 0.0,
        }
    }

    /// Parse and validate the service's JSON answer.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    /// Serialize back to the wire schema.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the sentiment. The score is clamped to 0–100.
    pub fn with_sentiment(mut self, score: f64, label: impl Into<String>) -> Self {
        let clamped = score.clamp(0.0, 100.0);
        if clamped != score {
            log::warn!("sentiment score {} out of range, clamped to {}", score, clamped);
        }
        self.sentiment_score = clamped;
        self.sentiment_label = label.into();
        self
    }

    /// Set the keywords, keeping at most five.
    pub fn with_keywords(mut self, mut keywords: Vec<ChartItem>) -> Self {
        if keywords.len() > MAX_KEYWORDS {
            log::warn!(
                "received {} keywords, keeping the first {}",
                keywords.len(),
                MAX_KEYWORDS
            );
            keywords.truncate(MAX_KEYWORDS);
        }
        self.keywords = keywords;
        self
    }

    /// Set the topics, keeping at most four. Values are not normalized.
    pub fn with_topics(mut self, mut topics: Vec<ChartItem>) -> Self {
        if topics.len() > MAX_TOPICS {
            log::warn!(
                "received {} topics, keeping the first {}",
                topics.len(),
                MAX_TOPICS
            );
            topics.truncate(MAX_TOPICS);
        }
        self.topics = topics;
        self
    }

    /// Set the number of named entities.
    pub fn with_entity_count(mut self, count: u64) -> Self {
        self.entity_count = count;
        self
    }

    /// Set the estimated reading time in minutes.
    pub fn with_reading_time(mut self, minutes: f64) -> Self {
        self.reading_time_min = if minutes.is_finite() { minutes.max(0.0) } else { 0.0 };
        self
    }

    /// Full extracted text.
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Short summary.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Sentiment score in 0–100.
    pub fn sentiment_score(&self) -> f64 {
        self.sentiment_score
    }

    /// Sentiment label (e.g. "Positive").
    pub fn sentiment_label(&self) -> &str {
        &self.sentiment_label
    }

    /// Keywords in relevance order.
    pub fn keywords(&self) -> &[ChartItem] {
        &self.keywords
    }

    /// Topics in relevance order.
    pub fn topics(&self) -> &[ChartItem] {
        &self.topics
    }

    /// Sum of the topic values. Usually close to 100, but not guaranteed.
    pub fn topics_total(&self) -> f64 {
        self.topics.iter().map(|t| t.value).sum()
    }

    /// Number of named entities.
    pub fn entity_count(&self) -> u64 {
        self.entity_count
    }

    /// Estimated reading time in minutes.
    pub fn reading_time_min(&self) -> f64 {
        self.reading_time_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> String {
        r#"{
            "fullText": "Hello",
            "summary": "S",
            "sentimentScore": 80,
            "sentimentLabel": "Positive",
            "keywords": [{"name": "AI", "value": 10}],
            "topics": [{"name": "Tech", "value": 100}],
            "entityCount": 3,
            "readingTimeMin": 2
        }"#
        .to_string()
    }

    #[test]
    fn test_from_json() {
        let result = AnalysisResult::from_json(&sample_json()).unwrap();
        assert_eq!(result.full_text(), "Hello");
        assert_eq!(result.sentiment_score(), 80.0);
        assert_eq!(result.keywords()[0], ChartItem::new("AI", 10.0));
        assert_eq!(result.entity_count(), 3);
        assert_eq!(result.topics_total(), 100.0);
    }

    #[test]
    fn test_json_round_trip_uses_wire_names() {
        let result = AnalysisResult::from_json(&sample_json()).unwrap();
        let json = result.to_json().unwrap();
        assert!(json.contains("\"fullText\""));
        assert!(json.contains("\"readingTimeMin\""));
        assert_eq!(AnalysisResult::from_json(&json).unwrap(), result);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = AnalysisResult::from_json(r#"{"fullText": "x"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_negative_counts_rejected() {
        let json = sample_json().replace("\"entityCount\": 3", "\"entityCount\": -1");
        assert!(AnalysisResult::from_json(&json).is_err());

        let json = sample_json().replace("\"readingTimeMin\": 2", "\"readingTimeMin\": -2");
        assert!(AnalysisResult::from_json(&json).is_err());
    }

    #[test]
    fn test_fractional_entity_count_rejected() {
        let json = sample_json().replace("\"entityCount\": 3", "\"entityCount\": 3.7");
        let err = AnalysisResult::from_json(&json).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));

        let json = sample_json().replace("\"entityCount\": 3", "\"entityCount\": 3.0");
        assert_eq!(AnalysisResult::from_json(&json).unwrap().entity_count(), 3);
    }

    #[test]
    fn test_clamp_and_truncate() {
        let keywords = (0..7).map(|i| ChartItem::new(format!("k{}", i), 1.0)).collect();
        let topics = (0..6).map(|i| ChartItem::new(format!("t{}", i), 30.0)).collect();
        let result = AnalysisResult::new("t", "s")
            .with_sentiment(140.0, "Ecstatic")
            .with_keywords(keywords)
            .with_topics(topics);

        assert_eq!(result.sentiment_score(), 100.0);
        assert_eq!(result.keywords().len(), MAX_KEYWORDS);
        assert_eq!(result.topics().len(), MAX_TOPICS);
        assert_eq!(result.topics_total(), 120.0);
    }
}
