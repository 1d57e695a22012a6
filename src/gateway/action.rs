//! Transformation actions and their fixed instructions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction used for actions without a table entry.
pub const DEFAULT_INSTRUCTION: &str = "Improve this text.";

/// A text transformation the user can request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Action {
    /// Three-bullet summary
    Summarize,
    /// Grammar, spelling and punctuation fix
    FixGrammar,
    /// Rewrite for a young reader
    Simplify,
    /// Translate to Spanish
    TranslateSpanish,
    /// Translate to French
    TranslateFrench,
    /// Translate to German
    TranslateGerman,
    /// Translate to Simplified Chinese
    TranslateChinese,
    /// Add detail and context
    Expand,
    /// Condense
    Shorten,
    /// Corporate tone
    MakeProfessional,
    /// Conversational tone
    MakeCasual,
    /// Research-paper tone
    MakeAcademic,
    /// More compelling
    MakePersuasive,
    /// List email addresses
    ExtractEmails,
    /// List dates and time references
    ExtractDates,
    /// List website URLs
    ExtractUrls,
    /// List phone numbers
    ExtractPhone,
    /// List people and organization names
    ExtractNames,
    /// List postal addresses
    ExtractAddresses,
    /// Checklist of action items
    ActionItems,
    /// Risks and liabilities
    RiskAssessment,
    /// Multiple choice quiz
    GenerateQuiz,
    /// Bulleted main points
    BulletPoints,
    /// Punctuation-only fix
    FixPunctuation,
    /// Clean HTML markup
    FormatHtml,
    /// Strip watermark artifacts
    RemoveWatermark,
    /// Replace personal data with a placeholder
    RedactPii,
    /// Any other label; uses [`DEFAULT_INSTRUCTION`]
    Other(String),
}

/// Groups used when listing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionGroup {
    /// Summarize, fix, simplify
    Basics,
    /// Translations
    Translate,
    /// Tone and length rewrites
    ToneAndStyle,
    /// Extraction of structured data
    ExtractData,
    /// Structuring and formatting
    StructureAndFormat,
    /// Watermark removal and redaction
    CleanUpAndSecurity,
}

impl ActionGroup {
    /// All groups in display order.
    pub const ALL: [ActionGroup; 6] = [
        ActionGroup::Basics,
        ActionGroup::Translate,
        ActionGroup::ToneAndStyle,
        ActionGroup::ExtractData,
        ActionGroup::StructureAndFormat,
        ActionGroup::CleanUpAndSecurity,
    ];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            ActionGroup::Basics => "Basics",
            ActionGroup::Translate => "Translate",
            ActionGroup::ToneAndStyle => "Tone & Style",
            ActionGroup::ExtractData => "Extract Data",
            ActionGroup::StructureAndFormat => "Structure & Format",
            ActionGroup::CleanUpAndSecurity => "Clean Up & Security",
        }
    }

    /// Actions in this group, in display order.
    pub fn actions(self) -> Vec<Action> {
        Action::all()
            .into_iter()
            .filter(|a| a.group() == Some(self))
            .collect()
    }
}

impl fmt::Display for ActionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Action {
    /// Every action with a table entry, in display order.
    pub fn all() -> Vec<Action> {
        vec![
            Action::Summarize,
            Action::FixGrammar,
            Action::Simplify,
            Action::TranslateSpanish,
            Action::TranslateFrench,
            Action::TranslateGerman,
            Action::TranslateChinese,
            Action::Expand,
            Action::Shorten,
            Action::MakeProfessional,
            Action::MakeCasual,
            Action::MakeAcademic,
            Action::MakePersuasive,
            Action::ExtractEmails,
            Action::ExtractDates,
            Action::ExtractUrls,
            Action::ExtractPhone,
            Action::ExtractNames,
            Action::ExtractAddresses,
            Action::ActionItems,
            Action::RiskAssessment,
            Action::GenerateQuiz,
            Action::BulletPoints,
            Action::FixPunctuation,
            Action::FormatHtml,
            Action::RemoveWatermark,
            Action::RedactPii,
        ]
    }

    /// Parse a display label. Matching ignores ASCII case; unknown labels
    /// become [`Action::Other`].
    pub fn parse(label: &str) -> Action {
        let label = label.trim();
        Action::all()
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(label))
            .unwrap_or_else(|| Action::Other(label.to_string()))
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            Action::Summarize => "Summarize",
            Action::FixGrammar => "Fix Grammar",
            Action::Simplify => "Simplify",
            Action::TranslateSpanish => "Translate (Spanish)",
            Action::TranslateFrench => "Translate (French)",
            Action::TranslateGerman => "Translate (German)",
            Action::TranslateChinese => "Translate (Chinese)",
            Action::Expand => "Expand Text",
            Action::Shorten => "Shorten Text",
            Action::MakeProfessional => "Make Professional",
            Action::MakeCasual => "Make Casual",
            Action::MakeAcademic => "Make Academic",
            Action::MakePersuasive => "Make Persuasive",
            Action::ExtractEmails => "Extract Emails",
            Action::ExtractDates => "Extract Dates",
            Action::ExtractUrls => "Extract URLs",
            Action::ExtractPhone => "Extract Phone #",
            Action::ExtractNames => "Extract Names",
            Action::ExtractAddresses => "Extract Addresses",
            Action::ActionItems => "Action Items",
            Action::RiskAssessment => "Risk Assessment",
            Action::GenerateQuiz => "Generate Quiz",
            Action::BulletPoints => "Convert to Bullets",
            Action::FixPunctuation => "Fix Punctuation",
            Action::FormatHtml => "Format as HTML",
            Action::RemoveWatermark => "Remove Watermark",
            Action::RedactPii => "Redact PII",
            Action::Other(label) => label,
        }
    }

    /// The fixed instruction sent to the service.
    pub fn instruction(&self) -> &'static str {
        match self {
            Action::Summarize => "Summarize this text in 3 key bullet points.",
            Action::FixGrammar => {
                "Fix all grammar, spelling, and punctuation errors. Maintain original formatting."
            }
            Action::Simplify => "Rewrite this text so it is easy for a 5th grader to understand.",
            Action::TranslateSpanish => "Translate this text to Spanish.",
            Action::TranslateFrench => "Translate this text to French.",
            Action::TranslateGerman => "Translate this text to German.",
            Action::TranslateChinese => "Translate this text to Chinese (Simplified).",
            Action::Expand => "Expand on the ideas in this text with more detail and context.",
            Action::Shorten => "Condense this text significantly without losing key information.",
            Action::MakeProfessional => {
                "Rewrite this in a strictly professional, corporate business tone."
            }
            Action::MakeCasual => "Rewrite this in a friendly, casual, and conversational tone.",
            Action::MakeAcademic => {
                "Rewrite this in a formal academic tone suitable for a research paper."
            }
            Action::MakePersuasive => "Rewrite this to be more persuasive and compelling.",
            Action::ExtractEmails => {
                "Extract all email addresses found in the text as a list. If none, say 'No emails found'."
            }
            Action::ExtractDates => {
                "Extract all dates and time references found in the text as a list."
            }
            Action::ExtractUrls => "Extract all website URLs found in the text as a list.",
            Action::ExtractPhone => "Extract all phone numbers found in the text as a list.",
            Action::ExtractNames => {
                "Extract all names of people and organizations found in the text as a list."
            }
            Action::ExtractAddresses => {
                "Extract all postal addresses found in the text as a list."
            }
            Action::ActionItems => "Create a checklist of clear action items based on this text.",
            Action::RiskAssessment => {
                "Analyze potential risks, liabilities, or warnings mentioned or implied in this text."
            }
            Action::GenerateQuiz => {
                "Generate 3 multiple choice questions (with answers) based on this text."
            }
            Action::BulletPoints => "Convert the main points of this text into a bulleted list.",
            Action::FixPunctuation => {
                "Fix only the punctuation in this text, keeping words the same."
            }
            Action::FormatHtml => {
                "Format this text as clean HTML code (using p, h1, ul, etc tags) inside a div."
            }
            Action::RemoveWatermark => {
                "Remove repetitive watermark phrases (like 'Confidential', 'Draft', 'Sample') or artifact text that appears to be a watermark. Keep the core content intact."
            }
            Action::RedactPii => {
                "Replace all Personally Identifiable Information (Names, Phone Numbers, Emails, Addresses, SSNs) with '[REDACTED]'. Maintain the rest of the text exactly."
            }
            Action::Other(_) => DEFAULT_INSTRUCTION,
        }
    }

    /// Listing group, or `None` for [`Action::Other`].
    pub fn group(&self) -> Option<ActionGroup> {
        use Action::*;
        let group = match self {
            Summarize | FixGrammar | Simplify => ActionGroup::Basics,
            TranslateSpanish | TranslateFrench | TranslateGerman | TranslateChinese => {
                ActionGroup::Translate
            }
            Expand | Shorten | MakeProfessional | MakeCasual | MakeAcademic | MakePersuasive => {
                ActionGroup::ToneAndStyle
            }
            ExtractEmails | ExtractDates | ExtractUrls | ExtractPhone | ExtractNames
            | ExtractAddresses => ActionGroup::ExtractData,
            ActionItems | RiskAssessment | GenerateQuiz | BulletPoints | FixPunctuation
            | FormatHtml => ActionGroup::StructureAndFormat,
            RemoveWatermark | RedactPii => ActionGroup::CleanUpAndSecurity,
            Other(_) => return None,
        };
        Some(group)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for Action {
    fn from(label: &str) -> Self {
        Action::parse(label)
    }
}

impl From<String> for Action {
    fn from(label: String) -> Self {
        Action::parse(&label)
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!(Action::parse("Summarize"), Action::Summarize);
        assert_eq!(Action::parse("translate (spanish)"), Action::TranslateSpanish);
        assert_eq!(Action::parse("Extract Phone #"), Action::ExtractPhone);
        assert_eq!(
            Action::parse("Make It Rhyme"),
            Action::Other("Make It Rhyme".to_string())
        );
    }

    #[test]
    fn test_every_label_round_trips() {
        for action in Action::all() {
            assert_eq!(Action::parse(action.label()), action);
        }
    }

    #[test]
    fn test_default_instruction() {
        assert_eq!(Action::Other("x".into()).instruction(), DEFAULT_INSTRUCTION);
        assert!(Action::Other("x".into()).group().is_none());
    }

    #[test]
    fn test_group_sizes() {
        let sizes: Vec<usize> = ActionGroup::ALL.iter().map(|g| g.actions().len()).collect();
        assert_eq!(sizes, vec![3, 4, 6, 6, 6, 2]);
    }

    #[test]
    fn test_instructions_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for action in Action::all() {
            assert!(seen.insert(action.instruction()), "{}", action);
        }
    }

    #[test]
    fn test_serde_uses_label() {
        let json = serde_json::to_string(&Action::TranslateGerman).unwrap();
        assert_eq!(json, "\"Translate (German)\"");
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Action::TranslateGerman);
    }
}
