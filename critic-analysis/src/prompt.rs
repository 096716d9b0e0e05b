//! Prompt construction and response parsing.
//!
//! Each task owns both sides of its contract with the model: the instruction
//! text it renders and the parser that turns the model's (often messy) reply
//! into typed data. Replies routinely arrive wrapped in prose or code
//! fences, so JSON parsers cut from the first `{` to the last `}` before
//! deserializing.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use content_critic::{Category, HighlightDescriptor};

use crate::error::AnalysisError;

/// Longest suggestion accepted back from the model, in chars.
pub const MAX_SUGGESTION_CHARS: usize = 500;

/// Language the model is asked to answer in.
#[derive(Debug, Clone)]
pub struct PromptOptions {
    pub language: String,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            language: "ENGLISH".to_string(),
        }
    }
}

/// The free-form half of a critique reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Analysis {
    /// Markdown table summarizing premise, risks, effects, tradeoffs.
    pub summary: String,
    /// The detailed critique, markdown with `#`/`##`/`###` headers.
    pub critique: String,
}

/// A fully parsed and validated critique reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Critique {
    pub analysis: Analysis,
    pub highlights: Vec<HighlightDescriptor>,
}

#[derive(Debug, Deserialize)]
struct RawCritique {
    analysis: Analysis,
    #[serde(default)]
    highlights: Vec<RawHighlight>,
}

#[derive(Debug, Deserialize)]
struct RawHighlight {
    text: String,
    #[serde(rename = "type")]
    kind: String,
    explanation: String,
    suggestion: Option<String>,
}

/// The JSON object embedded in `raw`, cut from the first `{` to the last
/// `}`.
fn json_object(raw: &str) -> Result<&str, AnalysisError> {
    let start = raw.find('{').ok_or(AnalysisError::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(AnalysisError::NoJsonObject)?;
    if end < start {
        return Err(AnalysisError::NoJsonObject);
    }
    Ok(&raw[start..=end])
}

/// Content critique: categorized verbatim quotes plus a markdown analysis.
#[derive(Debug, Clone, Default)]
pub struct CriticPrompt {
    pub options: PromptOptions,
}

impl CriticPrompt {
    pub fn new(options: PromptOptions) -> Self {
        Self { options }
    }

    /// The full request text for critiquing `content`.
    pub fn render(&self, content: &str) -> String {
        format!(
            r#"You are a sharp, rigorous reviewer. Critique the content below: surface weak
assumptions, logical fallacies, contradictions, inconsistencies, and filler.
Test ideas with second-order thinking, inversion, and tradeoffs. No praise
unless it serves the analysis.

Output rules: return ONLY a valid JSON object like this:
{{
  "analysis": {{
    "summary": "A 5-10 row Markdown table summarizing core premise, risks, effects, and tradeoffs",
    "critique": "Your detailed critique in markdown, using #, ##, ### for headers."
  }},
  "highlights": [
    {{
      "text": "Exact text copied verbatim from the content",
      "type": "fluff|fallacy|assumption|contradiction|inconsistency",
      "explanation": "Why this text is problematic",
      "suggestion": "Optional suggestion for improvement"
    }}
  ]
}}

1. Return ONLY the JSON object, no other text; it must be valid and complete
2. The "text" field must be copied verbatim from the content, never paraphrased
3. Do not put your analysis in the "text" field; use "explanation" instead
4. Highlight types MUST be one of: fluff|fallacy|assumption|contradiction|inconsistency

Your answer must be in {language}.
Please analyze and critique the following content:

{content}"#,
            language = self.options.language,
            content = content,
        )
    }

    /// Parse and validate a critique reply. Highlights with an unknown
    /// category or an empty quote fail the whole reply: a misshapen batch is
    /// a model error, not something to render half of.
    pub fn parse(&self, raw: &str) -> Result<Critique, AnalysisError> {
        let parsed: RawCritique = serde_json::from_str(json_object(raw)?)?;
        let mut highlights = Vec::with_capacity(parsed.highlights.len());
        for (index, h) in parsed.highlights.into_iter().enumerate() {
            let category: Category = h
                .kind
                .parse()
                .map_err(|_| AnalysisError::UnknownCategory(h.kind.clone()))?;
            if h.text.trim().is_empty() {
                return Err(AnalysisError::InvalidHighlight(format!(
                    "highlight {} has an empty \"text\" field",
                    index
                )));
            }
            if h.explanation.trim().is_empty() {
                return Err(AnalysisError::InvalidHighlight(format!(
                    "highlight {} has an empty \"explanation\" field",
                    index
                )));
            }
            let mut descriptor = HighlightDescriptor::new(h.text, category, h.explanation);
            if let Some(suggestion) = h.suggestion {
                descriptor = descriptor.with_suggestion(suggestion);
            }
            highlights.push(descriptor);
        }
        Ok(Critique {
            analysis: parsed.analysis,
            highlights,
        })
    }
}

/// Keyed page translation: `{"t0": ..., "t1": ...}` in, same keys out.
#[derive(Debug, Clone, Default)]
pub struct TranslationPrompt {
    pub options: PromptOptions,
}

impl TranslationPrompt {
    pub fn new(options: PromptOptions) -> Self {
        Self { options }
    }

    /// The full request text for translating keyed `entries`
    /// (in `t<N>` order).
    pub fn render<'a>(
        &self,
        entries: impl IntoIterator<Item = (String, &'a str)>,
    ) -> String {
        let texts: HashMap<String, &str> = entries.into_iter().collect();
        let mut keys: Vec<&String> = texts.keys().collect();
        keys.sort_by_key(|k| k.trim_start_matches('t').parse::<usize>().unwrap_or(usize::MAX));
        let mut payload = String::from("{");
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                payload.push(',');
            }
            payload.push_str(
                &serde_json::to_string(key).unwrap_or_default(),
            );
            payload.push(':');
            payload.push_str(&serde_json::to_string(texts[*key]).unwrap_or_default());
        }
        payload.push('}');

        format!(
            r#"You are a translator. Return a JSON object of {language} translations.

FORMAT: {{"t0":"translation0","t1":"translation1",...}}

CRITICAL RULES:
1. Return ONLY a valid JSON object
2. Keep tech terms in English
3. Keep numbers and units unchanged
4. Each input key (t0, t1, etc.) MUST have exactly one translation
5. NEVER split one input text into multiple translations
6. NEVER merge multiple input texts into one translation
7. Do not add or remove any keys

Texts: {payload}"#,
            language = self.options.language,
            payload = payload,
        )
    }

    /// Parse a translation reply into its keyed map. Keys that do not look
    /// like `t<N>` are rejected.
    pub fn parse(&self, raw: &str) -> Result<HashMap<String, String>, AnalysisError> {
        let translations: HashMap<String, String> =
            serde_json::from_str(json_object(raw)?)?;
        for key in translations.keys() {
            let valid = key
                .strip_prefix('t')
                .map_or(false, |rest| rest.parse::<usize>().is_ok());
            if !valid {
                return Err(AnalysisError::InvalidHighlight(format!(
                    "invalid translation key `{}`",
                    key
                )));
            }
        }
        Ok(translations)
    }
}

/// One-shot rewrite suggestion for a single highlighted passage.
#[derive(Debug, Clone, Default)]
pub struct SuggestionPrompt {
    pub options: PromptOptions,
}

impl SuggestionPrompt {
    pub fn new(options: PromptOptions) -> Self {
        Self { options }
    }

    pub fn render(
        &self,
        category: Category,
        text: &str,
        explanation: &str,
        context_before: &str,
        context_after: &str,
    ) -> String {
        format!(
            r#"As a content review expert, suggest an improvement for the text below.

Analysis type: {category}

<previousContext>
{context_before}
</previousContext>

<textAnalyzed>
{text}
</textAnalyzed>

<followingContext>
{context_after}
</followingContext>

<currentExplanation>
{explanation}
</currentExplanation>

Suggest a rewording that resolves the identified problem and fits naturally
between the surrounding context. The suggestion must not exceed {max} characters.
Your answer must be in {language}.
Reply with the improvement only, no extra explanation."#,
            category = category,
            text = text,
            explanation = explanation,
            context_before = context_before,
            context_after = context_after,
            max = MAX_SUGGESTION_CHARS,
            language = self.options.language,
        )
    }

    /// A suggestion reply is the plain rewritten text. Over-length replies
    /// are truncated on a char boundary rather than rejected.
    pub fn parse(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.chars().count() > MAX_SUGGESTION_CHARS {
            warn!(
                chars = trimmed.chars().count(),
                "suggestion over length limit, truncating"
            );
            return trimmed.chars().take(MAX_SUGGESTION_CHARS).collect();
        }
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critique_reply_wrapped_in_prose_still_parses() {
        let raw = r##"Here is my analysis:
```json
{
  "analysis": {"summary": "| a | b |", "critique": "# Critique"},
  "highlights": [
    {"text": "clearly the best", "type": "fluff", "explanation": "empty superlative"}
  ]
}
```
Hope this helps!"##;
        let critique = CriticPrompt::default().parse(raw).unwrap();
        assert_eq!(critique.analysis.critique, "# Critique");
        assert_eq!(critique.highlights.len(), 1);
        assert_eq!(critique.highlights[0].category, Category::Fluff);
        assert_eq!(critique.highlights[0].suggestion, None);
    }

    #[test]
    fn unknown_category_rejects_the_reply() {
        let raw = r#"{
  "analysis": {"summary": "s", "critique": "c"},
  "highlights": [{"text": "x", "type": "snark", "explanation": "e"}]
}"#;
        match CriticPrompt::default().parse(raw) {
            Err(AnalysisError::UnknownCategory(kind)) => assert_eq!(kind, "snark"),
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn missing_highlights_defaults_to_empty() {
        let raw = r#"{"analysis": {"summary": "s", "critique": "c"}}"#;
        let critique = CriticPrompt::default().parse(raw).unwrap();
        assert!(critique.highlights.is_empty());
    }

    #[test]
    fn reply_without_json_is_an_error() {
        assert!(matches!(
            CriticPrompt::default().parse("I cannot do that."),
            Err(AnalysisError::NoJsonObject)
        ));
    }

    #[test]
    fn translation_render_keeps_numeric_key_order() {
        let entries = (0..11).map(|i| (format!("t{}", i), "text"));
        let rendered = TranslationPrompt::default().render(entries);
        let t2 = rendered.find("\"t2\":").unwrap();
        let t10 = rendered.find("\"t10\":").unwrap();
        assert!(t2 < t10);
    }

    #[test]
    fn translation_reply_parses_and_validates_keys() {
        let prompt = TranslationPrompt::default();
        let parsed = prompt.parse(r#"{"t0": "Bonjour", "t1": "Monde"}"#).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["t0"], "Bonjour");

        assert!(prompt.parse(r#"{"nope": "x"}"#).is_err());
    }

    #[test]
    fn suggestion_reply_is_trimmed_and_capped() {
        let prompt = SuggestionPrompt::default();
        assert_eq!(prompt.parse("  shorter wording  "), "shorter wording");
        let long = "x".repeat(600);
        assert_eq!(prompt.parse(&long).chars().count(), MAX_SUGGESTION_CHARS);
    }
}
