//! Highlight descriptors supplied by the analysis collaborator.

use serde::{Deserialize, Serialize};

/// Closed set of critique categories. Anything else is rejected upstream by
/// the response validator; the renderer additionally tolerates nothing
/// outside this set by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fluff,
    Fallacy,
    Assumption,
    Contradiction,
    Inconsistency,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Fluff,
        Category::Fallacy,
        Category::Assumption,
        Category::Contradiction,
        Category::Inconsistency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fluff => "fluff",
            Category::Fallacy => "fallacy",
            Category::Assumption => "assumption",
            Category::Contradiction => "contradiction",
            Category::Inconsistency => "inconsistency",
        }
    }

    /// Class assigned to inline markers and overlay boxes; colors live in
    /// the injected stylesheet, never in engine code.
    pub fn highlight_class(&self) -> String {
        format!("highlight-{}", self.as_str())
    }

    pub fn tooltip_class(&self) -> String {
        format!("tooltip-type-{}", self.as_str())
    }

    /// Badge label shown in the tooltip ("Fluff", "Fallacy", ...).
    pub fn badge_label(&self) -> String {
        let s = self.as_str();
        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
        }
        out.push_str(chars.as_str());
        out
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One critique item to anchor onto the page.
///
/// `text` is expected to be a verbatim quote from the flattened document;
/// matching tolerates whitespace and markup-boundary differences only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightDescriptor {
    pub text: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl HighlightDescriptor {
    pub fn new(
        text: impl Into<String>,
        category: Category,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            category,
            explanation: explanation.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}
