//! In-memory document model for formatted math text.

use serde::{Deserialize, Serialize};

/// Delimiter every math span is normalized to.
pub const MATH_DELIMITER: char = '$';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Text { value: String },
    Math { expression: String },
}

impl Segment {
    pub fn text(value: impl Into<String>) -> Self {
        Segment::Text {
            value: value.into(),
        }
    }

    pub fn math(expression: impl Into<String>) -> Self {
        Segment::Math {
            expression: expression.into(),
        }
    }

    pub fn is_math(&self) -> bool {
        matches!(self, Segment::Math { .. })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text { value } => value,
            Segment::Math { expression } => expression,
        }
    }

    /// Pieces of a text segment that a renderer separates with explicit
    /// line breaks. A math segment yields its expression as one piece.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Segment::Text { value } => value.split('\n').collect(),
            Segment::Math { expression } => vec![expression.as_str()],
        }
    }
}

/// Rebuild source text from segments, re-inserting the canonical delimiter
/// around math.
pub fn to_source(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text { value } => out.push_str(value),
            Segment::Math { expression } => {
                out.push(MATH_DELIMITER);
                out.push_str(expression);
                out.push(MATH_DELIMITER);
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineRole {
    Heading,
    Subheading,
    Emphasis,
    StepHeader,
    ListItem,
    ChoiceLine,
    Plain,
    /// Redundant heading the container already shows.
    Skip,
}

impl LineRole {
    pub fn name(&self) -> &'static str {
        match self {
            LineRole::Heading => "heading",
            LineRole::Subheading => "subheading",
            LineRole::Emphasis => "emphasis",
            LineRole::StepHeader => "step-header",
            LineRole::ListItem => "list-item",
            LineRole::ChoiceLine => "choice-line",
            LineRole::Plain => "plain",
            LineRole::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub role: LineRole,
    pub content: String,
}

impl ClassifiedLine {
    pub fn new(role: LineRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A classified line whose content has been segmented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedLine {
    pub role: LineRole,
    pub segments: Vec<Segment>,
}

impl FormattedLine {
    pub fn new(role: LineRole, segments: Vec<Segment>) -> Self {
        Self { role, segments }
    }
}
