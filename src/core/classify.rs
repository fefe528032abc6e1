//! Line classification for generated solutions.
//!
//! Each non-blank line gets a structural role from an ordered rule table;
//! the first matching rule wins. Patterns overlap (`**Step 1:**` is both bold
//! and a step header), so the order of [`LINE_RULES`] is part of the
//! contract.

use lazy_static::lazy_static;
use mathtutor_ir::{ClassifiedLine, LineRole};
use regex::Regex;

lazy_static! {
    static ref SOLUTION_HEADER: Regex =
        Regex::new(r"(?i)^(##\s*)?Solution:\s*$").expect("valid solution header pattern");
    static ref SUBHEADING_MARKER: Regex = Regex::new(r"^###\s*").expect("valid pattern");
    static ref HEADING_MARKER: Regex = Regex::new(r"^##\s*").expect("valid pattern");
    static ref STEP_HEADER: Regex = Regex::new(
        r"(?i)^(Step [0-9]+:|Answer:|Final Answer:|Therefore,|Thus,|Hence,)"
    )
    .expect("valid step header pattern");
    static ref NUMBERED_ITEM: Regex = Regex::new(r"^[0-9]+\.\s").expect("valid pattern");
    static ref LIST_MARKER: Regex = Regex::new(r"^(-|[0-9]+\.)\s*").expect("valid pattern");
    static ref CHOICE_MARKER: Regex =
        Regex::new(r"^[A-E]\)|^\([A-E]\)").expect("valid choice pattern");
}

/// One entry of the classification table. `extract` returns the line
/// content to keep when the rule matches.
pub struct LineRule {
    pub name: &'static str,
    pub role: LineRole,
    extract: fn(&str) -> Option<String>,
}

impl LineRule {
    pub fn apply(&self, line: &str) -> Option<ClassifiedLine> {
        (self.extract)(line).map(|content| ClassifiedLine::new(self.role, content))
    }
}

impl std::fmt::Debug for LineRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineRule")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish()
    }
}

/// Classification rules in precedence order.
pub static LINE_RULES: &[LineRule] = &[
    LineRule {
        name: "solution-header",
        role: LineRole::Skip,
        extract: |line| SOLUTION_HEADER.is_match(line).then(|| line.to_string()),
    },
    LineRule {
        name: "subheading",
        role: LineRole::Subheading,
        extract: |line| {
            line.starts_with("###")
                .then(|| SUBHEADING_MARKER.replace(line, "").into_owned())
        },
    },
    LineRule {
        name: "heading",
        role: LineRole::Heading,
        extract: |line| {
            line.starts_with("##")
                .then(|| HEADING_MARKER.replace(line, "").into_owned())
        },
    },
    LineRule {
        name: "bold",
        role: LineRole::Heading,
        extract: |line| {
            (line.starts_with("**") && line.ends_with("**") && line.len() > 4)
                .then(|| line[2..line.len() - 2].to_string())
        },
    },
    LineRule {
        name: "italic",
        role: LineRole::Emphasis,
        extract: |line| {
            (line.starts_with('*')
                && line.ends_with('*')
                && !line.starts_with("**")
                && line.len() > 2)
                .then(|| line[1..line.len() - 1].to_string())
        },
    },
    LineRule {
        name: "step-header",
        role: LineRole::StepHeader,
        extract: |line| STEP_HEADER.is_match(line).then(|| line.to_string()),
    },
    LineRule {
        name: "list-item",
        role: LineRole::ListItem,
        extract: |line| {
            (line.starts_with("- ") || NUMBERED_ITEM.is_match(line))
                .then(|| LIST_MARKER.replace(line, "").into_owned())
        },
    },
    LineRule {
        name: "choice",
        role: LineRole::ChoiceLine,
        extract: |line| CHOICE_MARKER.is_match(line).then(|| line.to_string()),
    },
];

/// Classify one line. The line is trimmed first; blank lines yield `None`.
pub fn classify_line(line: &str) -> Option<ClassifiedLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let classified = LINE_RULES
        .iter()
        .find_map(|rule| rule.apply(line))
        .unwrap_or_else(|| ClassifiedLine::new(LineRole::Plain, line));
    Some(classified)
}

/// Classify every non-blank line of `solution`, including `Skip` lines.
pub fn classify_solution(solution: &str) -> Vec<ClassifiedLine> {
    solution.split('\n').filter_map(classify_line).collect()
}
