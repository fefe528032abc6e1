//! HTML output for the web front end.
//!
//! Math is emitted as escaped TeX inside `span.math-inline` for client-side
//! KaTeX; text keeps its line breaks as `<br>`. A math segment the check
//! rejects is written as escaped plain text, without delimiters.

use mathtutor_ir::{FormattedLine, LineRole, Segment};

use super::Renderer;
use crate::core::validate::{MathCheck, MitexCheck};

#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer<C = MitexCheck> {
    check: C,
}

impl HtmlRenderer<MitexCheck> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: MathCheck> HtmlRenderer<C> {
    pub fn with_check(check: C) -> Self {
        Self { check }
    }
}

/// CSS class of the `div` wrapping a line of the given role.
pub fn line_class(role: LineRole) -> Option<&'static str> {
    match role {
        LineRole::Heading => Some("solution-heading"),
        LineRole::Subheading => Some("solution-subheading"),
        LineRole::Emphasis => Some("solution-emphasis"),
        LineRole::StepHeader => Some("solution-step-header"),
        LineRole::ListItem => Some("solution-list-item"),
        LineRole::ChoiceLine => Some("solution-choice"),
        LineRole::Plain => Some("solution-text"),
        LineRole::Skip => None,
    }
}

impl<C: MathCheck> Renderer for HtmlRenderer<C> {
    fn render_segments(&self, segments: &[Segment]) -> String {
        let mut out = String::new();
        for segment in segments {
            match segment {
                Segment::Text { .. } => {
                    let pieces: Vec<String> =
                        segment.lines().into_iter().map(html_escape).collect();
                    out.push_str(&pieces.join("<br>"));
                }
                Segment::Math { expression } if self.check.accepts(expression) => {
                    out.push_str(r#"<span class="math-inline">"#);
                    out.push_str(&html_escape(expression));
                    out.push_str("</span>");
                }
                Segment::Math { expression } => out.push_str(&html_escape(expression)),
            }
        }
        out
    }

    fn render_lines(&self, lines: &[FormattedLine]) -> String {
        lines
            .iter()
            .filter_map(|line| {
                let class = line_class(line.role)?;
                let inner = self.render_segments(&line.segments);
                let inner = match line.role {
                    LineRole::Heading | LineRole::Subheading | LineRole::StepHeader => {
                        format!("<strong>{}</strong>", inner)
                    }
                    LineRole::Emphasis => format!("<em>{}</em>", inner),
                    _ => inner,
                };
                Some(format!(r#"<div class="{}">{}</div>"#, class, inner))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Escape HTML special characters in a string.
pub fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
