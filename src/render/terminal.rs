//! Plain-text output for the CLI.

use mathtutor_ir::{to_source, FormattedLine, LineRole, Segment};

use super::Renderer;

const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const RESET: &str = "\x1b[0m";

/// Renders math back inline as `$expr$`; headings and emphasis use ANSI
/// styles when `color` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer {
    pub color: bool,
}

impl TerminalRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", style, text, RESET)
        } else {
            text.to_string()
        }
    }
}

impl Renderer for TerminalRenderer {
    fn render_segments(&self, segments: &[Segment]) -> String {
        to_source(segments)
    }

    fn render_lines(&self, lines: &[FormattedLine]) -> String {
        lines
            .iter()
            .filter(|line| line.role != LineRole::Skip)
            .map(|line| {
                let text = self.render_segments(&line.segments);
                match line.role {
                    LineRole::Heading | LineRole::Subheading | LineRole::StepHeader => {
                        self.styled(BOLD, &text)
                    }
                    LineRole::Emphasis => self.styled(ITALIC, &text),
                    LineRole::ListItem => format!("• {}", text),
                    _ => text,
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<FormattedLine> {
        vec![
            FormattedLine::new(LineRole::StepHeader, vec![Segment::text("Step 1:")]),
            FormattedLine::new(
                LineRole::ListItem,
                vec![Segment::text("let "), Segment::math("x = 1")],
            ),
        ]
    }

    #[test]
    fn test_plain_output() {
        assert_eq!(
            TerminalRenderer::new(false).render_lines(&lines()),
            "Step 1:\n• let $x = 1$"
        );
    }

    #[test]
    fn test_colored_heading() {
        let out = TerminalRenderer::new(true).render_lines(&lines());
        assert!(out.starts_with("\x1b[1mStep 1:\x1b[0m"));
    }
}
