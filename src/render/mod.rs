//! Renderer adapters for segments and formatted lines.

pub mod html;
pub mod terminal;

use mathtutor_ir::{FormattedLine, Segment};

pub use html::HtmlRenderer;
pub use terminal::TerminalRenderer;

/// Turns pipeline output into a displayable string.
pub trait Renderer {
    fn render_segments(&self, segments: &[Segment]) -> String;

    fn render_lines(&self, lines: &[FormattedLine]) -> String;
}
