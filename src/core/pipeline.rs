//! End-to-end formatting: raw text in, segments or formatted lines out.

use mathtutor_ir::{FormattedLine, LineRole, Segment};
use tracing::debug;

use super::classify::classify_solution;
use super::normalize::normalize_delimiters;
use super::segment::Segmenter;
use super::spacing::repair_spacing;

/// The formatting pipeline. Whether a math segment can be typeset is left
/// to the renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathTextPipeline {
    segmenter: Segmenter,
}

impl MathTextPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repair spacing, normalize delimiters and segment `text`.
    ///
    /// Empty input renders nothing.
    pub fn render_math_text(&self, text: &str) -> Vec<Segment> {
        if text.is_empty() {
            return Vec::new();
        }
        let repaired = repair_spacing(text);
        self.segment_normalized(&repaired)
    }

    /// Normalize delimiters and segment, without spacing repair.
    pub fn segment_normalized(&self, text: &str) -> Vec<Segment> {
        let normalized = normalize_delimiters(text);
        self.segmenter.segment(&normalized)
    }

    /// Classify `solution` line by line and render each retained line.
    ///
    /// `Skip` lines are dropped.
    pub fn format_solution(&self, solution: &str) -> Vec<FormattedLine> {
        classify_solution(solution)
            .into_iter()
            .filter(|line| {
                let keep = line.role != LineRole::Skip;
                if !keep {
                    debug!(content = %line.content, "skipping redundant heading");
                }
                keep
            })
            .map(|line| FormattedLine::new(line.role, self.render_math_text(&line.content)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathtutor_ir::to_source;

    fn pipeline() -> MathTextPipeline {
        MathTextPipeline::new()
    }

    #[test]
    fn test_empty_text_renders_nothing() {
        assert!(pipeline().render_math_text("").is_empty());
        assert!(pipeline().render_math_text("   \n ").is_empty());
        assert!(pipeline().format_solution("").is_empty());
    }

    #[test]
    fn test_mixed_delimiters() {
        assert_eq!(
            pipeline().render_math_text(r"If \(x = 2\), then $$x^2 = 4$$."),
            vec![
                Segment::text("If "),
                Segment::math("x = 2"),
                Segment::text(", then "),
                Segment::math("x^2 = 4"),
                Segment::text("."),
            ]
        );
    }

    #[test]
    fn test_problem_choices_are_split_into_lines() {
        let segments = pipeline().render_math_text("Evaluate $\\int_0^1 x dx$. (A) $1$ (B) $\\frac{1}{2}$");
        assert_eq!(
            segments,
            vec![
                Segment::text("Evaluate "),
                Segment::math("\\int_0^1 x dx"),
                Segment::text(". \n(A) "),
                Segment::math("1"),
                Segment::text(" \n(B) "),
                Segment::math("\\frac{1}{2}"),
            ]
        );
    }

    #[test]
    fn test_skip_lines_are_dropped() {
        let lines = pipeline().format_solution("## Solution:\nStep 1: add.");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].role, LineRole::StepHeader);
    }

    #[test]
    fn test_reconstruction_is_stable() {
        let p = pipeline();
        let first = p.segment_normalized(r"Let \(f(x) = x^2\) and \[g = \sqrt{x}\] so \frac{a}{b}");
        let second = p.segment_normalized(&to_source(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_reconstruction_is_stable_for_unparsable_math() {
        let p = pipeline();
        let first = p.segment_normalized(r"see $\frac{1}{2}}$ ok");
        assert_eq!(
            first,
            vec![
                Segment::text("see "),
                Segment::math(r"\frac{1}{2}}"),
                Segment::text(" ok"),
            ]
        );
        assert_eq!(p.segment_normalized(&to_source(&first)), first);
    }
}
