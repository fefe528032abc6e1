//! Integration tests for the math text formatting pipeline

use mathtutor::{
    classify_solution, format_solution, render_math_text, to_source, HtmlRenderer, LineRole,
    MathTextPipeline, Renderer, Segment,
};
use pretty_assertions::assert_eq;

fn pipeline() -> MathTextPipeline {
    MathTextPipeline::new()
}

// ============================================================================
// Segmentation
// ============================================================================

mod segmentation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_without_delimiters_is_one_segment() {
        let inputs = [
            "Find the area under the curve.",
            "What is the limit as x approaches zero?",
            "A tank holds 40 liters.",
        ];
        for input in inputs {
            assert_eq!(
                pipeline().segment_normalized(input),
                vec![Segment::text(input)],
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_paren_delimiters_split_three_ways() {
        assert_eq!(
            pipeline().segment_normalized(r"area \(x+1\) units"),
            vec![
                Segment::text("area "),
                Segment::math("x+1"),
                Segment::text(" units"),
            ]
        );
    }

    #[test]
    fn test_every_delimiter_style() {
        let expected = vec![
            Segment::text("so "),
            Segment::math("y = 3"),
            Segment::text(" holds"),
        ];
        for input in [
            r"so \(y = 3\) holds",
            r"so \[y = 3\] holds",
            "so $$y = 3$$ holds",
            "so $y = 3$ holds",
        ] {
            assert_eq!(pipeline().segment_normalized(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_bare_command_outside_math_is_wrapped() {
        assert_eq!(
            pipeline().segment_normalized(r"the value \sqrt{2} is irrational"),
            vec![
                Segment::text("the value "),
                Segment::math(r"\sqrt{2}"),
                Segment::text(" is irrational"),
            ]
        );
    }

    #[test]
    fn test_unterminated_math_never_panics() {
        assert_eq!(
            pipeline().render_math_text("abc $x^2"),
            vec![Segment::text("abc $x^2")]
        );
        assert_eq!(
            render_math_text("abc $x^2"),
            vec![Segment::text("abc $x^2")]
        );
    }

    #[test]
    fn test_reconstruction_is_idempotent() {
        let inputs = [
            r"If \(f(x) = x^2\), then \[f'(x) = 2x\].",
            "Compute $$\\int_0^1 x\\,dx$$ and $y$.",
            r"Simplify \frac{a}{b} when $b \neq 0$",
            "price is 5$ today",
            "$a$$b$ adjacent",
            "abc $x^2",
            r"see $\frac{1}{2}}$ ok",
            r"broken \(\frac{1\) then $\sqrt{2}$",
        ];
        let p = pipeline();
        for input in inputs {
            let first = p.segment_normalized(input);
            let second = p.segment_normalized(&to_source(&first));
            assert_eq!(first, second, "input: {}", input);
        }
    }
}

// ============================================================================
// Spacing repair through the full pipeline
// ============================================================================

mod spacing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_glued_words_and_numbers_are_separated() {
        assert_eq!(
            pipeline().render_math_text("the functionFis defined for x2values"),
            vec![Segment::text("the function Fis defined for x 2 values")]
        );
    }

    #[test]
    fn test_choices_start_new_lines() {
        let segments = pipeline().render_math_text("Which is larger? (A) $e$ (B) $\\pi$");
        assert_eq!(
            segments,
            vec![
                Segment::text("Which is larger? \n(A) "),
                Segment::math("e"),
                Segment::text(" \n(B) "),
                Segment::math("\\pi"),
            ]
        );
    }

    #[test]
    fn test_whitespace_only_renders_nothing() {
        assert!(pipeline().render_math_text(" \t\n  ").is_empty());
    }
}

// ============================================================================
// Solution formatting
// ============================================================================

mod solutions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bold_step_is_heading() {
        let lines = classify_solution("**Step 1: do X**");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].role, LineRole::Heading);
        assert_eq!(lines[0].content, "Step 1: do X");
    }

    #[test]
    fn test_subheading_final_answer() {
        let lines = pipeline().format_solution("### Final Answer: $x = 2$");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].role, LineRole::Subheading);
        assert_eq!(
            lines[0].segments,
            vec![Segment::text("Final Answer: "), Segment::math("x = 2")]
        );
    }

    #[test]
    fn test_typical_solution_roles() {
        let roles: Vec<LineRole> =
            classify_solution("**Solution:**\nStep 1: expand.\n(A) 2\n(B) 3")
                .into_iter()
                .map(|line| line.role)
                .collect();
        assert_eq!(
            roles,
            vec![
                LineRole::Heading,
                LineRole::StepHeader,
                LineRole::ChoiceLine,
                LineRole::ChoiceLine,
            ]
        );
    }

    #[test]
    fn test_full_solution() {
        let solution = "\
## Solution:

Step 1: Substitute \\(u = x^2\\), so \\(du = 2\\,x\\,dx\\).

- The bounds become $0$ and $1$.
*Remember the constant.*

**Final Answer:** $\\frac{1}{2}$";
        let lines = pipeline().format_solution(solution);
        let roles: Vec<LineRole> = lines.iter().map(|line| line.role).collect();
        assert_eq!(
            roles,
            vec![
                LineRole::StepHeader,
                LineRole::ListItem,
                LineRole::Emphasis,
                LineRole::Plain,
            ]
        );
        assert_eq!(
            lines[0].segments,
            vec![
                Segment::text("Step 1: Substitute "),
                Segment::math("u = x^2"),
                Segment::text(", so "),
                Segment::math("du = 2\\,x\\,dx"),
                Segment::text("."),
            ]
        );
        assert_eq!(
            lines[1].segments,
            vec![
                Segment::text("The bounds become "),
                Segment::math("0"),
                Segment::text(" and "),
                Segment::math("1"),
                Segment::text("."),
            ]
        );
        assert_eq!(
            lines[2].segments,
            vec![Segment::text("Remember the constant.")]
        );
    }

    #[test]
    fn test_default_pipeline_drops_plain_solution_header() {
        let lines = format_solution("Solution:\nThus, $x = 1$.");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].role, LineRole::StepHeader);
    }
}

// ============================================================================
// HTML output
// ============================================================================

mod html {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_solution_html() {
        let lines = pipeline().format_solution("Step 1: Let $a < b$ & go");
        assert_eq!(
            HtmlRenderer::new().render_lines(&lines),
            "<div class=\"solution-step-header\"><strong>Step 1: Let \
             <span class=\"math-inline\">a &lt; b</span> &amp; go</strong></div>"
        );
    }

    #[test]
    fn test_unparsable_math_renders_as_text() {
        let segments = pipeline().render_math_text(r"see $\frac{1}{2}}$ ok");
        assert_eq!(segments[1], Segment::math(r"\frac{1}{2}}"));
        assert_eq!(
            HtmlRenderer::new().render_segments(&segments),
            r"see \frac{1}{2}} ok"
        );
    }
}
