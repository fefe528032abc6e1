//! Math/text segmentation of `$`-normalized strings.

use mathtutor_ir::{Segment, MATH_DELIMITER};

/// Splits normalized text into text and math segments.
///
/// Every `$...$` span with non-blank content becomes math, whether or not a
/// renderer can typeset it later. An unterminated trailing span stays text,
/// delimiter included. Adjacent text segments are merged, and line breaks
/// inside text are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter;

impl Segmenter {
    pub fn new() -> Self {
        Self
    }

    pub fn segment(&self, input: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        for part in split_parts(input) {
            self.push_part(&mut segments, &part);
        }
        segments
    }

    fn push_part(&self, segments: &mut Vec<Segment>, part: &str) {
        if !is_math_span(part) {
            push_text(segments, part);
            return;
        }

        let content = part[1..part.len() - 1].trim();
        if !content.is_empty() {
            segments.push(Segment::math(content));
        }
    }
}

/// Split on `$`, keeping delimiters attached to the math parts.
///
/// Text parts never contain `$`; math parts start with `$` and end with `$`
/// unless the input ran out first.
fn split_parts(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_math = false;

    for ch in input.chars() {
        if ch != MATH_DELIMITER {
            current.push(ch);
            continue;
        }
        if in_math {
            current.push(ch);
            parts.push(std::mem::take(&mut current));
            in_math = false;
        } else {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            current.push(ch);
            in_math = true;
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn is_math_span(part: &str) -> bool {
    part.len() > 2 && part.starts_with(MATH_DELIMITER) && part.ends_with(MATH_DELIMITER)
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text { value }) = segments.last_mut() {
        value.push_str(text);
    } else {
        segments.push(Segment::text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(input: &str) -> Vec<Segment> {
        Segmenter::new().segment(input)
    }

    #[test]
    fn test_plain_text_is_one_segment() {
        assert_eq!(
            segment("no math here\nsecond line"),
            vec![Segment::text("no math here\nsecond line")]
        );
    }

    #[test]
    fn test_inline_math() {
        assert_eq!(
            segment("area $A = \\pi r^2$ of a circle"),
            vec![
                Segment::text("area "),
                Segment::math("A = \\pi r^2"),
                Segment::text(" of a circle"),
            ]
        );
    }

    #[test]
    fn test_math_content_is_trimmed() {
        assert_eq!(segment("$ x + 1 $"), vec![Segment::math("x + 1")]);
    }

    #[test]
    fn test_blank_math_is_dropped() {
        assert_eq!(
            segment("a $ $ b"),
            vec![Segment::text("a  b")],
        );
    }

    #[test]
    fn test_unterminated_span_is_text() {
        assert_eq!(segment("abc $x^2"), vec![Segment::text("abc $x^2")]);
    }

    #[test]
    fn test_lone_dollar_is_text() {
        assert_eq!(segment("costs 5$"), vec![Segment::text("costs 5$")]);
        assert_eq!(segment("$$"), vec![Segment::text("$$")]);
    }

    #[test]
    fn test_unbalanced_math_stays_math() {
        assert_eq!(
            segment("see $\\frac{1}{2}}$ ok"),
            vec![
                Segment::text("see "),
                Segment::math("\\frac{1}{2}}"),
                Segment::text(" ok"),
            ]
        );
    }

    #[test]
    fn test_adjacent_math_spans() {
        assert_eq!(
            segment("$a$$b$"),
            vec![Segment::math("a"), Segment::math("b")]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_non_ascii_text_around_math() {
        assert_eq!(
            segment("größe $x$ – fertig"),
            vec![
                Segment::text("größe "),
                Segment::math("x"),
                Segment::text(" – fertig"),
            ]
        );
    }
}
