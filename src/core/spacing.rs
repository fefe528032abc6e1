//! Spacing and typo repair for raw problem/solution text.
//!
//! Dataset authoring and text generation both drop separating whitespace
//! around inserted tokens. These rules put it back. They run on the raw
//! string before delimiter normalization.

use lazy_static::lazy_static;

use super::rules::{apply_all, RewriteRule};

lazy_static! {
    /// Spacing rules, in application order.
    pub static ref SPACING_RULES: Vec<RewriteRule> = vec![
        // `\int` glued to the preceding word
        RewriteRule::new("then-int", r"Then\\int", r"Then $$\int$$"),
        RewriteRule::new("constant-then", r"constant\.Then", "constant. Then"),
        RewriteRule::new("letter-int", r"([a-zA-Z])\\int", r"${1} $$\int$$"),
        // word boundaries
        RewriteRule::new("lower-upper", r"([a-z])([A-Z])", "${1} ${2}"),
        RewriteRule::new("lower-digit", r"([a-z])([0-9])", "${1} ${2}"),
        RewriteRule::new("digit-lower", r"([0-9])([a-z])", "${1} ${2}"),
        // answer choices start a new paragraph
        RewriteRule::new("choice-break", r"\(([A-E])\)\s*", "\n\n(${1}) "),
        // whitespace cleanup
        RewriteRule::new("collapse-blanks", r"[ \t]+", " "),
        RewriteRule::new("collapse-indent", r"\n\s+", "\n"),
    ];
}

/// Run every spacing rule over `text` and trim the result.
pub fn repair_spacing(text: &str) -> String {
    apply_all(&SPACING_RULES, text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static RewriteRule {
        SPACING_RULES
            .iter()
            .find(|r| r.name == name)
            .expect("rule exists")
    }

    #[test]
    fn test_then_int() {
        assert_eq!(rule("then-int").apply(r"Then\int_0^1"), r"Then $\int$_0^1");
    }

    #[test]
    fn test_constant_then() {
        assert_eq!(
            rule("constant-then").apply("is a constant.Then we"),
            "is a constant. Then we"
        );
    }

    #[test]
    fn test_letter_int() {
        assert_eq!(rule("letter-int").apply(r"compute\int"), r"compute $\int$");
    }

    #[test]
    fn test_lower_upper() {
        assert_eq!(rule("lower-upper").apply("theFunction"), "the Function");
        assert_eq!(rule("lower-upper").apply("ABC"), "ABC");
    }

    #[test]
    fn test_letter_digit_both_orders() {
        assert_eq!(rule("lower-digit").apply("area5"), "area 5");
        assert_eq!(rule("digit-lower").apply("5units"), "5 units");
        // uppercase letters are left alone
        assert_eq!(rule("lower-digit").apply("X5"), "X5");
    }

    #[test]
    fn test_choice_break() {
        assert_eq!(rule("choice-break").apply("Pick:(A)  1"), "Pick:\n\n(A) 1");
        assert_eq!(rule("choice-break").apply("(F) 1"), "(F) 1");
    }

    #[test]
    fn test_collapse_blanks() {
        assert_eq!(rule("collapse-blanks").apply("a  \t b"), "a b");
    }

    #[test]
    fn test_collapse_indent() {
        assert_eq!(rule("collapse-indent").apply("a\n   b\n\n\nc"), "a\nb\nc");
    }

    #[test]
    fn test_choices_end_up_on_their_own_lines() {
        let out = repair_spacing("Which is largest? (A) 1 (B) 2 (C) 3");
        // the space before each inserted break survives; only indentation is folded
        assert_eq!(out, "Which is largest? \n(A) 1 \n(B) 2 \n(C) 3");
    }

    #[test]
    fn test_leading_choice_is_trimmed() {
        assert_eq!(repair_spacing("(A) yes"), "(A) yes");
    }

    #[test]
    fn test_trims_outer_whitespace() {
        assert_eq!(repair_spacing("  \n hello  "), "hello");
        assert_eq!(repair_spacing(""), "");
    }
}
