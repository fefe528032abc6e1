//! Ordered regex rewrite rules.

use regex::{NoExpand, Regex};
use tracing::trace;

/// A named regex rewrite. Rules are kept in slices and applied in slice
/// order; later rules may rely on the output of earlier ones.
#[derive(Debug)]
pub struct RewriteRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
    literal: bool,
}

impl RewriteRule {
    /// Build a rule from a pattern known at compile time.
    ///
    /// Panics if `pattern` is not a valid regex; rule tables are static and
    /// covered by tests.
    pub fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        let pattern = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid pattern for rule `{}`: {}", name, e));
        Self {
            name,
            pattern,
            replacement,
            literal: false,
        }
    }

    /// Plain substring replacement. Neither side is interpreted.
    pub fn literal(name: &'static str, from: &str, to: &'static str) -> Self {
        Self {
            literal: true,
            ..Self::new(name, &regex::escape(from), to)
        }
    }

    pub fn apply(&self, input: &str) -> String {
        if self.literal {
            self.pattern
                .replace_all(input, NoExpand(self.replacement))
                .into_owned()
        } else {
            self.pattern
                .replace_all(input, self.replacement)
                .into_owned()
        }
    }
}

/// Apply `rules` to `input` one after another.
pub fn apply_all(rules: &[RewriteRule], input: &str) -> String {
    rules.iter().fold(input.to_string(), |text, rule| {
        let next = rule.apply(&text);
        if next != text {
            trace!(rule = rule.name, "rewrite applied");
        }
        next
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_apply_in_order() {
        let rules = [
            RewriteRule::new("a-to-b", "a", "b"),
            RewriteRule::new("b-to-c", "b", "c"),
        ];
        assert_eq!(apply_all(&rules, "ab"), "cc");
    }

    #[test]
    fn test_replacement_groups() {
        let rule = RewriteRule::new("swap", r"(\w)-(\w)", "${2}-${1}");
        assert_eq!(rule.apply("a-b c-d"), "b-a d-c");
    }

    #[test]
    fn test_literal_rule() {
        let rule = RewriteRule::literal("int-dollar", r"\int \$", "$1");
        assert_eq!(rule.apply(r"\int \$0"), "$10");
    }
}
