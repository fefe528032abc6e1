//! Math fragment checks.
//!
//! A fragment the renderer would choke on is shown as plain text instead.

use mitex_parser::syntax::SyntaxKind;
use mitex_parser::CommandSpec;
use mitex_spec_gen::DEFAULT_SPEC;
use tracing::warn;

/// Decides whether an extracted math expression can be rendered as math.
pub trait MathCheck {
    fn accepts(&self, expression: &str) -> bool;
}

/// Accepts every expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl MathCheck for AcceptAll {
    fn accepts(&self, _expression: &str) -> bool {
        true
    }
}

/// Parses the expression with the mitex LaTeX parser and rejects it when the
/// tree contains error tokens.
#[derive(Debug, Clone)]
pub struct MitexCheck {
    spec: CommandSpec,
}

impl Default for MitexCheck {
    fn default() -> Self {
        Self {
            spec: DEFAULT_SPEC.clone(),
        }
    }
}

impl MitexCheck {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MathCheck for MitexCheck {
    fn accepts(&self, expression: &str) -> bool {
        let tree = mitex_parser::parse(expression, self.spec.clone());
        let errors = tree
            .descendants_with_tokens()
            .filter(|elem| elem.kind() == SyntaxKind::TokenError)
            .count();
        if errors > 0 {
            warn!(expression, errors, "math fragment rejected, rendering as text");
        }
        errors == 0
    }
}

impl<C: MathCheck + ?Sized> MathCheck for &C {
    fn accepts(&self, expression: &str) -> bool {
        (**self).accepts(expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all() {
        assert!(AcceptAll.accepts(r"\frac{"));
    }

    #[test]
    fn test_mitex_accepts_common_fragments() {
        let check = MitexCheck::new();
        for expr in [
            "x^2",
            r"\frac{\pi}{2}",
            r"\int_0^1 f(x) dx",
            r"0 \leq x \leq \sqrt{\pi}",
            r"V = \pi \int_a^b [f(y)]^2 dy",
        ] {
            assert!(check.accepts(expr), "expected `{}` to be accepted", expr);
        }
    }
}
