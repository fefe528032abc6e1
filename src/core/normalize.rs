//! Math delimiter normalization.
//!
//! LLM output mixes `\( \)`, `\[ \]`, `$$ $$` and stray `\cmd{..}` escapes
//! outside math mode. Everything is rewritten to the single `$` delimiter.

use lazy_static::lazy_static;
use mathtutor_ir::MATH_DELIMITER;
use regex::{Captures, Regex};

use super::rules::{apply_all, RewriteRule};

lazy_static! {
    /// Delimiter rewrites, in application order.
    pub static ref DELIMITER_RULES: Vec<RewriteRule> = vec![
        RewriteRule::new("paren-delimiters", r"\\\(|\\\)", "$$"),
        RewriteRule::new("bracket-delimiters", r"\\\[|\\\]", "$$"),
        RewriteRule::new("double-dollar", r"\$\$", "$$"),
    ];

    static ref BARE_COMMAND: Regex =
        Regex::new(r"\\([a-zA-Z]+)\s*\{([^}]*)\}").expect("valid bare command pattern");
}

/// Rewrite every math delimiter style in `text` to `$`.
pub fn normalize_delimiters(text: &str) -> String {
    let text = apply_all(&DELIMITER_RULES, text);
    wrap_bare_commands(&text)
}

/// Wrap `\cmd{...}` found outside `$` pairs in its own `$...$`.
///
/// Spans at even positions after splitting on `$` are outside math.
pub fn wrap_bare_commands(text: &str) -> String {
    let delimiter = MATH_DELIMITER.to_string();

    text.split(MATH_DELIMITER)
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 0 && !part.is_empty() {
                BARE_COMMAND
                    .replace_all(part, |caps: &Captures| {
                        format!("$\\{}{{{}}}$", &caps[1], &caps[2])
                    })
                    .into_owned()
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&delimiter)
}
