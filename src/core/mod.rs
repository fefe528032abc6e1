//! Core formatting pipeline
//!
//! Raw text flows through, in order:
//! - [`spacing`]: whitespace/typo repair on the raw string
//! - [`normalize`]: every math delimiter style rewritten to `$`
//! - [`segment`]: the normalized string split into text and math segments
//!
//! Solution text is first split into lines by [`classify`], and each
//! retained line runs through the steps above. [`pipeline`] wires it all
//! together.

pub mod classify;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod segment;
pub mod spacing;
pub mod validate;

pub use classify::{classify_line, classify_solution, LineRule, LINE_RULES};
pub use normalize::normalize_delimiters;
pub use pipeline::MathTextPipeline;
pub use rules::RewriteRule;
pub use segment::Segmenter;
pub use spacing::repair_spacing;
pub use validate::{AcceptAll, MathCheck, MitexCheck};
