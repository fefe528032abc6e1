//! # mathtutor
//!
//! Back end for a calculus practice tutor. The heart of the crate is the
//! formatting pipeline that turns loosely formatted, LLM-generated markdown
//! with mixed LaTeX delimiters into a stream of text and math segments,
//! and generated solutions into structurally classified lines.
//!
//! ## Pipeline
//!
//! ```text
//! raw text -> spacing repair -> delimiter normalization -> segmentation
//! solution -> line classification -> per-line normalization + segmentation
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use mathtutor::{render_math_text, Segment};
//!
//! let segments = render_math_text(r"Let \(x^2\) be positive");
//! assert_eq!(
//!     segments,
//!     vec![
//!         Segment::text("Let "),
//!         Segment::math("x^2"),
//!         Segment::text(" be positive"),
//!     ]
//! );
//! ```
//!
//! Around the pipeline sit the problem dataset ([`data`]), the hint and
//! solution generation service ([`service`]), the identity provider
//! ([`auth`]) and the practice session state ([`session`]).

pub mod auth;
pub mod config;
pub mod core;
pub mod data;
#[cfg(not(target_arch = "wasm32"))]
pub mod practice;
pub mod render;
pub mod service;
pub mod session;
pub mod utils;
pub mod wasm;

pub use mathtutor_ir::{
    to_source, ClassifiedLine, FormattedLine, LineRole, Segment, MATH_DELIMITER,
};

pub use crate::core::{
    classify_line, classify_solution, normalize_delimiters, repair_spacing, AcceptAll,
    MathCheck, MathTextPipeline, MitexCheck, Segmenter,
};
pub use crate::data::{Difficulty, ProblemFilter, ProblemRecord, ProblemSet};
pub use crate::render::{HtmlRenderer, Renderer, TerminalRenderer};
pub use crate::service::{GenerationMode, TextGenerator};
pub use crate::session::TutorSession;
pub use crate::utils::error::{TutorError, TutorResult};

/// Render free text (problem statements, choices, hints) into segments
/// using the default pipeline.
pub fn render_math_text(text: &str) -> Vec<Segment> {
    MathTextPipeline::new().render_math_text(text)
}

/// Classify and segment a generated solution using the default pipeline.
pub fn format_solution(solution: &str) -> Vec<FormattedLine> {
    MathTextPipeline::new().format_solution(solution)
}
