//! Problem dataset and booklet import

pub mod import;
pub mod problems;

pub use import::{ImportOutcome, ProblemImporter};
pub use problems::{Difficulty, ProblemFilter, ProblemId, ProblemRecord, ProblemSet};
