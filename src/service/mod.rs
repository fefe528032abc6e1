//! Hint/solution generation service.
//!
//! The service takes a problem statement and a [`GenerationMode`] and
//! returns loosely formatted markdown with mixed LaTeX delimiters. The
//! formatting pipeline copes with whatever comes back.

pub mod client;
pub mod prompts;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::utils::error::TutorResult;

#[cfg(not(target_arch = "wasm32"))]
pub use client::ChatClient;
pub use client::parse_chat_response;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Hint,
    Solution,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Hint => "hint",
            GenerationMode::Solution => "solution",
        }
    }

    /// Action name used in user-facing error messages.
    pub fn action(&self) -> String {
        format!("generate {}", self.as_str())
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces hint or solution text for a problem.
///
/// One call is one attempt; implementations do not retry.
pub trait TextGenerator: Send + Sync + 'static {
    fn generate(
        &self,
        problem: &str,
        mode: GenerationMode,
    ) -> impl Future<Output = TutorResult<String>> + Send;
}
