//! Static problem collection.
//!
//! The dataset is a JSON array of problem records loaded once. A
//! [`ProblemSet`] is read-only and handed to whatever needs it.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::utils::error::{TutorError, TutorResult};

const DEFAULT_IMAGE_ALT: &str = "Problem diagram";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Badge color used by the front end.
    pub fn color(&self) -> &'static str {
        match self {
            Difficulty::Easy => "#10b981",
            Difficulty::Medium => "#f59e0b",
            Difficulty::Hard => "#ef4444",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(TutorError::dataset(format!("unknown difficulty '{}'", other))),
        }
    }
}

/// Dataset ids are numbers in some exports and strings in others.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProblemId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemId::Number(n) => write!(f, "{}", n),
            ProblemId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRecord {
    pub id: ProblemId,
    pub category: String,
    pub difficulty: Difficulty,
    pub problem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
}

impl ProblemRecord {
    pub fn new(
        id: ProblemId,
        category: impl Into<String>,
        difficulty: Difficulty,
        problem: impl Into<String>,
    ) -> Self {
        Self {
            id,
            category: category.into(),
            difficulty,
            problem: problem.into(),
            choices: None,
            correct_answer: None,
            image: None,
            image_alt: None,
        }
    }

    pub fn is_multiple_choice(&self) -> bool {
        self.choices.as_ref().is_some_and(|c| !c.is_empty())
    }

    pub fn is_correct(&self, choice: &str) -> bool {
        self.correct_answer.as_deref() == Some(choice)
    }

    pub fn image_alt_text(&self) -> &str {
        self.image_alt.as_deref().unwrap_or(DEFAULT_IMAGE_ALT)
    }
}

/// Category/difficulty filter. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemFilter {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl ProblemFilter {
    pub fn matches(&self, problem: &ProblemRecord) -> bool {
        let category_match = self
            .category
            .as_deref()
            .map_or(true, |c| problem.category == c);
        let difficulty_match = self.difficulty.map_or(true, |d| problem.difficulty == d);
        category_match && difficulty_match
    }

    pub fn is_unfiltered(&self) -> bool {
        self.category.is_none() && self.difficulty.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProblemSet {
    problems: Vec<ProblemRecord>,
}

impl ProblemSet {
    pub fn new(problems: Vec<ProblemRecord>) -> Self {
        Self { problems }
    }

    pub fn from_json(json: &str) -> TutorResult<Self> {
        let problems: Vec<ProblemRecord> = serde_json::from_str(json)
            .map_err(|e| TutorError::dataset(format!("invalid problem JSON: {}", e)))?;
        debug!(count = problems.len(), "problem set parsed");
        let set = Self::new(problems);
        for issue in set.validate() {
            warn!(%issue, "dataset inconsistency");
        }
        Ok(set)
    }

    pub fn load(path: impl AsRef<Path>) -> TutorResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            TutorError::dataset(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProblemRecord> {
        self.problems.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProblemRecord> {
        self.problems.iter()
    }

    /// Sorted, de-duplicated categories.
    pub fn categories(&self) -> Vec<String> {
        self.problems
            .iter()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Difficulties present in the set, easiest first.
    pub fn difficulties(&self) -> Vec<Difficulty> {
        self.problems
            .iter()
            .map(|p| p.difficulty)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Problem count per category, in category order.
    pub fn category_counts(&self) -> IndexMap<String, usize> {
        let mut counts: IndexMap<String, usize> = self
            .categories()
            .into_iter()
            .map(|c| (c, 0))
            .collect();
        for problem in &self.problems {
            if let Some(count) = counts.get_mut(&problem.category) {
                *count += 1;
            }
        }
        counts
    }

    /// Problem count per difficulty, easiest first.
    pub fn difficulty_counts(&self) -> IndexMap<Difficulty, usize> {
        let mut counts: IndexMap<Difficulty, usize> =
            self.difficulties().into_iter().map(|d| (d, 0)).collect();
        for problem in &self.problems {
            if let Some(count) = counts.get_mut(&problem.difficulty) {
                *count += 1;
            }
        }
        counts
    }

    /// Indices of the problems that pass `filter`, in dataset order.
    pub fn filter_indices(&self, filter: &ProblemFilter) -> Vec<usize> {
        self.problems
            .iter()
            .enumerate()
            .filter(|(_, p)| filter.matches(p))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn filtered(&self, filter: &ProblemFilter) -> Vec<&ProblemRecord> {
        self.problems.iter().filter(|p| filter.matches(p)).collect()
    }

    /// Records whose `correctAnswer` is missing from their `choices`.
    pub fn validate(&self) -> Vec<String> {
        self.problems
            .iter()
            .filter_map(|p| {
                let choices = p.choices.as_ref()?;
                match &p.correct_answer {
                    Some(answer) if choices.contains(answer) => None,
                    Some(answer) => Some(format!(
                        "problem {}: correct answer '{}' is not one of its choices",
                        p.id, answer
                    )),
                    None => Some(format!("problem {}: choices without a correct answer", p.id)),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id": 1, "category": "Integrals", "difficulty": "Medium",
         "problem": "Evaluate $\\int_0^1 x\\,dx$.",
         "choices": ["(A) 1/2", "(B) 1"], "correctAnswer": "(A) 1/2"},
        {"id": "lim-2", "category": "Limits", "difficulty": "Easy",
         "problem": "Find $\\lim_{x \\to 0} \\frac{\\sin x}{x}$."},
        {"id": 3, "category": "Integrals", "difficulty": "Hard",
         "problem": "Volume of revolution.", "image": "img/3.png"}
    ]"#;

    fn sample() -> ProblemSet {
        ProblemSet::from_json(SAMPLE).expect("sample parses")
    }

    #[test]
    fn test_parse_records() {
        let set = sample();
        assert_eq!(set.len(), 3);
        let first = set.get(0).expect("first");
        assert_eq!(first.id, ProblemId::Number(1));
        assert!(first.is_multiple_choice());
        assert!(first.is_correct("(A) 1/2"));
        assert!(!first.is_correct("(B) 1"));
        assert_eq!(set.get(1).expect("second").id, ProblemId::Text("lim-2".into()));
        assert_eq!(set.get(2).expect("third").image_alt_text(), "Problem diagram");
    }

    #[test]
    fn test_categories_and_counts() {
        let set = sample();
        assert_eq!(set.categories(), vec!["Integrals", "Limits"]);
        assert_eq!(
            set.difficulties(),
            vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        );
        let counts = set.category_counts();
        assert_eq!(counts.get("Integrals"), Some(&2));
        assert_eq!(counts.get("Limits"), Some(&1));
        assert_eq!(set.difficulty_counts().get(&Difficulty::Hard), Some(&1));
    }

    #[test]
    fn test_filtering() {
        let set = sample();
        let filter = ProblemFilter {
            category: Some("Integrals".into()),
            difficulty: None,
        };
        assert_eq!(set.filter_indices(&filter), vec![0, 2]);

        let filter = ProblemFilter {
            category: Some("Integrals".into()),
            difficulty: Some(Difficulty::Easy),
        };
        assert!(set.filtered(&filter).is_empty());
        assert_eq!(set.filter_indices(&ProblemFilter::default()).len(), 3);
    }

    #[test]
    fn test_validate_flags_bad_answer() {
        let set = ProblemSet::from_json(
            r#"[{"id": 9, "category": "c", "difficulty": "Easy", "problem": "p",
                 "choices": ["a", "b"], "correctAnswer": "z"}]"#,
        )
        .expect("parses");
        let issues = set.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("problem 9"));
    }

    #[test]
    fn test_invalid_json_is_dataset_error() {
        let err = ProblemSet::from_json("{not json").unwrap_err();
        assert!(matches!(err, TutorError::Dataset { .. }));
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("hard".parse::<Difficulty>().ok(), Some(Difficulty::Hard));
        assert!("extreme".parse::<Difficulty>().is_err());
    }
}
