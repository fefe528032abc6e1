//! Interactive practice session state.
//!
//! Holds the current position in the filtered problem list, the selected
//! answer, and one slot each for generated hint and solution text. Every
//! generation request is tagged with a [`RequestTicket`]; a completion is
//! applied only if its ticket is still the pending one for its slot, so a
//! late response can never overwrite state that belongs to a newer request
//! or another problem.

use std::sync::Arc;

use tracing::debug;

use crate::data::{Difficulty, ProblemFilter, ProblemRecord, ProblemSet};
use crate::service::GenerationMode;
use crate::utils::error::{TutorError, TutorResult};

/// Identity of one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    pub mode: GenerationMode,
    /// Bumped whenever the current problem or the filter changes
    pub epoch: u64,
    pub id: u64,
}

/// Hint or solution display state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedSlot {
    pub text: String,
    pub visible: bool,
    pub error: Option<String>,
    pending: Option<RequestTicket>,
}

impl GeneratedSlot {
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<RequestTicket> {
        self.pending
    }

    /// Text to display, if any.
    pub fn shown_text(&self) -> Option<&str> {
        (self.visible && !self.text.is_empty()).then_some(self.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The slot was visible and is now hidden and cleared
    Hidden,
    /// A request was started; run it and report back with the ticket
    Requested {
        ticket: RequestTicket,
        problem: String,
    },
    /// A request for this slot is already in flight
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerFeedback {
    Correct,
    Incorrect { correct_answer: Option<String> },
}

#[derive(Debug)]
pub struct TutorSession {
    problems: Arc<ProblemSet>,
    filter: ProblemFilter,
    filtered: Vec<usize>,
    index: usize,
    epoch: u64,
    next_request_id: u64,
    hint: GeneratedSlot,
    solution: GeneratedSlot,
    selected_answer: Option<String>,
    feedback: Option<AnswerFeedback>,
}

impl TutorSession {
    pub fn new(problems: Arc<ProblemSet>) -> Self {
        let filter = ProblemFilter::default();
        let filtered = problems.filter_indices(&filter);
        Self {
            problems,
            filter,
            filtered,
            index: 0,
            epoch: 0,
            next_request_id: 0,
            hint: GeneratedSlot::default(),
            solution: GeneratedSlot::default(),
            selected_answer: None,
            feedback: None,
        }
    }

    pub fn problems(&self) -> &ProblemSet {
        &self.problems
    }

    pub fn filter(&self) -> &ProblemFilter {
        &self.filter
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn current_problem(&self) -> Option<&ProblemRecord> {
        self.filtered
            .get(self.index)
            .and_then(|&i| self.problems.get(i))
    }

    /// One-based position and filtered total, e.g. `(3, 12)`.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current_problem()
            .map(|_| (self.index + 1, self.filtered.len()))
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.filter.category = category;
        self.apply_filter();
    }

    pub fn set_difficulty(&mut self, difficulty: Option<Difficulty>) {
        self.filter.difficulty = difficulty;
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        self.filtered = self.problems.filter_indices(&self.filter);
        self.index = 0;
        debug!(filter = ?self.filter, matches = self.filtered.len(), "filter changed");
        self.reset_problem_state();
    }

    /// Move to the next problem, wrapping to the first.
    pub fn next(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.filtered.len();
        self.reset_problem_state();
    }

    /// Move to the previous problem, wrapping to the last.
    pub fn previous(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.index = if self.index == 0 {
            self.filtered.len() - 1
        } else {
            self.index - 1
        };
        self.reset_problem_state();
    }

    fn reset_problem_state(&mut self) {
        self.epoch += 1;
        self.hint = GeneratedSlot::default();
        self.solution = GeneratedSlot::default();
        self.selected_answer = None;
        self.feedback = None;
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    pub fn is_submitted(&self) -> bool {
        self.feedback.is_some()
    }

    pub fn feedback(&self) -> Option<&AnswerFeedback> {
        self.feedback.as_ref()
    }

    /// Select a choice. Ignored once an answer has been submitted.
    pub fn select_answer(&mut self, choice: impl Into<String>) -> TutorResult<bool> {
        if self.current_problem().is_none() {
            return Err(TutorError::NoCurrentProblem);
        }
        if self.is_submitted() {
            return Ok(false);
        }
        self.selected_answer = Some(choice.into());
        Ok(true)
    }

    /// Submit the selected answer. Returns `None` when nothing is selected
    /// or an answer was already submitted.
    pub fn submit_answer(&mut self) -> TutorResult<Option<AnswerFeedback>> {
        let problem = self.current_problem().ok_or(TutorError::NoCurrentProblem)?;
        if self.is_submitted() {
            return Ok(None);
        }
        let Some(selected) = self.selected_answer.as_deref() else {
            return Ok(None);
        };
        let feedback = if problem.is_correct(selected) {
            AnswerFeedback::Correct
        } else {
            AnswerFeedback::Incorrect {
                correct_answer: problem.correct_answer.clone(),
            }
        };
        self.feedback = Some(feedback.clone());
        Ok(Some(feedback))
    }

    pub fn slot(&self, mode: GenerationMode) -> &GeneratedSlot {
        match mode {
            GenerationMode::Hint => &self.hint,
            GenerationMode::Solution => &self.solution,
        }
    }

    fn slot_mut(&mut self, mode: GenerationMode) -> &mut GeneratedSlot {
        match mode {
            GenerationMode::Hint => &mut self.hint,
            GenerationMode::Solution => &mut self.solution,
        }
    }

    pub fn hint(&self) -> &GeneratedSlot {
        &self.hint
    }

    pub fn solution(&self) -> &GeneratedSlot {
        &self.solution
    }

    /// Show/hide button for a slot.
    pub fn toggle(&mut self, mode: GenerationMode) -> TutorResult<ToggleOutcome> {
        let problem = self
            .current_problem()
            .ok_or(TutorError::NoCurrentProblem)?
            .problem
            .clone();
        let epoch = self.epoch;
        self.next_request_id += 1;
        let id = self.next_request_id;

        let slot = self.slot_mut(mode);
        if slot.visible {
            slot.visible = false;
            slot.text.clear();
            return Ok(ToggleOutcome::Hidden);
        }
        if slot.pending.is_some() {
            debug!(%mode, "request already pending");
            return Ok(ToggleOutcome::Busy);
        }

        let ticket = RequestTicket { mode, epoch, id };
        slot.error = None;
        slot.pending = Some(ticket);
        Ok(ToggleOutcome::Requested { ticket, problem })
    }

    /// Apply a finished request. Returns `false` for stale tickets, which
    /// leave the session untouched.
    pub fn complete(&mut self, ticket: RequestTicket, result: TutorResult<String>) -> bool {
        let slot = self.slot_mut(ticket.mode);
        if slot.pending != Some(ticket) {
            debug!(?ticket, "dropping stale response");
            return false;
        }
        slot.pending = None;
        match result {
            Ok(text) => {
                slot.text = text;
                slot.visible = true;
            }
            Err(err) => {
                slot.error = Some(err.to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> TutorSession {
        let set = ProblemSet::from_json(
            r#"[
            {"id": 1, "category": "Limits", "difficulty": "Easy", "problem": "p1",
             "choices": ["1", "2"], "correctAnswer": "2"},
            {"id": 2, "category": "Series", "difficulty": "Hard", "problem": "p2"},
            {"id": 3, "category": "Limits", "difficulty": "Hard", "problem": "p3"}
        ]"#,
        )
        .expect("valid");
        TutorSession::new(Arc::new(set))
    }

    fn current(s: &TutorSession) -> &str {
        &s.current_problem().expect("problem").problem
    }

    #[test]
    fn test_navigation_wraps() {
        let mut s = session();
        assert_eq!(s.position(), Some((1, 3)));
        s.previous();
        assert_eq!(current(&s), "p3");
        s.next();
        assert_eq!(current(&s), "p1");
        s.next();
        s.next();
        s.next();
        assert_eq!(current(&s), "p1");
    }

    #[test]
    fn test_filter_resets_to_first_match() {
        let mut s = session();
        s.next();
        s.set_category(Some("Limits".into()));
        assert_eq!(s.position(), Some((1, 2)));
        s.set_difficulty(Some(Difficulty::Hard));
        assert_eq!(current(&s), "p3");
        s.set_category(Some("Geometry".into()));
        assert!(s.current_problem().is_none());
        assert!(s.position().is_none());
        s.next();
        assert!(matches!(
            s.toggle(GenerationMode::Hint),
            Err(TutorError::NoCurrentProblem)
        ));
    }

    #[test]
    fn test_answer_flow() {
        let mut s = session();
        assert_eq!(s.submit_answer().expect("problem"), None);
        assert!(s.select_answer("1").expect("problem"));
        assert!(s.select_answer("2").expect("problem"));
        assert_eq!(s.submit_answer().expect("problem"), Some(AnswerFeedback::Correct));
        // locked after submission
        assert!(!s.select_answer("1").expect("problem"));
        assert_eq!(s.submit_answer().expect("problem"), None);
        assert_eq!(s.selected_answer(), Some("2"));
    }

    #[test]
    fn test_wrong_answer_reports_correct_one() {
        let mut s = session();
        s.select_answer("1").expect("problem");
        assert_eq!(
            s.submit_answer().expect("problem"),
            Some(AnswerFeedback::Incorrect {
                correct_answer: Some("2".into())
            })
        );
    }

    #[test]
    fn test_navigation_clears_answer() {
        let mut s = session();
        s.select_answer("1").expect("problem");
        s.submit_answer().expect("problem");
        s.next();
        assert!(!s.is_submitted());
        assert!(s.selected_answer().is_none());
    }

    fn requested(outcome: ToggleOutcome) -> RequestTicket {
        match outcome {
            ToggleOutcome::Requested { ticket, .. } => ticket,
            other => panic!("expected a request, got {:?}", other),
        }
    }

    #[test]
    fn test_toggle_request_and_hide() {
        let mut s = session();
        let outcome = s.toggle(GenerationMode::Solution).expect("problem");
        let ToggleOutcome::Requested { ticket, problem } = outcome else {
            panic!("expected request");
        };
        assert_eq!(problem, "p1");
        assert!(s.solution().is_loading());
        assert!(s.complete(ticket, Ok("**Solution:**".into())));
        assert_eq!(s.solution().shown_text(), Some("**Solution:**"));
        assert!(!s.solution().is_loading());

        assert_eq!(
            s.toggle(GenerationMode::Solution).expect("problem"),
            ToggleOutcome::Hidden
        );
        assert_eq!(s.solution().shown_text(), None);
        assert!(s.solution().text.is_empty());
    }

    #[test]
    fn test_overlapping_request_refused() {
        let mut s = session();
        let first = requested(s.toggle(GenerationMode::Hint).expect("problem"));
        assert_eq!(
            s.toggle(GenerationMode::Hint).expect("problem"),
            ToggleOutcome::Busy
        );
        // the other slot is independent
        requested(s.toggle(GenerationMode::Solution).expect("problem"));
        assert!(s.complete(first, Ok("hint".into())));
    }

    #[test]
    fn test_stale_response_after_navigation_is_ignored() {
        let mut s = session();
        let ticket = requested(s.toggle(GenerationMode::Hint).expect("problem"));
        s.next();
        assert!(!s.complete(ticket, Ok("old hint".into())));
        assert_eq!(s.hint(), &GeneratedSlot::default());

        // a new request for the new problem still works
        let fresh = requested(s.toggle(GenerationMode::Hint).expect("problem"));
        assert_ne!(fresh, ticket);
        assert!(s.complete(fresh, Ok("new hint".into())));
        assert_eq!(s.hint().shown_text(), Some("new hint"));
    }

    #[test]
    fn test_failure_keeps_prior_content() {
        let mut s = session();
        let ticket = requested(s.toggle(GenerationMode::Hint).expect("problem"));
        s.complete(ticket, Ok("first hint".into()));
        let solution = requested(s.toggle(GenerationMode::Solution).expect("problem"));
        s.complete(
            solution,
            Err(TutorError::service("Failed to generate solution: API Error: 500 - Unknown error")),
        );
        assert_eq!(s.hint().shown_text(), Some("first hint"));
        assert_eq!(
            s.solution().error.as_deref(),
            Some("Failed to generate solution: API Error: 500 - Unknown error")
        );
        assert!(s.hint().error.is_none());

        // retrying clears the error
        requested(s.toggle(GenerationMode::Solution).expect("problem"));
        assert!(s.solution().error.is_none());
        assert!(s.solution().is_loading());
    }
}
