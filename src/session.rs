use log::debug;
use serde::{Deserialize, Serialize};

use crate::evaluation::EvaluationReport;

pub const MIN_QUESTIONS: usize = 3;
pub const MAX_QUESTIONS: usize = 10;
pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const MAX_ANSWER_CHARS: usize = 1000;
pub const MAX_CUSTOM_ROLE_CHARS: usize = 50;
pub const DEFAULT_ROLE: &str = "App Developer";
pub const UNSAFE_ANSWER_PLACEHOLDER: &str = "[Content Flagged as Unsafe]";

/// Preset roles offered in setup; "Other..." switches to free-text entry.
pub const ROLE_PRESETS: [&str; 4] = [
    "App Developer",
    "Data Analyst",
    "Big Data Engineer",
    "General",
];
pub const CUSTOM_ROLE_OPTION: &str = "Other...";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterviewPhase {
    Setup,
    Interviewing,
    Finished,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Complexity {
    Easy,
    Medium,
    Hard,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Complexity::Easy, Complexity::Medium, Complexity::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Easy => "Easy",
            Complexity::Medium => "Medium",
            Complexity::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single interview session. Owned by the wizard and passed by
/// reference; there is no global session registry.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InterviewSession {
    pub phase: InterviewPhase,
    pub questions: Vec<String>,
    /// Index-aligned with `questions`; `answers.len() == questions.len()`
    /// once interviewing begins.
    pub answers: Vec<String>,
    pub current_question_index: usize,
    /// Computed at most once per finished interview; cleared only by reset.
    pub evaluation: Option<EvaluationReport>,
    pub selected_option: String,
    pub custom_role_input: String,
    pub effective_role: String,
    pub question_count: usize,
    pub complexity: Complexity,
    pub unsafe_content_flagged: bool,
}

impl Default for InterviewSession {
    fn default() -> Self {
        Self {
            phase: InterviewPhase::Setup,
            questions: Vec::new(),
            answers: Vec::new(),
            current_question_index: 0,
            evaluation: None,
            selected_option: DEFAULT_ROLE.to_string(),
            custom_role_input: String::new(),
            effective_role: DEFAULT_ROLE.to_string(),
            question_count: DEFAULT_QUESTION_COUNT,
            complexity: Complexity::Medium,
            unsafe_content_flagged: false,
        }
    }
}

impl InterviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves into the interviewing phase: one empty answer per question,
    /// index back to the first question, prior results discarded.
    pub fn begin_interview(&mut self, questions: Vec<String>) {
        debug!("Phase transition: {:?} -> Interviewing", self.phase);
        self.answers = vec![String::new(); questions.len()];
        self.questions = questions;
        self.current_question_index = 0;
        self.evaluation = None;
        self.unsafe_content_flagged = false;
        self.phase = InterviewPhase::Interviewing;
    }

    pub fn current_question(&self) -> &str {
        &self.questions[self.current_question_index]
    }

    pub fn current_answer(&self) -> &str {
        &self.answers[self.current_question_index]
    }

    pub fn is_last_question(&self) -> bool {
        self.current_question_index + 1 == self.questions.len()
    }

    /// Stores `answer` into the slot for the current question, truncated to
    /// `MAX_ANSWER_CHARS` characters. Returns true when truncation occurred.
    pub fn record_answer(&mut self, answer: &str) -> bool {
        let truncated = answer.chars().count() > MAX_ANSWER_CHARS;
        self.answers[self.current_question_index] = answer.chars().take(MAX_ANSWER_CHARS).collect();
        truncated
    }

    /// Advances to the next question. Returns false on the last question.
    pub fn advance(&mut self) -> bool {
        if self.is_last_question() {
            return false;
        }
        self.current_question_index += 1;
        true
    }

    /// Steps back one question. Returns false when already on the first.
    pub fn go_back(&mut self) -> bool {
        if self.current_question_index == 0 {
            return false;
        }
        self.current_question_index -= 1;
        true
    }

    pub fn finish(&mut self) {
        debug!("Phase transition: {:?} -> Finished", self.phase);
        self.phase = InterviewPhase::Finished;
    }

    /// Replaces the answer at `index` with the unsafe-content placeholder
    /// and marks the session as flagged.
    pub fn flag_unsafe_answer(&mut self, index: usize) {
        self.answers[index] = UNSAFE_ANSWER_PLACEHOLDER.to_string();
        self.unsafe_content_flagged = true;
    }

    /// Restores the startup defaults, discarding all questions, answers and
    /// evaluation results.
    pub fn reset(&mut self) {
        debug!("Phase transition: {:?} -> Setup (reset)", self.phase);
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_questions() -> Vec<String> {
        vec!["q1".to_string(), "q2".to_string(), "q3".to_string()]
    }

    #[test]
    fn defaults_match_startup_state() {
        let session = InterviewSession::new();
        assert_eq!(session.phase, InterviewPhase::Setup);
        assert!(session.questions.is_empty());
        assert!(session.answers.is_empty());
        assert_eq!(session.current_question_index, 0);
        assert!(session.evaluation.is_none());
        assert_eq!(session.selected_option, DEFAULT_ROLE);
        assert_eq!(session.effective_role, DEFAULT_ROLE);
        assert_eq!(session.question_count, DEFAULT_QUESTION_COUNT);
        assert_eq!(session.complexity, Complexity::Medium);
        assert!(!session.unsafe_content_flagged);
    }

    #[test]
    fn begin_interview_aligns_answers_and_resets_index() {
        let mut session = InterviewSession::new();
        session.current_question_index = 7;
        session.unsafe_content_flagged = true;
        session.begin_interview(three_questions());

        assert_eq!(session.phase, InterviewPhase::Interviewing);
        assert_eq!(session.answers, vec!["", "", ""]);
        assert_eq!(session.questions.len(), session.answers.len());
        assert_eq!(session.current_question_index, 0);
        assert!(session.evaluation.is_none());
        assert!(!session.unsafe_content_flagged);
    }

    #[test]
    fn record_answer_truncates_by_characters_not_bytes() {
        let mut session = InterviewSession::new();
        session.begin_interview(three_questions());

        let long = "é".repeat(MAX_ANSWER_CHARS + 500);
        assert!(session.record_answer(&long));
        assert_eq!(session.current_answer().chars().count(), MAX_ANSWER_CHARS);

        let short = "fits".to_string();
        assert!(!session.record_answer(&short));
        assert_eq!(session.current_answer(), "fits");
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut session = InterviewSession::new();
        session.begin_interview(three_questions());

        assert!(!session.go_back());
        assert_eq!(session.current_question_index, 0);

        assert!(session.advance());
        assert!(session.advance());
        assert!(session.is_last_question());
        assert!(!session.advance());
        assert_eq!(session.current_question_index, 2);

        assert!(session.go_back());
        assert_eq!(session.current_question_index, 1);
    }

    #[test]
    fn flagging_replaces_answer_in_place() {
        let mut session = InterviewSession::new();
        session.begin_interview(three_questions());
        session.advance();
        session.record_answer("something rude");

        session.flag_unsafe_answer(1);
        assert_eq!(session.answers[1], UNSAFE_ANSWER_PLACEHOLDER);
        assert!(session.unsafe_content_flagged);
        assert_eq!(session.answers[0], "");
        assert_eq!(session.answers[2], "");
    }

    #[test]
    fn reset_restores_startup_defaults() {
        let mut session = InterviewSession::new();
        session.question_count = 8;
        session.complexity = Complexity::Hard;
        session.selected_option = CUSTOM_ROLE_OPTION.to_string();
        session.custom_role_input = "Platform Engineer".to_string();
        session.effective_role = "Platform Engineer".to_string();
        session.begin_interview(three_questions());
        session.record_answer("answer");
        session.finish();

        session.reset();
        assert_eq!(session.phase, InterviewPhase::Setup);
        assert!(session.questions.is_empty());
        assert!(session.answers.is_empty());
        assert_eq!(session.question_count, DEFAULT_QUESTION_COUNT);
        assert_eq!(session.complexity, Complexity::Medium);
        assert_eq!(session.selected_option, DEFAULT_ROLE);
        assert_eq!(session.effective_role, DEFAULT_ROLE);
        assert!(session.custom_role_input.is_empty());
    }
}
