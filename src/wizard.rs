//! The three-phase interview wizard: setup, questioning, results.
//!
//! The wizard owns the session and the OpenAI client. Every external call
//! is converted at the call site into a user-visible message plus a safe
//! fallback; no error crosses phase boundaries.

use anyhow::Result;
use log::{error, info, warn};

use crate::evaluation::{self, EvaluationError};
use crate::moderation::{self, RoleCheck, SafetyCheck};
use crate::openai::OpenAIClient;
use crate::questions;
use crate::session::{
    Complexity, InterviewPhase, InterviewSession, CUSTOM_ROLE_OPTION, MAX_ANSWER_CHARS,
    MAX_CUSTOM_ROLE_CHARS, MAX_QUESTIONS, MIN_QUESTIONS, ROLE_PRESETS,
};
use crate::ui;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NavAction {
    Next,
    Finish,
    Previous,
    EndEarly,
}

/// Why an answer was replaced with the unsafe-content placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagCause {
    Unsafe,
    Unclear,
    CheckFailed(String),
}

pub struct Wizard {
    client: OpenAIClient,
    session: InterviewSession,
}

impl Wizard {
    pub fn new(client: OpenAIClient) -> Self {
        Self {
            client,
            session: InterviewSession::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        ui::banner();
        info!("🎬 Interview wizard started");

        loop {
            let flow = match self.session.phase {
                InterviewPhase::Setup => self.run_setup().await?,
                InterviewPhase::Interviewing => self.run_interviewing().await?,
                InterviewPhase::Finished => self.run_finished().await?,
            };
            if flow == Flow::Quit {
                println!();
                println!("{}", ui::success("Thanks for practicing with PrepMate. Goodbye!"));
                return Ok(());
            }
        }
    }

    /// Collects question count, role and complexity, validates the role and
    /// generates the questions. A generation failure stays in setup.
    async fn run_setup(&mut self) -> Result<Flow> {
        println!("{}", ui::section_title("Interview Setup"));

        let count = ui::prompt_usize_in_range(
            "Number of questions",
            MIN_QUESTIONS,
            MAX_QUESTIONS,
            self.session.question_count,
        )?;
        self.session.question_count = count;

        let role = loop {
            let candidate = self.select_role()?;

            let spinner = ui::spinner(format!("Validating role '{candidate}'..."));
            let verdict = moderation::check_role(&self.client, &candidate).await;
            spinner.finish_and_clear();

            match verdict {
                Ok(RoleCheck::Approved(role)) => {
                    println!("{}", ui::success(&format!("Role '{role}' is valid.")));
                    break role;
                }
                Ok(RoleCheck::Rejected) => {
                    println!(
                        "{}",
                        ui::error(&format!(
                            "The role name '{candidate}' was deemed inappropriate or not a \
                             valid job role. Please enter a different one."
                        ))
                    );
                }
                Ok(RoleCheck::Unclear(reply)) => {
                    warn!("Unclear role verdict for '{}': {}", candidate, reply);
                    println!(
                        "{}",
                        ui::warning(&format!(
                            "Could not confirm the validity of the role '{candidate}'. \
                             Please try a different one."
                        ))
                    );
                }
                Err(e) => {
                    error!("Role validation failed: {:#}", e);
                    println!(
                        "{}",
                        ui::error(&format!("Role validation failed: {e:#}. Please try again."))
                    );
                }
            }
        };
        self.session.effective_role = role.clone();

        let labels: Vec<&str> = Complexity::ALL.iter().map(|c| c.as_str()).collect();
        let current = Complexity::ALL
            .iter()
            .position(|&c| c == self.session.complexity)
            .unwrap_or(1);
        let choice = ui::menu("Question complexity:", &labels, Some(current))?;
        self.session.complexity = Complexity::ALL[choice];

        let spinner = ui::spinner(format!(
            "AI is preparing {count} {} questions for a {role}...",
            self.session.complexity
        ));
        let outcome =
            questions::generate_questions(&self.client, count, self.session.complexity, &role)
                .await;
        spinner.finish_and_clear();

        match outcome {
            Ok(questions) => {
                println!(
                    "{}",
                    ui::success(&format!("Generated {} questions. Good luck!", questions.len()))
                );
                self.session.begin_interview(questions);
            }
            Err(e) => {
                error!("Question generation failed: {}", e);
                println!(
                    "{}",
                    ui::error(&format!("Failed to generate interview questions: {e}"))
                );
            }
        }
        Ok(Flow::Continue)
    }

    /// One question screen: progress, question text, any previous answer,
    /// multi-line entry and the navigation menu.
    async fn run_interviewing(&mut self) -> Result<Flow> {
        let index = self.session.current_question_index;
        let total = self.session.questions.len();

        println!();
        println!("{}", ui::separator(60));
        println!();
        println!(
            "{} {}",
            ui::section_title(&format!("Question {} of {}", index + 1, total)),
            ui::progress_bar(index + 1, total)
        );
        println!();
        println!("{}", self.session.current_question());
        println!();

        let existing = self.session.current_answer();
        if !existing.is_empty() {
            println!("Your current answer:");
            for line in existing.lines() {
                println!("  > {line}");
            }
            println!(
                "Characters: {} / {}",
                existing.chars().count(),
                MAX_ANSWER_CHARS
            );
            println!();
        }

        println!("Your answer (leave empty to keep the current one):");
        let input = ui::read_multiline()?;
        if !input.trim().is_empty() {
            let truncated = self.session.record_answer(&input);
            if truncated {
                println!(
                    "{}",
                    ui::warning(&format!("Answer truncated to {MAX_ANSWER_CHARS} characters."))
                );
            }
            println!(
                "Characters: {} / {}",
                self.session.current_answer().chars().count(),
                MAX_ANSWER_CHARS
            );
        }

        let options = nav_options(&self.session);
        let labels: Vec<&str> = options.iter().map(|(label, _)| *label).collect();
        let choice = ui::menu("What next?", &labels, Some(0))?;

        match options[choice].1 {
            NavAction::Next => {
                self.session.advance();
            }
            NavAction::Previous => {
                self.session.go_back();
            }
            NavAction::Finish | NavAction::EndEarly => {
                info!("🏁 Interview finished at question {} of {}", index + 1, total);
                self.session.finish();
            }
        }
        Ok(Flow::Continue)
    }

    /// Safety sweep, one evaluation attempt, results, and the closing menu.
    async fn run_finished(&mut self) -> Result<Flow> {
        println!();
        println!("{}", ui::section_title("Interview Complete"));

        if self.session.evaluation.is_none() {
            let spinner = ui::spinner("Checking your answers for safety...".to_string());
            let flagged = sweep_answers(&self.client, &mut self.session).await;
            spinner.finish_and_clear();

            for (index, cause) in &flagged {
                let number = index + 1;
                match cause {
                    FlagCause::Unsafe => println!(
                        "{}",
                        ui::error(&format!(
                            "Answer to question {number} flagged as potentially unsafe."
                        ))
                    ),
                    FlagCause::Unclear => println!(
                        "{}",
                        ui::warning(&format!(
                            "Could not confirm the safety of the answer to question {number}."
                        ))
                    ),
                    FlagCause::CheckFailed(reason) => println!(
                        "{}",
                        ui::error(&format!(
                            "Safety check for the answer to question {number} failed: {reason}"
                        ))
                    ),
                }
            }
            if self.session.unsafe_content_flagged {
                println!(
                    "{}",
                    ui::warning(
                        "Some answers were flagged as potentially unsafe and may not be \
                         evaluated properly."
                    )
                );
            }

            let spinner = ui::spinner(format!(
                "AI is evaluating your answers for the {} role...",
                self.session.effective_role
            ));
            let outcome = ensure_evaluation(&self.client, &mut self.session).await;
            spinner.finish_and_clear();

            if let Err(e) = outcome {
                error!("Evaluation failed: {}", e);
                println!(
                    "{}",
                    ui::error(&format!("Failed to get evaluation results from the AI: {e}"))
                );
            }
        }

        match &self.session.evaluation {
            Some(report) => ui::render_evaluation(
                report,
                &self.session.questions,
                &self.session.answers,
                &self.session.effective_role,
            ),
            None => println!(
                "{}",
                ui::error("Could not retrieve or display AI evaluation for your answers.")
            ),
        }

        let choice = ui::menu("What next?", &["Start New Interview", "Quit"], Some(0))?;
        if choice == 0 {
            self.session.reset();
            Ok(Flow::Continue)
        } else {
            Ok(Flow::Quit)
        }
    }

    /// Role preset menu plus the custom entry path: trimmed, capped at
    /// `MAX_CUSTOM_ROLE_CHARS` characters, re-prompted while empty.
    fn select_role(&mut self) -> Result<String> {
        let mut options: Vec<&str> = ROLE_PRESETS.to_vec();
        options.push(CUSTOM_ROLE_OPTION);

        let default = options
            .iter()
            .position(|&o| o == self.session.selected_option)
            .unwrap_or(0);
        let choice = ui::menu(
            "Choose the role you want to practice for:",
            &options,
            Some(default),
        )?;
        let selected = options[choice];
        self.session.selected_option = selected.to_string();

        if selected != CUSTOM_ROLE_OPTION {
            return Ok(selected.to_string());
        }

        loop {
            let input = ui::prompt_line("Enter your desired role: ")?;
            let trimmed = input.trim();
            if trimmed.is_empty() {
                println!("{}", ui::warning("Please enter a role name."));
                continue;
            }
            if trimmed.chars().count() > MAX_CUSTOM_ROLE_CHARS {
                println!(
                    "{}",
                    ui::warning(&format!(
                        "Role names are capped at {MAX_CUSTOM_ROLE_CHARS} characters."
                    ))
                );
            }
            let role: String = trimmed.chars().take(MAX_CUSTOM_ROLE_CHARS).collect();
            self.session.custom_role_input = role.clone();
            return Ok(role);
        }
    }
}

fn nav_options(session: &InterviewSession) -> Vec<(&'static str, NavAction)> {
    let mut options = Vec::new();
    if session.is_last_question() {
        options.push(("Finish Interview & Evaluate", NavAction::Finish));
    } else {
        options.push(("Submit & Next", NavAction::Next));
    }
    if session.current_question_index > 0 {
        options.push(("Previous", NavAction::Previous));
    }
    options.push(("End Early & Evaluate", NavAction::EndEarly));
    options
}

/// Runs the answer safety check over every non-empty answer, replacing
/// flagged ones in place. Unclear verdicts and failed checks flag too;
/// empty answers are never touched.
pub async fn sweep_answers(
    client: &OpenAIClient,
    session: &mut InterviewSession,
) -> Vec<(usize, FlagCause)> {
    let mut flagged = Vec::new();
    for index in 0..session.answers.len() {
        if session.answers[index].trim().is_empty() {
            continue;
        }
        let cause = match moderation::check_answer_safety(client, &session.answers[index]).await {
            Ok(SafetyCheck::Safe) => None,
            Ok(SafetyCheck::Unsafe) => Some(FlagCause::Unsafe),
            Ok(SafetyCheck::Unclear(reply)) => {
                warn!("Unclear safety verdict for answer {}: {}", index + 1, reply);
                Some(FlagCause::Unclear)
            }
            Err(e) => {
                error!("Safety check for answer {} failed: {:#}", index + 1, e);
                Some(FlagCause::CheckFailed(format!("{e:#}")))
            }
        };
        if let Some(cause) = cause {
            session.flag_unsafe_answer(index);
            flagged.push((index, cause));
        }
    }
    flagged
}

/// Evaluates the finished interview unless a report is already cached.
/// On failure the cache stays empty so nothing partial is ever shown.
pub async fn ensure_evaluation(
    client: &OpenAIClient,
    session: &mut InterviewSession,
) -> Result<(), EvaluationError> {
    if session.evaluation.is_some() {
        return Ok(());
    }
    let report = evaluation::evaluate_answers(
        client,
        &session.questions,
        &session.answers,
        session.questions.len(),
        &session.effective_role,
    )
    .await?;
    session.evaluation = Some(report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(count: usize) -> InterviewSession {
        let mut session = InterviewSession::new();
        session.begin_interview((0..count).map(|i| format!("q{i}")).collect());
        session
    }

    #[test]
    fn first_question_offers_no_previous() {
        let session = session_with(3);
        let options = nav_options(&session);
        assert_eq!(options[0], ("Submit & Next", NavAction::Next));
        assert!(options.iter().all(|(_, action)| *action != NavAction::Previous));
        assert_eq!(options.last().unwrap().1, NavAction::EndEarly);
    }

    #[test]
    fn middle_question_offers_previous() {
        let mut session = session_with(3);
        session.advance();
        let options = nav_options(&session);
        assert_eq!(options[0], ("Submit & Next", NavAction::Next));
        assert_eq!(options[1], ("Previous", NavAction::Previous));
    }

    #[test]
    fn last_question_offers_finish_instead_of_next() {
        let mut session = session_with(3);
        session.advance();
        session.advance();
        let options = nav_options(&session);
        assert_eq!(options[0], ("Finish Interview & Evaluate", NavAction::Finish));
        assert!(options.iter().all(|(_, action)| *action != NavAction::Next));
    }
}
