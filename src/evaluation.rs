//! Interview grading: builds the transcript prompt, decodes the structured
//! reply against a declared schema, and rejects the whole payload on any
//! mismatch. No partial acceptance.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::openai::{ChatOptions, OpenAIClient};

const EVALUATION_MODEL: &str = "gpt-4o-mini";
const NOT_ANSWERED_MARKER: &str = "--- NOT ANSWERED ---";

pub const GRADE_MIN: u8 = 1;
pub const GRADE_MAX: u8 = 10;

/// Grade and justification for one answer, aligned with the question list
/// by position.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AnswerEvaluation {
    pub question_index: usize,
    pub grade: u8,
    pub justification: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EvaluationReport {
    pub evaluations: Vec<AnswerEvaluation>,
    pub overall_grade: u8,
    pub overall_justification: String,
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("questions and answers are misaligned: {questions} questions, {answers} answers")]
    MismatchedInput { questions: usize, answers: usize },
    #[error("OpenAI request failed: {0}")]
    Api(String),
    #[error("could not parse the AI's evaluation as valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("the AI's evaluation had an invalid structure: {0}")]
    InvalidShape(String),
}

fn evaluation_system_prompt(role: &str) -> String {
    format!(
        "You are an AI evaluation assistant. You analyze interview transcripts for a \
         '{role}' role and provide structured feedback strictly in the specified JSON format."
    )
}

fn evaluation_prompt(role: &str, transcript: &str) -> String {
    format!(
        r#"Act as an expert hiring manager and strict interviewer evaluating a candidate's performance for a **{role}** position based on the provided interview transcript.

Transcript:
--- Transcript Start ---
{transcript}
--- Transcript End ---

Your Task:
1.  **Evaluate Each Answer:** For every question in the transcript:
    * Provide a numerical **grade** from 1 (Poor) to 10 (Excellent).
    * Provide a concise **justification** (1-2 sentences) for the grade. Base the evaluation on:
        * **Relevance:** Does the answer directly address the question?
        * **Clarity:** Is the answer clear, well-structured, and easy to understand?
        * **Depth & Detail:** Does the answer provide sufficient detail and examples?
        * **Role Appropriateness:** Is the content and level of detail appropriate for a candidate applying for a **{role}** position?
2.  **Handle Unanswered Questions:** If a question is marked as "--- NOT ANSWERED ---", assign a grade of **1** and use the justification "**Not answered**".
3.  **Content Safety:** If an answer contains offensive, discriminatory, inappropriate content, or is completely irrelevant gibberish, assign a grade of **1** and use the justification "**Inappropriate or irrelevant content**". Do not evaluate the substance otherwise.
4.  **Overall Assessment:** After evaluating all individual answers:
    * Provide an **overall_grade** (1-10) reflecting the candidate's performance across the entire interview.
    * Provide an **overall_justification** (2-4 sentences) summarizing strengths and weaknesses, **specifically in the context of the {role} role requirements**. Mention potential suitability or areas needing significant improvement for this type of position.

Output Format:
Return **ONLY** a valid **JSON object** adhering strictly to the following structure. Do not include any text before or after the JSON object.
{{
  "evaluations": [
    {{
      "question_index": integer, // Index of the question (0-based)
      "grade": integer,          // Grade for this answer (1-10)
      "justification": "string"  // Justification (or "Not answered", "Inappropriate or irrelevant content")
    }}
    // ... one object for EACH question asked, matching the order in the transcript
  ],
  "overall_grade": integer,      // Overall interview grade (1-10)
  "overall_justification": "string" // Overall feedback summary tailored to the role
}}

Ensure the 'evaluations' list contains exactly one entry for each question asked, maintaining the original order."#
    )
}

/// The report used when the candidate typed nothing at all.
pub fn unanswered_report(question_count: usize) -> EvaluationReport {
    EvaluationReport {
        evaluations: (0..question_count)
            .map(|i| AnswerEvaluation {
                question_index: i,
                grade: 1,
                justification: "Not answered".to_string(),
            })
            .collect(),
        overall_grade: 1,
        overall_justification: "No answers were provided for evaluation.".to_string(),
    }
}

fn build_transcript(questions: &[String], answers: &[String]) -> String {
    let mut transcript = String::new();
    for (i, (question, answer)) in questions.iter().zip(answers).enumerate() {
        transcript.push_str(&format!("Question {}: {}\n", i + 1, question));
        let answer = answer.trim();
        if answer.is_empty() {
            transcript.push_str(&format!("Answer {}: {}\n\n", i + 1, NOT_ANSWERED_MARKER));
        } else {
            transcript.push_str(&format!("Answer {}: {}\n\n", i + 1, answer));
        }
    }
    transcript
}

/// Grades the interview. Short-circuits to a synthetic "not answered" report
/// when every answer is empty; otherwise sends the transcript and validates
/// the structured reply.
pub async fn evaluate_answers(
    client: &OpenAIClient,
    questions: &[String],
    answers: &[String],
    question_count: usize,
    role: &str,
) -> Result<EvaluationReport, EvaluationError> {
    if questions.len() != answers.len() {
        return Err(EvaluationError::MismatchedInput {
            questions: questions.len(),
            answers: answers.len(),
        });
    }

    info!("Evaluating {} answers for role: {}", answers.len(), role);

    if answers.iter().all(|a| a.trim().is_empty()) {
        info!("Evaluation skipped: no answers were provided");
        return Ok(unanswered_report(questions.len()));
    }

    let transcript = build_transcript(questions, answers);
    let options = ChatOptions {
        model: EVALUATION_MODEL,
        max_tokens: 200 * question_count as u32,
        temperature: 0.6,
        top_p: 1.0,
        frequency_penalty: 0.2,
        presence_penalty: 0.2,
        json_response: true,
    };

    let reply = client
        .chat(
            &evaluation_system_prompt(role),
            &evaluation_prompt(role, &transcript),
            &options,
        )
        .await
        .map_err(|e| EvaluationError::Api(format!("{e:#}")))?;

    debug!("Raw response received from OpenAI (evaluation): {}", reply);

    let report = parse_evaluation_reply(&reply, questions.len()).map_err(|e| {
        error!("Rejecting evaluation reply: {} (raw: {})", e, reply);
        e
    })?;
    info!("Successfully parsed and validated evaluation results");
    Ok(report)
}

/// Decodes the structured reply, then checks the invariants serde cannot:
/// one entry per question, indexes matching positions, grades within range.
fn parse_evaluation_reply(
    reply: &str,
    question_count: usize,
) -> Result<EvaluationReport, EvaluationError> {
    let report: EvaluationReport = serde_json::from_str(reply)?;

    if report.evaluations.len() != question_count {
        return Err(EvaluationError::InvalidShape(format!(
            "'evaluations' list length ({}) does not match number of questions ({})",
            report.evaluations.len(),
            question_count
        )));
    }

    for (i, item) in report.evaluations.iter().enumerate() {
        if item.question_index != i {
            return Err(EvaluationError::InvalidShape(format!(
                "evaluation at position {} declares question_index {}",
                i, item.question_index
            )));
        }
        if !(GRADE_MIN..=GRADE_MAX).contains(&item.grade) {
            return Err(EvaluationError::InvalidShape(format!(
                "grade {} for question {} is outside {}-{}",
                item.grade, i, GRADE_MIN, GRADE_MAX
            )));
        }
    }

    if !(GRADE_MIN..=GRADE_MAX).contains(&report.overall_grade) {
        return Err(EvaluationError::InvalidShape(format!(
            "overall grade {} is outside {}-{}",
            report.overall_grade, GRADE_MIN, GRADE_MAX
        )));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed_reply() -> String {
        r#"{
            "evaluations": [
                {"question_index": 0, "grade": 7, "justification": "Solid answer."},
                {"question_index": 1, "grade": 4, "justification": "Lacks detail."},
                {"question_index": 2, "grade": 1, "justification": "Not answered"}
            ],
            "overall_grade": 5,
            "overall_justification": "Mixed performance overall."
        }"#
        .to_string()
    }

    #[test]
    fn valid_reply_is_accepted() {
        let report = parse_evaluation_reply(&well_formed_reply(), 3).unwrap();
        assert_eq!(report.evaluations.len(), 3);
        assert_eq!(report.overall_grade, 5);
        assert_eq!(report.evaluations[1].grade, 4);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = parse_evaluation_reply(&well_formed_reply(), 4).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidShape(_)));
    }

    #[test]
    fn out_of_order_indexes_are_rejected() {
        let reply = r#"{
            "evaluations": [
                {"question_index": 1, "grade": 7, "justification": "x"},
                {"question_index": 0, "grade": 4, "justification": "y"}
            ],
            "overall_grade": 5,
            "overall_justification": "z"
        }"#;
        let err = parse_evaluation_reply(reply, 2).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidShape(_)));
    }

    #[test]
    fn out_of_range_grades_are_rejected() {
        for grade in [0, 11] {
            let reply = format!(
                r#"{{
                    "evaluations": [{{"question_index": 0, "grade": {grade}, "justification": "x"}}],
                    "overall_grade": 5,
                    "overall_justification": "z"
                }}"#
            );
            let err = parse_evaluation_reply(&reply, 1).unwrap_err();
            assert!(matches!(err, EvaluationError::InvalidShape(_)));
        }
    }

    #[test]
    fn out_of_range_overall_grade_is_rejected() {
        let reply = r#"{
            "evaluations": [{"question_index": 0, "grade": 5, "justification": "x"}],
            "overall_grade": 0,
            "overall_justification": "z"
        }"#;
        let err = parse_evaluation_reply(reply, 1).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidShape(_)));
    }

    #[test]
    fn missing_overall_grade_is_a_decode_error() {
        let reply = r#"{
            "evaluations": [{"question_index": 0, "grade": 5, "justification": "x"}],
            "overall_justification": "z"
        }"#;
        let err = parse_evaluation_reply(reply, 1).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidJson(_)));
    }

    #[test]
    fn non_integer_grades_are_a_decode_error() {
        for grade in ["\"seven\"", "7.5"] {
            let reply = format!(
                r#"{{
                    "evaluations": [{{"question_index": 0, "grade": {grade}, "justification": "x"}}],
                    "overall_grade": 5,
                    "overall_justification": "z"
                }}"#
            );
            let err = parse_evaluation_reply(&reply, 1).unwrap_err();
            assert!(matches!(err, EvaluationError::InvalidJson(_)));
        }
    }

    #[test]
    fn synthetic_report_covers_every_question_with_grade_one() {
        let report = unanswered_report(4);
        assert_eq!(report.evaluations.len(), 4);
        for (i, item) in report.evaluations.iter().enumerate() {
            assert_eq!(item.question_index, i);
            assert_eq!(item.grade, 1);
            assert_eq!(item.justification, "Not answered");
        }
        assert_eq!(report.overall_grade, 1);
        assert_eq!(
            report.overall_justification,
            "No answers were provided for evaluation."
        );
    }

    #[test]
    fn transcript_interleaves_and_marks_unanswered() {
        let questions = vec!["First?".to_string(), "Second?".to_string()];
        let answers = vec!["An answer.".to_string(), "   ".to_string()];
        let transcript = build_transcript(&questions, &answers);

        assert!(transcript.contains("Question 1: First?\nAnswer 1: An answer.\n"));
        assert!(transcript.contains(&format!("Question 2: Second?\nAnswer 2: {NOT_ANSWERED_MARKER}")));
    }
}
