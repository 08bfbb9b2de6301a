use log::{debug, error, info};
use serde::Deserialize;
use thiserror::Error;

use crate::openai::{ChatOptions, OpenAIClient};
use crate::session::Complexity;

const QUESTION_MODEL: &str = "gpt-4.1-mini";

/// Fallback role when no specific role applies.
pub const GENERIC_ROLE: &str = "General";

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("OpenAI request failed: {0}")]
    Api(String),
    #[error("could not parse the AI's response as valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("AI response did not match the expected shape: {0}")]
    InvalidShape(String),
}

#[derive(Deserialize)]
struct QuestionReply {
    questions: Vec<String>,
}

fn question_system_prompt(role: &str) -> String {
    format!(
        "You are an expert assistant that generates professional interview questions \
         tailored for a specific job role ({role}). You output *only* a valid JSON object \
         containing a list of questions under the 'questions' key, strictly following all \
         constraints provided."
    )
}

fn question_prompt(count: usize, complexity: Complexity, role: &str) -> String {
    format!(
        r#"Generate exactly {count} **{complexity}** interview questions specifically tailored for a **{role}** position.
The questions should assess relevant technical skills (if applicable), problem-solving abilities, experience, and professional approach related to the **{role}** field.
Ensure the questions cover a diverse range of scenarios and challenges relevant to the role and make sure you base them heavily on the skills, tools, and responsibilities.

Specific Role Instructions:
- If the role is anything but "General":
    - Approximately 20% of questions should be general behavioral/professional questions.
    - General questions should preferably appear first.
    - The remaining 80% must be specifically tailored to the skills and responsibilities of a **{role}** position.
    - Generate questions with varied formats (e.g., situational, technical deep-dive, design).
- If the role is "General":
    - Generate broad professional questions suitable for a wide range of roles, focusing on experience, problem-solving, teamwork, and career goals, while respecting the constraints below.

IMPORTANT CONSTRAINTS (Apply to ALL roles):
1. DO NOT ask the following specific, generic questions:
   - "What are your strengths?"
   - "What are your weaknesses?"
   - "Where do you see yourself in 5 years?"
   - "Why should we hire you?"
2. Absolutely DO NOT ask any questions related to:
   - Religion or religious beliefs/practices
   - Sexual orientation or gender identity
   - Political affiliations or views
   - Health conditions, disabilities, or medical history
   - Personal family matters (marital status, children, pregnancy plans etc.)
   - Age (unless directly job-related and legally permissible, which is rare)
   - Race or ethnicity
   - National origin or citizenship status (beyond legal work authorization)
3. Make sure there are {count} **{complexity}** interview questions specifically tailored for a **{role}** position.

Output Format:
Return ONLY a valid **JSON object** containing a single key "questions" whose value is a list of strings (the interview questions).
Example for num_questions=2, role="App Developer":
{{
  "questions": ["Describe a challenging technical problem you solved recently and your approach.", "How do you ensure the quality and maintainability of your code?"]
}}
Ensure the entire output is a single, valid JSON object starting with '{{' and ending with '}}'."#
    )
}

/// Generates `count` interview questions for `role` at the requested
/// complexity. Returns exactly `count` questions or a typed error; a reply
/// with too few questions is rejected rather than passed through ragged.
pub async fn generate_questions(
    client: &OpenAIClient,
    count: usize,
    complexity: Complexity,
    role: &str,
) -> Result<Vec<String>, QuestionError> {
    let role = if role.trim().is_empty() { GENERIC_ROLE } else { role };
    info!("Generating {} {} questions for role: {}", count, complexity, role);

    let options = ChatOptions {
        model: QUESTION_MODEL,
        max_tokens: 150 * count as u32,
        temperature: 0.9,
        top_p: 0.9,
        frequency_penalty: 0.5,
        presence_penalty: 0.9,
        json_response: true,
    };

    let reply = client
        .chat(
            &question_system_prompt(role),
            &question_prompt(count, complexity, role),
            &options,
        )
        .await
        .map_err(|e| QuestionError::Api(format!("{e:#}")))?;

    debug!("Raw JSON response received from OpenAI (questions): {}", reply);

    let questions = parse_question_reply(&reply, count).map_err(|e| {
        error!("Rejecting question reply: {} (raw: {})", e, reply);
        e
    })?;
    info!("Successfully parsed {} questions from JSON", questions.len());
    Ok(questions)
}

/// Decodes the `{"questions": [...]}` reply and truncates to `count`.
fn parse_question_reply(reply: &str, count: usize) -> Result<Vec<String>, QuestionError> {
    let parsed: QuestionReply = serde_json::from_str(reply)?;
    let mut questions = parsed.questions;

    if questions.len() < count {
        return Err(QuestionError::InvalidShape(format!(
            "expected {} questions, got {}",
            count,
            questions.len()
        )));
    }

    questions.truncate(count);
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_with(n: usize) -> String {
        let questions: Vec<String> = (0..n).map(|i| format!("\"Question {i}?\"")).collect();
        format!("{{\"questions\": [{}]}}", questions.join(", "))
    }

    #[test]
    fn exact_count_passes_through() {
        let questions = parse_question_reply(&reply_with(5), 5).unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0], "Question 0?");
    }

    #[test]
    fn surplus_is_truncated_to_requested_count() {
        let questions = parse_question_reply(&reply_with(8), 5).unwrap();
        assert_eq!(questions.len(), 5);
    }

    #[test]
    fn deficit_is_a_shape_error_never_a_ragged_list() {
        let err = parse_question_reply(&reply_with(2), 5).unwrap_err();
        assert!(matches!(err, QuestionError::InvalidShape(_)));
    }

    #[test]
    fn every_accepted_count_yields_exactly_that_many() {
        for n in 3..=10 {
            let questions = parse_question_reply(&reply_with(n + 2), n).unwrap();
            assert_eq!(questions.len(), n);
        }
    }

    #[test]
    fn missing_key_is_a_decode_error() {
        let err = parse_question_reply(r#"{"items": ["a", "b", "c"]}"#, 3).unwrap_err();
        assert!(matches!(err, QuestionError::InvalidJson(_)));
    }

    #[test]
    fn non_string_elements_are_a_decode_error() {
        let err = parse_question_reply(r#"{"questions": ["a", 2, "c"]}"#, 3).unwrap_err();
        assert!(matches!(err, QuestionError::InvalidJson(_)));
    }

    #[test]
    fn non_list_value_is_a_decode_error() {
        let err = parse_question_reply(r#"{"questions": "a, b, c"}"#, 3).unwrap_err();
        assert!(matches!(err, QuestionError::InvalidJson(_)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = parse_question_reply("Sure! Here are your questions:", 3).unwrap_err();
        assert!(matches!(err, QuestionError::InvalidJson(_)));
    }
}
