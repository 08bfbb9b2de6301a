//! Two-token moderation calls: role-name validation and answer safety.
//!
//! Both checks ask the model for exactly one of two literal tokens and map
//! anything else to an explicit `Unclear` verdict, never a sentinel string.

use anyhow::Result;
use log::{debug, info, warn};

use crate::openai::{ChatOptions, OpenAIClient};

const MODERATION_MODEL: &str = "gpt-4.1-mini";

const ROLE_CHECK_SYSTEM: &str = "You are a moderator for job role names. Analyze the input \
name for plausibility (allowing for minor typos if intent is clear) and appropriateness. \
Output ONLY 'VALID' or 'INVALID'.";

const ANSWER_SAFETY_SYSTEM: &str = "You are a strict content moderator. Analyze the provided \
text STRICTLY for any offensive, discriminatory, sexually explicit, hateful, harmful, or \
nonsensical gibberish content. Output ONLY 'SAFE' or 'UNSAFE'.";

/// Verdict on a candidate role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCheck {
    /// The model judged the role plausible and appropriate; carries the
    /// original role string.
    Approved(String),
    /// The model judged the role inappropriate or nonsensical.
    Rejected,
    /// The model replied with something other than the two expected tokens;
    /// carries the raw reply. Distinct from rejection.
    Unclear(String),
}

/// Verdict on a single answer's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyCheck {
    Safe,
    Unsafe,
    /// Out-of-vocabulary reply; callers must treat this as unsafe.
    Unclear(String),
}

fn role_check_prompt(role: &str) -> String {
    format!(
        r#"Analyze the following role name for safety:
--- ROLE START ---
{role}
--- ROLE END ---

1. Determine if it represents a plausible, common, or understandable job role or field, **even if there's a minor spelling mistake** (e.g., 'Enginer', 'Acountant', 'Data Analist'). The intent should be clear.
2. There can be more specific words for that role to get more deeper questions for the role (e.g. "Network engineer ospf bgp", "Cloud engineer aws").
3. Check if the name contains any offensive, discriminatory, sexually explicit, hateful, or nonsensical gibberish content (e.g., 'xyzabc', offensive terms). Apply strict filtering for inappropriate content.

Output Format:
- If the role name represents a plausible job role (allowing for minor typos) AND is appropriate, return ONLY the single word: VALID
- If the role name is inappropriate, offensive, gibberish, nonsensical, or the misspelling makes the intended role unclear, return ONLY the single word: INVALID"#
    )
}

fn answer_safety_prompt(answer: &str) -> String {
    format!(
        r#"Analyze the following text for safety:
--- TEXT START ---
{answer}
--- TEXT END ---

Instructions:
Check STRICTLY if the text contains ANY offensive, discriminatory, sexually explicit, hateful, harmful, or nonsensical gibberish content.
Examples include slurs, threats, graphic descriptions, hate speech, harassment, etc. Do NOT tolerate ANY inappropriate content.
Focus only on the presence of unsafe content.

Output Format:
- If the text is SAFE (contains NO inappropriate content), return ONLY the single word: SAFE
- If the text is UNSAFE (contains ANY inappropriate content), return ONLY the single word: UNSAFE"#
    )
}

/// Asks the model whether `role` is a plausible, appropriate job role.
/// Stateless: the same input always issues the same classification request.
pub async fn check_role(client: &OpenAIClient, role: &str) -> Result<RoleCheck> {
    info!("Checking role name appropriateness (with typo tolerance): {}", role);

    let options = ChatOptions {
        model: MODERATION_MODEL,
        max_tokens: 5,
        temperature: 0.0,
        top_p: 0.1,
        frequency_penalty: 0.1,
        presence_penalty: 0.1,
        json_response: false,
    };

    let reply = client
        .chat(ROLE_CHECK_SYSTEM, &role_check_prompt(role), &options)
        .await?;

    Ok(parse_role_verdict(role, &reply))
}

/// Screens one answer for unsafe content. Empty or whitespace-only input is
/// safe by definition and never reaches the network.
pub async fn check_answer_safety(client: &OpenAIClient, answer: &str) -> Result<SafetyCheck> {
    if answer.trim().is_empty() {
        debug!("Answer is empty, considered safe by default");
        return Ok(SafetyCheck::Safe);
    }

    let options = ChatOptions {
        model: MODERATION_MODEL,
        max_tokens: 5,
        temperature: 0.0,
        top_p: 0.1,
        frequency_penalty: 0.0,
        presence_penalty: 0.0,
        json_response: false,
    };

    let reply = client
        .chat(ANSWER_SAFETY_SYSTEM, &answer_safety_prompt(answer), &options)
        .await?;

    Ok(parse_safety_verdict(&reply))
}

fn parse_role_verdict(role: &str, reply: &str) -> RoleCheck {
    let raw = reply.trim();
    let normalized = raw.to_uppercase();
    debug!("Raw AI response for role check: '{}', normalized: '{}'", raw, normalized);

    match normalized.as_str() {
        "VALID" => RoleCheck::Approved(role.to_string()),
        "INVALID" => RoleCheck::Rejected,
        _ => {
            warn!("AI returned unexpected content '{}' for role check", raw);
            RoleCheck::Unclear(raw.to_string())
        }
    }
}

fn parse_safety_verdict(reply: &str) -> SafetyCheck {
    let raw = reply.trim();
    let normalized = raw.to_uppercase();
    debug!("Raw AI safety response: '{}', normalized: '{}'", raw, normalized);

    match normalized.as_str() {
        "SAFE" => SafetyCheck::Safe,
        "UNSAFE" => SafetyCheck::Unsafe,
        _ => {
            warn!("AI returned unexpected safety content '{}'", raw);
            SafetyCheck::Unclear(raw.to_string())
        }
    }
}
