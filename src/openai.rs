use anyhow::Result;
use log::{error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call sampling options. Each caller pins its own model and decoding
/// parameters; moderation calls run near-deterministic, generation does not.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: &'static str,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub json_response: bool,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
    response_format: ResponseFormat,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Sends one system + user prompt pair and returns the assistant's reply.
    pub async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &ChatOptions,
    ) -> Result<String> {
        let request = OpenAIRequest {
            model: options.model.to_string(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            frequency_penalty: options.frequency_penalty,
            presence_penalty: options.presence_penalty,
            response_format: ResponseFormat {
                kind: if options.json_response {
                    "json_object"
                } else {
                    "text"
                },
            },
            stream: false,
        };

        info!("Sending request to OpenAI with model: {}", options.model);

        let response = self
            .client
            .post(&format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API error: {}", error_text);
            return Err(anyhow::anyhow!("OpenAI API error: {}", error_text));
        }

        let openai_response: OpenAIResponse = response.json().await?;

        if let Some(usage) = &openai_response.usage {
            info!(
                "Token usage - Prompt: {}, Completion: {}, Total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        match openai_response.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content),
            None => Err(anyhow::anyhow!(
                "Invalid response structure from OpenAI: no choices returned"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json_response: bool) -> OpenAIRequest {
        let options = ChatOptions {
            model: "gpt-4.1-mini",
            max_tokens: 5,
            temperature: 0.0,
            top_p: 0.1,
            frequency_penalty: 0.1,
            presence_penalty: 0.1,
            json_response,
        };
        OpenAIRequest {
            model: options.model.to_string(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: "sys".to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: "usr".to_string(),
                },
            ],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            frequency_penalty: options.frequency_penalty,
            presence_penalty: options.presence_penalty,
            response_format: ResponseFormat {
                kind: if options.json_response {
                    "json_object"
                } else {
                    "text"
                },
            },
            stream: false,
        }
    }

    #[test]
    fn request_serializes_expected_wire_shape() {
        let value = serde_json::to_value(request(true)).unwrap();
        assert_eq!(value["model"], "gpt-4.1-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["stream"], false);
        assert_eq!(value["max_tokens"], 5);
    }

    #[test]
    fn text_format_requests_text_type() {
        let value = serde_json::to_value(request(false)).unwrap();
        assert_eq!(value["response_format"]["type"], "text");
    }

    #[test]
    fn response_parses_choices_and_usage() {
        let payload = r#"{
            "choices": [{"message": {"role": "assistant", "content": "VALID"}}],
            "usage": {"prompt_tokens": 42, "completion_tokens": 1, "total_tokens": 43}
        }"#;
        let parsed: OpenAIResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.choices[0].message.content, "VALID");
        assert_eq!(parsed.usage.unwrap().total_tokens, 43);
    }
}
