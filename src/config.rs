use anyhow::{bail, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
}

impl AppConfig {
    /// Loads configuration from a `.env` file (when present) and the process
    /// environment. A missing API key is fatal: nothing else runs without it.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!(
                "OpenAI API key not found. Please create a .env file or set the \
                 OPENAI_API_KEY environment variable."
            ),
        };

        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self { api_key, base_url })
    }
}
