use anyhow::Result;
use log::info;

pub mod config;
pub mod evaluation;
pub mod moderation;
pub mod openai;
pub mod questions;
pub mod session;
pub mod ui;
pub mod wizard;

pub use openai::OpenAIClient;
pub use session::{Complexity, InterviewPhase, InterviewSession};
pub use wizard::Wizard;

use config::AppConfig;

/// Entry point for the terminal app. Owns the tokio runtime so `main`
/// stays synchronous.
#[tokio::main]
pub async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    info!("PrepMate starting against {}", config.base_url);

    let client = OpenAIClient::new(config.api_key, config.base_url);
    let mut wizard = Wizard::new(client);
    wizard.run().await
}
