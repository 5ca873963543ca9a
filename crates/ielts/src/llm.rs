//! LLM Bridge: one chat completion call to OpenRouter per generation.

use std::time::Duration;

use ielts_core::llm::{build_request, parse_llm_result, response_content, ChatResponse, LlmResult, DEFAULT_MODEL};

use crate::error::Error;
use crate::status::Activity;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

const MISSING_KEY: &str = "OpenRouter API key is missing. Add OPENROUTER_API_KEY to your environment.";

#[derive(Debug, Clone, clap::Args)]
pub struct LlmOptions {
    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Chat completions endpoint
    #[arg(long, env = "OPENROUTER_URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Model identifier
    #[arg(long, env = "OPENROUTER_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Request timeout in seconds
    #[arg(long = "llm-timeout", env = "OPENROUTER_TIMEOUT", default_value = "60")]
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl From<LlmOptions> for LlmConfig {
    fn from(options: LlmOptions) -> Self {
        Self {
            api_key: options.api_key.filter(|key| !key.trim().is_empty()),
            endpoint: options.endpoint,
            model: options.model,
            timeout: Duration::from_secs(options.timeout),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmBridge {
    client: reqwest::Client,
    config: LlmConfig,
    activity: Activity,
}

impl LlmBridge {
    pub fn new(config: LlmConfig) -> Result<Self, Error> {
        Self::with_activity(config, Activity::new())
    }

    /// Bridge reporting into an existing [`Activity`].
    pub fn with_activity(config: LlmConfig, activity: Activity) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Generic(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            activity,
        })
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Ask the model for passage HTML and graded questions.
    ///
    /// On failure the message is kept in [`Activity::last_error`] and `None`
    /// is returned.
    pub async fn generate(&self, raw_text: &str) -> Option<LlmResult> {
        self.try_generate(raw_text).await.ok()
    }

    pub async fn try_generate(&self, raw_text: &str) -> Result<LlmResult, Error> {
        let _guard = self.activity.begin();

        let result = self.call(raw_text).await;
        if let Err(err) = &result {
            log::warn!("LLM generation failed: {err}");
            self.activity.record_error(err.to_string());
        }
        result
    }

    async fn call(&self, raw_text: &str) -> Result<LlmResult, Error> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Configuration(MISSING_KEY.to_string()))?;

        let body = build_request(&self.config.model, raw_text);
        log::debug!("POST {} (model {})", self.config.endpoint, self.config.model);

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Network(format!(
                        "OpenRouter request timed out after {}s",
                        self.config.timeout.as_secs_f32()
                    ))
                } else {
                    Error::Network(format!("Failed to call OpenRouter: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("OpenRouter API error {}", status.as_u16())));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Format(format!("Unexpected OpenRouter response: {e}")))?;

        let mut result = parse_llm_result(response_content(&completion))?;

        let adjusted = result.normalize();
        if !adjusted.is_empty() {
            log::warn!("Adjusted malformed questions from model output: {adjusted:?}");
        }

        Ok(result)
    }
}
