//! Advisory text for an assessed household.
//!
//! The engine never talks to the language model itself. The HTTP and CLI
//! boundaries receive an [`Advisor`] at construction time and turn every
//! failure into one of the fallback strings below, so a missing or broken
//! model never fails a request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::Args;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::{FinancialProfile, RatioSummary, RiskZone};

pub const OFFLINE_ADVICE: &str = "AI Advice unavailable (Server running in offline mode due to missing API Key). Please set XAI_API_KEY.";
pub const FAILED_ADVICE: &str = "Could not generate advice at this time. Please try again later.";
pub const SIMULATION_ADVICE: &str = "Simulation run complete. See updated metrics.";

const SYSTEM_PROMPT: &str = "You are a helpful financial advisor for Indians.";

/// Field name to value mapping handed to the model: the raw profile plus the
/// display ratios.
pub type AdviceContext = Map<String, Value>;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor is disabled: no API key configured")]
    Disabled,
    #[error("advisor request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("advisor returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("advisor returned no content")]
    EmptyResponse,
}

#[async_trait]
pub trait Advisor: Send + Sync {
    async fn generate_advice(
        &self,
        context: &AdviceContext,
        risk_zone: RiskZone,
    ) -> Result<String, AdvisorError>;
}

#[derive(Args, Debug, Clone)]
pub struct AdvisorArgs {
    #[arg(
        long,
        env = "XAI_API_KEY",
        hide_env_values = true,
        help = "API key for the advice model; offline mode when absent"
    )]
    pub xai_api_key: Option<String>,
    #[arg(long, env = "ADVISOR_BASE_URL", default_value = "https://api.x.ai/v1")]
    pub advisor_base_url: String,
    #[arg(long, env = "ADVISOR_MODEL", default_value = "grok-beta")]
    pub advisor_model: String,
    #[arg(long, default_value_t = 500)]
    pub advisor_max_tokens: u32,
    #[arg(
        long,
        default_value_t = 30,
        help = "Timeout for one advice request in seconds"
    )]
    pub advisor_timeout_secs: u64,
}

/// Used when no credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineAdvisor;

#[async_trait]
impl Advisor for OfflineAdvisor {
    async fn generate_advice(
        &self,
        _context: &AdviceContext,
        _risk_zone: RiskZone,
    ) -> Result<String, AdvisorError> {
        Err(AdvisorError::Disabled)
    }
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct ChatAdvisor {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ChatAdvisor {
    pub fn new(
        base_url: &str,
        api_key: String,
        model: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, AdvisorError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model,
            max_tokens,
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl Advisor for ChatAdvisor {
    async fn generate_advice(
        &self,
        context: &AdviceContext,
        risk_zone: RiskZone,
    ) -> Result<String, AdvisorError> {
        let prompt = build_prompt(context, risk_zone);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AdvisorError::Status { status, body });
        }

        let body: ChatCompletionResponse = response.json().await?;
        extract_content(body)
    }
}

fn extract_content(body: ChatCompletionResponse) -> Result<String, AdvisorError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(AdvisorError::EmptyResponse)
}

pub fn build_prompt(context: &AdviceContext, risk_zone: RiskZone) -> String {
    let user_data = Value::Object(context.clone());
    format!(
        "You are a financial advisor for Indian middle-class families.\n\
         Use simple Hindi+English mix (Hinglish).\n\
         \n\
         User Data: {user_data}\n\
         Risk Zone: {risk_zone}\n\
         \n\
         Provide:\n\
         1. Current situation summary (2 lines)\n\
         2. Top 3 immediate risks\n\
         3. Action steps for next 30-90 days\n\
         4. Long-term suggestions\n\
         \n\
         Be practical, non-technical, and culturally relevant for India."
    )
}

/// Profile fields followed by the display ratios. A ratio never shadows a
/// profile field since the names are disjoint.
pub fn build_context(profile: &FinancialProfile, ratios: &RatioSummary) -> AdviceContext {
    let mut context = match serde_json::to_value(profile) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    if let Ok(Value::Object(ratio_map)) = serde_json::to_value(ratios) {
        context.extend(ratio_map);
    }
    context
}

/// Never fails: disabled and failing advisors both map to fixed text.
pub async fn advice_or_fallback(
    advisor: &dyn Advisor,
    context: &AdviceContext,
    risk_zone: RiskZone,
) -> String {
    match advisor.generate_advice(context, risk_zone).await {
        Ok(advice) => advice,
        Err(AdvisorError::Disabled) => OFFLINE_ADVICE.to_string(),
        Err(err) => {
            warn!(error = %err, zone = %risk_zone, "advisor request failed");
            FAILED_ADVICE.to_string()
        }
    }
}

pub fn advisor_from_args(args: &AdvisorArgs) -> Arc<dyn Advisor> {
    let Some(api_key) = args.xai_api_key.clone().filter(|key| !key.trim().is_empty()) else {
        warn!("XAI_API_KEY not set; advisor running in offline mode");
        return Arc::new(OfflineAdvisor);
    };

    match ChatAdvisor::new(
        &args.advisor_base_url,
        api_key,
        args.advisor_model.clone(),
        args.advisor_max_tokens,
        Duration::from_secs(args.advisor_timeout_secs),
    ) {
        Ok(advisor) => {
            info!(
                base_url = %args.advisor_base_url,
                model = %args.advisor_model,
                "advisor enabled"
            );
            Arc::new(advisor)
        }
        Err(err) => {
            warn!(error = %err, "failed to build advisor client; running in offline mode");
            Arc::new(OfflineAdvisor)
        }
    }
}
