use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use homefinder_core::config::LookupSettings;
use homefinder_core::error::LookupError;
use homefinder_core::traits::GenerativeLookup;
use homefinder_core::types::Property;

use crate::parse::{extract_message_content, parse_generated};

/// Generative lookup backed by an OpenRouter-compatible chat-completions
/// endpoint. Requests are bounded by `timeout_secs` and retried `retries`
/// times on transport errors, 429 and 5xx answers.
pub struct OpenRouterLookup {
    client: Client,
    settings: LookupSettings,
}

enum Attempt {
    Retryable(LookupError),
    Fatal(LookupError),
}

impl OpenRouterLookup {
    pub fn new(settings: LookupSettings) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &LookupSettings { &self.settings }

    pub fn prompt(&self, query: &str) -> String {
        format!(
            "You are a real estate assistant. Given the following user request, respond with a JSON array of up to {} matching properties. Each property should have: name, location, price, type, bedrooms, bathrooms, area, description, features (array), coordinates (lat,lng). User request: \"{}\"",
            self.settings.max_properties, query
        )
    }

    fn request_body(&self, query: &str) -> Value {
        json!({
            "model": self.settings.model,
            "messages": [{ "role": "user", "content": self.prompt(query) }],
            "max_tokens": self.settings.max_tokens,
        })
    }

    async fn send_once(&self, body: &Value, api_key: &str) -> Result<String, Attempt> {
        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Attempt::Retryable(LookupError::Transport(e.to_string())))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Attempt::Retryable(LookupError::Transport(e.to_string())))?;
        if status.is_success() {
            return Ok(text);
        }
        let error = LookupError::Status { status: status.as_u16(), body: text };
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(Attempt::Retryable(error))
        } else {
            Err(Attempt::Fatal(error))
        }
    }

    async fn send(&self, query: &str, api_key: &str) -> Result<String, LookupError> {
        let body = self.request_body(query);
        let mut attempt = 0;
        loop {
            match self.send_once(&body, api_key).await {
                Ok(text) => return Ok(text),
                Err(Attempt::Retryable(e)) if attempt < self.settings.retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "generative lookup failed, retrying");
                }
                Err(Attempt::Retryable(e)) | Err(Attempt::Fatal(e)) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl GenerativeLookup for OpenRouterLookup {
    async fn lookup(&self, query: &str) -> Result<Vec<Property>, LookupError> {
        if !self.settings.enabled {
            return Err(LookupError::NotConfigured("lookup disabled in settings".into()));
        }
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LookupError::NotConfigured("missing API key".into()))?;

        debug!(query, model = %self.settings.model, "requesting generated listings");
        let raw = self.send(query, api_key).await?;
        let response: Value = serde_json::from_str(&raw)?;
        let content = extract_message_content(&response).ok_or(LookupError::MissingContent)?;
        let report = parse_generated(&content, self.settings.max_properties)?;
        for (position, reason) in &report.rejected {
            warn!(position, %reason, "dropping generated listing");
        }
        info!(kept = report.properties.len(), rejected = report.rejected.len(), truncated = report.truncated, "generated listings parsed");
        Ok(report.properties)
    }
}

/// Lookup that never produces anything; used for local-only operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledLookup;

#[async_trait]
impl GenerativeLookup for DisabledLookup {
    async fn lookup(&self, _query: &str) -> Result<Vec<Property>, LookupError> {
        Err(LookupError::NotConfigured("local-only mode".into()))
    }
}
