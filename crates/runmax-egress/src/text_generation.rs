//! Text-generation connector
//!
//! Speaks the common hosted-inference shape: the prompt goes out as
//! `{"inputs": ..., "parameters": {...}}` and the reply is either
//! `[{"generated_text": ...}]` or `{"generated_text": ...}`.

use crate::client::{HttpClientConfig, MAX_RETRIES, create_client, with_retry};
use crate::{EgressError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Text-generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGenerationConfig {
    /// Endpoint to POST prompts to; remote generation is skipped when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Bearer token sent with each request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures
    #[serde(default)]
    pub max_retries: u32,

    /// Generation length limit passed to the model
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            max_new_tokens: default_max_new_tokens(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_new_tokens() -> u32 {
    128
}

impl TextGenerationConfig {
    /// Create a configuration for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Reject settings the client cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_retries > MAX_RETRIES {
            return Err(EgressError::ConfigError(format!(
                "max_retries must be at most {}, got {}",
                MAX_RETRIES, self.max_retries
            )));
        }
        if self.timeout_secs == 0 {
            return Err(EgressError::ConfigError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
}

impl GenerationResponse {
    fn into_text(self) -> Option<String> {
        let generation = match self {
            GenerationResponse::Batch(items) => items.into_iter().next()?,
            GenerationResponse::Single(item) => item,
        };
        let text = generation.generated_text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Client for a text-generation endpoint
pub struct TextGenerationClient {
    endpoint: String,
    config: TextGenerationConfig,
    client: Client,
}

impl TextGenerationClient {
    /// Create a new client
    ///
    /// Fails with `EgressError::ConfigError` when no endpoint is configured.
    pub fn new(config: TextGenerationConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                EgressError::ConfigError("text generation endpoint is not set".to_string())
            })?;
        config.validate()?;
        let client = create_client(&config.client_config())?;

        Ok(Self {
            endpoint,
            config,
            client,
        })
    }

    /// Endpoint this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Generate text for `prompt`
    #[instrument(skip(self, prompt), fields(endpoint = %self.endpoint))]
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        with_retry(self.config.max_retries, || self.generate_once(prompt)).await
    }

    async fn generate_once(&self, prompt: &str) -> Result<String> {
        let body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: self.config.max_new_tokens,
                return_full_text: false,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EgressError::Timeout(self.config.timeout_secs)
            } else {
                EgressError::HttpError(e)
            }
        })?;

        let status = response.status();
        debug!("Text generation responded with {}", status);

        if !status.is_success() {
            let status_code = status.as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            return Err(if status_code == 429 {
                EgressError::RateLimitExceeded {
                    retry_after_secs: None,
                }
            } else {
                EgressError::ProviderError {
                    status_code,
                    message,
                }
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                EgressError::Timeout(self.config.timeout_secs)
            } else {
                EgressError::HttpError(e)
            }
        })?;

        serde_json::from_slice::<GenerationResponse>(&bytes)
            .map_err(|e| EgressError::ParseError(format!("Unexpected response shape: {}", e)))?
            .into_text()
            .ok_or_else(|| EgressError::ParseError("Response contained no generated text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_endpoint() {
        let result = TextGenerationClient::new(TextGenerationConfig::default());
        assert!(matches!(result, Err(EgressError::ConfigError(_))));

        let blank = TextGenerationConfig::new("  ");
        assert!(TextGenerationClient::new(blank).is_err());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(TextGenerationConfig::default().validate().is_ok());

        let mut config = TextGenerationConfig::new("http://localhost:9000/generate");
        config.max_retries = MAX_RETRIES;
        assert!(config.validate().is_ok());

        config.max_retries = 65;
        assert!(matches!(config.validate(), Err(EgressError::ConfigError(_))));
        assert!(matches!(
            TextGenerationClient::new(config),
            Err(EgressError::ConfigError(_))
        ));

        let zero_timeout = TextGenerationConfig::new("http://localhost:9000/generate")
            .with_timeout_secs(0);
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_builder() {
        let config = TextGenerationConfig::new("http://localhost:9000/generate")
            .with_api_key("secret")
            .with_timeout_secs(3);

        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000/generate"));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.client_config().timeout_secs, 3);

        let client = TextGenerationClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000/generate");
    }

    #[test]
    fn test_parse_batch_and_single_shapes() {
        let batch: GenerationResponse =
            serde_json::from_str(r#"[{"generated_text": " sorted: a, b "}]"#).unwrap();
        assert_eq!(batch.into_text().as_deref(), Some("sorted: a, b"));

        let single: GenerationResponse =
            serde_json::from_str(r#"{"generated_text": "ok"}"#).unwrap();
        assert_eq!(single.into_text().as_deref(), Some("ok"));
    }

    #[test]
    fn test_parse_empty_generation() {
        let empty: GenerationResponse = serde_json::from_str("[]").unwrap();
        assert!(empty.into_text().is_none());

        let blank: GenerationResponse =
            serde_json::from_str(r#"{"generated_text": "   "}"#).unwrap();
        assert!(blank.into_text().is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerationRequest {
            inputs: "prompt",
            parameters: GenerationParameters {
                max_new_tokens: 64,
                return_full_text: false,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"], "prompt");
        assert_eq!(json["parameters"]["max_new_tokens"], 64);
        assert_eq!(json["parameters"]["return_full_text"], false);
    }
}
