use crate::config::AppConfig;
use crate::domain::model::{ApiRequest, ContentKind, RawPayload};
use crate::domain::ports::Fetcher;
use crate::utils::error::{AppError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Network collaborator for the OpenSecrets API.
pub struct OpenSecretsClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl OpenSecretsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| AppError::MissingConfigError {
                field: "api.api_key".to_string(),
            })?;
        Ok(Self::new(
            config.api.base_url.clone(),
            api_key,
            Duration::from_secs(config.api.timeout_seconds),
        ))
    }
}

#[async_trait::async_trait]
impl Fetcher for OpenSecretsClient {
    async fn fetch(&self, request: &ApiRequest) -> Result<RawPayload> {
        let mut query = request.query_pairs();
        query.push(("apikey", self.api_key.clone()));

        // never log the api key
        tracing::debug!(
            "📡 Making API request: method={} {}={}",
            request.method.as_str(),
            request.method.id_param(),
            request.entity_id
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);

        if !status.is_success() {
            tracing::error!("❌ {} failed with status {}", request.method.as_str(), status);
            return Err(AppError::HttpStatus {
                status: status.as_u16(),
                method: request.method.as_str().to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let kind = ContentKind::from_content_type(content_type.as_deref());
        let body = response.text().await?;

        tracing::debug!(
            "📡 Received {} bytes of {} for {}",
            body.len(),
            kind.as_str(),
            request.method.as_str()
        );
        Ok(RawPayload::new(kind, body))
    }
}
