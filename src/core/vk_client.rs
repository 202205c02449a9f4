use crate::config::BotConfig;
use crate::utils::error::{BotError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const API_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct VkEnvelope<T> {
    response: Option<T>,
    error: Option<VkErrorPayload>,
}

#[derive(Debug, Deserialize)]
struct VkErrorPayload {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

/// Thin VK API caller: appends the token and version to every call and
/// unwraps the `{response}` / `{error}` envelope.
#[derive(Debug, Clone)]
pub struct VkClient {
    client: Client,
    base_url: String,
    access_token: String,
    api_version: String,
}

impl VkClient {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let client = Client::builder().timeout(API_TIMEOUT).build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &BotConfig) -> Self {
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            api_version: config.api_version.clone(),
        }
    }

    /// Underlying HTTP client, shared with uploads and image downloads.
    pub fn http(&self) -> &Client {
        &self.client
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    fn with_auth(&self, params: &[(&str, String)]) -> Vec<(String, String)> {
        params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .chain([
                ("access_token".to_string(), self.access_token.clone()),
                ("v".to_string(), self.api_version.clone()),
            ])
            .collect()
    }

    /// Calls `method` with query parameters.
    pub async fn get<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<T> {
        tracing::debug!("VK GET {}", method);
        let response = self
            .client
            .get(self.method_url(method))
            .query(&self.with_auth(params))
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        decode_response(method, &body)
    }

    /// Calls `method` with a form-encoded body, for payloads too long for a
    /// query string.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        tracing::debug!("VK POST {}", method);
        let response = self
            .client
            .post(self.method_url(method))
            .form(&self.with_auth(params))
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        decode_response(method, &body)
    }
}

pub(crate) fn decode_response<T: DeserializeOwned>(method: &str, body: &str) -> Result<T> {
    let envelope: VkEnvelope<T> = serde_json::from_str(body)?;

    if let Some(error) = envelope.error {
        return Err(BotError::ApiError {
            method: method.to_string(),
            code: error.error_code,
            message: error.error_msg,
        });
    }

    envelope.response.ok_or_else(|| BotError::ApiError {
        method: method.to_string(),
        code: 0,
        message: "response field is missing".to_string(),
    })
}
