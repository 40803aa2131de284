use anyhow::Result;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Non-success answer from PostgREST, kept typed so callers can tell a
/// unique/exclusion violation (409) apart from other failures.
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, SupabaseError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.anon_key)
                .map_err(|e| SupabaseError::InvalidHeader(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // PostgREST falls back to the anon role when no user token is given
        let bearer = auth_token.unwrap_or(&self.anon_key);
        if !bearer.is_empty() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", bearer))
                    .map_err(|e| SupabaseError::InvalidHeader(e.to_string()))?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => SupabaseError::Auth(error_text),
                404 => SupabaseError::NotFound(error_text),
                409 => SupabaseError::Conflict(error_text),
                code => SupabaseError::Api { status: code, message: error_text },
            }.into());
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}
