use std::time::Duration;

use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::ApiError;
use crate::filters::QueryParams;
use crate::models::ApiResponse;

/// Upper bound for one backend call, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper over `reqwest::Client` that speaks the backend's
/// `{success, data, recordsTotal, recordsFiltered}` envelope.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<ApiResponse<T>, ApiError> {
        tracing::debug!(method = "GET", path, params = ?params.as_slice(), "API request");
        let request = self.http.get(self.url(path)).query(params.as_slice());
        self.send(request).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        tracing::debug!(method = "POST", path, "API request");
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        tracing::debug!(method = "PUT", path, "API request");
        self.send(self.http.put(self.url(path)).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        tracing::debug!(method = "DELETE", path, "API request");
        self.send(self.http.delete(self.url(path))).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            // 204 and friends: nothing to decode, the status already said yes
            return Ok(ApiResponse {
                success: true,
                data: None,
                message: None,
                records_total: None,
                records_filtered: None,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
