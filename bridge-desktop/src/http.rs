//! Reqwest-backed [`HttpClient`]

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use core_async::time::sleep;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Desktop HTTP client.
///
/// Uploads and Firestore commits share one pooled `reqwest::Client`.
/// `execute` retries 429 and 5xx with the default [`RetryPolicy`]; once the
/// attempts run out the last response is returned as-is for the caller to
/// judge by status.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("media-upload-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map(Self::with_client)
            .map_err(|e| BridgeError::NotAvailable(format!("HTTP client: {}", e)))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn method_for(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn prepare(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = headers
            .into_iter()
            .fold(self.client.request(Self::method_for(method), url), |b, (k, v)| {
                b.header(k, v)
            });

        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }

    async fn send_once(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self
            .prepare(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let headers = header_map(response.headers());
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn transport_error(err: reqwest::Error) -> BridgeError {
    let detail = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    BridgeError::OperationFailed(detail)
}

// Non-UTF-8 header values are dropped
fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect()
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.execute_with_retry(request, RetryPolicy::default()).await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(
                attempt,
                attempts,
                method = request.method.as_str(),
                url = %request.url,
                "Sending request"
            );

            let outcome = self.send_once(request.clone()).await;
            let retryable = outcome.as_ref().map_or(true, HttpResponse::is_retryable);
            if !retryable || attempt >= attempts {
                return outcome;
            }

            match &outcome {
                Ok(response) => warn!(status = response.status, attempt, "Retryable status"),
                Err(e) => warn!(error = %e, attempt, "Request failed"),
            }
            sleep(policy.delay_for(attempt - 1)).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(ReqwestHttpClient::new().is_ok());
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(ReqwestHttpClient::method_for(HttpMethod::Post), Method::POST);
        assert_eq!(ReqwestHttpClient::method_for(HttpMethod::Delete), Method::DELETE);
    }

    #[test]
    fn test_prepared_request_carries_headers_and_body() {
        let client = ReqwestHttpClient::new().unwrap();
        let request = HttpRequest::new(HttpMethod::Post, "https://example.com/upload")
            .bearer_token("tok")
            .body(bytes::Bytes::from("payload"));

        let built = client.prepare(request).build().unwrap();

        assert_eq!(built.method(), Method::POST);
        assert_eq!(built.headers().get("Authorization").unwrap(), "Bearer tok");
        assert_eq!(built.body().and_then(|b| b.as_bytes()), Some(&b"payload"[..]));
    }
}
