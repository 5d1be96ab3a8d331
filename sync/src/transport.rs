//! The I/O seam: executes the plain-data requests `TodoClient` builds.

use async_trait::async_trait;
use reqwest::Method;
use todo_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use tracing::{debug, warn};

use crate::config::{ConfigError, SyncConfig};

/// Executes one HTTP round-trip.
///
/// Any status code is a successful execution; interpreting it is the
/// client's job. Failing to get a response at all maps to
/// `ApiError::RequestFailed` with no status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `reqwest`-backed transport.
///
/// Transport failures on idempotent requests are retried up to `retries`
/// times. HTTP error statuses are never retried.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    retries: u32,
}

impl ReqwestTransport {
    pub fn new(config: &SyncConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            retries: config.transport_retries,
        })
    }

    async fn send_once(&self, request: &HttpRequest) -> Result<HttpResponse, reqwest::Error> {
        let mut builder = self.client.request(method(request.method), &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let attempts = if request.method.is_idempotent() {
            self.retries + 1
        } else {
            1
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&request).await {
                Ok(response) => {
                    debug!(
                        method = request.method.as_str(),
                        path = %request.path,
                        status = response.status,
                        "request completed"
                    );
                    return Ok(response);
                }
                Err(err) if attempt < attempts => {
                    warn!(
                        method = request.method.as_str(),
                        path = %request.path,
                        attempt,
                        "transport error, retrying: {err}"
                    );
                    attempt += 1;
                }
                Err(err) => {
                    warn!(
                        method = request.method.as_str(),
                        path = %request.path,
                        "transport error: {err}"
                    );
                    return Err(ApiError::transport(err.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_method() {
        assert_eq!(method(HttpMethod::Get), Method::GET);
        assert_eq!(method(HttpMethod::Post), Method::POST);
        assert_eq!(method(HttpMethod::Put), Method::PUT);
        assert_eq!(method(HttpMethod::Patch), Method::PATCH);
        assert_eq!(method(HttpMethod::Delete), Method::DELETE);
    }

    #[tokio::test]
    async fn unreachable_host_is_request_failed_without_status() {
        // Grab a free port, then release it so nothing is listening there.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let config = SyncConfig {
            transport_retries: 1,
            ..SyncConfig::new(format!("http://{addr}"))
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        let request = todo_core::TodoClient::new(&config.base_url).build_health_check();
        let err = transport.execute(request).await.unwrap_err();
        assert!(matches!(err, ApiError::RequestFailed { status: None, .. }));
    }
}
