use super::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use async_trait::async_trait;
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::debug;

/// reqwest-backed transport.
///
/// Deliberately has no request timeout: a slow server stalls the session
/// rather than failing the call.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(proxy_url: Option<&str>) -> std::result::Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(
                env::var("PLAYPASS_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(4),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = proxy_url {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| TransportError::Other(format!("invalid proxy {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Build a transport honoring `PLAYPASS_PROXY_URL`.
    pub fn from_env() -> std::result::Result<Self, TransportError> {
        let proxy = env::var("PLAYPASS_PROXY_URL").ok().filter(|s| !s.is_empty());
        Self::new(proxy.as_deref())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(
            method = request.method.as_str(),
            url = request.url.as_str(),
            http_status = status,
            "request completed"
        );

        Ok(HttpResponse { status, body })
    }
}
