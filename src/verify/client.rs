// ABOUTME: Minimal JSON-over-HTTP client used for verification.
// ABOUTME: One hyper HTTP/1 connection per request, bounded by a request timeout.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::net::TcpStream;

/// Errors from issuing an HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("HTTP error: {0}")]
    Protocol(#[from] hyper::Error),

    #[error("failed to build request: {0}")]
    InvalidRequest(String),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,
}

impl HttpError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpError::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Delete,
}

impl ApiMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Delete => "DELETE",
        }
    }
}

/// A request against an absolute `http://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: ApiMethod,
    pub url: String,
    pub body: Option<Bytes>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: ApiMethod::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: ApiMethod::Delete,
            url: url.into(),
            body: None,
        }
    }

    pub fn post_json<T: Serialize>(url: impl Into<String>, body: &T) -> Result<Self, HttpError> {
        let body = serde_json::to_vec(body).map_err(HttpError::Encode)?;
        Ok(Self {
            method: ApiMethod::Post,
            url: url.into(),
            body: Some(Bytes::from(body)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Sends a request and returns the complete response.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError>;
}

#[async_trait]
impl<T: ApiClient + ?Sized> ApiClient for &T {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        (**self).send(request).await
    }
}

/// Plain-HTTP client built on hyper's connection API.
#[derive(Debug, Clone, Copy)]
pub struct HttpClient {
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn send_once(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        let uri: hyper::Uri = request.url.parse().map_err(|e| HttpError::InvalidUrl {
            url: request.url.clone(),
            reason: format!("{}", e),
        })?;

        match uri.scheme_str() {
            Some("http") => {}
            other => return Err(HttpError::UnsupportedScheme(other.unwrap_or("").to_string())),
        }

        let host = uri.host().ok_or_else(|| HttpError::InvalidUrl {
            url: request.url.clone(),
            reason: "missing host".to_string(),
        })?;
        let port = uri.port_u16().unwrap_or(80);
        let authority = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .unwrap_or_else(|| host.to_string());
        let path = uri
            .path_and_query()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let stream = TcpStream::connect((socket_host(host), port))
            .await
            .map_err(HttpError::Connect)?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake::<_, Full<Bytes>>(io).await?;

        // Drive the connection until the response is fully read.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("verification connection error: {}", e);
            }
        });

        let mut builder = hyper::Request::builder()
            .method(request.method.as_str())
            .uri(path)
            .header("Host", authority)
            .header("Accept", "application/json");
        if request.body.is_some() {
            builder = builder.header("Content-Type", "application/json");
        }
        let req = builder
            .body(Full::new(request.body.unwrap_or_default()))
            .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;

        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let resp = sender.send_request(req).await?;
        let status = resp.status().as_u16();
        let body = resp.into_body().collect().await?.to_bytes();

        Ok(ApiResponse { status, body })
    }
}

/// URI hosts keep IPv6 brackets; socket addresses must not.
fn socket_host(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

#[async_trait]
impl ApiClient for HttpClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        tokio::time::timeout(self.timeout, self.send_once(request))
            .await
            .map_err(|_| HttpError::Timeout(self.timeout))?
    }
}
