//! Pooled HTTP client with taxonomy-mapped failures.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use model::{DomainError, ErrorCategory};
use reqwest::header::{HeaderMap, HeaderName, ACCEPT, ACCEPT_CHARSET, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error};

use crate::{HttpClientConfig, HttpClientError};

const APPLICATION_JSON: &str = "application/json";
const UTF_8: &str = "utf-8";

/// A successful (2xx/3xx) response with its body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
    /// Value of the correlation header: echoed by the server when present,
    /// otherwise the value this client sent.
    pub request_time: String,
}

/// HTTP client built once from an [`HttpClientConfig`] and shared by callers.
///
/// Cloning is cheap; clones share the connection pool and concurrency limit.
#[derive(Debug, Clone)]
pub struct RestClient {
    inner: reqwest::Client,
    correlation_header: HeaderName,
    max_in_memory_size: usize,
    pending_acquire_max_count: usize,
    permits: Arc<Semaphore>,
    waiting: Arc<AtomicUsize>,
}

impl RestClient {
    /// Builds the client.
    pub fn new(config: &HttpClientConfig) -> Result<Self, HttpClientError> {
        if config.max_connections == 0 {
            return Err(HttpClientError::ConfigurationError {
                message: "max_connections must be at least 1".to_string(),
            });
        }
        let correlation_header = HeaderName::from_bytes(config.correlation_header.as_bytes())
            .map_err(|_| HttpClientError::InvalidHeaderName {
                name: config.correlation_header.clone(),
            })?;

        debug!("initialising http client");
        let inner = reqwest::Client::builder()
            .pool_max_idle_per_host(config.max_connections)
            .pool_idle_timeout(config.max_idle_time())
            .gzip(config.compression)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            inner,
            correlation_header,
            max_in_memory_size: config.max_in_memory_size,
            pending_acquire_max_count: config.pending_acquire_max_count,
            permits: Arc::new(Semaphore::new(config.max_connections)),
            waiting: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// POSTs `body` serialised as JSON.
    pub async fn post_json<B>(
        &self,
        url: &str,
        body: &B,
        headers: Option<&HeaderMap>,
    ) -> Result<RestResponse, DomainError>
    where
        B: Serialize + ?Sized,
    {
        debug!(url, "start http call");
        let json = serde_json::to_string(body).map_err(|err| {
            let error = ErrorCategory::SerializationException.with_description(err.to_string());
            error.emit_diagnostic("http request body could not be serialised", None);
            error
        })?;
        let request = self
            .with_headers(self.inner.post(url), headers)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
            .header(ACCEPT_CHARSET, UTF_8)
            .body(json);
        self.execute(request).await
    }

    /// POSTs `form` as `application/x-www-form-urlencoded`.
    pub async fn post_form<F>(
        &self,
        url: &str,
        form: &F,
        headers: Option<&HeaderMap>,
    ) -> Result<RestResponse, DomainError>
    where
        F: Serialize + ?Sized,
    {
        debug!(url, "start http call");
        let request = self
            .with_headers(self.inner.post(url), headers)
            .header(ACCEPT, APPLICATION_JSON)
            .header(ACCEPT_CHARSET, UTF_8)
            .form(form);
        self.execute(request).await
    }

    /// GETs `url` with `query` appended as a query string.
    pub async fn get<Q>(
        &self,
        url: &str,
        query: &Q,
        headers: Option<&HeaderMap>,
    ) -> Result<RestResponse, DomainError>
    where
        Q: Serialize + ?Sized,
    {
        debug!(url, "start http call");
        let request = self
            .with_headers(self.inner.get(url), headers)
            .header(ACCEPT, APPLICATION_JSON)
            .header(ACCEPT_CHARSET, UTF_8)
            .query(query);
        self.execute(request).await
    }

    fn with_headers(&self, request: RequestBuilder, headers: Option<&HeaderMap>) -> RequestBuilder {
        match headers {
            Some(headers) => request.headers(headers.clone()),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<RestResponse, DomainError> {
        let _permit = self.acquire().await?;

        let sent_at = Utc::now().timestamp_millis();
        let request_time = sent_at.to_string();
        let response = request
            .header(self.correlation_header.clone(), request_time.as_str())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if let Some(error) = status_error(status) {
            error.emit_diagnostic("http call returned an error status", None);
            return Err(error);
        }

        let request_time = response
            .headers()
            .get(&self.correlation_header)
            .and_then(|value| value.to_str().ok())
            .map_or(request_time, str::to_string);
        let body = self.read_body(response).await?;

        debug!(
            status = status.as_u16(),
            elapsed_ms = Utc::now().timestamp_millis() - sent_at,
            body = %body,
            "http call response"
        );
        Ok(RestResponse {
            status: status.as_u16(),
            body,
            request_time,
        })
    }

    /// Waits for a free connection, rejecting the request when too many are
    /// already waiting.
    async fn acquire(&self) -> Result<OwnedSemaphorePermit, DomainError> {
        if let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() {
            return Ok(permit);
        }

        let waiting = WaitingGuard::enter(&self.waiting);
        if waiting.position > self.pending_acquire_max_count {
            let error = ErrorCategory::HttpRequestError
                .with_description("too many requests waiting for a connection");
            error.emit_diagnostic("http call rejected", None);
            return Err(error);
        }
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(transport_error)
    }

    async fn read_body(&self, mut response: Response) -> Result<String, DomainError> {
        if response
            .content_length()
            .is_some_and(|length| length > self.max_in_memory_size as u64)
        {
            return Err(body_too_large(self.max_in_memory_size));
        }

        let mut buffer = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
            if buffer.len() + chunk.len() > self.max_in_memory_size {
                return Err(body_too_large(self.max_in_memory_size));
            }
            buffer.extend_from_slice(&chunk);
        }

        String::from_utf8(buffer).map_err(|err| {
            let error = ErrorCategory::SerializationException.with_description(err.to_string());
            error.emit_diagnostic("http response body is not valid UTF-8", None);
            error
        })
    }
}

/// Maps an error status onto `HTTP_REQUEST_ERROR`; `None` for non-error statuses.
pub fn status_error(status: StatusCode) -> Option<DomainError> {
    let description = if status == StatusCode::NOT_FOUND {
        "request path does not exist, please check the request url".to_string()
    } else if status.is_client_error() {
        format!(
            "authentication failed, please contact an administrator, status: {}",
            status.as_u16()
        )
    } else if status.is_server_error() {
        format!(
            "internal server error, please retry later or contact support, status: {}",
            status.as_u16()
        )
    } else if status.as_u16() >= 400 {
        format!(
            "unknown error, please retry later or contact an administrator, status: {}",
            status.as_u16()
        )
    } else {
        return None;
    };
    Some(ErrorCategory::HttpRequestError.with_description(description))
}

fn transport_error(err: impl fmt::Display) -> DomainError {
    error!(error = %err, "http client call failed");
    ErrorCategory::SysError.to_error()
}

fn body_too_large(limit: usize) -> DomainError {
    let error = ErrorCategory::SysError
        .with_description(format!("response body exceeds {limit} bytes"));
    error.emit_diagnostic("http response rejected", None);
    error
}

/// Counts a request as waiting for a connection until dropped.
struct WaitingGuard<'a> {
    counter: &'a AtomicUsize,
    position: usize,
}

impl<'a> WaitingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        let position = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Self { counter, position }
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
