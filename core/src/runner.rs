//! Executes `RequestDescription`s over HTTP.
//!
//! # Design
//! `RequestRunner` wraps a `reqwest::Client` and a default timeout, and is
//! cheap to clone. Each call sends exactly one request: there is no retry and
//! redirects follow reqwest's default policy. The status check happens before
//! the body is read, so a mismatched response is never parsed.
//!
//! Downloads stream chunk by chunk into any `AsyncWrite`. The sink is shut
//! down on every exit path, including mid-stream failures and cancellation.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{field, instrument, Span};

use crate::config::DEFAULT_TIMEOUT;
use crate::error::HttpError;
use crate::http::{Download, RequestBody, RequestDescription, ResponseBody, ResponseFormat, ResponseResult};

/// Builder for [`RequestRunner`].
#[derive(Debug)]
pub struct RequestRunnerBuilder {
    timeout: Duration,
    user_agent: String,
}

impl RequestRunnerBuilder {
    /// Default timeout applied to requests that do not set their own.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// ## Errors
    ///
    /// Returns [`HttpError::Transport`] if the TLS backend cannot be
    /// initialised.
    pub fn build(self) -> Result<RequestRunner, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent)
            .build()
            .map_err(HttpError::Transport)?;
        Ok(RequestRunner {
            client,
            timeout: self.timeout,
        })
    }
}

/// Sends requests and validates their responses.
#[derive(Debug, Clone)]
pub struct RequestRunner {
    client: reqwest::Client,
    timeout: Duration,
}

impl RequestRunner {
    pub fn builder() -> RequestRunnerBuilder {
        RequestRunnerBuilder {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("reqres-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// A runner with the default 30 second timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::builder().build()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `request` and returns its status and body.
    ///
    /// An empty body comes back as `None`. Otherwise the body is parsed as
    /// JSON or returned as bytes, depending on the request's
    /// [`ResponseFormat`].
    ///
    /// ## Errors
    ///
    /// - [`HttpError::UnexpectedStatus`] if the request declared a status and
    ///   the server returned a different one. The body is not read.
    /// - [`HttpError::Transport`] or [`HttpError::Timeout`] on network
    ///   failure.
    /// - [`HttpError::Parse`] if a JSON body does not parse.
    /// - [`HttpError::Serialize`] if a JSON request body cannot be encoded.
    #[instrument(
        name = "http_request",
        skip(self, request),
        fields(
            http.method = %request.method(),
            http.url = %request.url(),
            http.status_code = field::Empty,
        )
    )]
    pub async fn execute(&self, request: &RequestDescription) -> Result<ResponseResult, HttpError> {
        let timeout = self.effective_timeout(request);
        let response = self.send(request).await?;
        let status = check_status(request, &response)?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HttpError::from_transport(e, timeout))?;
        tracing::debug!(len = bytes.len(), "received body");

        let body = if bytes.is_empty() {
            None
        } else {
            match request.response_format() {
                ResponseFormat::Json => Some(ResponseBody::Json(serde_json::from_slice(&bytes)?)),
                ResponseFormat::Raw => Some(ResponseBody::Bytes(bytes)),
            }
        };

        Ok(ResponseResult { status, body })
    }

    /// Like [`execute`](Self::execute), but gives up as soon as `cancel`
    /// fires. Dropping the in-flight future closes its connection.
    pub async fn execute_with_cancel(
        &self,
        request: &RequestDescription,
        cancel: &CancellationToken,
    ) -> Result<ResponseResult, HttpError> {
        until_cancelled(Some(cancel), self.execute(request)).await
    }

    /// Streams the response body of `request` into `sink`.
    ///
    /// The sink is shut down whether or not the transfer succeeds. When both
    /// the transfer and the shutdown fail, the transfer error is returned.
    pub async fn download<W>(&self, request: &RequestDescription, sink: W) -> Result<Download, HttpError>
    where
        W: AsyncWrite + Unpin,
    {
        self.download_inner(request, sink, None).await
    }

    pub async fn download_with_cancel<W>(
        &self,
        request: &RequestDescription,
        sink: W,
        cancel: &CancellationToken,
    ) -> Result<Download, HttpError>
    where
        W: AsyncWrite + Unpin,
    {
        self.download_inner(request, sink, Some(cancel)).await
    }

    /// Creates (or truncates) `path` and downloads into it.
    pub async fn download_to_file(
        &self,
        request: &RequestDescription,
        path: impl AsRef<Path>,
    ) -> Result<Download, HttpError> {
        let file = tokio::fs::File::create(path.as_ref()).await?;
        self.download(request, file).await
    }

    #[instrument(
        name = "http_request",
        skip(self, request, sink, cancel),
        fields(
            http.method = %request.method(),
            http.url = %request.url(),
            http.status_code = field::Empty,
        )
    )]
    async fn download_inner<W>(
        &self,
        request: &RequestDescription,
        mut sink: W,
        cancel: Option<&CancellationToken>,
    ) -> Result<Download, HttpError>
    where
        W: AsyncWrite + Unpin,
    {
        let streamed = self.stream_into(request, &mut sink, cancel).await;
        let closed = sink.shutdown().await;

        match (streamed, closed) {
            (Ok(download), Ok(())) => {
                tracing::debug!(bytes = download.bytes_written, "download complete");
                Ok(download)
            }
            (Ok(_), Err(e)) => Err(HttpError::Io(e)),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "failed to close sink after error");
                }
                Err(e)
            }
        }
    }

    async fn stream_into<W>(
        &self,
        request: &RequestDescription,
        sink: &mut W,
        cancel: Option<&CancellationToken>,
    ) -> Result<Download, HttpError>
    where
        W: AsyncWrite + Unpin,
    {
        let timeout = self.effective_timeout(request);
        let mut response = until_cancelled(cancel, self.send(request)).await?;
        let status = check_status(request, &response)?;

        let mut bytes_written = 0u64;
        loop {
            let next = until_cancelled(cancel, async {
                response
                    .chunk()
                    .await
                    .map_err(|e| HttpError::from_transport(e, timeout))
            })
            .await?;
            let Some(chunk) = next else { break };
            sink.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        sink.flush().await?;

        Ok(Download {
            status,
            bytes_written,
        })
    }

    async fn send(&self, request: &RequestDescription) -> Result<reqwest::Response, HttpError> {
        let timeout = self.effective_timeout(request);
        let mut builder = self
            .client
            .request(request.method().into(), request.url().clone())
            .timeout(timeout);

        if let Some(content_type) = request.content_type() {
            builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        match request.body() {
            Some(RequestBody::Json(value)) => {
                builder = builder.body(serde_json::to_vec(value).map_err(HttpError::Serialize)?)
            }
            Some(RequestBody::Bytes(bytes)) => builder = builder.body(bytes.clone()),
            None => {}
        }

        builder
            .send()
            .await
            .map_err(|e| HttpError::from_transport(e, timeout))
    }

    fn effective_timeout(&self, request: &RequestDescription) -> Duration {
        request.timeout().unwrap_or(self.timeout)
    }
}

/// Records the status on the current span and enforces the expected status.
fn check_status(request: &RequestDescription, response: &reqwest::Response) -> Result<u16, HttpError> {
    let status = response.status().as_u16();
    Span::current().record("http.status_code", status);

    match request.expected_status() {
        Some(expected) if expected != status => {
            tracing::warn!(got = status, expected, "unexpected status");
            Err(HttpError::UnexpectedStatus {
                got: status,
                expected,
            })
        }
        _ => Ok(status),
    }
}

async fn until_cancelled<T, F>(cancel: Option<&CancellationToken>, fut: F) -> Result<T, HttpError>
where
    F: Future<Output = Result<T, HttpError>>,
{
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(HttpError::Cancelled),
                result = fut => result,
            }
        }
        None => fut.await,
    }
}
