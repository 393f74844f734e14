//! Request and response types for the runner.
//!
//! # Design
//! A `RequestDescription` is plain data: method, resolved URL, optional body
//! and the caller's expectations about the response. It is assembled through
//! `RequestDescriptionBuilder` and cannot be changed afterwards, so a single
//! description can be executed repeatedly or shared across tasks.
//!
//! URL resolution happens in `build()`. A malformed base URL is reported
//! there, before any network activity.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use url::Url;

use crate::error::HttpError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Payload attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Bytes(Bytes),
}

/// How the runner should interpret a non-empty response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Json,
    Raw,
}

/// An immutable, fully resolved HTTP request.
#[derive(Debug, Clone)]
pub struct RequestDescription {
    method: HttpMethod,
    base_url: Url,
    path: Vec<String>,
    query: BTreeMap<String, String>,
    url: Url,
    body: Option<RequestBody>,
    content_type: Option<String>,
    expected_status: Option<u16>,
    response_format: ResponseFormat,
    timeout: Option<Duration>,
}

impl RequestDescription {
    /// Starts a description for `method` against `base_url`.
    ///
    /// The base URL is only parsed when [`RequestDescriptionBuilder::build`]
    /// runs.
    pub fn builder(method: HttpMethod, base_url: impl Into<String>) -> RequestDescriptionBuilder {
        RequestDescriptionBuilder {
            method,
            base_url: base_url.into(),
            path: Vec::new(),
            query: BTreeMap::new(),
            body: None,
            content_type: None,
            expected_status: None,
            response_format: ResponseFormat::Json,
            timeout: None,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// The final URL: base, then path segments, then query.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Content type sent with the body. JSON bodies default to
    /// `application/json` when none was set explicitly.
    pub fn content_type(&self) -> Option<&str> {
        match (&self.content_type, &self.body) {
            (Some(ct), _) => Some(ct.as_str()),
            (None, Some(RequestBody::Json(_))) => Some("application/json"),
            (None, _) => None,
        }
    }

    pub fn expected_status(&self) -> Option<u16> {
        self.expected_status
    }

    pub fn response_format(&self) -> ResponseFormat {
        self.response_format
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Builder for [`RequestDescription`].
#[derive(Debug, Clone)]
pub struct RequestDescriptionBuilder {
    method: HttpMethod,
    base_url: String,
    path: Vec<String>,
    query: BTreeMap<String, String>,
    body: Option<RequestBody>,
    content_type: Option<String>,
    expected_status: Option<u16>,
    response_format: ResponseFormat,
    timeout: Option<Duration>,
}

impl RequestDescriptionBuilder {
    /// Appends one path segment. The segment is percent-encoded as a unit,
    /// so a `/` inside it does not start a new segment.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.path.push(segment.into());
        self
    }

    pub fn segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path.extend(segments.into_iter().map(Into::into));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Declares the status the response must carry. Anything else fails with
    /// [`HttpError::UnexpectedStatus`] before the body is read.
    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Overrides the runner's default timeout for this request only.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolves the URL and freezes the description.
    ///
    /// ## Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if the base URL does not parse or
    /// cannot carry path segments (e.g. `mailto:`).
    pub fn build(self) -> Result<RequestDescription, HttpError> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{e}: {}", self.base_url)))?;

        let mut url = base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| HttpError::InvalidUrl(format!("cannot be a base: {base_url}")))?;
            segments.pop_if_empty();
            segments.extend(self.path.iter());
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        Ok(RequestDescription {
            method: self.method,
            base_url,
            path: self.path,
            query: self.query,
            url,
            body: self.body,
            content_type: self.content_type,
            expected_status: self.expected_status,
            response_format: self.response_format,
            timeout: self.timeout,
        })
    }
}

/// Body of a completed response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Bytes(Bytes),
}

/// Status and body produced by one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseResult {
    pub status: u16,
    pub body: Option<ResponseBody>,
}

impl ResponseResult {
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Some(ResponseBody::Json(value)) => Some(value),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.body {
            Some(ResponseBody::Bytes(bytes)) => Some(bytes),
            _ => None,
        }
    }
}

/// Outcome of streaming a response body into a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Download {
    pub status: u16,
    pub bytes_written: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn segments_are_appended_to_base_path() {
        let req = RequestDescription::builder(HttpMethod::Put, "https://reqres.in/api")
            .segments(["users", "1"])
            .build()
            .unwrap();
        assert_eq!(req.url().as_str(), "https://reqres.in/api/users/1");
        assert_eq!(req.path(), ["users".to_string(), "1".to_string()]);
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let req = RequestDescription::builder(HttpMethod::Get, "https://reqres.in/api/")
            .segment("users")
            .build()
            .unwrap();
        assert_eq!(req.url().as_str(), "https://reqres.in/api/users");
    }

    #[test]
    fn query_pairs_are_encoded() {
        let req = RequestDescription::builder(HttpMethod::Get, "https://reqres.in/api")
            .segment("users")
            .query("id", 1)
            .query("q", "a b&c")
            .build()
            .unwrap();
        assert_eq!(req.url().as_str(), "https://reqres.in/api/users?id=1&q=a+b%26c");
    }

    #[test]
    fn slash_inside_segment_is_escaped() {
        let req = RequestDescription::builder(HttpMethod::Get, "http://localhost:3000")
            .segment("a/b")
            .build()
            .unwrap();
        assert_eq!(req.url().as_str(), "http://localhost:3000/a%2Fb");
    }

    #[test]
    fn malformed_base_url_fails_at_build() {
        let err = RequestDescription::builder(HttpMethod::Get, "not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl(_)));
    }

    #[test]
    fn cannot_be_a_base_url_fails_at_build() {
        let err = RequestDescription::builder(HttpMethod::Get, "mailto:someone@example.com")
            .segment("users")
            .build()
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl(_)));
    }

    #[test]
    fn json_body_defaults_content_type() {
        let req = RequestDescription::builder(HttpMethod::Post, "http://localhost")
            .json(json!({"name": "atakan"}))
            .build()
            .unwrap();
        assert_eq!(req.content_type(), Some("application/json"));

        let req = RequestDescription::builder(HttpMethod::Post, "http://localhost")
            .bytes("plain")
            .build()
            .unwrap();
        assert_eq!(req.content_type(), None);

        let req = RequestDescription::builder(HttpMethod::Post, "http://localhost")
            .json(json!({}))
            .content_type("application/merge-patch+json")
            .build()
            .unwrap();
        assert_eq!(req.content_type(), Some("application/merge-patch+json"));
    }

    #[test]
    fn method_maps_to_reqwest() {
        assert_eq!(reqwest::Method::from(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
