//! HTTP-JSON request helper and reqres users client.
//!
//! # Overview
//! `RequestRunner` sends one `RequestDescription`, checks the status against
//! the declared expectation and hands back a `ResponseResult` holding parsed
//! JSON or raw bytes. Downloads stream into any `AsyncWrite` sink. Fields are
//! read out of JSON bodies with the typed `extract*` helpers.
//!
//! # Design
//! - `RequestDescription` is immutable and resolves its URL when built, so a
//!   malformed base URL fails before any I/O.
//! - `UsersClient` is stateless and splits each operation into `build_*` and
//!   `parse_*`; the runner does the I/O in between.
//! - `run_scenario` drives all six users operations concurrently and reports
//!   each outcome separately.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod runner;
pub mod scenario;
pub mod types;

pub use client::UsersClient;
pub use config::Config;
pub use error::{ApiError, ConfigError, ExtractionError, HttpError, JsonKind};
pub use extract::{extract, extract_array, extract_bool, extract_f64, extract_i64, extract_object, extract_str, extract_u64};
pub use http::{
    Download, HttpMethod, RequestBody, RequestDescription, RequestDescriptionBuilder, ResponseBody, ResponseFormat,
    ResponseResult,
};
pub use runner::{RequestRunner, RequestRunnerBuilder};
pub use scenario::{run_scenario, Operation, OperationReport, ScenarioOptions};
pub use tokio_util::sync::CancellationToken;
pub use types::{CreatedUser, NewUser, UpdatedUser, User, UserPatch, UserUpdate};
