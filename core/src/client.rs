//! Request builders and response parsers for the reqres users API.
//!
//! # Design
//! `UsersClient` holds only a `base_url` and carries no state between calls.
//! Each operation is split into a `build_*` method that produces a
//! `RequestDescription` and a `parse_*` method that consumes a
//! `ResponseResult`. The `RequestRunner` sits in between, so the mapping
//! from API shape to typed values can be tested without a network.

use serde_json::Value;
use url::Url;

use crate::error::{ApiError, HttpError};
use crate::extract::{extract, extract_i64, extract_str};
use crate::http::{HttpMethod, RequestDescription, RequestDescriptionBuilder, ResponseFormat, ResponseResult};
use crate::types::{CreatedUser, NewUser, UpdatedUser, User, UserPatch, UserUpdate};

const USERS: &str = "users";

/// Stateless client for the `/users` resource.
#[derive(Debug, Clone)]
pub struct UsersClient {
    base_url: Url,
}

impl UsersClient {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /users`, kept as raw bytes for writing to a file.
    pub fn build_list_users(&self) -> Result<RequestDescription, HttpError> {
        self.request(HttpMethod::Get)
            .segment(USERS)
            .response_format(ResponseFormat::Raw)
            .expect_status(200)
            .build()
    }

    pub fn build_get_user(&self, id: u64) -> Result<RequestDescription, HttpError> {
        self.request(HttpMethod::Get)
            .segment(USERS)
            .query("id", id)
            .expect_status(200)
            .build()
    }

    pub fn build_create_user(&self, input: &NewUser) -> Result<RequestDescription, HttpError> {
        self.request(HttpMethod::Post)
            .segment(USERS)
            .json(serde_json::to_value(input).map_err(HttpError::Serialize)?)
            .expect_status(201)
            .build()
    }

    pub fn build_update_user(&self, id: u64, input: &UserUpdate) -> Result<RequestDescription, HttpError> {
        self.request(HttpMethod::Put)
            .segments([USERS.to_string(), id.to_string()])
            .json(serde_json::to_value(input).map_err(HttpError::Serialize)?)
            .expect_status(200)
            .build()
    }

    pub fn build_patch_user(&self, id: u64, input: &UserPatch) -> Result<RequestDescription, HttpError> {
        self.request(HttpMethod::Patch)
            .segments([USERS.to_string(), id.to_string()])
            .json(serde_json::to_value(input).map_err(HttpError::Serialize)?)
            .expect_status(200)
            .build()
    }

    /// No status expectation: the outcome is reported by
    /// [`parse_delete_user`](Self::parse_delete_user).
    pub fn build_delete_user(&self, id: u64) -> Result<RequestDescription, HttpError> {
        self.request(HttpMethod::Delete)
            .segments([USERS.to_string(), id.to_string()])
            .build()
    }

    pub fn parse_get_user(&self, response: &ResponseResult) -> Result<User, ApiError> {
        let body = json_body(response)?;
        let data = extract(body, &["data"])?;
        Ok(User {
            id: extract_i64(data, &["id"])?,
            first_name: extract_str(data, &["first_name"])?.to_string(),
            last_name: extract_str(data, &["last_name"])?.to_string(),
        })
    }

    pub fn parse_create_user(&self, response: &ResponseResult) -> Result<CreatedUser, ApiError> {
        let body = json_body(response)?;
        Ok(CreatedUser {
            id: extract_str(body, &["id"])?.to_string(),
            first_name: extract_str(body, &["first_name"])?.to_string(),
            last_name: extract_str(body, &["last_name"])?.to_string(),
        })
    }

    pub fn parse_update_user(&self, response: &ResponseResult) -> Result<UpdatedUser, ApiError> {
        let body = json_body(response)?;
        Ok(UpdatedUser {
            name: extract_str(body, &["name"])?.to_string(),
            location: extract_str(body, &["location"])?.to_string(),
        })
    }

    /// The patch echo is returned whole.
    pub fn parse_patch_user(&self, response: &ResponseResult) -> Result<Value, ApiError> {
        json_body(response).cloned()
    }

    pub fn parse_delete_user(&self, response: &ResponseResult) -> bool {
        response.status == 204
    }

    fn request(&self, method: HttpMethod) -> RequestDescriptionBuilder {
        RequestDescription::builder(method, self.base_url.as_str())
    }
}

fn json_body(response: &ResponseResult) -> Result<&Value, ApiError> {
    response.json().ok_or(ApiError::MissingBody {
        status: response.status,
    })
}
