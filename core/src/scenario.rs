//! The six-call walkthrough against the users API.
//!
//! All operations are started together and joined at the end. Each one owns
//! its own chain of build, execute and parse, so a failure in one never
//! cancels or alters the others.

use std::fmt;
use std::path::PathBuf;

use crate::client::UsersClient;
use crate::config::{Config, DEFAULT_OUTPUT, DEFAULT_USER_ID};
use crate::error::ApiError;
use crate::runner::RequestRunner;
use crate::types::{NewUser, UserPatch, UserUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListUsers,
    GetUser,
    CreateUser,
    UpdateUser,
    PatchUser,
    DeleteUser,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ListUsers => "list users",
            Operation::GetUser => "get user",
            Operation::CreateUser => "create user",
            Operation::UpdateUser => "update user",
            Operation::PatchUser => "patch user",
            Operation::DeleteUser => "delete user",
        };
        f.write_str(name)
    }
}

/// Inputs for one scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    pub output: PathBuf,
    pub user_id: u64,
    pub new_user: NewUser,
    pub update: UserUpdate,
    pub patch: UserPatch,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            user_id: DEFAULT_USER_ID,
            new_user: NewUser {
                first_name: "atakan".to_string(),
                last_name: "sarioglu".to_string(),
            },
            update: UserUpdate {
                name: "atakan".to_string(),
                location: "istanbul".to_string(),
            },
            patch: UserPatch {
                name: Some("sarioglu".to_string()),
                location: None,
            },
        }
    }
}

impl From<&Config> for ScenarioOptions {
    fn from(config: &Config) -> Self {
        Self {
            output: config.output.clone(),
            user_id: config.user_id,
            ..Self::default()
        }
    }
}

/// What one operation printed, or why it failed.
#[derive(Debug)]
pub struct OperationReport {
    pub operation: Operation,
    pub outcome: Result<String, ApiError>,
}

impl OperationReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Runs every operation concurrently and returns one report per operation,
/// in [`Operation`] declaration order.
pub async fn run_scenario(
    runner: &RequestRunner,
    client: &UsersClient,
    options: &ScenarioOptions,
) -> Vec<OperationReport> {
    let (list, get, create, update, patch, delete) = tokio::join!(
        list_users(runner, client, options),
        get_user(runner, client, options),
        create_user(runner, client, options),
        update_user(runner, client, options),
        patch_user(runner, client, options),
        delete_user(runner, client, options),
    );

    [
        (Operation::ListUsers, list),
        (Operation::GetUser, get),
        (Operation::CreateUser, create),
        (Operation::UpdateUser, update),
        (Operation::PatchUser, patch),
        (Operation::DeleteUser, delete),
    ]
    .into_iter()
    .map(|(operation, outcome)| {
        if let Err(err) = &outcome {
            tracing::warn!(%operation, error = %err, "operation failed");
        }
        OperationReport { operation, outcome }
    })
    .collect()
}

async fn list_users(
    runner: &RequestRunner,
    client: &UsersClient,
    options: &ScenarioOptions,
) -> Result<String, ApiError> {
    let request = client.build_list_users()?;
    let download = runner.download_to_file(&request, &options.output).await?;
    Ok(format!(
        "wrote {} bytes to {}",
        download.bytes_written,
        options.output.display()
    ))
}

async fn get_user(
    runner: &RequestRunner,
    client: &UsersClient,
    options: &ScenarioOptions,
) -> Result<String, ApiError> {
    let request = client.build_get_user(options.user_id)?;
    let response = runner.execute(&request).await?;
    let user = client.parse_get_user(&response)?;
    Ok(format!("{} {} ({})", user.first_name, user.last_name, user.id))
}

async fn create_user(
    runner: &RequestRunner,
    client: &UsersClient,
    options: &ScenarioOptions,
) -> Result<String, ApiError> {
    let request = client.build_create_user(&options.new_user)?;
    let response = runner.execute(&request).await?;
    let user = client.parse_create_user(&response)?;
    Ok(format!("{} {} ({})", user.first_name, user.last_name, user.id))
}

async fn update_user(
    runner: &RequestRunner,
    client: &UsersClient,
    options: &ScenarioOptions,
) -> Result<String, ApiError> {
    let request = client.build_update_user(options.user_id, &options.update)?;
    let response = runner.execute(&request).await?;
    let user = client.parse_update_user(&response)?;
    Ok(format!("{} {}", user.name, user.location))
}

async fn patch_user(
    runner: &RequestRunner,
    client: &UsersClient,
    options: &ScenarioOptions,
) -> Result<String, ApiError> {
    let request = client.build_patch_user(options.user_id, &options.patch)?;
    let response = runner.execute(&request).await?;
    Ok(client.parse_patch_user(&response)?.to_string())
}

async fn delete_user(
    runner: &RequestRunner,
    client: &UsersClient,
    options: &ScenarioOptions,
) -> Result<String, ApiError> {
    let request = client.build_delete_user(options.user_id)?;
    let response = runner.execute(&request).await?;
    Ok(format!("Deleted: {}", client.parse_delete_user(&response)))
}
