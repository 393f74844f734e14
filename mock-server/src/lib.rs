use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const PER_PAGE: usize = 6;
const SUPPORT_URL: &str = "https://reqres.in/#support-heading";
const SUPPORT_TEXT: &str = "To keep ReqRes free, contributions towards server costs are appreciated!";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
}

impl User {
    fn seeded(id: u64, first_name: &str, last_name: &str) -> Self {
        Self {
            id,
            email: format!("{}.{}@reqres.in", first_name.to_lowercase(), last_name.to_lowercase()),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            avatar: format!("https://reqres.in/img/faces/{id}-image.jpg"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Support {
    pub url: String,
    pub text: String,
}

impl Default for Support {
    fn default() -> Self {
        Self {
            url: SUPPORT_URL.to_string(),
            text: SUPPORT_TEXT.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SingleUser {
    pub data: User,
    pub support: Support,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserPage {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub data: Vec<User>,
    pub support: Support,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub id: Option<u64>,
}

#[derive(Debug)]
pub struct Directory {
    users: BTreeMap<u64, User>,
    next_id: u64,
}

impl Directory {
    /// The twelve demo users served by reqres.in.
    pub fn seeded() -> Self {
        let users: BTreeMap<u64, User> = [
            "George Bluth",
            "Janet Weaver",
            "Emma Wong",
            "Eve Holt",
            "Charles Morris",
            "Tracey Ramos",
            "Michael Lawson",
            "Lindsay Ferguson",
            "Tobias Funke",
            "Byron Fields",
            "George Edwards",
            "Rachel Howell",
        ]
        .iter()
        .zip(1u64..)
        .map(|(name, id)| {
            let (first, last) = name.split_once(' ').unwrap_or((*name, ""));
            (id, User::seeded(id, first, last))
        })
        .collect();
        Self { users, next_id: 100 }
    }
}

pub type Db = Arc<RwLock<Directory>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Directory::seeded()));
    let users: Router<Db> = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(replace_user).patch(replace_user).delete(delete_user),
        );
    Router::new().nest("/api", users).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({})))
}

fn single(user: &User) -> Json<SingleUser> {
    Json(SingleUser {
        data: user.clone(),
        support: Support::default(),
    })
}

async fn list_users(State(db): State<Db>, Query(params): Query<ListParams>) -> Response {
    let directory = db.read().await;

    if let Some(id) = params.id {
        return match directory.users.get(&id) {
            Some(user) => single(user).into_response(),
            None => not_found().into_response(),
        };
    }

    let page = params.page.unwrap_or(1).max(1);
    let total = directory.users.len();
    let data = directory
        .users
        .values()
        .skip((page - 1).saturating_mul(PER_PAGE))
        .take(PER_PAGE)
        .cloned()
        .collect();
    Json(UserPage {
        page,
        per_page: PER_PAGE,
        total,
        total_pages: total.div_ceil(PER_PAGE),
        data,
        support: Support::default(),
    })
    .into_response()
}

async fn get_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<SingleUser>, (StatusCode, Json<Value>)> {
    let directory = db.read().await;
    directory.users.get(&id).map(single).ok_or_else(not_found)
}

async fn create_user(
    State(db): State<Db>,
    Json(mut input): Json<Map<String, Value>>,
) -> (StatusCode, Json<Map<String, Value>>) {
    let id = {
        let mut directory = db.write().await;
        directory.next_id += 1;
        directory.next_id
    };
    input.insert("id".to_string(), Value::String(id.to_string()));
    input.insert("createdAt".to_string(), Value::String(timestamp()));
    tracing::debug!(id, "created user");
    (StatusCode::CREATED, Json(input))
}

/// Shared by PUT and PATCH: the payload is echoed back with a timestamp.
async fn replace_user(
    Path(_id): Path<u64>,
    Json(mut input): Json<Map<String, Value>>,
) -> Json<Map<String, Value>> {
    input.insert("updatedAt".to_string(), Value::String(timestamp()));
    Json(input)
}

/// Known users are acknowledged with 204 but never removed, so a concurrent
/// GET of the same id still succeeds.
async fn delete_user(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let directory = db.read().await;
    if directory.users.contains_key(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found().into_response()
    }
}
