use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, SingleUser, UserPage, PER_PAGE};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- list ---

#[tokio::test]
async fn list_users_first_page() {
    let resp = app().oneshot(get("/api/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: UserPage = body_json(resp).await;
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, PER_PAGE);
    assert_eq!(page.total, 12);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data.len(), 6);
    assert_eq!(page.data[0].id, 1);
}

#[tokio::test]
async fn list_users_second_page() {
    let resp = app().oneshot(get("/api/users?page=2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: UserPage = body_json(resp).await;
    assert_eq!(page.page, 2);
    assert_eq!(page.data.first().map(|u| u.id), Some(7));
    assert_eq!(page.data.last().map(|u| u.id), Some(12));
}

#[tokio::test]
async fn list_users_past_the_end_is_empty() {
    let resp = app().oneshot(get("/api/users?page=9")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: UserPage = body_json(resp).await;
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn list_users_is_stable() {
    let app = app();
    let first = body_bytes(app.clone().oneshot(get("/api/users")).await.unwrap()).await;
    let second = body_bytes(app.oneshot(get("/api/users")).await.unwrap()).await;
    assert_eq!(first, second);
}

// --- get ---

#[tokio::test]
async fn get_user_by_query() {
    let resp = app().oneshot(get("/api/users?id=1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: SingleUser = body_json(resp).await;
    assert_eq!(user.data.id, 1);
    assert_eq!(user.data.first_name, "George");
    assert_eq!(user.data.last_name, "Bluth");
}

#[tokio::test]
async fn get_user_by_path() {
    let resp = app().oneshot(get("/api/users/2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: SingleUser = body_json(resp).await;
    assert_eq!(user.data.first_name, "Janet");
}

#[tokio::test]
async fn get_user_not_found_returns_empty_object() {
    let resp = app().oneshot(get("/api/users/23")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({}));

    let resp = app().oneshot(get("/api/users?id=23")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_user_bad_id_returns_400() {
    let resp = app().oneshot(get("/api/users/not-a-number")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- create ---

#[tokio::test]
async fn create_user_returns_201_with_string_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/users",
            r#"{"first_name":"atakan","last_name":"sarioglu"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["first_name"], "atakan");
    assert_eq!(body["last_name"], "sarioglu");
    assert!(body["id"].is_string());
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn create_user_ids_increase() {
    use tower::Service;

    let mut app = app().into_service();
    let mut ids = Vec::new();
    for _ in 0..2 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/api/users", r#"{"first_name":"a"}"#))
            .await
            .unwrap();
        let body: Value = body_json(resp).await;
        ids.push(body["id"].as_str().unwrap().parse::<u64>().unwrap());
    }
    assert!(ids[1] > ids[0]);
}

#[tokio::test]
async fn create_user_rejects_non_object() {
    let resp = app()
        .oneshot(json_request("POST", "/api/users", "[1,2,3]"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- update ---

#[tokio::test]
async fn put_echoes_body_with_timestamp() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/api/users/1",
            r#"{"name":"atakan","location":"istanbul"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["name"], "atakan");
    assert_eq!(body["location"], "istanbul");
    assert!(body["updatedAt"].is_string());
}

#[tokio::test]
async fn patch_echoes_partial_body() {
    let resp = app()
        .oneshot(json_request("PATCH", "/api/users/1", r#"{"name":"sarioglu"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["name"], "sarioglu");
    assert!(body.get("location").is_none());
}

// --- delete ---

#[tokio::test]
async fn delete_is_acknowledged_but_not_persisted() {
    use tower::Service;

    let mut app = app().into_service();
    let delete = Request::builder()
        .method("DELETE")
        .uri("/api/users/1")
        .body(String::new())
        .unwrap();

    let resp = ServiceExt::ready(&mut app).await.unwrap().call(delete).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/users/1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_unknown_user_returns_404() {
    let delete = Request::builder()
        .method("DELETE")
        .uri("/api/users/999")
        .body(String::new())
        .unwrap();

    let resp = app().oneshot(delete).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({}));
}
