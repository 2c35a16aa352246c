use reqwest::Method;
use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn options_is_answered_on_every_area() {
    let app = TestApp::spawn().await;

    for path in [routes::STUDENTS, routes::ASSIGNMENTS, routes::WEEKLY, "/api/discussion"] {
        let res = app.send_raw(Method::OPTIONS, path, "").await;
        assert_eq!(res.status, 200, "OPTIONS {path}");
    }
}

#[tokio::test]
async fn unsupported_method_is_405_envelope() {
    let app = TestApp::spawn().await;

    let res = app.send_raw(Method::PATCH, routes::ASSIGNMENTS, "{}").await;
    assert_eq!(res.status, 405);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.code(), "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn unknown_resource_is_400() {
    let app = TestApp::spawn().await;

    let res = app.get("/api/assignments?resource=grades").await;
    assert_eq!(res.status, 400);
    assert_eq!(res.error(), "Invalid resource. Use 'assignments' or 'comments'");

    let res = app
        .post("/api/weekly?resource=quizzes", &json!({"title": "x"}))
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn unknown_path_is_404_envelope() {
    let app = TestApp::spawn().await;

    let res = app.get("/api/grades").await;
    assert_eq!(res.status, 404);
    assert_eq!(res.code(), "NOT_FOUND");
}

#[tokio::test]
async fn responses_allow_any_origin_and_carry_request_id() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .get(format!("http://{}{}", app.addr, routes::STUDENTS))
        .header("Origin", "http://course.example.edu")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::spawn().await;

    let res = app.get("/api-docs/openapi.json").await;
    assert_eq!(res.status, 200);
    assert!(res.body["paths"]["/api/students"].is_object());
    assert!(res.body["paths"]["/api/discussion"]["delete"].is_object());
}
