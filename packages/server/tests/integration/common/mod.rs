use std::net::SocketAddr;

use reqwest::{Client, Method};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{Value, json};

use server::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig};
use server::state::AppState;

const TEST_DB_URL: &str = "sqlite::memory:";

pub mod routes {
    pub const STUDENTS: &str = "/api/students";
    pub const ASSIGNMENTS: &str = "/api/assignments";
    pub const ASSIGNMENT_COMMENTS: &str = "/api/assignments?resource=comments";
    pub const WEEKLY: &str = "/api/weekly";
    pub const WEEK_COMMENTS: &str = "/api/weekly?resource=comments";
    pub const TOPICS: &str = "/api/discussion?resource=topics";
    pub const REPLIES: &str = "/api/discussion?resource=replies";
    pub const CHANGE_PASSWORD: &str = "/api/students?action=change_password";

    pub fn student(id: i32) -> String {
        format!("/api/students?id={id}")
    }

    pub fn assignment(id: i32) -> String {
        format!("/api/assignments?id={id}")
    }

    pub fn assignment_comments(assignment_id: i32) -> String {
        format!("/api/assignments?resource=comments&assignment_id={assignment_id}")
    }

    pub fn assignment_comment(id: i32) -> String {
        format!("/api/assignments?resource=comments&id={id}")
    }

    pub fn week(id: i32) -> String {
        format!("/api/weekly?id={id}")
    }

    pub fn week_comments(week_id: i32) -> String {
        format!("/api/weekly?resource=comments&week_id={week_id}")
    }

    pub fn week_comment(id: i32) -> String {
        format!("/api/weekly?resource=comments&id={id}")
    }

    pub fn topic(id: i32) -> String {
        format!("/api/discussion?resource=topics&id={id}")
    }

    pub fn replies(topic_id: i32) -> String {
        format!("/api/discussion?resource=replies&topic_id={topic_id}")
    }

    pub fn reply(id: i32) -> String {
        format!("/api/discussion?resource=replies&id={id}")
    }
}

/// A running test server backed by its own in-memory SQLite database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        // Each in-memory SQLite connection is its own database, so the pool
        // must hold exactly one connection for the lifetime of the test.
        let mut opts = ConnectOptions::new(TEST_DB_URL);
        opts.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(opts)
            .await
            .expect("Failed to open in-memory database");
        server::database::sync_schema(&db)
            .await
            .expect("Failed to create schema");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: TEST_DB_URL.to_string(),
                max_connections: 1,
            },
        };

        let state = AppState {
            db: db.clone(),
            config: app_config,
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_body(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Send an arbitrary method with a raw (possibly invalid) body.
    pub async fn send_raw(&self, method: Method, path: &str, body: &str) -> TestResponse {
        let res = self
            .client
            .request(method, self.url(path))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to send request");

        TestResponse::from_response(res).await
    }

    /// Create a student via the API and return its `id`.
    pub async fn create_student(&self, name: &str, email: &str) -> i32 {
        let res = self
            .post(
                routes::STUDENTS,
                &json!({"name": name, "email": email, "password": "password123"}),
            )
            .await;
        assert_eq!(res.status, 201, "create_student failed: {}", res.text);
        res.id()
    }

    /// Create an assignment via the API and return its `id`.
    pub async fn create_assignment(&self, title: &str, due_date: &str) -> i32 {
        let res = self
            .post(
                routes::ASSIGNMENTS,
                &json!({
                    "title": title,
                    "description": format!("{title} description"),
                    "due_date": due_date,
                }),
            )
            .await;
        assert_eq!(res.status, 201, "create_assignment failed: {}", res.text);
        res.id()
    }

    /// Add a comment to an assignment and return its `id`.
    pub async fn create_assignment_comment(&self, assignment_id: i32, text: &str) -> i32 {
        let res = self
            .post(
                routes::ASSIGNMENT_COMMENTS,
                &json!({"assignment_id": assignment_id, "author": "Grace", "text": text}),
            )
            .await;
        assert_eq!(res.status, 201, "create_assignment_comment failed: {}", res.text);
        res.id()
    }

    /// Create a week via the API and return its `id`.
    pub async fn create_week(&self, title: &str, start_date: &str) -> i32 {
        let res = self
            .post(
                routes::WEEKLY,
                &json!({
                    "title": title,
                    "start_date": start_date,
                    "description": format!("{title} notes"),
                }),
            )
            .await;
        assert_eq!(res.status, 201, "create_week failed: {}", res.text);
        res.id()
    }

    /// Add a comment to a week and return its `id`.
    pub async fn create_week_comment(&self, week_id: i32, text: &str) -> i32 {
        let res = self
            .post(
                routes::WEEK_COMMENTS,
                &json!({"week_id": week_id, "author": "Grace", "text": text}),
            )
            .await;
        assert_eq!(res.status, 201, "create_week_comment failed: {}", res.text);
        res.id()
    }

    /// Create a topic via the API and return its `id`.
    pub async fn create_topic(&self, subject: &str, author: &str) -> i32 {
        let res = self
            .post(
                routes::TOPICS,
                &json!({
                    "subject": subject,
                    "message": format!("{subject} body"),
                    "author": author,
                }),
            )
            .await;
        assert_eq!(res.status, 201, "create_topic failed: {}", res.text);
        res.id()
    }

    /// Reply to a topic and return the reply `id`.
    pub async fn create_reply(&self, topic_id: i32, text: &str) -> i32 {
        let res = self
            .post(
                routes::REPLIES,
                &json!({"topic_id": topic_id, "author": "Alan", "text": text}),
            )
            .await;
        assert_eq!(res.status, 201, "create_reply failed: {}", res.text);
        res.id()
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    /// The numeric id returned in `data` by a create.
    pub fn id(&self) -> i32 {
        self.body["data"]
            .as_i64()
            .expect("response body should contain a numeric 'data'") as i32
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `data` array, in order.
    pub fn items(&self) -> &Vec<Value> {
        self.body["data"]
            .as_array()
            .expect("response 'data' should be an array")
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}

/// The values of `field` across a list response, in order.
pub fn column<'a>(items: &'a [Value], field: &str) -> Vec<&'a str> {
    items
        .iter()
        .map(|item| item[field].as_str().unwrap_or_default())
        .collect()
}
