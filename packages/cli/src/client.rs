use common::Envelope;
use common::SortOrder;
use common::records::{Assignment, AssignmentComment, Reply, Student, Topic, Week, WeekComment};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::resource::{Child, Collection, Endpoint};
use crate::store::Rows;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {status}: {message}")]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("server reported failure: {0}")]
    Api(String),
}

/// Optional list filters, forwarded as `search`, `sort` and `order`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl ListQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.to_string()));
        }
        pairs
    }
}

/// Typed async client for every area of the server.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(
        &self,
        method: reqwest::Method,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> RequestBuilder {
        let mut query: Vec<(&str, String)> = Vec::with_capacity(params.len() + 1);
        if let Some(resource) = endpoint.resource {
            query.push(("resource", resource.to_string()));
        }
        query.extend(params.iter().cloned());
        self.http
            .request(method, format!("{}{}", self.base_url, endpoint.path))
            .query(&query)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, ClientError> {
        let res = builder.send().await?;
        let status = res.status();
        let text = res.text().await?;
        decode_envelope(status, &text)
    }

    async fn data<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        self.send::<T>(builder)
            .await?
            .data
            .ok_or_else(|| ClientError::Decode("envelope has no data".into()))
    }

    async fn message(&self, builder: RequestBuilder) -> Result<String, ClientError> {
        let envelope = self.send::<Value>(builder).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<T>, ClientError> {
        let builder = self.request(reqwest::Method::GET, collection.endpoint(), &query.pairs());
        self.data(builder).await
    }

    /// Fetch a whole collection into the matching [`Rows`] variant.
    pub async fn fetch(&self, collection: Collection, query: &ListQuery) -> Result<Rows, ClientError> {
        Ok(match collection {
            Collection::Students => Rows::Students(self.list::<Student>(collection, query).await?),
            Collection::Assignments => {
                Rows::Assignments(self.list::<Assignment>(collection, query).await?)
            }
            Collection::Weeks => Rows::Weeks(self.list::<Week>(collection, query).await?),
            Collection::Topics => Rows::Topics(self.list::<Topic>(collection, query).await?),
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: i32,
    ) -> Result<T, ClientError> {
        let builder = self.request(
            reqwest::Method::GET,
            collection.endpoint(),
            &[("id", id.to_string())],
        );
        self.data(builder).await
    }

    /// Create a record and return its id.
    pub async fn create(&self, collection: Collection, body: &Value) -> Result<i32, ClientError> {
        let builder = self
            .request(reqwest::Method::POST, collection.endpoint(), &[])
            .json(body);
        self.data(builder).await
    }

    /// Send the given fields as a partial update and return the stored record.
    pub async fn update<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: i32,
        fields: Value,
    ) -> Result<T, ClientError> {
        let mut body = match fields {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        body.insert("id".into(), json!(id));
        let builder = self
            .request(reqwest::Method::PUT, collection.endpoint(), &[])
            .json(&body);
        self.data(builder).await
    }

    pub async fn delete(&self, endpoint: Endpoint, id: i32) -> Result<String, ClientError> {
        let builder = self.request(reqwest::Method::DELETE, endpoint, &[("id", id.to_string())]);
        self.message(builder).await
    }

    pub async fn list_children<T: DeserializeOwned>(
        &self,
        child: Child,
        parent_id: i32,
    ) -> Result<Vec<T>, ClientError> {
        let builder = self.request(
            reqwest::Method::GET,
            child.endpoint(),
            &[(child.parent_key(), parent_id.to_string())],
        );
        self.data(builder).await
    }

    pub async fn add_child(
        &self,
        child: Child,
        parent_id: i32,
        author: &str,
        text: &str,
    ) -> Result<i32, ClientError> {
        let mut body = serde_json::Map::new();
        body.insert(child.parent_key().into(), json!(parent_id));
        body.insert("author".into(), json!(author));
        body.insert("text".into(), json!(text));
        let builder = self
            .request(reqwest::Method::POST, child.endpoint(), &[])
            .json(&body);
        self.data(builder).await
    }

    pub async fn assignment_comments(
        &self,
        assignment_id: i32,
    ) -> Result<Vec<AssignmentComment>, ClientError> {
        self.list_children(Child::AssignmentComments, assignment_id).await
    }

    pub async fn week_comments(&self, week_id: i32) -> Result<Vec<WeekComment>, ClientError> {
        self.list_children(Child::WeekComments, week_id).await
    }

    pub async fn replies(&self, topic_id: i32) -> Result<Vec<Reply>, ClientError> {
        self.list_children(Child::Replies, topic_id).await
    }

    pub async fn change_password(
        &self,
        id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<String, ClientError> {
        let builder = self
            .request(
                reqwest::Method::POST,
                Collection::Students.endpoint(),
                &[("action", "change_password".to_string())],
            )
            .json(&json!({
                "id": id,
                "current_password": current_password,
                "new_password": new_password,
            }));
        self.message(builder).await
    }
}

/// Turn a raw HTTP answer into an envelope, or the matching error.
fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    text: &str,
) -> Result<Envelope<T>, ClientError> {
    let envelope: Envelope<T> = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(ClientError::Decode(e.to_string())),
        Err(_) => {
            return Err(ClientError::Status {
                status,
                code: None,
                message: text.trim().to_string(),
            });
        }
    };

    if !status.is_success() {
        return Err(ClientError::Status {
            status,
            message: envelope.error_text().unwrap_or("no error message").to_string(),
            code: envelope.code,
        });
    }
    if !envelope.success {
        return Err(ClientError::Api(
            envelope.error_text().unwrap_or("no error message").to_string(),
        ));
    }
    Ok(envelope)
}
