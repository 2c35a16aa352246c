use axum::extract::State;
use axum::response::{IntoResponse, Response};
use common::SortOrder;
use common::records::{Reply, Topic};
use common::validate::lookup;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use serde_json::Value;
use tracing::instrument;

use crate::entity::{reply, topic};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::{LenientJson, from_body};
use crate::extractors::query::AppQuery;
use crate::models::discussion::*;
use crate::models::shared::{
    IdBody, next_stamp, parse_id, parse_resource, pick_id, required_text, search_condition,
    search_term, to_order,
};
use crate::response::ApiResponse;
use crate::state::AppState;

pub(crate) const TOPIC_SORT: &[(&str, topic::Column)] = &[
    ("subject", topic::Column::Subject),
    ("author", topic::Column::Author),
    ("created_at", topic::Column::CreatedAt),
];

fn resource(query: &DiscussionQuery) -> Result<DiscussionResource, AppError> {
    parse_resource(query.resource.as_deref(), DISCUSSION_RESOURCES, None)
}

#[utoipa::path(
    get,
    path = "/api/discussion",
    tag = "Discussion",
    operation_id = "getDiscussion",
    summary = "Get or list topics, or list a topic's replies",
    description = "`resource` is required. `topics`: with `id` returns that topic, otherwise every topic filtered by `search` and ordered by `sort`/`order` (default newest first). `replies`: the replies of `topic_id`, oldest first.",
    params(DiscussionQuery),
    responses(
        (status = 200, description = "Topic, topic list or reply list in `data`", body = [Topic]),
        (status = 400, description = "Missing or invalid resource, or missing topic_id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Topic not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(resource = ?query.resource))]
pub async fn handle_get(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DiscussionQuery>,
) -> Result<Response, AppError> {
    match resource(&query)? {
        DiscussionResource::Topics => match pick_id(&[query.id.as_deref()]) {
            Some(raw) => Ok(get_topic(&state.db, raw).await?.into_response()),
            None => Ok(list_topics(&state.db, &query).await?.into_response()),
        },
        DiscussionResource::Replies => Ok(list_replies(&state.db, &query).await?.into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/discussion",
    tag = "Discussion",
    operation_id = "createDiscussion",
    summary = "Create a topic or a reply",
    description = "`resource=topics` takes a `CreateTopicRequest`; `resource=replies` takes a `CreateReplyRequest` whose topic must exist. Returns the new id.",
    params(DiscussionQuery),
    request_body = CreateTopicRequest,
    responses(
        (status = 201, description = "Created, new id in `data`", body = i32),
        (status = 400, description = "Missing fields or invalid resource (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Parent topic not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body), fields(resource = ?query.resource))]
pub async fn handle_post(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DiscussionQuery>,
    LenientJson(body): LenientJson<Value>,
) -> Result<ApiResponse<i32>, AppError> {
    match resource(&query)? {
        DiscussionResource::Topics => create_topic(&state.db, from_body(body)?).await,
        DiscussionResource::Replies => create_reply(&state.db, from_body(body)?).await,
    }
}

#[utoipa::path(
    put,
    path = "/api/discussion",
    tag = "Discussion",
    operation_id = "updateTopic",
    summary = "Update a topic's subject or message",
    description = "Only fields present in the body are changed. The id is read from the body, falling back to the query string. Replies cannot be edited.",
    params(DiscussionQuery),
    request_body = UpdateTopicRequest,
    responses(
        (status = 200, description = "Updated topic in `data`", body = Topic),
        (status = 400, description = "Missing id or no fields (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Topic not found (NOT_FOUND)", body = ErrorBody),
        (status = 405, description = "Replies cannot be updated (METHOD_NOT_ALLOWED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body), fields(resource = ?query.resource))]
pub async fn handle_put(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DiscussionQuery>,
    LenientJson(body): LenientJson<Value>,
) -> Result<ApiResponse<Topic>, AppError> {
    match resource(&query)? {
        DiscussionResource::Topics => {
            let payload: UpdateTopicRequest = from_body(body)?;
            let raw = pick_id(&[payload.id.as_deref(), query.id.as_deref()]);
            let id = parse_id(raw, "id", "Topic")?;
            update_topic(&state.db, id, payload).await
        }
        DiscussionResource::Replies => Err(AppError::MethodNotAllowed),
    }
}

#[utoipa::path(
    delete,
    path = "/api/discussion",
    tag = "Discussion",
    operation_id = "deleteDiscussion",
    summary = "Delete a topic with its replies, or a single reply",
    description = "The id is read from the query string, falling back to the JSON body. Deleting a topic removes its replies in the same transaction.",
    params(DiscussionQuery),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Missing id or invalid resource (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Topic or reply not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body), fields(resource = ?query.resource))]
pub async fn handle_delete(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DiscussionQuery>,
    LenientJson(body): LenientJson<IdBody>,
) -> Result<ApiResponse<()>, AppError> {
    let raw = pick_id(&[query.id.as_deref(), body.id.as_deref()]);
    match resource(&query)? {
        DiscussionResource::Topics => {
            let id = parse_id(raw, "id", "Topic")?;
            delete_topic(&state.db, id).await
        }
        DiscussionResource::Replies => {
            let id = parse_id(raw, "id", "Reply")?;
            delete_reply(&state.db, id).await
        }
    }
}

async fn list_topics<C: ConnectionTrait>(
    db: &C,
    query: &DiscussionQuery,
) -> Result<ApiResponse<Vec<Topic>>, AppError> {
    let mut select = topic::Entity::find();

    if let Some(term) = search_term(query.search.as_deref()) {
        select = select.filter(search_condition(
            term,
            &[
                topic::Column::Subject,
                topic::Column::Message,
                topic::Column::Author,
            ],
        ));
    }

    let sort_column = query
        .sort
        .as_deref()
        .and_then(|key| lookup(key, TOPIC_SORT))
        .unwrap_or(topic::Column::CreatedAt);
    let sort_order = SortOrder::parse_or(query.order.as_deref(), SortOrder::Desc);

    let rows = select
        .order_by(sort_column, to_order(sort_order))
        .order_by_asc(topic::Column::Id)
        .all(db)
        .await?;

    Ok(ApiResponse::ok(rows.into_iter().map(Topic::from).collect()))
}

async fn get_topic<C: ConnectionTrait>(
    db: &C,
    raw_id: &str,
) -> Result<ApiResponse<Topic>, AppError> {
    let id = parse_id(Some(raw_id), "id", "Topic")?;
    let model = find_topic(db, id).await?;
    Ok(ApiResponse::ok(model.into()))
}

async fn create_topic<C: ConnectionTrait>(
    db: &C,
    payload: CreateTopicRequest,
) -> Result<ApiResponse<i32>, AppError> {
    let subject = required_text(payload.subject.as_deref(), "Missing required fields")?;
    let message = required_text(payload.message.as_deref(), "Missing required fields")?;
    let author = required_text(payload.author.as_deref(), "Missing required fields")?;

    let now = chrono::Utc::now();
    let new_topic = topic::ActiveModel {
        subject: Set(subject),
        message: Set(message),
        author: Set(author),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_topic.insert(db).await?;

    Ok(ApiResponse::created(model.id))
}

async fn update_topic(
    db: &DatabaseConnection,
    id: i32,
    payload: UpdateTopicRequest,
) -> Result<ApiResponse<Topic>, AppError> {
    let txn = db.begin().await?;

    let existing = find_topic_for_update(&txn, id).await?;

    if payload.subject.is_none() && payload.message.is_none() {
        return Err(AppError::Validation("No fields to update".into()));
    }

    let previous = existing.updated_at;
    let mut active: topic::ActiveModel = existing.into();

    if let Some(ref subject) = payload.subject {
        active.subject = Set(required_text(Some(subject), "Subject must not be empty")?);
    }
    if let Some(ref message) = payload.message {
        active.message = Set(required_text(Some(message), "Message must not be empty")?);
    }
    active.updated_at = Set(next_stamp(previous));

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok(model.into()))
}

async fn delete_topic(db: &DatabaseConnection, id: i32) -> Result<ApiResponse<()>, AppError> {
    let txn = db.begin().await?;

    find_topic_for_update(&txn, id).await?;

    let removed = reply::Entity::delete_many()
        .filter(reply::Column::TopicId.eq(id))
        .exec(&txn)
        .await?;

    let result = topic::Entity::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::Internal(format!(
            "Delete of topic {id} affected no rows"
        )));
    }

    txn.commit().await?;

    tracing::debug!(replies = removed.rows_affected, "Topic deleted");
    Ok(ApiResponse::done("Topic and its replies were successfully deleted"))
}

async fn list_replies<C: ConnectionTrait>(
    db: &C,
    query: &DiscussionQuery,
) -> Result<ApiResponse<Vec<Reply>>, AppError> {
    let Some(raw) = pick_id(&[query.topic_id.as_deref()]) else {
        return Err(AppError::Validation("topic_id parameter is missing".into()));
    };
    let Ok(topic_id) = raw.trim().parse::<i32>() else {
        return Ok(ApiResponse::ok(Vec::new()));
    };

    let rows = reply::Entity::find()
        .filter(reply::Column::TopicId.eq(topic_id))
        .order_by_asc(reply::Column::CreatedAt)
        .order_by_asc(reply::Column::Id)
        .all(db)
        .await?;

    Ok(ApiResponse::ok(rows.into_iter().map(Reply::from).collect()))
}

async fn create_reply(
    db: &DatabaseConnection,
    payload: CreateReplyRequest,
) -> Result<ApiResponse<i32>, AppError> {
    let raw = pick_id(&[payload.topic_id.as_deref()]);
    let text = required_text(payload.text.as_deref(), "Missing required fields")?;
    let author = required_text(payload.author.as_deref(), "Missing required fields")?;
    if raw.is_none() {
        return Err(AppError::Validation("Missing required fields".into()));
    }
    let topic_id = parse_id(raw, "topic_id", "Topic")?;

    let txn = db.begin().await?;

    topic::Entity::find_by_id(topic_id)
        .lock(LockType::Share)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Topic not found".into()))?;

    let new_reply = reply::ActiveModel {
        topic_id: Set(topic_id),
        text: Set(text),
        author: Set(author),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_reply.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::NotFound("Topic not found".into())
        }
        _ => AppError::from(e),
    })?;
    txn.commit().await?;

    Ok(ApiResponse::created(model.id))
}

async fn delete_reply(db: &DatabaseConnection, id: i32) -> Result<ApiResponse<()>, AppError> {
    let result = reply::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Reply not found".into()));
    }
    Ok(ApiResponse::done("Reply deleted"))
}

async fn find_topic<C: ConnectionTrait>(db: &C, id: i32) -> Result<topic::Model, AppError> {
    topic::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Topic not found".into()))
}

async fn find_topic_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<topic::Model, AppError> {
    topic::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Topic not found".into()))
}
