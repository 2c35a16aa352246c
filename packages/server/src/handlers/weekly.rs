use axum::extract::State;
use axum::response::{IntoResponse, Response};
use common::SortOrder;
use common::codec::encode_list;
use common::records::{Week, WeekComment};
use common::validate::lookup;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use serde_json::Value;
use tracing::instrument;

use crate::entity::{week, week_comment};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::{LenientJson, from_body};
use crate::extractors::query::AppQuery;
use crate::models::weekly::*;
use crate::models::shared::{
    IdBody, next_stamp, parse_id, parse_resource, pick_id, required_date, required_text,
    search_condition, search_term, to_order,
};
use crate::response::ApiResponse;
use crate::state::AppState;

pub(crate) const WEEK_SORT: &[(&str, week::Column)] = &[
    ("title", week::Column::Title),
    ("start_date", week::Column::StartDate),
    ("created_at", week::Column::CreatedAt),
];

fn resource(query: &WeeklyQuery) -> Result<WeeklyResource, AppError> {
    parse_resource(
        query.resource.as_deref(),
        WEEKLY_RESOURCES,
        Some(WeeklyResource::Weeks),
    )
}

#[utoipa::path(
    get,
    path = "/api/weekly",
    tag = "Weekly",
    operation_id = "getWeeks",
    summary = "Get or list weeks, or list a week's comments",
    description = "`resource=weeks` (default): with `id` returns that week, otherwise the full list filtered by `search` and ordered by `sort`/`order` (default `start_date` asc). `resource=comments`: the comments of `week_id`, oldest first.",
    params(WeeklyQuery),
    responses(
        (status = 200, description = "Week, week list or comment list in `data`", body = [Week]),
        (status = 400, description = "Invalid resource or missing week_id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Week not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(resource = ?query.resource))]
pub async fn handle_get(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<WeeklyQuery>,
) -> Result<Response, AppError> {
    match resource(&query)? {
        WeeklyResource::Weeks => match pick_id(&[query.id.as_deref()]) {
            Some(raw) => Ok(get_week(&state.db, raw).await?.into_response()),
            None => Ok(list_weeks(&state.db, &query).await?.into_response()),
        },
        WeeklyResource::Comments => Ok(list_comments(&state.db, &query).await?.into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/weekly",
    tag = "Weekly",
    operation_id = "createWeek",
    summary = "Create an week or a comment",
    description = "`resource=weeks` takes a `CreateWeekRequest`; `resource=comments` takes a `CreateWeekCommentRequest` whose parent must exist. Returns the new id.",
    params(WeeklyQuery),
    request_body = CreateWeekRequest,
    responses(
        (status = 201, description = "Created, new id in `data`", body = i32),
        (status = 400, description = "Missing fields or invalid date (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Parent week not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body), fields(resource = ?query.resource))]
pub async fn handle_post(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<WeeklyQuery>,
    LenientJson(body): LenientJson<Value>,
) -> Result<ApiResponse<i32>, AppError> {
    match resource(&query)? {
        WeeklyResource::Weeks => create_week(&state.db, from_body(body)?).await,
        WeeklyResource::Comments => create_comment(&state.db, from_body(body)?).await,
    }
}

#[utoipa::path(
    put,
    path = "/api/weekly",
    tag = "Weekly",
    operation_id = "updateWeek",
    summary = "Update an week",
    description = "Only fields present in the body are changed. The id is read from the body, falling back to the query string. Comments cannot be edited.",
    params(WeeklyQuery),
    request_body = UpdateWeekRequest,
    responses(
        (status = 200, description = "Updated week in `data`", body = Week),
        (status = 400, description = "Missing id, no fields or invalid date (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Week not found (NOT_FOUND)", body = ErrorBody),
        (status = 405, description = "Comments cannot be updated (METHOD_NOT_ALLOWED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body), fields(resource = ?query.resource))]
pub async fn handle_put(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<WeeklyQuery>,
    LenientJson(body): LenientJson<Value>,
) -> Result<ApiResponse<Week>, AppError> {
    match resource(&query)? {
        WeeklyResource::Weeks => {
            let payload: UpdateWeekRequest = from_body(body)?;
            let raw = pick_id(&[payload.id.as_deref(), query.id.as_deref()]);
            let id = parse_id(raw, "id", "Week")?;
            update_week(&state.db, id, payload).await
        }
        WeeklyResource::Comments => Err(AppError::MethodNotAllowed),
    }
}

#[utoipa::path(
    delete,
    path = "/api/weekly",
    tag = "Weekly",
    operation_id = "deleteWeek",
    summary = "Delete an week with its comments, or a single comment",
    description = "The id is read from the query string, falling back to the JSON body. Deleting an week removes its comments in the same transaction.",
    params(WeeklyQuery),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Missing id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Week or comment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body), fields(resource = ?query.resource))]
pub async fn handle_delete(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<WeeklyQuery>,
    LenientJson(body): LenientJson<IdBody>,
) -> Result<ApiResponse<()>, AppError> {
    let raw = pick_id(&[query.id.as_deref(), body.id.as_deref()]);
    match resource(&query)? {
        WeeklyResource::Weeks => {
            let id = parse_id(raw, "id", "Week")?;
            delete_week(&state.db, id).await
        }
        WeeklyResource::Comments => {
            let id = parse_id(raw, "id", "Comment")?;
            delete_comment(&state.db, id).await
        }
    }
}

async fn list_weeks<C: ConnectionTrait>(
    db: &C,
    query: &WeeklyQuery,
) -> Result<ApiResponse<Vec<Week>>, AppError> {
    let mut select = week::Entity::find();

    if let Some(term) = search_term(query.search.as_deref()) {
        select = select.filter(search_condition(
            term,
            &[week::Column::Title, week::Column::Description],
        ));
    }

    let sort_column = query
        .sort
        .as_deref()
        .and_then(|key| lookup(key, WEEK_SORT))
        .unwrap_or(week::Column::StartDate);
    let sort_order = SortOrder::parse_or(query.order.as_deref(), SortOrder::Asc);

    let rows = select
        .order_by(sort_column, to_order(sort_order))
        .order_by_asc(week::Column::Id)
        .all(db)
        .await?;

    Ok(ApiResponse::ok(rows.into_iter().map(Week::from).collect()))
}

async fn get_week<C: ConnectionTrait>(
    db: &C,
    raw_id: &str,
) -> Result<ApiResponse<Week>, AppError> {
    let id = parse_id(Some(raw_id), "id", "Week")?;
    let model = find_week(db, id).await?;
    Ok(ApiResponse::ok(model.into()))
}

async fn create_week<C: ConnectionTrait>(
    db: &C,
    payload: CreateWeekRequest,
) -> Result<ApiResponse<i32>, AppError> {
    let title = required_text(payload.title.as_deref(), "Missing required fields")?;
    let start_date = match payload.start_date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => required_date(raw)?,
        _ => return Err(AppError::Validation("Missing required fields".into())),
    };
    let description = required_text(payload.description.as_deref(), "Missing required fields")?;
    let links = payload.links.unwrap_or_default();

    let now = chrono::Utc::now();
    let new_week = week::ActiveModel {
        title: Set(title),
        description: Set(description),
        start_date: Set(start_date),
        links: Set(encode_list(&links)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_week.insert(db).await?;

    Ok(ApiResponse::created(model.id))
}

async fn update_week(
    db: &DatabaseConnection,
    id: i32,
    payload: UpdateWeekRequest,
) -> Result<ApiResponse<Week>, AppError> {
    let txn = db.begin().await?;

    let existing = find_week_for_update(&txn, id).await?;

    if payload.is_empty() {
        return Err(AppError::Validation("No fields to update".into()));
    }

    let previous = existing.updated_at;
    let mut active: week::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(required_text(Some(title), "Title must not be empty")?);
    }
    if let Some(ref description) = payload.description {
        active.description = Set(required_text(
            Some(description),
            "Description must not be empty",
        )?);
    }
    if let Some(ref start_date) = payload.start_date {
        active.start_date = Set(required_date(start_date)?);
    }
    if let Some(ref links) = payload.links {
        active.links = Set(encode_list(links));
    }
    active.updated_at = Set(next_stamp(previous));

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok(model.into()))
}

async fn delete_week(
    db: &DatabaseConnection,
    id: i32,
) -> Result<ApiResponse<()>, AppError> {
    let txn = db.begin().await?;

    find_week_for_update(&txn, id).await?;

    let removed = week_comment::Entity::delete_many()
        .filter(week_comment::Column::WeekId.eq(id))
        .exec(&txn)
        .await?;

    let result = week::Entity::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::Internal(format!(
            "Delete of week {id} affected no rows"
        )));
    }

    txn.commit().await?;

    tracing::debug!(comments = removed.rows_affected, "Week deleted");
    Ok(ApiResponse::done(
        "Week and its comments were successfully deleted",
    ))
}

async fn list_comments<C: ConnectionTrait>(
    db: &C,
    query: &WeeklyQuery,
) -> Result<ApiResponse<Vec<WeekComment>>, AppError> {
    let Some(raw) = pick_id(&[query.week_id.as_deref()]) else {
        return Err(AppError::Validation(
            "week_id parameter is missing".into(),
        ));
    };
    // A non-numeric parent matches no rows.
    let Ok(week_id) = raw.trim().parse::<i32>() else {
        return Ok(ApiResponse::ok(Vec::new()));
    };

    let rows = week_comment::Entity::find()
        .filter(week_comment::Column::WeekId.eq(week_id))
        .order_by_asc(week_comment::Column::CreatedAt)
        .order_by_asc(week_comment::Column::Id)
        .all(db)
        .await?;

    Ok(ApiResponse::ok(
        rows.into_iter().map(WeekComment::from).collect(),
    ))
}

async fn create_comment(
    db: &DatabaseConnection,
    payload: CreateWeekCommentRequest,
) -> Result<ApiResponse<i32>, AppError> {
    let raw = pick_id(&[payload.week_id.as_deref()]);
    let author = required_text(payload.author.as_deref(), "Missing required fields")?;
    let text = required_text(payload.text.as_deref(), "Missing required fields")?;
    if raw.is_none() {
        return Err(AppError::Validation("Missing required fields".into()));
    }
    let week_id = parse_id(raw, "week_id", "Week")?;

    let txn = db.begin().await?;

    week::Entity::find_by_id(week_id)
        .lock(LockType::Share)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Week not found".into()))?;

    let new_comment = week_comment::ActiveModel {
        week_id: Set(week_id),
        author: Set(author),
        text: Set(text),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_comment.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::NotFound("Week not found".into())
        }
        _ => AppError::from(e),
    })?;
    txn.commit().await?;

    Ok(ApiResponse::created(model.id))
}

async fn delete_comment(db: &DatabaseConnection, id: i32) -> Result<ApiResponse<()>, AppError> {
    let result = week_comment::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Comment not found".into()));
    }
    Ok(ApiResponse::done("Comment deleted successfully"))
}

async fn find_week<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<week::Model, AppError> {
    week::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Week not found".into()))
}

async fn find_week_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<week::Model, AppError> {
    week::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Week not found".into()))
}
