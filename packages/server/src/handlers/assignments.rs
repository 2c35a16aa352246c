use axum::extract::State;
use axum::response::{IntoResponse, Response};
use common::SortOrder;
use common::codec::encode_list;
use common::records::{Assignment, AssignmentComment};
use common::validate::lookup;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use serde_json::Value;
use tracing::instrument;

use crate::entity::{assignment, assignment_comment};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::{LenientJson, from_body};
use crate::extractors::query::AppQuery;
use crate::models::assignments::*;
use crate::models::shared::{
    IdBody, next_stamp, parse_id, parse_resource, pick_id, required_date, required_text,
    search_condition, search_term, to_order,
};
use crate::response::ApiResponse;
use crate::state::AppState;

pub(crate) const ASSIGNMENT_SORT: &[(&str, assignment::Column)] = &[
    ("title", assignment::Column::Title),
    ("due_date", assignment::Column::DueDate),
    ("created_at", assignment::Column::CreatedAt),
];

fn resource(query: &AssignmentQuery) -> Result<AssignmentResource, AppError> {
    parse_resource(
        query.resource.as_deref(),
        ASSIGNMENT_RESOURCES,
        Some(AssignmentResource::Assignments),
    )
}

#[utoipa::path(
    get,
    path = "/api/assignments",
    tag = "Assignments",
    operation_id = "getAssignments",
    summary = "Get or list assignments, or list an assignment's comments",
    description = "`resource=assignments` (default): with `id` returns that assignment, otherwise the full list filtered by `search` and ordered by `sort`/`order` (default `due_date` asc). `resource=comments`: the comments of `assignment_id`, oldest first.",
    params(AssignmentQuery),
    responses(
        (status = 200, description = "Assignment, assignment list or comment list in `data`", body = [Assignment]),
        (status = 400, description = "Invalid resource or missing assignment_id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(resource = ?query.resource))]
pub async fn handle_get(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AssignmentQuery>,
) -> Result<Response, AppError> {
    match resource(&query)? {
        AssignmentResource::Assignments => match pick_id(&[query.id.as_deref()]) {
            Some(raw) => Ok(get_assignment(&state.db, raw).await?.into_response()),
            None => Ok(list_assignments(&state.db, &query).await?.into_response()),
        },
        AssignmentResource::Comments => Ok(list_comments(&state.db, &query).await?.into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/assignments",
    tag = "Assignments",
    operation_id = "createAssignment",
    summary = "Create an assignment or a comment",
    description = "`resource=assignments` takes a `CreateAssignmentRequest`; `resource=comments` takes a `CreateAssignmentCommentRequest` whose parent must exist. Returns the new id.",
    params(AssignmentQuery),
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Created, new id in `data`", body = i32),
        (status = 400, description = "Missing fields or invalid date (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Parent assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body), fields(resource = ?query.resource))]
pub async fn handle_post(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AssignmentQuery>,
    LenientJson(body): LenientJson<Value>,
) -> Result<ApiResponse<i32>, AppError> {
    match resource(&query)? {
        AssignmentResource::Assignments => create_assignment(&state.db, from_body(body)?).await,
        AssignmentResource::Comments => create_comment(&state.db, from_body(body)?).await,
    }
}

#[utoipa::path(
    put,
    path = "/api/assignments",
    tag = "Assignments",
    operation_id = "updateAssignment",
    summary = "Update an assignment",
    description = "Only fields present in the body are changed. The id is read from the body, falling back to the query string. Comments cannot be edited.",
    params(AssignmentQuery),
    request_body = UpdateAssignmentRequest,
    responses(
        (status = 200, description = "Updated assignment in `data`", body = Assignment),
        (status = 400, description = "Missing id, no fields or invalid date (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
        (status = 405, description = "Comments cannot be updated (METHOD_NOT_ALLOWED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body), fields(resource = ?query.resource))]
pub async fn handle_put(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AssignmentQuery>,
    LenientJson(body): LenientJson<Value>,
) -> Result<ApiResponse<Assignment>, AppError> {
    match resource(&query)? {
        AssignmentResource::Assignments => {
            let payload: UpdateAssignmentRequest = from_body(body)?;
            let raw = pick_id(&[payload.id.as_deref(), query.id.as_deref()]);
            let id = parse_id(raw, "id", "Assignment")?;
            update_assignment(&state.db, id, payload).await
        }
        AssignmentResource::Comments => Err(AppError::MethodNotAllowed),
    }
}

#[utoipa::path(
    delete,
    path = "/api/assignments",
    tag = "Assignments",
    operation_id = "deleteAssignment",
    summary = "Delete an assignment with its comments, or a single comment",
    description = "The id is read from the query string, falling back to the JSON body. Deleting an assignment removes its comments in the same transaction.",
    params(AssignmentQuery),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Missing id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Assignment or comment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body), fields(resource = ?query.resource))]
pub async fn handle_delete(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AssignmentQuery>,
    LenientJson(body): LenientJson<IdBody>,
) -> Result<ApiResponse<()>, AppError> {
    let raw = pick_id(&[query.id.as_deref(), body.id.as_deref()]);
    match resource(&query)? {
        AssignmentResource::Assignments => {
            let id = parse_id(raw, "id", "Assignment")?;
            delete_assignment(&state.db, id).await
        }
        AssignmentResource::Comments => {
            let id = parse_id(raw, "id", "Comment")?;
            delete_comment(&state.db, id).await
        }
    }
}

async fn list_assignments<C: ConnectionTrait>(
    db: &C,
    query: &AssignmentQuery,
) -> Result<ApiResponse<Vec<Assignment>>, AppError> {
    let mut select = assignment::Entity::find();

    if let Some(term) = search_term(query.search.as_deref()) {
        select = select.filter(search_condition(
            term,
            &[assignment::Column::Title, assignment::Column::Description],
        ));
    }

    let sort_column = query
        .sort
        .as_deref()
        .and_then(|key| lookup(key, ASSIGNMENT_SORT))
        .unwrap_or(assignment::Column::DueDate);
    let sort_order = SortOrder::parse_or(query.order.as_deref(), SortOrder::Asc);

    let rows = select
        .order_by(sort_column, to_order(sort_order))
        .order_by_asc(assignment::Column::Id)
        .all(db)
        .await?;

    Ok(ApiResponse::ok(rows.into_iter().map(Assignment::from).collect()))
}

async fn get_assignment<C: ConnectionTrait>(
    db: &C,
    raw_id: &str,
) -> Result<ApiResponse<Assignment>, AppError> {
    let id = parse_id(Some(raw_id), "id", "Assignment")?;
    let model = find_assignment(db, id).await?;
    Ok(ApiResponse::ok(model.into()))
}

async fn create_assignment<C: ConnectionTrait>(
    db: &C,
    payload: CreateAssignmentRequest,
) -> Result<ApiResponse<i32>, AppError> {
    let title = required_text(payload.title.as_deref(), "Missing required fields")?;
    let description = required_text(payload.description.as_deref(), "Missing required fields")?;
    let due_date = match payload.due_date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => required_date(raw)?,
        _ => return Err(AppError::Validation("Missing required fields".into())),
    };
    let files = payload.files.unwrap_or_default();

    let now = chrono::Utc::now();
    let new_assignment = assignment::ActiveModel {
        title: Set(title),
        description: Set(description),
        due_date: Set(due_date),
        files: Set(encode_list(&files)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_assignment.insert(db).await?;

    Ok(ApiResponse::created(model.id))
}

async fn update_assignment(
    db: &DatabaseConnection,
    id: i32,
    payload: UpdateAssignmentRequest,
) -> Result<ApiResponse<Assignment>, AppError> {
    let txn = db.begin().await?;

    let existing = find_assignment_for_update(&txn, id).await?;

    if payload.is_empty() {
        return Err(AppError::Validation("No fields to update".into()));
    }

    let previous = existing.updated_at;
    let mut active: assignment::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(required_text(Some(title), "Title must not be empty")?);
    }
    if let Some(ref description) = payload.description {
        active.description = Set(required_text(
            Some(description),
            "Description must not be empty",
        )?);
    }
    if let Some(ref due_date) = payload.due_date {
        active.due_date = Set(required_date(due_date)?);
    }
    if let Some(ref files) = payload.files {
        active.files = Set(encode_list(files));
    }
    active.updated_at = Set(next_stamp(previous));

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok(model.into()))
}

async fn delete_assignment(
    db: &DatabaseConnection,
    id: i32,
) -> Result<ApiResponse<()>, AppError> {
    let txn = db.begin().await?;

    find_assignment_for_update(&txn, id).await?;

    let removed = assignment_comment::Entity::delete_many()
        .filter(assignment_comment::Column::AssignmentId.eq(id))
        .exec(&txn)
        .await?;

    let result = assignment::Entity::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::Internal(format!(
            "Delete of assignment {id} affected no rows"
        )));
    }

    txn.commit().await?;

    tracing::debug!(comments = removed.rows_affected, "Assignment deleted");
    Ok(ApiResponse::done(
        "Assignment and its comments were successfully deleted",
    ))
}

async fn list_comments<C: ConnectionTrait>(
    db: &C,
    query: &AssignmentQuery,
) -> Result<ApiResponse<Vec<AssignmentComment>>, AppError> {
    let Some(raw) = pick_id(&[query.assignment_id.as_deref()]) else {
        return Err(AppError::Validation(
            "assignment_id parameter is missing".into(),
        ));
    };
    // A non-numeric parent matches no rows.
    let Ok(assignment_id) = raw.trim().parse::<i32>() else {
        return Ok(ApiResponse::ok(Vec::new()));
    };

    let rows = assignment_comment::Entity::find()
        .filter(assignment_comment::Column::AssignmentId.eq(assignment_id))
        .order_by_asc(assignment_comment::Column::CreatedAt)
        .order_by_asc(assignment_comment::Column::Id)
        .all(db)
        .await?;

    Ok(ApiResponse::ok(
        rows.into_iter().map(AssignmentComment::from).collect(),
    ))
}

async fn create_comment(
    db: &DatabaseConnection,
    payload: CreateAssignmentCommentRequest,
) -> Result<ApiResponse<i32>, AppError> {
    let raw = pick_id(&[payload.assignment_id.as_deref()]);
    let author = required_text(payload.author.as_deref(), "Missing required fields")?;
    let text = required_text(payload.text.as_deref(), "Missing required fields")?;
    if raw.is_none() {
        return Err(AppError::Validation("Missing required fields".into()));
    }
    let assignment_id = parse_id(raw, "assignment_id", "Assignment")?;

    let txn = db.begin().await?;

    assignment::Entity::find_by_id(assignment_id)
        .lock(LockType::Share)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".into()))?;

    let new_comment = assignment_comment::ActiveModel {
        assignment_id: Set(assignment_id),
        author: Set(author),
        text: Set(text),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_comment.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::NotFound("Assignment not found".into())
        }
        _ => AppError::from(e),
    })?;
    txn.commit().await?;

    Ok(ApiResponse::created(model.id))
}

async fn delete_comment(db: &DatabaseConnection, id: i32) -> Result<ApiResponse<()>, AppError> {
    let result = assignment_comment::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Comment not found".into()));
    }
    Ok(ApiResponse::done("Comment deleted successfully"))
}

async fn find_assignment<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<assignment::Model, AppError> {
    assignment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".into()))
}

async fn find_assignment_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<assignment::Model, AppError> {
    assignment::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".into()))
}
