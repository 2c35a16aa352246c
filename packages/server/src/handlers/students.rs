use axum::extract::State;
use axum::response::{IntoResponse, Response};
use common::SortOrder;
use common::records::Student;
use common::validate::{lookup, validate_email, validate_password};
use sea_orm::sea_query::LockType;
use sea_orm::*;
use serde_json::Value;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::{LenientJson, from_body};
use crate::extractors::query::AppQuery;
use crate::models::shared::{
    next_stamp, parse_id, pick_id, required_text, search_condition, search_term, to_order,
};
use crate::models::students::*;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::utils::hash;

pub(crate) const STUDENT_SORT: &[(&str, user::Column)] = &[
    ("name", user::Column::Name),
    ("student_id", user::Column::Id),
    ("id", user::Column::Id),
    ("email", user::Column::Email),
];

const CHANGE_PASSWORD: &str = "change_password";

#[utoipa::path(
    get,
    path = "/api/students",
    tag = "Students",
    operation_id = "getStudents",
    summary = "Get one student or list students",
    description = "With `id` (or `student_id`) returns that student. Otherwise returns every student, optionally filtered by `search` and ordered by `sort`/`order`. An unknown `sort` key falls back to `name`. Passwords are never returned.",
    params(StudentQuery),
    responses(
        (status = 200, description = "Student, or the ordered student list, in `data`", body = [Student]),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn handle_get(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StudentQuery>,
) -> Result<Response, AppError> {
    match pick_id(&[query.id.as_deref(), query.student_id.as_deref()]) {
        Some(raw) => Ok(get_student(&state.db, raw).await?.into_response()),
        None => Ok(list_students(&state.db, &query).await?.into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/students",
    tag = "Students",
    operation_id = "createStudent",
    summary = "Create a student or change a password",
    description = "Creates a student and returns its id. With `action=change_password` the body is a `ChangePasswordRequest` instead and the student's password is replaced after the current one verifies.",
    params(StudentQuery),
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created, new id in `data`", body = i32),
        (status = 200, description = "Password changed"),
        (status = 400, description = "Missing or invalid fields (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Current password is incorrect (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already exists (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body), fields(action = ?query.action))]
pub async fn handle_post(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StudentQuery>,
    LenientJson(body): LenientJson<Value>,
) -> Result<Response, AppError> {
    if query.action.as_deref() == Some(CHANGE_PASSWORD) {
        let payload: ChangePasswordRequest = from_body(body)?;
        return Ok(change_password(&state.db, payload).await?.into_response());
    }
    let payload: CreateStudentRequest = from_body(body)?;
    Ok(create_student(&state.db, payload).await?.into_response())
}

#[utoipa::path(
    put,
    path = "/api/students",
    tag = "Students",
    operation_id = "updateStudent",
    summary = "Update a student's name or email",
    description = "Only fields present in the body are changed. The id is read from the body, falling back to the query string.",
    params(StudentQuery),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Updated student in `data`", body = Student),
        (status = 400, description = "Missing id, no fields or invalid email (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already exists (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, payload))]
pub async fn handle_put(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StudentQuery>,
    LenientJson(payload): LenientJson<UpdateStudentRequest>,
) -> Result<ApiResponse<Student>, AppError> {
    let raw = pick_id(&[
        payload.id.as_deref(),
        payload.student_id.as_deref(),
        query.id.as_deref(),
        query.student_id.as_deref(),
    ]);
    let id = parse_id(raw, "id", "Student")?;
    update_student(&state.db, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/students",
    tag = "Students",
    operation_id = "deleteStudent",
    summary = "Delete a student",
    description = "The id is read from the query string, falling back to the JSON body.",
    params(StudentQuery),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 400, description = "Missing id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, body))]
pub async fn handle_delete(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StudentQuery>,
    LenientJson(body): LenientJson<StudentIdBody>,
) -> Result<ApiResponse<()>, AppError> {
    let raw = pick_id(&[
        query.id.as_deref(),
        query.student_id.as_deref(),
        body.id.as_deref(),
        body.student_id.as_deref(),
    ]);
    let id = parse_id(raw, "id", "Student")?;
    delete_student(&state.db, id).await
}

async fn list_students<C: ConnectionTrait>(
    db: &C,
    query: &StudentQuery,
) -> Result<ApiResponse<Vec<Student>>, AppError> {
    let mut select = user::Entity::find();

    if let Some(term) = search_term(query.search.as_deref()) {
        let mut condition = search_condition(term, &[user::Column::Name, user::Column::Email]);
        if let Ok(id) = term.parse::<i32>() {
            condition = condition.add(user::Column::Id.eq(id));
        }
        select = select.filter(condition);
    }

    let sort_column = query
        .sort
        .as_deref()
        .and_then(|key| lookup(key, STUDENT_SORT))
        .unwrap_or(user::Column::Name);
    let sort_order = SortOrder::parse_or(query.order.as_deref(), SortOrder::Asc);

    let rows = select
        .order_by(sort_column, to_order(sort_order))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;

    Ok(ApiResponse::ok(rows.into_iter().map(Student::from).collect()))
}

async fn get_student<C: ConnectionTrait>(
    db: &C,
    raw_id: &str,
) -> Result<ApiResponse<Student>, AppError> {
    let id = parse_id(Some(raw_id), "id", "Student")?;
    let student = find_student(db, id).await?;
    Ok(ApiResponse::ok(student.into()))
}

async fn create_student<C: ConnectionTrait>(
    db: &C,
    payload: CreateStudentRequest,
) -> Result<ApiResponse<i32>, AppError> {
    let name = required_text(payload.name.as_deref(), "Missing required fields")?;
    let email = normalize_email(payload.email.as_deref().unwrap_or_default());
    let password = payload.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Missing required fields".into()));
    }
    if !validate_email(&email) {
        return Err(AppError::Validation("Invalid email format".into()));
    }
    if !validate_password(&password) {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    let hash = hash::hash_password(&password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = chrono::Utc::now();
    let new_student = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        password: Set(hash),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_student.insert(db).await.map_err(map_email_conflict)?;

    Ok(ApiResponse::created(model.id))
}

async fn update_student(
    db: &DatabaseConnection,
    id: i32,
    payload: UpdateStudentRequest,
) -> Result<ApiResponse<Student>, AppError> {
    let txn = db.begin().await?;

    let existing = find_student_for_update(&txn, id).await?;

    if payload.name.is_none() && payload.email.is_none() {
        return Err(AppError::Validation("No fields to update".into()));
    }

    let previous = existing.updated_at;
    let mut active: user::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(required_text(Some(name), "Name must not be empty")?);
    }
    if let Some(ref email) = payload.email {
        let email = normalize_email(email);
        if !validate_email(&email) {
            return Err(AppError::Validation("Invalid email format".into()));
        }
        active.email = Set(email);
    }
    active.updated_at = Set(next_stamp(previous));

    let model = active.update(&txn).await.map_err(map_email_conflict)?;
    txn.commit().await?;

    Ok(ApiResponse::ok(model.into()))
}

async fn delete_student(db: &DatabaseConnection, id: i32) -> Result<ApiResponse<()>, AppError> {
    let result = user::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Student not found".into()));
    }
    Ok(ApiResponse::done("Student deleted successfully"))
}

async fn change_password(
    db: &DatabaseConnection,
    payload: ChangePasswordRequest,
) -> Result<ApiResponse<()>, AppError> {
    let raw = pick_id(&[payload.id.as_deref(), payload.student_id.as_deref()]);
    let current = payload.current_password.unwrap_or_default();
    let new = payload.new_password.unwrap_or_default();
    if raw.is_none() || current.is_empty() || new.is_empty() {
        return Err(AppError::Validation("Missing required fields".into()));
    }
    if !validate_password(&new) {
        return Err(AppError::Validation(
            "New password must be at least 8 characters".into(),
        ));
    }
    let id = parse_id(raw, "id", "Student")?;

    let txn = db.begin().await?;
    let existing = find_student_for_update(&txn, id).await?;

    let is_valid = hash::verify_password(&current, &existing.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }

    let hash = hash::hash_password(&new)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let previous = existing.updated_at;
    let mut active: user::ActiveModel = existing.into();
    active.password = Set(hash);
    active.updated_at = Set(next_stamp(previous));
    active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(student_id = id, "Password changed");
    Ok(ApiResponse::done("Password updated successfully"))
}

/// Emails are stored lowercased so the unique constraint ignores case.
fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn map_email_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Unique constraint on users.email caught on write");
            AppError::Conflict("Email already exists".into())
        }
        _ => AppError::from(e),
    }
}

async fn find_student<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}

async fn find_student_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}
