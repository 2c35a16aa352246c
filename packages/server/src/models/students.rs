use common::records::Student;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::shared::raw_id;
use crate::entity::user;

/// Query parameters accepted by `/api/students`.
#[derive(Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentQuery {
    /// Student id. Selects a single record on GET and DELETE.
    #[serde(default, deserialize_with = "raw_id")]
    pub id: Option<String>,
    /// Alias of `id`.
    #[serde(default, deserialize_with = "raw_id")]
    pub student_id: Option<String>,
    /// Case-insensitive match against name and email, or an exact id.
    pub search: Option<String>,
    /// One of `name`, `student_id`, `id`, `email`. Defaults to `name`.
    pub sort: Option<String>,
    /// `asc` (default) or `desc`.
    pub order: Option<String>,
    /// `change_password` switches POST to the password change operation.
    pub action: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.edu")]
    pub email: Option<String>,
    /// At least 8 characters.
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    #[serde(default, deserialize_with = "raw_id")]
    #[schema(value_type = Option<i32>)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "raw_id")]
    #[schema(value_type = Option<i32>)]
    pub student_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    #[serde(default, deserialize_with = "raw_id")]
    #[schema(value_type = Option<i32>)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "raw_id")]
    #[schema(value_type = Option<i32>)]
    pub student_id: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Body fallback for DELETE.
#[derive(Deserialize, Default)]
pub struct StudentIdBody {
    #[serde(default, deserialize_with = "raw_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "raw_id")]
    pub student_id: Option<String>,
}

impl From<user::Model> for Student {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
