use common::codec::decode_list;
use common::records::{Assignment, AssignmentComment};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::shared::raw_id;
use crate::entity::{assignment, assignment_comment};

/// Resources served by `/api/assignments`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentResource {
    Assignments,
    Comments,
}

pub const ASSIGNMENT_RESOURCES: &[(&str, AssignmentResource)] = &[
    ("assignments", AssignmentResource::Assignments),
    ("comments", AssignmentResource::Comments),
];

#[derive(Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignmentQuery {
    /// `assignments` (default) or `comments`.
    pub resource: Option<String>,
    /// Assignment id on GET; assignment or comment id on DELETE.
    #[serde(default, deserialize_with = "raw_id")]
    pub id: Option<String>,
    /// Parent assignment when listing comments.
    #[serde(default, deserialize_with = "raw_id")]
    pub assignment_id: Option<String>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
    /// One of `title`, `due_date`, `created_at`. Defaults to `due_date`.
    pub sort: Option<String>,
    /// `asc` (default) or `desc`.
    pub order: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    #[schema(example = "Lab 1")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "2024-01-15")]
    pub due_date: Option<String>,
    pub files: Option<Vec<String>>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAssignmentRequest {
    #[serde(default, deserialize_with = "raw_id")]
    #[schema(value_type = Option<i32>)]
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub files: Option<Vec<String>>,
}

impl UpdateAssignmentRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.files.is_none()
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateAssignmentCommentRequest {
    #[serde(default, deserialize_with = "raw_id")]
    #[schema(value_type = Option<i32>)]
    pub assignment_id: Option<String>,
    pub author: Option<String>,
    pub text: Option<String>,
}

impl From<assignment::Model> for Assignment {
    fn from(m: assignment::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            due_date: m.due_date,
            files: decode_list(&m.files),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<assignment_comment::Model> for AssignmentComment {
    fn from(m: assignment_comment::Model) -> Self {
        Self {
            id: m.id,
            assignment_id: m.assignment_id,
            author: m.author,
            text: m.text,
            created_at: m.created_at,
        }
    }
}
