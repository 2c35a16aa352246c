use common::codec::decode_list;
use common::records::{Week, WeekComment};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::shared::raw_id;
use crate::entity::{week, week_comment};

/// Resources served by `/api/weekly`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeeklyResource {
    Weeks,
    Comments,
}

pub const WEEKLY_RESOURCES: &[(&str, WeeklyResource)] = &[
    ("weeks", WeeklyResource::Weeks),
    ("comments", WeeklyResource::Comments),
];

#[derive(Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeeklyQuery {
    /// `weeks` (default) or `comments`.
    pub resource: Option<String>,
    #[serde(default, deserialize_with = "raw_id")]
    pub id: Option<String>,
    /// Parent week when listing comments.
    #[serde(default, deserialize_with = "raw_id")]
    pub week_id: Option<String>,
    pub search: Option<String>,
    /// One of `title`, `start_date`, `created_at`. Defaults to `start_date`.
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateWeekRequest {
    #[schema(example = "Week 1: Introduction")]
    pub title: Option<String>,
    #[schema(example = "2024-01-08")]
    pub start_date: Option<String>,
    pub description: Option<String>,
    pub links: Option<Vec<String>>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateWeekRequest {
    #[serde(default, deserialize_with = "raw_id")]
    #[schema(value_type = Option<i32>)]
    pub id: Option<String>,
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub description: Option<String>,
    pub links: Option<Vec<String>>,
}

impl UpdateWeekRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start_date.is_none()
            && self.description.is_none()
            && self.links.is_none()
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateWeekCommentRequest {
    #[serde(default, deserialize_with = "raw_id")]
    #[schema(value_type = Option<i32>)]
    pub week_id: Option<String>,
    pub author: Option<String>,
    pub text: Option<String>,
}

impl From<week::Model> for Week {
    fn from(m: week::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            start_date: m.start_date,
            description: m.description,
            links: decode_list(&m.links),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<week_comment::Model> for WeekComment {
    fn from(m: week_comment::Model) -> Self {
        Self {
            id: m.id,
            week_id: m.week_id,
            author: m.author,
            text: m.text,
            created_at: m.created_at,
        }
    }
}
