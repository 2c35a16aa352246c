use common::records::{Reply, Topic};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::shared::raw_id;
use crate::entity::{reply, topic};

/// Resources served by `/api/discussion`. There is no default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscussionResource {
    Topics,
    Replies,
}

pub const DISCUSSION_RESOURCES: &[(&str, DiscussionResource)] = &[
    ("topics", DiscussionResource::Topics),
    ("replies", DiscussionResource::Replies),
];

#[derive(Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DiscussionQuery {
    /// `topics` or `replies`. Required.
    pub resource: Option<String>,
    #[serde(default, deserialize_with = "raw_id")]
    pub id: Option<String>,
    /// Parent topic when listing replies.
    #[serde(default, deserialize_with = "raw_id")]
    pub topic_id: Option<String>,
    /// Case-insensitive match against subject, message and author.
    pub search: Option<String>,
    /// One of `subject`, `author`, `created_at`. Defaults to `created_at`.
    pub sort: Option<String>,
    /// `asc` or `desc` (default).
    pub order: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTopicRequest {
    pub subject: Option<String>,
    pub message: Option<String>,
    pub author: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateTopicRequest {
    #[serde(default, deserialize_with = "raw_id")]
    #[schema(value_type = Option<i32>)]
    pub id: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateReplyRequest {
    #[serde(default, deserialize_with = "raw_id")]
    #[schema(value_type = Option<i32>)]
    pub topic_id: Option<String>,
    pub text: Option<String>,
    pub author: Option<String>,
}

impl From<topic::Model> for Topic {
    fn from(m: topic::Model) -> Self {
        Self {
            id: m.id,
            subject: m.subject,
            message: m.message,
            author: m.author,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<reply::Model> for Reply {
    fn from(m: reply::Model) -> Self {
        Self {
            id: m.id,
            topic_id: m.topic_id,
            text: m.text,
            author: m.author,
            created_at: m.created_at,
        }
    }
}
