//! Records as they appear in the `data` field of a response.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A student account. The password hash is never part of this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Student {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Fatima Ali")]
    pub name: String,
    #[schema(example = "fatima@example.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Assignment {
    pub id: i32,
    #[schema(example = "Homework 1")]
    pub title: String,
    pub description: String,
    #[schema(value_type = String, example = "2024-01-15")]
    pub due_date: NaiveDate,
    /// Attached file URLs or paths, in upload order.
    #[schema(example = json!(["hw1.pdf"]))]
    pub files: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Week {
    pub id: i32,
    #[schema(example = "Week 1: Introduction")]
    pub title: String,
    #[schema(value_type = String, example = "2024-01-07")]
    pub start_date: NaiveDate,
    pub description: String,
    /// Resource links, in display order.
    pub links: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AssignmentComment {
    pub id: i32,
    pub assignment_id: i32,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WeekComment {
    pub id: i32,
    pub week_id: i32,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Topic {
    pub id: i32,
    #[schema(example = "Exam format?")]
    pub subject: String,
    pub message: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Reply {
    pub id: i32,
    pub topic_id: i32,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}
