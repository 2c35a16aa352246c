//! Column definitions for each record type the client can display.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use common::records::{Assignment, AssignmentComment, Reply, Student, Topic, Week, WeekComment};

use crate::resource::Collection;

/// A comparable cell value. Text compares case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Number(i64),
    Date(NaiveDate),
    Time(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    fn text(value: &str) -> Self {
        SortKey::Text(value.to_lowercase())
    }
}

/// A record rendered as one table row.
pub trait Row {
    /// Column names, in display order.
    const COLUMNS: &'static [&'static str];

    fn cell(&self, column: &str) -> String;

    /// `None` for columns that cannot be sorted.
    fn sort_key(&self, column: &str) -> Option<SortKey>;

    fn compare(&self, other: &Self, column: &str) -> Ordering {
        self.sort_key(column).cmp(&other.sort_key(column))
    }
}

/// Displayed columns of a top-level collection.
pub fn columns(collection: Collection) -> &'static [&'static str] {
    match collection {
        Collection::Students => Student::COLUMNS,
        Collection::Assignments => Assignment::COLUMNS,
        Collection::Weeks => Week::COLUMNS,
        Collection::Topics => Topic::COLUMNS,
    }
}

fn stamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

impl Row for Student {
    const COLUMNS: &'static [&'static str] = &["id", "name", "email"];

    fn cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.to_string(),
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            _ => String::new(),
        }
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "id" | "student_id" => Some(SortKey::Number(self.id.into())),
            "name" => Some(SortKey::text(&self.name)),
            "email" => Some(SortKey::text(&self.email)),
            _ => None,
        }
    }
}

impl Row for Assignment {
    const COLUMNS: &'static [&'static str] = &["id", "title", "due_date", "files", "created_at"];

    fn cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.to_string(),
            "title" => self.title.clone(),
            "due_date" => self.due_date.to_string(),
            "files" => self.files.len().to_string(),
            "created_at" => stamp(&self.created_at),
            _ => String::new(),
        }
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "id" => Some(SortKey::Number(self.id.into())),
            "title" => Some(SortKey::text(&self.title)),
            "due_date" => Some(SortKey::Date(self.due_date)),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}

impl Row for Week {
    const COLUMNS: &'static [&'static str] = &["id", "title", "start_date", "links", "created_at"];

    fn cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.to_string(),
            "title" => self.title.clone(),
            "start_date" => self.start_date.to_string(),
            "links" => self.links.len().to_string(),
            "created_at" => stamp(&self.created_at),
            _ => String::new(),
        }
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "id" => Some(SortKey::Number(self.id.into())),
            "title" => Some(SortKey::text(&self.title)),
            "start_date" => Some(SortKey::Date(self.start_date)),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}

impl Row for Topic {
    const COLUMNS: &'static [&'static str] = &["id", "subject", "author", "created_at"];

    fn cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.to_string(),
            "subject" => self.subject.clone(),
            "author" => self.author.clone(),
            "created_at" => stamp(&self.created_at),
            _ => String::new(),
        }
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "id" => Some(SortKey::Number(self.id.into())),
            "subject" => Some(SortKey::text(&self.subject)),
            "author" => Some(SortKey::text(&self.author)),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}

macro_rules! comment_row {
    ($ty:ty) => {
        impl Row for $ty {
            const COLUMNS: &'static [&'static str] = &["id", "author", "text", "created_at"];

            fn cell(&self, column: &str) -> String {
                match column {
                    "id" => self.id.to_string(),
                    "author" => self.author.clone(),
                    "text" => self.text.clone(),
                    "created_at" => stamp(&self.created_at),
                    _ => String::new(),
                }
            }

            fn sort_key(&self, column: &str) -> Option<SortKey> {
                match column {
                    "id" => Some(SortKey::Number(self.id.into())),
                    "author" => Some(SortKey::text(&self.author)),
                    "created_at" => Some(SortKey::Time(self.created_at)),
                    _ => None,
                }
            }
        }
    };
}

comment_row!(AssignmentComment);
comment_row!(WeekComment);
comment_row!(Reply);
