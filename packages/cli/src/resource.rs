//! The server endpoints the client talks to.

use common::sort::{ASSIGNMENT_SORT_KEYS, STUDENT_SORT_KEYS, TOPIC_SORT_KEYS, WEEK_SORT_KEYS};

/// A path plus the fixed `resource` discriminator, if the area has one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub resource: Option<&'static str>,
}

/// Top-level collections held by the [`Store`](crate::store::Store).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Collection {
    Students,
    Assignments,
    Weeks,
    Topics,
}

/// Records that only exist under a parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Child {
    AssignmentComments,
    WeekComments,
    Replies,
}

impl Collection {
    pub fn endpoint(self) -> Endpoint {
        match self {
            Collection::Students => Endpoint {
                path: "/api/students",
                resource: None,
            },
            Collection::Assignments => Endpoint {
                path: "/api/assignments",
                resource: Some("assignments"),
            },
            Collection::Weeks => Endpoint {
                path: "/api/weekly",
                resource: Some("weeks"),
            },
            Collection::Topics => Endpoint {
                path: "/api/discussion",
                resource: Some("topics"),
            },
        }
    }

    /// Keys the server accepts as `sort` for this collection.
    pub fn server_sort_keys(self) -> &'static [&'static str] {
        match self {
            Collection::Students => &STUDENT_SORT_KEYS,
            Collection::Assignments => &ASSIGNMENT_SORT_KEYS,
            Collection::Weeks => &WEEK_SORT_KEYS,
            Collection::Topics => &TOPIC_SORT_KEYS,
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            Collection::Students => "student",
            Collection::Assignments => "assignment",
            Collection::Weeks => "week",
            Collection::Topics => "topic",
        }
    }
}

impl Child {
    pub fn endpoint(self) -> Endpoint {
        match self {
            Child::AssignmentComments => Endpoint {
                path: "/api/assignments",
                resource: Some("comments"),
            },
            Child::WeekComments => Endpoint {
                path: "/api/weekly",
                resource: Some("comments"),
            },
            Child::Replies => Endpoint {
                path: "/api/discussion",
                resource: Some("replies"),
            },
        }
    }

    /// Name of the field that references the parent record.
    pub fn parent_key(self) -> &'static str {
        match self {
            Child::AssignmentComments => "assignment_id",
            Child::WeekComments => "week_id",
            Child::Replies => "topic_id",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            Child::AssignmentComments | Child::WeekComments => "comment",
            Child::Replies => "reply",
        }
    }
}
