//! Sort keys and directions accepted by the list endpoints.
//!
//! These are the only values a client may send as `sort`/`order`. The
//! server maps each key to a fixed column; anything else falls back to the
//! resource default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const STUDENT_SORT_KEYS: [&str; 4] = ["name", "student_id", "id", "email"];
pub const ASSIGNMENT_SORT_KEYS: [&str; 3] = ["title", "due_date", "created_at"];
pub const WEEK_SORT_KEYS: [&str; 3] = ["title", "start_date", "created_at"];
pub const TOPIC_SORT_KEYS: [&str; 3] = ["subject", "author", "created_at"];

pub const ORDER_KEYS: [&str; 2] = ["asc", "desc"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a client-supplied direction, falling back to `default` for
    /// absent or unrecognized input.
    pub fn parse_or(raw: Option<&str>, default: SortOrder) -> SortOrder {
        raw.and_then(|s| s.parse().ok()).unwrap_or(default)
    }

    pub fn toggled(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}
