use std::collections::HashMap;

use common::SortOrder;
use common::records::{Assignment, Student, Topic, Week};

use crate::resource::Collection;
use crate::table::Row;

/// A freshly fetched collection, tagged with where it belongs.
#[derive(Clone, Debug, PartialEq)]
pub enum Rows {
    Students(Vec<Student>),
    Assignments(Vec<Assignment>),
    Weeks(Vec<Week>),
    Topics(Vec<Topic>),
}

impl Rows {
    pub fn collection(&self) -> Collection {
        match self {
            Rows::Students(_) => Collection::Students,
            Rows::Assignments(_) => Collection::Assignments,
            Rows::Weeks(_) => Collection::Weeks,
            Rows::Topics(_) => Collection::Topics,
        }
    }
}

/// Everything the client has loaded, plus the per-column sort state.
#[derive(Debug, Default)]
pub struct Store {
    pub students: Vec<Student>,
    pub assignments: Vec<Assignment>,
    pub weeks: Vec<Week>,
    pub topics: Vec<Topic>,
    directions: HashMap<(Collection, String), SortOrder>,
    active: HashMap<Collection, String>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the direction of `column`. A column never sorted before starts at asc.
    pub fn toggle_sort(&mut self, collection: Collection, column: &str) -> SortOrder {
        let order = match self.directions.get(&(collection, column.to_string())) {
            Some(previous) => previous.toggled(),
            None => SortOrder::Asc,
        };
        self.directions.insert((collection, column.to_string()), order);
        self.active.insert(collection, column.to_string());
        self.resort(collection);
        order
    }

    /// The column and direction last chosen for `collection`.
    pub fn active_sort(&self, collection: Collection) -> Option<(&str, SortOrder)> {
        let column = self.active.get(&collection)?;
        let order = self.directions.get(&(collection, column.clone()))?;
        Some((column.as_str(), *order))
    }

    /// Replace a collection with fetched rows, keeping the active local sort.
    pub fn apply(&mut self, rows: Rows) {
        let collection = rows.collection();
        match rows {
            Rows::Students(rows) => self.students = rows,
            Rows::Assignments(rows) => self.assignments = rows,
            Rows::Weeks(rows) => self.weeks = rows,
            Rows::Topics(rows) => self.topics = rows,
        }
        self.resort(collection);
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Students => self.students.len(),
            Collection::Assignments => self.assignments.len(),
            Collection::Weeks => self.weeks.len(),
            Collection::Topics => self.topics.len(),
        }
    }

    fn resort(&mut self, collection: Collection) {
        let Some((column, order)) = self
            .active_sort(collection)
            .map(|(column, order)| (column.to_string(), order))
        else {
            return;
        };
        match collection {
            Collection::Students => sort_rows(&mut self.students, &column, order),
            Collection::Assignments => sort_rows(&mut self.assignments, &column, order),
            Collection::Weeks => sort_rows(&mut self.weeks, &column, order),
            Collection::Topics => sort_rows(&mut self.topics, &column, order),
        }
    }
}

/// Stable in-place sort by one column.
pub fn sort_rows<T: Row>(rows: &mut [T], column: &str, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ordering = a.compare(b, column);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}
