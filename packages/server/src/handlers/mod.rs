pub mod assignments;
pub mod discussion;
pub mod fallback;
pub mod students;
pub mod weekly;
