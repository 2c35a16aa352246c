pub mod assignments;
pub mod discussion;
pub mod shared;
pub mod students;
pub mod weekly;
