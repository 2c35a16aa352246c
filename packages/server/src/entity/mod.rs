pub mod assignment;
pub mod assignment_comment;
pub mod reply;
pub mod topic;
pub mod user;
pub mod week;
pub mod week_comment;
