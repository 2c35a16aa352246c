mod assignments;
mod common;
mod discussion;
mod routing;
mod weekly;
