pub mod codec;
pub mod envelope;
pub mod records;
pub mod sort;
pub mod validate;

pub use envelope::Envelope;
pub use sort::SortOrder;
