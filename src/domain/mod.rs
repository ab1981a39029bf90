pub mod aggregate;
pub mod bug;
pub mod query;
