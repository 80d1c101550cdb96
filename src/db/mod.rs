mod schema;

pub mod repository;

pub use repository::{InsertOutcome, Repository};
