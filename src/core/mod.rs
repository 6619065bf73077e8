pub mod library;
pub mod query;
pub mod schema;

pub use library::*;
pub use query::*;
pub use schema::*;
