pub mod dispatcher;
pub mod error;

pub use dispatcher::{Action, Api, ApiResponse};
pub use error::{ApiError, ErrorBody};
