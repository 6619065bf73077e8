pub mod files;
pub mod formatter;

pub use files::extract_version_files;
pub use formatter::{Formatter, Selection};
