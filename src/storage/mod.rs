pub mod catalog;
pub mod collection;
pub mod etags;
pub mod watcher;

pub use catalog::{CatalogSnapshot, CatalogStore};
pub use collection::{Collection, MemoryCollection};
pub use etags::{EtagEntry, EtagStore, MemoryEtagStore};
pub use watcher::{reload_on_change, CatalogWatcher};
