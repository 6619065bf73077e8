#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod api;
pub mod config;
pub mod core;
pub mod query;
pub mod response;
pub mod stats;
pub mod storage;

pub use api::{Api, ApiError, ApiResponse};
pub use config::Config;
