pub mod criteria;
pub mod matcher;
pub mod params;
pub mod scorer;
pub mod selector;
pub mod server;

pub use criteria::{resolve, NameCriteria, NamePattern};
pub use matcher::*;
pub use params::{build_action_params, has_param, Filter};
pub use scorer::{score, Rank, RankMetric};
pub use server::*;
