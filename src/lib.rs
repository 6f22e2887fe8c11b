pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod service;
pub mod utils;

pub use api::*;
pub use config::Config;
pub use error::{parse_team_id, StatsError};
pub use models::*;
pub use scrapers::*;
pub use service::StatsService;
pub use utils::*;
