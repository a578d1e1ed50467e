pub mod config;
pub mod error;
pub mod routes;
pub mod subs;

pub use config::{
    database_config_from_env, log_level_filter, ConfigError, DatabaseConfig, DatabaseParts,
    DatabaseTarget,
};
pub use routes::{api_routes, app};
