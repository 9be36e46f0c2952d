pub mod config;
pub mod paths;

pub use config::{ActionsConfig, ArrConfig, Config, LoggingConfig, PlexConfig};
pub use paths::PathManager;
