//! TOML configuration: navigation, logging, assets, accounts and routes.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    AccountConfig, AppConfig, AssetsConfig, Config, FlowKind, LoggingConfig, RouteConfig,
};
