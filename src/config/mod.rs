//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, BillingConfig, KeysConfig, LogFormat, LoggingConfig, ServerConfig,
};
