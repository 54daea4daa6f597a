//! Core application services.

mod config;

pub use config::{BuildConfig, Config, PathsConfig, UiConfig, CONFIG_ENV, LOCAL_CONFIG};
