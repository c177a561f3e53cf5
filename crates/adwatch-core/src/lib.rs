//! Shared domain types for adwatch: classified ad records, the run filter
//! configuration, page rollups, favorites, and environment configuration.

pub mod ads;
pub mod aggregate;
pub mod app_config;
pub mod config;
pub mod favorites;
pub mod filters;

use thiserror::Error;

pub use ads::{AdRecord, HistoryPoint, PageAggregate};
pub use aggregate::aggregate_pages;
pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use favorites::Favorites;
pub use filters::{
    infoproduct_keywords_in, matches_cta, matches_infoproduct, Country, FilterConfig,
    INFOPRODUCT_KEYWORDS, WINNER_THRESHOLD,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid country code \"{0}\": expected two ASCII letters or ALL")]
    InvalidCountry(String),
}
