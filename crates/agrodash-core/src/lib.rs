//! Domain model and pure projections for the agrodash dashboard client.
//!
//! Everything in this crate is synchronous and free of I/O apart from
//! configuration loading: the typed records the backend returns, the unified
//! alert/notification feed, the crop budget metrics, and the shared
//! preferences channel.

mod app_config;
mod config;

pub mod budget;
pub mod feed;
pub mod preferences;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use budget::{
    budget_overview, budget_utilization, crop_utilizations, top_crop, BudgetOverview,
    BudgetUtilization, CropUtilization, TopCrop,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use feed::{merge_feed, FeedItem, FeedKey, FeedKind, FeedOriginal, FeedSource, FeedState};
pub use preferences::{Preferences, PreferencesHub, Theme};
pub use types::{
    Actor, AggregateDashboard, Alert, AlertType, CropBudgetSummary, Metrics, Notification,
    NotificationType, Order, Payload, Product, Profile, RecentContent, Role,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
