pub mod models;
pub mod indicators;
pub mod data_provider;
pub mod errors;
pub mod config;
pub mod scrapers;
pub mod services;
pub mod report;

#[doc(hidden)]
pub mod util;

pub use models::signal::{Signal, TradeLevels};
pub use models::stock::{AssetMetadata, IndicatorResult, PriceBar};
pub use indicators::{classify_signal, trade_levels};
pub use data_provider::DashboardSnapshot;
pub use services::indicator_engine::IndicatorEngine;
pub use config::Config;
pub use errors::{Result, HunterError, Unavailable, UnavailableReason};
