//! Value types shared by the geocode response parser and its front ends.
//!
//! Coordinates, bounding shapes, addresses and located places, plus the
//! environment-driven application configuration.

pub mod address;
pub mod app_config;
pub mod config;
pub mod coordinate;
pub mod location;
pub mod shape;

pub use address::GeoAddress;
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use coordinate::GeoCoordinate;
pub use location::{filter_within, GeoLocation};
pub use shape::{GeoCircle, GeoRectangle, GeoShape};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
