//! carlwatch library exports
//!
//! Fetches the Carlcare spare-parts model catalog, compares it with the
//! last saved snapshot and notifies a Telegram chat about new models.

pub mod catalog;
pub mod config;
pub mod error;
pub mod notifier;
pub mod retry;
pub mod runner;

pub use catalog::{diff, Catalog, DiffResult};
pub use error::{ConfigError, DeliveryError, FetchError};
