//! New-model notifications
//!
//! One message per brand with new models, delivered through a
//! [`NotifierBackend`]. Delivery failures are logged and counted; they never
//! abort a run.

pub mod telegram;

pub use telegram::TelegramBackend;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::catalog::DiffResult;

/// Trait for message delivery backends
#[async_trait]
pub trait NotifierBackend: Send + Sync {
    /// Deliver a single text message
    async fn send(&self, text: &str) -> Result<()>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &'static str;
}

/// Outcome of one notification pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub sent: usize,
    pub failed: usize,
}

/// Message announcing new models for one brand
pub fn format_message(brand: &str, models: &[String]) -> String {
    format!(
        "Found new models on the Carlcare website for {}: {}",
        brand,
        models.join(", ")
    )
}

pub struct Notifier {
    backend: Option<Box<dyn NotifierBackend>>,
}

impl Notifier {
    pub fn new(backend: Box<dyn NotifierBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Notifier that logs messages instead of sending them
    pub fn dry_run() -> Self {
        Self { backend: None }
    }

    pub fn is_dry_run(&self) -> bool {
        self.backend.is_none()
    }

    /// Send one message per brand, in the diff's brand order
    pub async fn notify(&self, new_models: &DiffResult) -> NotifyReport {
        let mut report = NotifyReport::default();

        for (brand, models) in new_models.iter() {
            let message = format_message(brand, models);

            let Some(backend) = &self.backend else {
                info!("Dry run: would send for {}: {}", brand, message);
                continue;
            };

            info!("Sending message for {} via {}", brand, backend.name());
            match backend.send(&message).await {
                Ok(()) => {
                    debug!("Message for {} delivered", brand);
                    report.sent += 1;
                }
                Err(e) => {
                    warn!("Failed to deliver message for {}: {:#}", brand, e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}
