use async_trait::async_trait;
use thiserror::Error;

use recall_core::{Notification, OwnerId};

/// Failure to hand a notification to its recipient.
///
/// Never alters scheduling state; the chain advances regardless.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("recipient {owner} is unreachable")]
    Unreachable { owner: OwnerId },

    #[error("delivery channel error: {0}")]
    Channel(String),
}

/// Outbound side of a firing: renders and sends the reminder to its owner.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;
}
