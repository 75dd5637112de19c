//! Dry-run transport: alerts go to the log instead of a chat.

use async_trait::async_trait;

use super::{AlertSink, DeliveryError, Recipient};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, recipient: &Recipient, message: &str) -> Result<(), DeliveryError> {
        tracing::info!(%recipient, "dry-run alert:\n{message}");
        Ok(())
    }
}
