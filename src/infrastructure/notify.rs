use crate::domain::ports::Notifier;
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Emits the local acknowledgment as a structured log event. Stands in
/// for the device notification channel, which belongs to the app shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        info!(title, body, "local notification");
        Ok(())
    }
}
