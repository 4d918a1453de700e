use async_trait::async_trait;
use std::time::Duration;

/// Scheduler seam for the deliberate blocking waits the remote services
/// impose. Production code sleeps for real; tests inject a recording fake so
/// pacing can be asserted without wall-clock delays.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Pacer backed by the tokio timer.
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
