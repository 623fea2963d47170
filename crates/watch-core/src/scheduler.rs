//! Waiting between poll cycles.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the poll loop between cycles.
#[async_trait]
pub trait Scheduler: Send + Sync {
	async fn wait(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
	async fn wait(&self, duration: Duration) {
		tokio::time::sleep(duration).await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn test_tokio_scheduler_waits_for_duration() {
		let start = tokio::time::Instant::now();
		TokioScheduler.wait(Duration::from_secs(60)).await;
		assert!(start.elapsed() >= Duration::from_secs(60));
	}
}
