//! services/api/src/web/sweeper.rs
//!
//! Background task that deletes expired sessions from the store.

use eventify_core::SessionManager;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Purges expired sessions every `period` until `cancellation_token` fires.
pub async fn sweep_expired_sessions(
    sessions: SessionManager,
    period: Duration,
    cancellation_token: CancellationToken,
) {
    info!("Session sweeper started.");
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Session sweeper stopped.");
                return;
            }
            _ = ticker.tick() => {
                if let Err(e) = sessions.purge_expired().await {
                    error!("Failed to purge expired sessions: {}", e);
                }
            }
        }
    }
}
