use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::token::manager::TokenManager;

/// Periodic background refresh, so the token stays warm without traffic.
///
/// The first tick fires immediately, which doubles as the startup refresh.
pub struct RefreshTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RefreshTask {
    pub fn spawn(manager: Arc<TokenManager>, period: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            // interval() panics on a zero period
            let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(
                "token monitoring active (refresh every {} seconds)",
                period.as_secs()
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match manager.get_valid_token().await {
                            Some(credential) => info!("background refresh holds {}", credential.preview()),
                            None => warn!("background refresh found no usable page token"),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("token monitoring stopped");
                            break;
                        }
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Signal the loop and wait for it. A refresh already in flight completes first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            error!("token monitoring task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl TokenManager {
    /// Start the background refresh at the configured interval.
    pub fn start_background_refresh(self: &Arc<Self>) -> RefreshTask {
        RefreshTask::spawn(self.clone(), self.refresh_interval())
    }
}
