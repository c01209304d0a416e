//! Periodic GET against an external API so a free-tier host does not idle out.

use crate::error::BotResult;
use motion_config::KeepAliveConfig;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Upper bound for one ping request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

struct Running {
    target: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns at most one background ping task.
pub struct KeepAlive {
    client: reqwest::Client,
    running: Mutex<Option<Running>>,
}

impl std::fmt::Debug for KeepAlive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeepAlive")
            .field("client", &"<reqwest::Client>")
            .finish_non_exhaustive()
    }
}

impl KeepAlive {
    /// Creates a stopped pinger.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new() -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            running: Mutex::new(None),
        })
    }

    /// Starts pinging per `settings` unless already running. Returns whether a
    /// task is running afterwards.
    pub async fn start(&self, settings: &KeepAliveConfig) -> bool {
        let mut running = self.running.lock().await;
        self.start_locked(&mut running, settings)
    }

    /// Stops the ping task, if any, and waits for it to finish.
    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        Self::stop_locked(&mut running).await;
    }

    /// Restarts with new settings; used when the dashboard edits them.
    pub async fn reconfigure(&self, settings: &KeepAliveConfig) -> bool {
        let mut running = self.running.lock().await;
        Self::stop_locked(&mut running).await;
        self.start_locked(&mut running, settings)
    }

    /// URL currently being pinged.
    pub async fn target(&self) -> Option<String> {
        self.running
            .lock()
            .await
            .as_ref()
            .map(|running| running.target.clone())
    }

    fn start_locked(&self, running: &mut Option<Running>, settings: &KeepAliveConfig) -> bool {
        if running.is_some() {
            return true;
        }

        let Some(target) = settings.target() else {
            info!("Keep-alive disabled");
            return false;
        };

        let period = settings.interval().max(Duration::from_secs(1));
        info!(url = target, interval = ?period, "Keep-alive enabled");

        let token = CancellationToken::new();
        let handle = tokio::spawn(ping_loop(
            self.client.clone(),
            target.to_string(),
            period,
            token.clone(),
        ));
        *running = Some(Running {
            target: target.to_string(),
            token,
            handle,
        });
        true
    }

    async fn stop_locked(running: &mut Option<Running>) {
        if let Some(task) = running.take() {
            task.token.cancel();
            if let Err(e) = task.handle.await {
                warn!(error = %e, "Keep-alive task ended abnormally");
            }
            info!(url = %task.target, "Keep-alive stopped");
        }
    }
}

async fn ping_loop(
    client: reqwest::Client,
    url: String,
    period: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                let result = tokio::select! {
                    () = token.cancelled() => break,
                    result = client.get(&url).send() => result.and_then(reqwest::Response::error_for_status),
                };
                match result {
                    Ok(response) => debug!(url = %url, status = %response.status(), "Keep-alive ping"),
                    Err(e) => warn!(url = %url, error = %e, "Keep-alive ping failed"),
                }
            }
        }
    }
}
