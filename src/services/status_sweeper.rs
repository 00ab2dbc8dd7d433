use crate::error::AppResult;
use crate::models::SessionStatus;
use crate::repositories::SessionRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};

/// Background task that applies time-due session transitions.
///
/// Clients poll and request transitions themselves, but a session with no
/// connected clients would otherwise stay upcoming or in progress forever.
/// Each sweep moves due sessions forward through the same guarded update the
/// request path uses, so the sweeper and concurrent client requests never
/// double-apply a transition.
pub struct StatusSweeper {
    session_repo: Arc<SessionRepository>,
    sweep_interval: Duration,
}

impl StatusSweeper {
    /// Create a new status sweeper
    pub fn new(session_repo: Arc<SessionRepository>) -> Self {
        Self {
            session_repo,
            sweep_interval: Duration::from_secs(15), // Matches the client polling cadence
        }
    }

    /// Set sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Start the sweeper background task
    pub async fn start(self) {
        let mut interval = time::interval(self.sweep_interval);
        info!(
            "Status sweeper started, sweeping every {:?}",
            self.sweep_interval
        );

        loop {
            interval.tick().await;

            if let Err(e) = self.sweep().await {
                error!("Error in status sweep: {}", e);
            }
        }
    }

    /// Run a single sweep pass.
    ///
    /// Starts are applied before ends, so a session found upcoming but
    /// already past its end time is started and then terminated within the
    /// same pass. Returns how many sessions were started and ended.
    pub async fn sweep(&self) -> AppResult<(usize, usize)> {
        let now = chrono::Utc::now().naive_utc();

        let mut started = 0;
        for session in self.session_repo.find_due_starts(now).await? {
            let applied = self
                .session_repo
                .transition_status(session.id, SessionStatus::Upcoming, SessionStatus::InProgress)
                .await?;
            if applied.is_some() {
                info!("Session {} started", session.id);
                started += 1;
            }
        }

        let mut ended = 0;
        for session in self.session_repo.find_due_ends(now).await? {
            let applied = self
                .session_repo
                .transition_status(
                    session.id,
                    SessionStatus::InProgress,
                    SessionStatus::Terminated,
                )
                .await?;
            if applied.is_some() {
                info!("Session {} terminated", session.id);
                ended += 1;
            }
        }

        Ok((started, ended))
    }
}
