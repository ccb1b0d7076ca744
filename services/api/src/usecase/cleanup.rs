use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::domain::types::CleanupReport;
use crate::error::ApiError;

/// Background task that sweeps the code table on a fixed period.
///
/// Ticks that pile up behind a slow sweep are skipped, not queued. A failed
/// sweep is logged and the next tick retries; it never takes the process
/// down. After [`shutdown`] an in-flight sweep finishes but no new one
/// starts.
///
/// [`shutdown`]: CleanupScheduler::shutdown
pub struct CleanupScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CleanupScheduler {
    /// `sweep` produces one cleanup pass per call, typically
    /// `OtpLedger::sweep` on a cloned ledger.
    pub fn spawn<F, Fut>(sweep: F, period: Duration) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<CleanupReport, ApiError>> + Send,
    {
        let (shutdown, mut rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            info!(period_secs = period.as_secs(), "cleanup scheduler started");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = rx.changed() => break,
                }
                // runs outside the select so a shutdown signal cannot cancel
                // a sweep halfway through
                match sweep().await {
                    Ok(report) if report.expired_removed > 0 || report.stale_removed > 0 => {
                        info!(
                            expired = report.expired_removed,
                            stale = report.stale_removed,
                            "cleanup sweep removed codes"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "cleanup sweep failed"),
                }
            }
            info!("cleanup scheduler stopped");
        });
        Self { shutdown, handle }
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::repository::OtpRepository;
    use crate::domain::types::OtpPurpose;
    use crate::usecase::otp::OtpLedger;
    use crate::usecase::testkit::MemoryOtpRepo;

    fn ledger(repo: MemoryOtpRepo) -> OtpLedger<MemoryOtpRepo> {
        OtpLedger {
            repo,
            ttl_minutes: 10,
        }
    }

    fn spawn_scheduler(repo: &MemoryOtpRepo, period: Duration) -> CleanupScheduler {
        let repo = repo.clone();
        CleanupScheduler::spawn(
            move || {
                let ledger = ledger(repo.clone());
                async move { ledger.sweep().await }
            },
            period,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn should_sweep_on_startup_tick() {
        let repo = MemoryOtpRepo::new();
        ledger(repo.clone())
            .issue(Uuid::new_v4(), OtpPurpose::EmailVerification)
            .await
            .unwrap();
        repo.expire_all();

        let scheduler = spawn_scheduler(&repo, Duration::from_secs(3600));
        // the first interval tick fires immediately; yield to let it run
        tokio::time::sleep(Duration::from_millis(1)).await;

        let stats = repo.stats(Utc::now()).await.unwrap();
        assert_eq!(stats.total, 0);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn should_sweep_again_on_next_tick() {
        let repo = MemoryOtpRepo::new();
        let scheduler = spawn_scheduler(&repo, Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(1)).await;

        ledger(repo.clone())
            .issue(Uuid::new_v4(), OtpPurpose::PasswordReset)
            .await
            .unwrap();
        repo.expire_all();

        tokio::time::sleep(Duration::from_secs(3601)).await;
        let stats = repo.stats(Utc::now()).await.unwrap();
        assert_eq!(stats.total, 0);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_sweep_after_shutdown() {
        let repo = MemoryOtpRepo::new();
        let scheduler = spawn_scheduler(&repo, Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(1)).await;
        scheduler.shutdown().await;

        ledger(repo.clone())
            .issue(Uuid::new_v4(), OtpPurpose::EmailVerification)
            .await
            .unwrap();
        repo.expire_all();

        tokio::time::sleep(Duration::from_secs(7200)).await;
        let stats = repo.stats(Utc::now()).await.unwrap();
        assert_eq!(stats.total, 1);
    }
}
