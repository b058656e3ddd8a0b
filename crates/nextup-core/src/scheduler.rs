//! Periodic background sync with a single run slot.

use crate::sync::PlexSync;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nextup_models::{SyncSummary, DEFAULT_SYNC_INTERVAL_HOURS, MAX_SYNC_INTERVAL_HOURS};
use nextup_store::Store;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("A sync is already running")]
    AlreadyRunning,

    #[error("The scheduler is already started")]
    AlreadyStarted,

    #[error("Sync failed: {0:#}")]
    Sync(#[from] anyhow::Error),
}

/// One unit of scheduled work.
#[async_trait]
pub trait SyncJob: Send + Sync {
    async fn run(&self) -> Result<SyncSummary>;
}

#[async_trait]
impl SyncJob for PlexSync {
    async fn run(&self) -> Result<SyncSummary> {
        self.full_sync().await
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SyncStatus {
    pub is_running: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_summary: Option<SyncSummary>,
    /// Kept until the next successful run.
    pub last_error: Option<String>,
    pub next_sync_at: Option<DateTime<Utc>>,
    pub interval_hours: u32,
}

struct Shared {
    job: Arc<dyn SyncJob>,
    store: Store,
    slot: Mutex<()>,
    status: RwLock<SyncStatus>,
}

impl Shared {
    /// Interval from settings, capped at `MAX_SYNC_INTERVAL_HOURS`, or
    /// `fallback` when settings can't be read.
    fn interval_hours(&self, fallback: u32) -> u32 {
        match self.store.get_settings() {
            Ok(settings) if settings.sync_interval_hours > MAX_SYNC_INTERVAL_HOURS => {
                warn!(
                    configured = settings.sync_interval_hours,
                    "Sync interval too long, capping at {}h",
                    MAX_SYNC_INTERVAL_HOURS
                );
                MAX_SYNC_INTERVAL_HOURS
            }
            Ok(settings) if settings.sync_interval_hours > 0 => settings.sync_interval_hours,
            Ok(_) => fallback,
            Err(e) => {
                warn!(error = %e, "Failed to read sync interval, using {}h", fallback);
                fallback
            }
        }
    }

    async fn run_guarded(&self, trigger: &'static str) -> Result<SyncSummary, SchedulerError> {
        let Ok(_slot) = self.slot.try_lock() else {
            return Err(SchedulerError::AlreadyRunning);
        };
        self.status.write().await.is_running = true;
        info!(operation = "scheduled_sync", trigger, "Sync started");

        let result = self.job.run().await;

        let mut status = self.status.write().await;
        status.is_running = false;
        match result {
            Ok(summary) => {
                status.last_sync_at = Some(Utc::now());
                status.last_summary = Some(summary.clone());
                status.last_error = None;
                info!(
                    operation = "scheduled_sync",
                    trigger,
                    duration_ms = summary.duration_ms,
                    "Sync finished"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(operation = "scheduled_sync", trigger, error = %e, "Sync failed");
                status.last_error = Some(format!("{:#}", e));
                Err(SchedulerError::Sync(e))
            }
        }
    }
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct BackgroundSync {
    shared: Arc<Shared>,
    sync_on_start: bool,
    fallback_hours: u32,
    running: Mutex<Option<Running>>,
}

impl BackgroundSync {
    pub fn new(job: Arc<dyn SyncJob>, store: Store) -> Self {
        Self {
            shared: Arc::new(Shared {
                job,
                store,
                slot: Mutex::new(()),
                status: RwLock::new(SyncStatus::default()),
            }),
            sync_on_start: true,
            fallback_hours: DEFAULT_SYNC_INTERVAL_HOURS,
            running: Mutex::new(None),
        }
    }

    pub fn with_sync_on_start(mut self, sync_on_start: bool) -> Self {
        self.sync_on_start = sync_on_start;
        self
    }

    pub fn with_fallback_interval(mut self, hours: u32) -> Self {
        self.fallback_hours = hours.max(1);
        self
    }

    /// Spawns the control loop. Must be called from within a tokio runtime.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(SchedulerError::AlreadyStarted);
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(control_loop(
            self.shared.clone(),
            cancel.clone(),
            self.sync_on_start,
            self.fallback_hours,
        ));
        *running = Some(Running { cancel, handle });
        info!(operation = "scheduler_start", "Background sync started");
        Ok(())
    }

    /// Cancels the control loop and waits for it. An in-flight sync finishes
    /// first.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().await.take() else {
            return;
        };
        running.cancel.cancel();
        if let Err(e) = running.handle.await {
            warn!(error = %e, "Scheduler task ended abnormally");
        }
        self.shared.status.write().await.next_sync_at = None;
        info!(operation = "scheduler_stop", "Background sync stopped");
    }

    /// Runs a sync now on the caller's task. Fails fast when one is running.
    pub async fn force_sync_now(&self) -> Result<SyncSummary, SchedulerError> {
        self.shared.run_guarded("manual").await
    }

    pub async fn get_sync_status(&self) -> SyncStatus {
        self.shared.status.read().await.clone()
    }
}

async fn control_loop(shared: Arc<Shared>, cancel: CancellationToken, sync_on_start: bool, fallback_hours: u32) {
    if sync_on_start {
        log_skip(shared.run_guarded("startup").await);
    }

    while !cancel.is_cancelled() {
        let hours = shared.interval_hours(fallback_hours);
        {
            let mut status = shared.status.write().await;
            status.interval_hours = hours;
            status.next_sync_at = Utc::now().checked_add_signed(chrono::Duration::hours(i64::from(hours)));
        }
        debug!(interval_hours = hours, "Next sync scheduled");

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(u64::from(hours) * 3600)) => {
                log_skip(shared.run_guarded("scheduled").await);
            }
        }
    }
}

fn log_skip(result: Result<SyncSummary, SchedulerError>) {
    if let Err(SchedulerError::AlreadyRunning) = result {
        info!("Skipping scheduled sync, one is already running");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeJob {
        runs: AtomicUsize,
        fail: AtomicBool,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl SyncJob for FakeJob {
        async fn run(&self) -> Result<SyncSummary> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("server unreachable"));
            }
            Ok(SyncSummary {
                total_movies: 3,
                ..SyncSummary::default()
            })
        }
    }

    fn store_with_interval(hours: u32) -> Store {
        let store = Store::open_in_memory().unwrap();
        let mut settings = store.get_settings().unwrap();
        settings.sync_interval_hours = hours;
        store.update_settings(&settings).unwrap();
        store
    }

    #[tokio::test]
    async fn test_force_sync_records_status() {
        let job = Arc::new(FakeJob::default());
        let scheduler = BackgroundSync::new(job.clone(), Store::open_in_memory().unwrap());

        let summary = scheduler.force_sync_now().await.unwrap();
        assert_eq!(summary.total_movies, 3);

        let status = scheduler.get_sync_status().await;
        assert!(!status.is_running);
        assert!(status.last_sync_at.is_some());
        assert_eq!(status.last_summary, Some(summary));
        assert!(status.last_error.is_none());
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_last_error_kept_until_success() {
        let job = Arc::new(FakeJob::default());
        job.fail.store(true, Ordering::SeqCst);
        let scheduler = BackgroundSync::new(job.clone(), Store::open_in_memory().unwrap());

        assert!(matches!(scheduler.force_sync_now().await, Err(SchedulerError::Sync(_))));
        let status = scheduler.get_sync_status().await;
        assert_eq!(status.last_error.as_deref(), Some("server unreachable"));
        assert!(status.last_sync_at.is_none());

        job.fail.store(false, Ordering::SeqCst);
        scheduler.force_sync_now().await.unwrap();
        assert!(scheduler.get_sync_status().await.last_error.is_none());
    }

    #[tokio::test]
    async fn test_overlapping_run_is_rejected() {
        let gate = Arc::new(Notify::new());
        let job = Arc::new(FakeJob {
            gate: Some(gate.clone()),
            ..FakeJob::default()
        });
        let scheduler = Arc::new(BackgroundSync::new(job.clone(), Store::open_in_memory().unwrap()));

        let first = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.force_sync_now().await })
        };
        while !scheduler.get_sync_status().await.is_running {
            tokio::task::yield_now().await;
        }

        assert!(matches!(scheduler.force_sync_now().await, Err(SchedulerError::AlreadyRunning)));
        gate.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_runs_follow_interval() {
        let job = Arc::new(FakeJob::default());
        let scheduler = BackgroundSync::new(job.clone(), store_with_interval(2)).with_sync_on_start(false);
        scheduler.start().await.unwrap();
        assert!(matches!(scheduler.start().await, Err(SchedulerError::AlreadyStarted)));

        tokio::time::sleep(Duration::from_secs(60)).await;
        let status = scheduler.get_sync_status().await;
        assert_eq!(status.interval_hours, 2);
        assert!(status.next_sync_at.is_some());
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2 * 3600)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);

        scheduler.stop().await;
        assert!(scheduler.get_sync_status().await.next_sync_at.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_interval_is_capped() {
        let job = Arc::new(FakeJob::default());
        let scheduler = BackgroundSync::new(job.clone(), store_with_interval(u32::MAX)).with_sync_on_start(false);
        scheduler.start().await.unwrap();

        tokio::time::sleep(Duration::from_secs(60)).await;
        let status = scheduler.get_sync_status().await;
        assert_eq!(status.interval_hours, MAX_SYNC_INTERVAL_HOURS);
        assert!(status.next_sync_at.is_some());

        tokio::time::sleep(Duration::from_secs(u64::from(MAX_SYNC_INTERVAL_HOURS) * 3600)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);

        let running = scheduler.running.lock().await.take().unwrap();
        running.cancel.cancel();
        assert!(running.handle.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_on_start() {
        let job = Arc::new(FakeJob::default());
        let scheduler = BackgroundSync::new(job.clone(), store_with_interval(12));
        scheduler.start().await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
        assert!(scheduler.get_sync_status().await.last_summary.is_some());
        scheduler.stop().await;
    }
}
