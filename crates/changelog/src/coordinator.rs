//! Fan-out of per-commit work and collection of its results
//!
//! A [`RetrievalCoordinator`] is shared by a backend and the tasks it spawns.
//! It counts outstanding work, carries finished records to the caller and lets
//! any task report a fatal error. [`collect_records`] drives a backend through
//! one run and returns every record it produced, or the first fatal error.

use crate::prelude::*;
use changelog_core::change_record::ChangeRecord;
use color_eyre::eyre::Report;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

use crate::source::SourceBackend;

/// Capacity of the record queue between workers and the collector
const RECORD_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct InFlight {
    count: AtomicUsize,
    drained: Notify,
}

/// Keeps one unit of work counted as in flight until dropped
#[derive(Debug)]
pub struct WorkGuard {
    in_flight: Arc<InFlight>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        if self.in_flight.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.in_flight.drained.notify_waiters();
        }
    }
}

/// Receiving ends handed to whoever collects a run
#[derive(Debug)]
pub struct Outputs {
    pub records: mpsc::Receiver<ChangeRecord>,
    pub failures: mpsc::UnboundedReceiver<Report>,
}

#[derive(Debug, Clone)]
pub struct RetrievalCoordinator {
    in_flight: Arc<InFlight>,
    records: mpsc::Sender<ChangeRecord>,
    failures: mpsc::UnboundedSender<Report>,
}

impl RetrievalCoordinator {
    pub fn new() -> (Self, Outputs) {
        let (records_tx, records_rx) = mpsc::channel(RECORD_QUEUE_CAPACITY);
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();

        let coordinator = Self {
            in_flight: Arc::new(InFlight::default()),
            records: records_tx,
            failures: failures_tx,
        };
        let outputs = Outputs {
            records: records_rx,
            failures: failures_rx,
        };
        (coordinator, outputs)
    }

    /// Count a unit of work as started. It completes when the guard is dropped.
    pub fn track(&self) -> WorkGuard {
        self.in_flight.count.fetch_add(1, Ordering::AcqRel);
        WorkGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Number of units of work not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::Acquire)
    }

    /// Run `task` concurrently and forward the record it yields, if any.
    ///
    /// The task is counted before this returns and stays counted until its
    /// record has been queued.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Option<ChangeRecord>> + Send + 'static,
    {
        let guard = self.track();
        let records = self.records.clone();

        tokio::spawn(async move {
            let _guard = guard;
            if let Some(record) = task.await {
                if records.send(record).await.is_err() {
                    log::debug!("Record queue closed, discarding record");
                }
            }
        });
    }

    /// Abort the run with `err`
    pub fn report_fatal(&self, err: Report) {
        if self.failures.send(err).is_err() {
            log::debug!("Failure queue closed, fatal error dropped");
        }
    }

    /// Resolves once no work is in flight
    pub async fn completed(&self) {
        loop {
            let drained = self.in_flight.drained.notified();
            if self.in_flight() == 0 {
                return;
            }
            drained.await;
        }
    }
}

/// Run `backend` over `from..to` and gather every record it emits.
///
/// The first error wins, whether it comes from scheduling or from a spawned
/// task. Records already in the queue when work completes are still returned.
pub async fn collect_records<B: SourceBackend>(
    backend: &B,
    from: &str,
    to: &str,
) -> Result<Vec<ChangeRecord>> {
    let (coordinator, mut outputs) = RetrievalCoordinator::new();
    let mut records = Vec::new();

    // Scheduling itself counts as work so completion cannot fire before the
    // backend has spawned everything.
    let mut scheduling = Some(coordinator.track());
    let process = backend.process(&coordinator, from, to);
    tokio::pin!(process);

    loop {
        tokio::select! {
            result = &mut process, if scheduling.is_some() => {
                result?;
                scheduling = None;
            }
            Some(err) = outputs.failures.recv() => {
                return Err(err);
            }
            Some(record) = outputs.records.recv() => {
                records.push(record);
            }
            _ = coordinator.completed() => {
                break;
            }
        }
    }

    if let Ok(err) = outputs.failures.try_recv() {
        return Err(err);
    }

    outputs.records.close();
    while let Some(record) = outputs.records.recv().await {
        records.push(record);
    }

    log::debug!("Collected {} records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn record(title: &str) -> ChangeRecord {
        ChangeRecord {
            message: Some(title.to_string()),
            ..Default::default()
        }
    }

    /// Spawns one task per title, each finishing after a staggered delay
    struct StaggeredBackend {
        titles: Vec<&'static str>,
    }

    impl SourceBackend for StaggeredBackend {
        async fn process(
            &self,
            coordinator: &RetrievalCoordinator,
            _from: &str,
            _to: &str,
        ) -> Result<()> {
            for (i, title) in self.titles.iter().enumerate() {
                let title = *title;
                coordinator.spawn(async move {
                    tokio::time::sleep(Duration::from_millis(5 * (i as u64 % 3))).await;
                    (title != "skip").then(|| record(title))
                });
            }
            Ok(())
        }
    }

    struct FailingBackend;

    impl SourceBackend for FailingBackend {
        async fn process(
            &self,
            coordinator: &RetrievalCoordinator,
            _from: &str,
            _to: &str,
        ) -> Result<()> {
            coordinator.spawn(async { Some(record("early")) });
            Err(eyre!("compare failed"))
        }
    }

    struct ReportingBackend;

    impl SourceBackend for ReportingBackend {
        async fn process(
            &self,
            coordinator: &RetrievalCoordinator,
            _from: &str,
            _to: &str,
        ) -> Result<()> {
            let worker = coordinator.clone();
            let guard = coordinator.track();
            tokio::spawn(async move {
                let _guard = guard;
                tokio::time::sleep(Duration::from_millis(10)).await;
                worker.report_fatal(eyre!("worker failed"));
            });
            coordinator.spawn(async { Some(record("kept")) });
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_collects_every_record() {
        let backend = StaggeredBackend {
            titles: vec!["a", "b", "skip", "c", "d", "e", "f", "g"],
        };
        let records = collect_records(&backend, "v1", "v2").await.unwrap();

        let mut titles: Vec<&str> = records.iter().map(|r| r.title()).collect();
        titles.sort();
        assert_eq!(titles, vec!["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[tokio::test]
    async fn test_more_records_than_queue_capacity() {
        let titles: Vec<&'static str> = (0..RECORD_QUEUE_CAPACITY * 3).map(|_| "x").collect();
        let backend = StaggeredBackend { titles };
        let records = collect_records(&backend, "v1", "v2").await.unwrap();
        assert_eq!(records.len(), RECORD_QUEUE_CAPACITY * 3);
    }

    #[tokio::test]
    async fn test_empty_run_completes() {
        let backend = StaggeredBackend { titles: vec![] };
        let records = collect_records(&backend, "v1", "v2").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_scheduling_error_aborts() {
        let err = collect_records(&FailingBackend, "v1", "v2").await.unwrap_err();
        assert_eq!(err.to_string(), "compare failed");
    }

    #[tokio::test]
    async fn test_reported_failure_aborts() {
        let err = collect_records(&ReportingBackend, "v1", "v2")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "worker failed");
    }

    #[tokio::test]
    async fn test_guard_tracks_in_flight() {
        let (coordinator, _outputs) = RetrievalCoordinator::new();
        let first = coordinator.track();
        let second = coordinator.track();
        assert_eq!(coordinator.in_flight(), 2);

        drop(first);
        assert_eq!(coordinator.in_flight(), 1);
        drop(second);

        tokio::time::timeout(Duration::from_secs(1), coordinator.completed())
            .await
            .unwrap();
    }
}
