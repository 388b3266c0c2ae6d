//! Conversion queue: bounded channel of record ids, worker pool and dead-letter channel.
//!
//! Submission never blocks the caller. When the channel is full the record is marked
//! failed and a [`DeadLetter`] is emitted instead. [`ConversionQueue::shutdown`] stops the
//! pool from taking new work and waits for conversions already running.

use std::fmt;
use std::sync::Arc;

use intake_core::models::ConversionOutcome;
use intake_core::AppError;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::context::ConversionHandler;

/// Error recorded on a record that could not be queued.
pub const QUEUE_FULL_MESSAGE: &str = "conversion queue is full";

const SHUTDOWN_MESSAGE: &str = "conversion queue shut down before the record was converted";

#[derive(Debug, Clone)]
pub struct ConversionQueueConfig {
    pub max_workers: usize,
    /// Record ids that may wait for a free worker.
    pub capacity: usize,
}

impl Default for ConversionQueueConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadLetterReason {
    /// Rejected at submission because the channel was full.
    QueueFull,
    /// Submitted after shutdown, or still waiting when shutdown happened.
    QueueClosed,
    /// The normalizer failed; the error is on the record.
    ConversionFailed,
    /// The outcome could not be written back.
    WriteBackFailed,
}

impl fmt::Display for DeadLetterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeadLetterReason::QueueFull => "queue_full",
            DeadLetterReason::QueueClosed => "queue_closed",
            DeadLetterReason::ConversionFailed => "conversion_failed",
            DeadLetterReason::WriteBackFailed => "write_back_failed",
        };
        f.write_str(s)
    }
}

/// A record whose conversion did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetter {
    pub record_id: Uuid,
    pub reason: DeadLetterReason,
    pub error: String,
}

pub type DeadLetterReceiver = mpsc::UnboundedReceiver<DeadLetter>;

#[derive(Clone)]
pub struct ConversionQueue {
    jobs_tx: mpsc::Sender<Uuid>,
    shutdown_tx: mpsc::Sender<()>,
    dead_letters: mpsc::UnboundedSender<DeadLetter>,
    handler: Arc<dyn ConversionHandler>,
    semaphore: Arc<Semaphore>,
    config: ConversionQueueConfig,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ConversionQueue {
    /// Start the worker pool. Dead letters are delivered on the returned receiver.
    pub fn new(
        config: ConversionQueueConfig,
        handler: Arc<dyn ConversionHandler>,
    ) -> (Self, DeadLetterReceiver) {
        let (jobs_tx, jobs_rx) = mpsc::channel(config.capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (dead_letters, dead_letter_rx) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(config.max_workers.max(1)));

        let worker = tokio::spawn(Self::worker_pool(
            jobs_rx,
            shutdown_rx,
            semaphore.clone(),
            handler.clone(),
            dead_letters.clone(),
            config.max_workers,
        ));

        let queue = Self {
            jobs_tx,
            shutdown_tx,
            dead_letters,
            handler,
            semaphore,
            config,
            worker: Arc::new(Mutex::new(Some(worker))),
        };
        (queue, dead_letter_rx)
    }

    pub fn config(&self) -> &ConversionQueueConfig {
        &self.config
    }

    /// Queue `record_id` for conversion without waiting for room.
    #[tracing::instrument(skip(self), fields(record_id = %record_id))]
    pub async fn submit(&self, record_id: Uuid) -> Result<(), AppError> {
        match self.jobs_tx.try_send(record_id) {
            Ok(()) => {
                tracing::debug!("Record queued for conversion");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    capacity = self.config.capacity,
                    "Conversion queue full, rejecting record"
                );
                if let Err(e) = self.handler.record_failure(record_id, QUEUE_FULL_MESSAGE).await {
                    tracing::error!(error = %e, "Failed to record queue rejection");
                }
                self.dead_letter(record_id, DeadLetterReason::QueueFull, QUEUE_FULL_MESSAGE);
                Err(AppError::QueueFull(format!(
                    "record {} was not queued",
                    record_id
                )))
            }
            Err(TrySendError::Closed(_)) => {
                self.dead_letter(record_id, DeadLetterReason::QueueClosed, SHUTDOWN_MESSAGE);
                Err(AppError::Internal(
                    "conversion queue is shut down".to_string(),
                ))
            }
        }
    }

    /// Stop taking work and wait until running conversions have finished.
    ///
    /// Records still waiting in the channel are not converted; each one becomes a
    /// dead letter.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating conversion queue shutdown");
        let _ = self.shutdown_tx.try_send(());

        if let Some(worker) = self.worker.lock().await.take() {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Conversion worker pool panicked");
            }
        }

        // Every permit back means no conversion is running.
        match self
            .semaphore
            .acquire_many(self.config.max_workers.max(1) as u32)
            .await
        {
            Ok(_permits) => tracing::info!("Conversion queue drained"),
            Err(e) => tracing::warn!(error = %e, "Conversion semaphore closed"),
        }
    }

    fn dead_letter(&self, record_id: Uuid, reason: DeadLetterReason, error: &str) {
        Self::emit(&self.dead_letters, record_id, reason, error.to_string());
    }

    fn emit(
        dead_letters: &mpsc::UnboundedSender<DeadLetter>,
        record_id: Uuid,
        reason: DeadLetterReason,
        error: String,
    ) {
        tracing::debug!(
            record_id = %record_id,
            reason = %reason,
            "Conversion dead-lettered"
        );
        if let Err(mpsc::error::SendError(letter)) = dead_letters.send(DeadLetter {
            record_id,
            reason,
            error,
        }) {
            tracing::warn!(
                record_id = %letter.record_id,
                reason = %letter.reason,
                error = %letter.error,
                "Dead letter dropped, no receiver"
            );
        }
    }

    async fn worker_pool(
        mut jobs_rx: mpsc::Receiver<Uuid>,
        mut shutdown_rx: mpsc::Receiver<()>,
        semaphore: Arc<Semaphore>,
        handler: Arc<dyn ConversionHandler>,
        dead_letters: mpsc::UnboundedSender<DeadLetter>,
        max_workers: usize,
    ) {
        tracing::info!(max_workers, "Conversion worker pool started");

        loop {
            let permit = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let record_id = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                job = jobs_rx.recv() => match job {
                    Some(record_id) => record_id,
                    None => break,
                },
            };

            let handler = handler.clone();
            let dead_letters = dead_letters.clone();
            tokio::spawn(async move {
                let _permit = permit;
                Self::process(record_id, handler.as_ref(), &dead_letters).await;
            });
        }

        jobs_rx.close();
        while let Ok(record_id) = jobs_rx.try_recv() {
            Self::emit(
                &dead_letters,
                record_id,
                DeadLetterReason::QueueClosed,
                SHUTDOWN_MESSAGE.to_string(),
            );
        }

        tracing::info!("Conversion worker pool stopped");
    }

    #[tracing::instrument(skip(handler, dead_letters), fields(record_id = %record_id))]
    async fn process(
        record_id: Uuid,
        handler: &dyn ConversionHandler,
        dead_letters: &mpsc::UnboundedSender<DeadLetter>,
    ) {
        match handler.convert(record_id).await {
            Ok(ConversionOutcome::Converted(_)) => {}
            Ok(ConversionOutcome::Failed { reason }) => {
                Self::emit(
                    dead_letters,
                    record_id,
                    DeadLetterReason::ConversionFailed,
                    reason,
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Conversion outcome could not be stored");
                Self::emit(
                    dead_letters,
                    record_id,
                    DeadLetterReason::WriteBackFailed,
                    e.to_string(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use intake_core::models::{ConvertedFile, ImageMetadata, NormalizedMetadata};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;

    #[derive(Clone, Copy)]
    enum Mode {
        Convert,
        Fail,
        Error,
    }

    struct TestHandler {
        mode: Mode,
        gate: Semaphore,
        active: AtomicUsize,
        peak: AtomicUsize,
        started: mpsc::UnboundedSender<Uuid>,
        done: mpsc::UnboundedSender<Uuid>,
        failures: std::sync::Mutex<Vec<(Uuid, String)>>,
    }

    struct Harness {
        handler: Arc<TestHandler>,
        started: mpsc::UnboundedReceiver<Uuid>,
        done: mpsc::UnboundedReceiver<Uuid>,
    }

    fn harness(mode: Mode, open: bool) -> Harness {
        let (started_tx, started) = mpsc::unbounded_channel();
        let (done_tx, done) = mpsc::unbounded_channel();
        let handler = Arc::new(TestHandler {
            mode,
            gate: Semaphore::new(if open { Semaphore::MAX_PERMITS } else { 0 }),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: started_tx,
            done: done_tx,
            failures: std::sync::Mutex::new(Vec::new()),
        });
        Harness {
            handler,
            started,
            done,
        }
    }

    fn converted() -> ConversionOutcome {
        ConversionOutcome::Converted(ConvertedFile {
            file_path: "processed/x/1.jpg".to_string(),
            file_name: "1.jpg".to_string(),
            size: 10,
            metadata: NormalizedMetadata::Image(ImageMetadata {
                width: 1,
                height: 1,
                color_space: "RGB".to_string(),
                compression: "JPEG".to_string(),
                dpi: 72,
                has_alpha: false,
            }),
        })
    }

    #[async_trait]
    impl ConversionHandler for TestHandler {
        async fn convert(&self, record_id: Uuid) -> Result<ConversionOutcome, AppError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let _ = self.started.send(record_id);

            self.gate.acquire().await.unwrap().forget();

            self.active.fetch_sub(1, Ordering::SeqCst);
            let _ = self.done.send(record_id);
            match self.mode {
                Mode::Convert => Ok(converted()),
                Mode::Fail => Ok(ConversionOutcome::failed("failed to decode image: bad")),
                Mode::Error => Err(AppError::Internal("store unavailable".to_string())),
            }
        }

        async fn record_failure(&self, record_id: Uuid, reason: &str) -> Result<(), AppError> {
            self.failures
                .lock()
                .unwrap()
                .push((record_id, reason.to_string()));
            Ok(())
        }
    }

    async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_worker_count_is_bounded() {
        let mut h = harness(Mode::Convert, false);
        let (queue, _dead) = ConversionQueue::new(
            ConversionQueueConfig {
                max_workers: 2,
                capacity: 16,
            },
            h.handler.clone(),
        );

        for _ in 0..6 {
            queue.submit(Uuid::new_v4()).await.unwrap();
        }
        next(&mut h.started).await;
        next(&mut h.started).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.handler.active.load(Ordering::SeqCst), 2);

        h.handler.gate.add_permits(6);
        for _ in 0..6 {
            next(&mut h.done).await;
        }
        assert_eq!(h.handler.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_full_queue_marks_record_and_dead_letters() {
        let mut h = harness(Mode::Convert, false);
        let (queue, mut dead) = ConversionQueue::new(
            ConversionQueueConfig {
                max_workers: 1,
                capacity: 1,
            },
            h.handler.clone(),
        );

        let running = Uuid::new_v4();
        queue.submit(running).await.unwrap();
        assert_eq!(next(&mut h.started).await, running);

        queue.submit(Uuid::new_v4()).await.unwrap();
        let rejected = Uuid::new_v4();
        let result = queue.submit(rejected).await;
        assert!(matches!(result, Err(AppError::QueueFull(_))));

        assert_eq!(
            h.handler.failures.lock().unwrap().clone(),
            vec![(rejected, QUEUE_FULL_MESSAGE.to_string())]
        );
        assert_eq!(
            next(&mut dead).await,
            DeadLetter {
                record_id: rejected,
                reason: DeadLetterReason::QueueFull,
                error: QUEUE_FULL_MESSAGE.to_string(),
            }
        );

        h.handler.gate.add_permits(2);
        next(&mut h.done).await;
        next(&mut h.done).await;
    }

    #[tokio::test]
    async fn test_failed_conversion_is_dead_lettered() {
        let h = harness(Mode::Fail, true);
        let (queue, mut dead) = ConversionQueue::new(ConversionQueueConfig::default(), h.handler);

        let id = Uuid::new_v4();
        queue.submit(id).await.unwrap();

        let letter = next(&mut dead).await;
        assert_eq!(letter.record_id, id);
        assert_eq!(letter.reason, DeadLetterReason::ConversionFailed);
        assert_eq!(letter.error, "failed to decode image: bad");
    }

    #[tokio::test]
    async fn test_write_back_failure_is_dead_lettered() {
        let h = harness(Mode::Error, true);
        let (queue, mut dead) = ConversionQueue::new(ConversionQueueConfig::default(), h.handler);

        let id = Uuid::new_v4();
        queue.submit(id).await.unwrap();

        let letter = next(&mut dead).await;
        assert_eq!(letter.reason, DeadLetterReason::WriteBackFailed);
        assert!(letter.error.contains("store unavailable"));
    }

    #[tokio::test]
    async fn test_successful_conversion_emits_nothing() {
        let mut h = harness(Mode::Convert, true);
        let (queue, mut dead) =
            ConversionQueue::new(ConversionQueueConfig::default(), h.handler.clone());

        queue.submit(Uuid::new_v4()).await.unwrap();
        next(&mut h.done).await;
        queue.shutdown().await;
        assert!(dead.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_running_conversion() {
        let mut h = harness(Mode::Convert, false);
        let (queue, mut dead) = ConversionQueue::new(
            ConversionQueueConfig {
                max_workers: 1,
                capacity: 4,
            },
            h.handler.clone(),
        );

        let running = Uuid::new_v4();
        queue.submit(running).await.unwrap();
        next(&mut h.started).await;
        let waiting = Uuid::new_v4();
        queue.submit(waiting).await.unwrap();

        let stopping = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.shutdown().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!stopping.is_finished());

        h.handler.gate.add_permits(1);
        timeout(Duration::from_secs(5), stopping)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next(&mut h.done).await, running);

        let letter = next(&mut dead).await;
        assert_eq!(letter.record_id, waiting);
        assert_eq!(letter.reason, DeadLetterReason::QueueClosed);

        let late = Uuid::new_v4();
        assert!(queue.submit(late).await.is_err());
        assert_eq!(next(&mut dead).await.reason, DeadLetterReason::QueueClosed);
    }

    #[test]
    fn test_dead_letter_reason_display() {
        assert_eq!(DeadLetterReason::QueueFull.to_string(), "queue_full");
        assert_eq!(
            DeadLetterReason::WriteBackFailed.to_string(),
            "write_back_failed"
        );
    }
}
