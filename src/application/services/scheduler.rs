//! Bounded FIFO queue with a single dedicated consumer.
//!
//! All engine mutation (load, release, transcribe) happens on one OS
//! thread that owns the engine exclusively. Producers only enqueue;
//! a full queue rejects synchronously instead of blocking. Model
//! hot-swap follows release-before-load: unified memory cannot hold
//! two models at once.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;
use std::time::Instant;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::application::ports::{AsrEngine, EngineError, EngineFactory, TranscribeOptions};
use crate::domain::{Language, ModelSpec, Transcript};

/// A fully-validated unit of work. The temp file is owned by the
/// producer until enqueue succeeds, and by the worker afterwards.
#[derive(Debug)]
pub struct TranscriptionRequest {
    pub temp_audio_path: PathBuf,
    pub language: Language,
    pub with_timestamp: bool,
    /// `None` means "keep the current model" (no switch).
    pub requested_model: Option<ModelSpec>,
    pub request_id: String,
}

/// A successful job outcome: the transcript plus the model that
/// actually produced it (relevant after a hot-swap).
#[derive(Debug)]
pub struct CompletedTranscription {
    pub transcript: Transcript,
    pub model_id: String,
}

pub type JobReceiver = oneshot::Receiver<Result<CompletedTranscription, JobError>>;
type JobSender = oneshot::Sender<Result<CompletedTranscription, JobError>>;

/// Errors delivered through a job's completion channel.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("model load failed")]
    SwapFailed(#[source] EngineError),
    #[error("transcription failed")]
    Inference(#[source] EngineError),
    #[error("service is degraded; manual restart required")]
    Degraded,
}

/// Errors returned synchronously from `submit`.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("server is busy: queue is full")]
    QueueFull,
    #[error("service is degraded; manual restart required")]
    Degraded,
    #[error("service is shutting down")]
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("initial model load failed")]
    InitialLoad(#[source] EngineError),
    #[error("worker exited before becoming ready")]
    WorkerGone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Running,
    Degraded,
    Stopping,
    Stopped,
}

impl ServiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Degraded => "degraded",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Running,
            1 => Self::Degraded,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Degraded => 1,
            Self::Stopping => 2,
            Self::Stopped => 3,
        }
    }
}

struct TranscriptionJob {
    request: TranscriptionRequest,
    completion: JobSender,
    received_at: Instant,
}

enum WorkerMessage {
    Job(Box<TranscriptionJob>),
    Shutdown,
}

/// State the worker publishes for producers and the models endpoints.
/// Readers snapshot; only the worker writes.
struct SchedulerShared {
    current_spec: RwLock<ModelSpec>,
    state: AtomicU8,
    queue_depth: AtomicUsize,
    max_queue_size: usize,
}

impl SchedulerShared {
    fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: ServiceState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }
}

pub struct TranscriptionScheduler {
    sender: mpsc::Sender<WorkerMessage>,
    shared: Arc<SchedulerShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TranscriptionScheduler {
    /// Spawn the worker thread, create and load the initial engine on
    /// it, and return once the model is in memory. Engine mutation
    /// never happens anywhere else.
    pub async fn start(
        factory: Arc<dyn EngineFactory>,
        initial_spec: ModelSpec,
        max_queue_size: usize,
    ) -> Result<Self, SchedulerError> {
        let (sender, receiver) = mpsc::channel(max_queue_size);
        let shared = Arc::new(SchedulerShared {
            current_spec: RwLock::new(initial_spec.clone()),
            state: AtomicU8::new(ServiceState::Running.as_u8()),
            queue_depth: AtomicUsize::new(0),
            max_queue_size,
        });
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), EngineError>>();

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("transcription-worker".to_string())
            .spawn(move || {
                let mut engine = factory.create(&initial_spec);
                if let Err(e) = engine.load() {
                    let _ = ready_tx.send(Err(e));
                    worker_shared.set_state(ServiceState::Stopped);
                    return;
                }
                let _ = ready_tx.send(Ok(()));
                Worker {
                    engine,
                    current_spec: initial_spec,
                    factory,
                    receiver,
                    shared: worker_shared,
                }
                .run();
            })?;

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(SchedulerError::InitialLoad(e)),
            Err(_) => return Err(SchedulerError::WorkerGone),
        }

        tracing::info!(queue_capacity = max_queue_size, "transcription worker started");

        Ok(Self {
            sender,
            shared,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Enqueue a job and return the channel the caller awaits. Never
    /// blocks: a full queue is an immediate `QueueFull`, and on any
    /// error the caller keeps ownership of the temp file.
    pub fn submit(&self, request: TranscriptionRequest) -> Result<JobReceiver, SubmitError> {
        match self.shared.state() {
            ServiceState::Running => {}
            ServiceState::Degraded => return Err(SubmitError::Degraded),
            ServiceState::Stopping | ServiceState::Stopped => return Err(SubmitError::Stopped),
        }

        let (completion, rx) = oneshot::channel();
        let job = Box::new(TranscriptionJob {
            request,
            completion,
            received_at: Instant::now(),
        });

        // Incremented before the send so the worker's decrement can
        // never observe the counter at zero.
        self.shared.queue_depth.fetch_add(1, Ordering::SeqCst);
        match self.sender.try_send(WorkerMessage::Job(job)) {
            Ok(()) => Ok(rx),
            Err(e) => {
                self.shared.queue_depth.fetch_sub(1, Ordering::SeqCst);
                match e {
                    TrySendError::Full(_) => Err(SubmitError::QueueFull),
                    TrySendError::Closed(_) => Err(SubmitError::Stopped),
                }
            }
        }
    }

    /// Snapshot of the spec the worker currently runs. Read-only;
    /// a swap replaces the whole value atomically.
    pub fn current_spec(&self) -> ModelSpec {
        self.shared
            .current_spec
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn state(&self) -> ServiceState {
        self.shared.state()
    }

    pub fn queue_depth(&self) -> usize {
        self.shared.queue_depth.load(Ordering::SeqCst)
    }

    pub fn max_queue_size(&self) -> usize {
        self.shared.max_queue_size
    }

    /// Graceful stop: reject new submissions, let the worker drain
    /// everything already queued, then release the engine.
    pub async fn shutdown(&self) {
        self.shared.set_state(ServiceState::Stopping);
        if self.sender.send(WorkerMessage::Shutdown).await.is_err() {
            return;
        }
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = tokio::task::spawn_blocking(move || handle.join()).await;
        }
        tracing::info!("transcription scheduler stopped");
    }
}

struct Worker {
    engine: Box<dyn AsrEngine>,
    current_spec: ModelSpec,
    factory: Arc<dyn EngineFactory>,
    receiver: mpsc::Receiver<WorkerMessage>,
    shared: Arc<SchedulerShared>,
}

impl Worker {
    fn run(mut self) {
        while let Some(message) = self.receiver.blocking_recv() {
            match message {
                WorkerMessage::Job(job) => self.process(*job),
                WorkerMessage::Shutdown => break,
            }
        }
        self.engine.release();
        self.shared.set_state(ServiceState::Stopped);
        tracing::info!("transcription worker stopped");
    }

    fn process(&mut self, job: TranscriptionJob) {
        self.shared.queue_depth.fetch_sub(1, Ordering::SeqCst);

        let request_id = job.request.request_id.clone();
        let queue_time_ms = job.received_at.elapsed().as_millis() as u64;
        let inference_start = Instant::now();

        let result = self.execute(&job.request);

        let inference_time_ms = inference_start.elapsed().as_millis() as u64;
        let total_time_ms = job.received_at.elapsed().as_millis() as u64;

        // The temp file dies with the job, success or not, before the
        // worker touches the next one.
        if let Err(e) = std::fs::remove_file(&job.request.temp_audio_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    request_id = %request_id,
                    error = %e,
                    "failed to remove temp audio file"
                );
            }
        }

        match &result {
            Ok(_) => tracing::info!(
                request_id = %request_id,
                queue_time_ms,
                inference_time_ms,
                total_time_ms,
                "transcription completed"
            ),
            Err(e) => tracing::error!(
                request_id = %request_id,
                error = %e,
                queue_time_ms,
                total_time_ms,
                "transcription failed"
            ),
        }

        if job.completion.send(result).is_err() {
            tracing::warn!(request_id = %request_id, "client gone, discarding result");
        }
    }

    fn execute(
        &mut self,
        request: &TranscriptionRequest,
    ) -> Result<CompletedTranscription, JobError> {
        if self.shared.state() == ServiceState::Degraded {
            return Err(JobError::Degraded);
        }

        if let Some(requested) = &request.requested_model {
            if *requested != self.current_spec {
                self.swap_engine(requested, &request.request_id)?;
            }
        }

        let opts = TranscribeOptions {
            language: request.language,
            with_timestamp: request.with_timestamp,
        };
        let transcript = self
            .engine
            .transcribe(&request.temp_audio_path, &opts)
            .map_err(JobError::Inference)?;

        Ok(CompletedTranscription {
            transcript,
            model_id: self.current_spec.model_id.clone(),
        })
    }

    /// Hot-swap: release the old engine, then create and load the new
    /// one. Release-first is the one hard memory contract; the two
    /// models must never coexist.
    fn swap_engine(&mut self, requested: &ModelSpec, request_id: &str) -> Result<(), JobError> {
        tracing::info!(
            request_id,
            from = %self.current_spec.alias,
            to = %requested.alias,
            "switching model"
        );
        let switch_start = Instant::now();

        self.engine.release();

        let mut next = self.factory.create(requested);
        if let Err(load_err) = next.load() {
            tracing::error!(
                request_id,
                error = %load_err,
                model = %requested.model_id,
                "new engine load failed, restoring previous model"
            );
            let mut previous = self.factory.create(&self.current_spec);
            match previous.load() {
                Ok(()) => {
                    self.engine = previous;
                    tracing::info!(
                        request_id,
                        model = %self.current_spec.alias,
                        "previous engine restored"
                    );
                }
                Err(restore_err) => {
                    self.shared.set_state(ServiceState::Degraded);
                    tracing::error!(
                        request_id,
                        load_error = %load_err,
                        restore_error = %restore_err,
                        "model switch and recovery both failed, service degraded until restart"
                    );
                }
            }
            return Err(JobError::SwapFailed(load_err));
        }

        self.engine = next;
        self.current_spec = requested.clone();
        *self
            .shared
            .current_spec
            .write()
            .unwrap_or_else(|e| e.into_inner()) = requested.clone();

        tracing::info!(
            request_id,
            model = %requested.alias,
            elapsed_ms = switch_start.elapsed().as_millis() as u64,
            "model switch complete"
        );
        Ok(())
    }
}
