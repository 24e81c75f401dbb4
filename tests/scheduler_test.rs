use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lyrebird::application::services::{
    JobError, ServiceState, SubmitError, TranscriptionRequest, TranscriptionScheduler,
};
use lyrebird::domain::{registry, Language, ModelSpec};
use lyrebird::infrastructure::engines::{Gate, MockEngineFactory};

const QWEN_ID: &str = "mlx-community/Qwen3-ASR-1.7B-4bit";
const PARAFORMER_ID: &str =
    "iic/speech_seaco_paraformer_large_asr_nat-zh-cn-16k-common-vocab8404-pytorch";

fn temp_audio(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir
        .path()
        .join(format!("job-{}.wav", uuid::Uuid::new_v4()));
    std::fs::write(&path, b"RIFF fake audio").unwrap();
    path
}

fn request(path: PathBuf, requested_model: Option<ModelSpec>) -> TranscriptionRequest {
    TranscriptionRequest {
        temp_audio_path: path,
        language: Language::Zh,
        with_timestamp: false,
        requested_model,
        request_id: uuid::Uuid::new_v4().to_string(),
    }
}

async fn start(
    factory: MockEngineFactory,
    initial_alias: &str,
    capacity: usize,
) -> (Arc<TranscriptionScheduler>, lyrebird::infrastructure::engines::CallLog) {
    let log = Arc::clone(&factory.log);
    let initial = registry::lookup(initial_alias).unwrap();
    let scheduler = TranscriptionScheduler::start(Arc::new(factory), initial, capacity)
        .await
        .unwrap();
    (Arc::new(scheduler), log)
}

async fn wait_for_inference_start(log: &lyrebird::infrastructure::engines::CallLog) {
    for _ in 0..500 {
        if log
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.starts_with("transcribe:"))
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("worker never started inference");
}

#[tokio::test]
async fn given_successful_job_when_completed_then_temp_file_is_removed() {
    let (scheduler, _log) = start(MockEngineFactory::new(), "sensevoice-small", 4).await;
    let dir = tempfile::tempdir().unwrap();
    let path = temp_audio(&dir);

    let rx = scheduler.submit(request(path.clone(), None)).unwrap();
    let result = rx.await.unwrap();

    assert!(result.is_ok());
    assert!(!path.exists(), "temp file must be removed after delivery");
}

#[tokio::test]
async fn given_failing_inference_when_job_errors_then_worker_processes_the_next_job() {
    let factory = MockEngineFactory::new().fail_transcribe_for("iic/SenseVoiceSmall");
    let (scheduler, _log) = start(factory, "sensevoice-small", 4).await;
    let dir = tempfile::tempdir().unwrap();

    let first_path = temp_audio(&dir);
    let rx = scheduler.submit(request(first_path.clone(), None)).unwrap();
    let first = rx.await.unwrap();
    assert!(matches!(first, Err(JobError::Inference(_))));
    assert!(!first_path.exists(), "temp file must be removed on error paths");

    // The worker survived: the next job still gets a response.
    let second_path = temp_audio(&dir);
    let rx = scheduler.submit(request(second_path.clone(), None)).unwrap();
    let second = rx.await.unwrap();
    assert!(matches!(second, Err(JobError::Inference(_))));
    assert!(!second_path.exists());
    assert_eq!(scheduler.state(), ServiceState::Running);
}

#[tokio::test]
async fn given_model_switch_when_swapping_then_release_completes_before_load_begins() {
    let (scheduler, log) = start(MockEngineFactory::new(), "qwen3-asr-mini", 4).await;
    let dir = tempfile::tempdir().unwrap();

    let paraformer = registry::lookup("paraformer").unwrap();
    let rx = scheduler
        .submit(request(temp_audio(&dir), Some(paraformer)))
        .unwrap();
    let result = rx.await.unwrap().unwrap();

    assert_eq!(result.model_id, PARAFORMER_ID);
    let entries = log.lock().unwrap().clone();
    assert_eq!(
        entries,
        vec![
            format!("load:{QWEN_ID}"),
            format!("release:{QWEN_ID}"),
            format!("load:{PARAFORMER_ID}"),
            format!("transcribe:{PARAFORMER_ID}"),
        ]
    );
    assert_eq!(scheduler.current_spec().model_id, PARAFORMER_ID);
}

#[tokio::test]
async fn given_same_model_requested_when_processing_then_no_swap_is_triggered() {
    let (scheduler, log) = start(MockEngineFactory::new(), "qwen3-asr-mini", 4).await;
    let dir = tempfile::tempdir().unwrap();

    let same = registry::lookup("qwen3-asr-mini").unwrap();
    let rx = scheduler
        .submit(request(temp_audio(&dir), Some(same)))
        .unwrap();
    rx.await.unwrap().unwrap();

    let entries = log.lock().unwrap().clone();
    assert!(
        !entries.iter().any(|e| e.starts_with("release:")),
        "same-model request must not release: {entries:?}"
    );
    assert_eq!(
        entries
            .iter()
            .filter(|e| e.starts_with("load:"))
            .count(),
        1
    );
}

#[tokio::test]
async fn given_failed_load_and_failed_restore_when_swapping_then_service_degrades() {
    let factory = MockEngineFactory::new()
        .fail_load_for(PARAFORMER_ID)
        .fail_load_for_reloads(QWEN_ID);
    let (scheduler, _log) = start(factory, "qwen3-asr-mini", 4).await;
    let dir = tempfile::tempdir().unwrap();

    let paraformer = registry::lookup("paraformer").unwrap();
    let path = temp_audio(&dir);
    let rx = scheduler
        .submit(request(path.clone(), Some(paraformer)))
        .unwrap();
    let result = rx.await.unwrap();

    assert!(matches!(result, Err(JobError::SwapFailed(_))));
    assert!(!path.exists());
    assert_eq!(scheduler.state(), ServiceState::Degraded);

    // Degraded service rejects new work synchronously.
    let rejected = scheduler.submit(request(temp_audio(&dir), None));
    assert!(matches!(rejected, Err(SubmitError::Degraded)));
}

#[tokio::test]
async fn given_failed_load_with_successful_restore_when_swapping_then_service_stays_healthy() {
    let factory = MockEngineFactory::new().fail_load_for(PARAFORMER_ID);
    let (scheduler, log) = start(factory, "qwen3-asr-mini", 4).await;
    let dir = tempfile::tempdir().unwrap();

    let paraformer = registry::lookup("paraformer").unwrap();
    let rx = scheduler
        .submit(request(temp_audio(&dir), Some(paraformer)))
        .unwrap();
    assert!(matches!(rx.await.unwrap(), Err(JobError::SwapFailed(_))));
    assert_eq!(scheduler.state(), ServiceState::Running);

    // The restored engine serves the next job.
    let rx = scheduler.submit(request(temp_audio(&dir), None)).unwrap();
    let completed = rx.await.unwrap().unwrap();
    assert_eq!(completed.model_id, QWEN_ID);

    let entries = log.lock().unwrap().clone();
    assert_eq!(
        entries,
        vec![
            format!("load:{QWEN_ID}"),
            format!("release:{QWEN_ID}"),
            format!("load:{PARAFORMER_ID}"),
            format!("load:{QWEN_ID}"),
            format!("transcribe:{QWEN_ID}"),
        ]
    );
}

#[tokio::test]
async fn given_full_queue_when_submitting_then_rejection_is_synchronous() {
    let gate = Gate::closed();
    let factory = MockEngineFactory::new().with_gate(gate.clone());
    let (scheduler, log) = start(factory, "sensevoice-small", 1).await;
    let dir = tempfile::tempdir().unwrap();

    let first_path = temp_audio(&dir);
    let first = scheduler.submit(request(first_path.clone(), None)).unwrap();
    wait_for_inference_start(&log).await;

    let second_path = temp_audio(&dir);
    let second = scheduler.submit(request(second_path.clone(), None)).unwrap();

    let surplus_path = temp_audio(&dir);
    let started = Instant::now();
    let rejected = scheduler.submit(request(surplus_path.clone(), None));
    let elapsed = started.elapsed();

    assert!(matches!(rejected, Err(SubmitError::QueueFull)));
    assert!(
        elapsed < Duration::from_millis(100),
        "rejection must be synchronous, took {elapsed:?}"
    );
    // On rejection the producer still owns the temp file.
    assert!(surplus_path.exists());
    std::fs::remove_file(&surplus_path).unwrap();

    gate.open();
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    assert!(!first_path.exists());
    assert!(!second_path.exists());
}

#[tokio::test]
async fn given_disconnected_client_when_job_completes_then_result_is_discarded_not_cancelled() {
    let gate = Gate::closed();
    let factory = MockEngineFactory::new().with_gate(gate.clone());
    let (scheduler, log) = start(factory, "sensevoice-small", 4).await;
    let dir = tempfile::tempdir().unwrap();

    let path = temp_audio(&dir);
    let rx = scheduler.submit(request(path.clone(), None)).unwrap();
    wait_for_inference_start(&log).await;
    drop(rx);
    gate.open();

    // The job ran to completion anyway and the worker kept going.
    let rx = scheduler.submit(request(temp_audio(&dir), None)).unwrap();
    rx.await.unwrap().unwrap();
    assert!(!path.exists(), "abandoned job must still clean its temp file");
}

#[tokio::test]
async fn given_shutdown_when_draining_then_engine_released_and_state_stopped() {
    let (scheduler, log) = start(MockEngineFactory::new(), "sensevoice-small", 4).await;
    let dir = tempfile::tempdir().unwrap();

    let rx = scheduler.submit(request(temp_audio(&dir), None)).unwrap();
    rx.await.unwrap().unwrap();

    scheduler.shutdown().await;

    assert_eq!(scheduler.state(), ServiceState::Stopped);
    let entries = log.lock().unwrap().clone();
    assert_eq!(
        entries.last().unwrap(),
        &format!("release:{}", "iic/SenseVoiceSmall")
    );

    // New submissions after shutdown are rejected.
    let path = temp_audio(&dir);
    assert!(matches!(
        scheduler.submit(request(path, None)),
        Err(SubmitError::Stopped)
    ));
}
