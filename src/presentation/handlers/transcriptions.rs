//! `POST /v1/audio/transcriptions` — the OpenAI-compatible upload
//! endpoint. Parses the multipart form, spools the audio to a temp
//! file, runs admission, enqueues the job, and serializes the result.

use std::path::PathBuf;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use tokio::io::AsyncWriteExt;

use crate::application::services::admission::{self, AdmissionError};
use crate::application::services::{JobError, SubmitError, TranscriptionRequest};
use crate::domain::OutputFormat;
use crate::infrastructure::formatting::{format_srt, format_txt};
use crate::infrastructure::observability::RequestId;
use crate::presentation::state::AppState;

use super::openai_types::{ErrorResponse, SegmentDto, TranscriptionResponse};

#[derive(Default)]
struct UploadForm {
    audio: Option<SpooledAudio>,
    model: Option<String>,
    language: Option<String>,
    output_format: Option<String>,
    response_format: Option<String>,
    with_timestamp: Option<String>,
}

/// An upload persisted to disk. Owned by the handler until the job is
/// accepted by the scheduler, then by the worker.
struct SpooledAudio {
    path: PathBuf,
    size_bytes: u64,
}

impl SpooledAudio {
    async fn discard(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, "failed to remove rejected upload");
            }
        }
    }
}

pub async fn create_transcription_handler(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    mut multipart: Multipart,
) -> Response {
    let mut form = UploadForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read multipart body");
                if let Some(audio) = form.audio.take() {
                    audio.discard().await;
                }
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Failed to read multipart body",
                    "invalid_request_error",
                );
            }
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                if let Some(previous) = form.audio.take() {
                    previous.discard().await;
                }
                let content_type = field.content_type().map(str::to_string);
                let filename = field.file_name().map(str::to_string);

                // Media type is checked before a single byte is spooled.
                if let Err(e) = state
                    .admission
                    .check_media_type(content_type.as_deref(), filename.as_deref())
                {
                    tracing::warn!(
                        content_type = content_type.as_deref().unwrap_or("none"),
                        filename = filename.as_deref().unwrap_or("none"),
                        "rejecting unsupported upload"
                    );
                    return admission_rejection(e);
                }

                match spool_audio(field, filename.as_deref(), &state).await {
                    Ok(audio) => form.audio = Some(audio),
                    Err(SpoolFailure::Admission(e)) => return admission_rejection(e),
                    Err(SpoolFailure::Io(message)) => {
                        tracing::error!(error = %message, "failed to spool upload");
                        return error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            format!("Internal server error occurred. (Request ID: {})", request_id),
                            "server_error",
                        );
                    }
                }
            }
            "model" | "language" | "output_format" | "response_format" | "with_timestamp" => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!(field = %name, error = %e, "unreadable form field");
                        if let Some(audio) = form.audio.take() {
                            audio.discard().await;
                        }
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Unreadable form field: {}", name),
                            "invalid_request_error",
                        );
                    }
                };
                match name.as_str() {
                    "model" => form.model = Some(value),
                    "language" => form.language = Some(value),
                    "output_format" => form.output_format = Some(value),
                    "response_format" => form.response_format = Some(value),
                    _ => form.with_timestamp = Some(value),
                }
            }
            _ => {}
        }
    }

    let Some(audio) = form.audio.take() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "No file uploaded",
            "invalid_request_error",
        );
    };

    // Size of the persisted file, never of an in-memory buffer.
    let size_bytes = tokio::fs::metadata(&audio.path)
        .await
        .map(|m| m.len())
        .unwrap_or(audio.size_bytes);
    if let Err(e) = state.admission.check_size(size_bytes) {
        audio.discard().await;
        return admission_rejection(e);
    }

    let validated = validate_params(&form, &state);
    let (requested_model, output_format, language, with_timestamp) = match validated {
        Ok(v) => v,
        Err(e) => {
            audio.discard().await;
            return admission_rejection(e);
        }
    };

    let capabilities = match &requested_model {
        Some(spec) => spec.capabilities,
        None => state.scheduler.current_spec().capabilities,
    };
    let effective_language = admission::effective_language(language, &capabilities);

    tracing::info!(
        size_mb = size_bytes / (1024 * 1024),
        format = %output_format,
        language = %effective_language,
        model = requested_model.as_ref().map(|s| s.alias.as_str()).unwrap_or("current"),
        "transcription request accepted"
    );

    let request = TranscriptionRequest {
        temp_audio_path: audio.path.clone(),
        language: effective_language,
        with_timestamp,
        requested_model,
        request_id: request_id.clone(),
    };

    let receiver = match state.scheduler.submit(request) {
        Ok(receiver) => receiver,
        Err(e) => {
            audio.discard().await;
            return match e {
                SubmitError::QueueFull => error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Server is busy (queue full). Please try again later.",
                    "server_busy",
                ),
                SubmitError::Degraded => degraded_response(),
                SubmitError::Stopped => error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service is shutting down.",
                    "server_busy",
                ),
            };
        }
    };

    // From here on the worker owns the temp file.
    let completed = match receiver.await {
        Ok(Ok(completed)) => completed,
        Ok(Err(JobError::Degraded)) => return degraded_response(),
        Ok(Err(e @ JobError::SwapFailed(_))) => {
            tracing::error!(error = %e, "job failed during model switch");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Model load failed. (Request ID: {})", request_id),
                "server_error",
            );
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "job failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error occurred. (Request ID: {})", request_id),
                "server_error",
            );
        }
        Err(_) => {
            tracing::error!("worker dropped the job without a result");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error occurred. (Request ID: {})", request_id),
                "server_error",
            );
        }
    };

    let transcript = &completed.transcript;
    match output_format {
        OutputFormat::Srt => {
            let segments = transcript.segments.as_deref().unwrap_or(&[]);
            (StatusCode::OK, format_srt(segments)).into_response()
        }
        OutputFormat::Txt => {
            (StatusCode::OK, format_txt(transcript, with_timestamp)).into_response()
        }
        OutputFormat::Json => {
            let language = transcript.language.clone().unwrap_or_else(|| {
                match effective_language {
                    crate::domain::Language::Auto => "zh".to_string(),
                    other => other.as_str().to_string(),
                }
            });
            (
                StatusCode::OK,
                Json(TranscriptionResponse {
                    text: transcript.text.clone(),
                    duration: transcript.duration,
                    language: Some(language),
                    model: completed.model_id,
                    segments: transcript
                        .segments
                        .as_ref()
                        .map(|s| s.iter().map(SegmentDto::from).collect()),
                }),
            )
                .into_response()
        }
    }
}

type ValidatedParams = (
    Option<crate::domain::ModelSpec>,
    OutputFormat,
    crate::domain::Language,
    bool,
);

fn validate_params(form: &UploadForm, state: &AppState) -> Result<ValidatedParams, AdmissionError> {
    let requested_model = admission::resolve_requested_model(form.model.as_deref())?;
    let output_format = admission::resolve_output_format(
        form.output_format.as_deref(),
        form.response_format.as_deref(),
    )?;
    let language = admission::resolve_language(form.language.as_deref())?;
    let with_timestamp = match form.with_timestamp.as_deref() {
        None => false,
        Some("true") | Some("1") => true,
        Some("false") | Some("0") | Some("") => false,
        Some(other) => {
            return Err(AdmissionError::InvalidParameter(format!(
                "Invalid with_timestamp: '{}'. Expected: true or false",
                other
            )))
        }
    };

    let (capabilities, model_label) = match &requested_model {
        Some(spec) => (spec.capabilities, spec.alias.clone()),
        None => {
            let current = state.scheduler.current_spec();
            (current.capabilities, current.model_id.clone())
        }
    };
    admission::check_capabilities(output_format, with_timestamp, &capabilities, &model_label)?;

    Ok((requested_model, output_format, language, with_timestamp))
}

enum SpoolFailure {
    Admission(AdmissionError),
    Io(String),
}

/// Stream the upload to a temp file in the spool directory, enforcing
/// the size limit as bytes arrive so an oversized body never lands
/// fully on disk.
async fn spool_audio(
    mut field: Field<'_>,
    filename: Option<&str>,
    state: &AppState,
) -> Result<SpooledAudio, SpoolFailure> {
    let suffix = filename
        .and_then(|f| f.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_else(|| ".wav".to_string());

    let named = tempfile::Builder::new()
        .prefix("asr-upload-")
        .suffix(&suffix)
        .tempfile_in(&state.settings.upload.spool_dir)
        .map_err(|e| SpoolFailure::Io(format!("create temp file: {}", e)))?;
    let (std_file, path) = named
        .keep()
        .map_err(|e| SpoolFailure::Io(format!("persist temp file: {}", e)))?;
    let mut file = tokio::fs::File::from_std(std_file);

    let mut size_bytes: u64 = 0;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                size_bytes += chunk.len() as u64;
                if size_bytes > state.admission.max_upload_bytes {
                    drop(file);
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(SpoolFailure::Admission(AdmissionError::PayloadTooLarge {
                        actual_mb: size_bytes / (1024 * 1024),
                        limit_mb: state.admission.max_upload_bytes / (1024 * 1024),
                    }));
                }
                if let Err(e) = file.write_all(&chunk).await {
                    drop(file);
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(SpoolFailure::Io(format!("write temp file: {}", e)));
                }
            }
            Ok(None) => break,
            Err(e) => {
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                return Err(SpoolFailure::Io(format!("read upload stream: {}", e)));
            }
        }
    }

    if let Err(e) = file.flush().await {
        let _ = tokio::fs::remove_file(&path).await;
        return Err(SpoolFailure::Io(format!("flush temp file: {}", e)));
    }

    Ok(SpooledAudio { path, size_bytes })
}

fn admission_rejection(e: AdmissionError) -> Response {
    let status = e.status_code();
    let error_type = if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
        "unsupported_media_type"
    } else if status == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "invalid_request_error"
    };
    error_response(status, e.to_string(), error_type)
}

fn degraded_response() -> Response {
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "Service is degraded (model unrecoverable). Manual restart required.",
        "service_degraded",
    )
}

fn error_response(
    status: StatusCode,
    message: impl Into<String>,
    error_type: &str,
) -> Response {
    (status, Json(ErrorResponse::new(message, error_type))).into_response()
}
