//! Pre-queue validation at the HTTP boundary.
//!
//! Checks run in a fixed order (first failure wins): media type, upload
//! size, model resolution, format/capability compatibility. A request
//! that fails here is never enqueued, and the caller must delete any
//! temp file it already persisted.

use axum::http::StatusCode;

use crate::domain::registry::{self, RegistryError};
use crate::domain::{EngineCapabilities, Language, ModelSpec, OutputFormat};

const ALLOWED_AUDIO_TYPES: &[&str] = &[
    "audio/wav",
    "audio/x-wav",
    "audio/mpeg",
    "audio/mp3",
    "audio/mp4",
    "audio/x-m4a",
    "audio/flac",
    "audio/ogg",
    "audio/webm",
];

// Fallback for clients (curl, mostly) that upload audio as
// application/octet-stream or with no content type at all.
const ALLOWED_AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "mp4", "flac", "ogg", "webm"];

#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("Unsupported file type. Expected audio file, got: {0}")]
    UnsupportedMediaType(String),
    #[error("File size {actual_mb} MB exceeds maximum allowed ({limit_mb} MB)")]
    PayloadTooLarge { actual_mb: u64, limit_mb: u64 },
    #[error(transparent)]
    UnknownModel(#[from] RegistryError),
    #[error("{0}")]
    CapabilityMismatch(String),
    #[error("{0}")]
    InvalidParameter(String),
}

impl AdmissionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnknownModel(_) | Self::CapabilityMismatch(_) | Self::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

/// Size and media-type policy, built from settings once at startup.
#[derive(Debug, Clone)]
pub struct AdmissionPolicy {
    pub max_upload_bytes: u64,
}

impl AdmissionPolicy {
    pub fn new(max_upload_size_mb: u64) -> Self {
        Self {
            max_upload_bytes: max_upload_size_mb * 1024 * 1024,
        }
    }

    pub fn check_media_type(
        &self,
        content_type: Option<&str>,
        filename: Option<&str>,
    ) -> Result<(), AdmissionError> {
        match content_type {
            Some(ct) if ALLOWED_AUDIO_TYPES.contains(&ct) => Ok(()),
            Some("application/octet-stream") | None => {
                let ext = filename
                    .and_then(|f| f.rsplit_once('.'))
                    .map(|(_, ext)| ext.to_lowercase());
                match ext {
                    Some(ext) if ALLOWED_AUDIO_EXTENSIONS.contains(&ext.as_str()) => {
                        tracing::debug!(
                            filename = filename.unwrap_or(""),
                            "accepted upload by extension fallback"
                        );
                        Ok(())
                    }
                    _ => Err(AdmissionError::UnsupportedMediaType(
                        content_type.unwrap_or("unknown").to_string(),
                    )),
                }
            }
            Some(other) => Err(AdmissionError::UnsupportedMediaType(other.to_string())),
        }
    }

    /// Check the size of the already-persisted upload. Callers pass the
    /// on-disk length of the temp file (or the advertised content
    /// length for an early reject); the body is never buffered.
    pub fn check_size(&self, size_bytes: u64) -> Result<(), AdmissionError> {
        if size_bytes > self.max_upload_bytes {
            return Err(AdmissionError::PayloadTooLarge {
                actual_mb: size_bytes / (1024 * 1024),
                limit_mb: self.max_upload_bytes / (1024 * 1024),
            });
        }
        Ok(())
    }
}

/// Resolve the `model` form field. Passthrough values (`""`,
/// `"whisper-1"`, omitted) mean "keep the current model" and return
/// `None`; anything else must resolve through the registry.
pub fn resolve_requested_model(model: Option<&str>) -> Result<Option<ModelSpec>, AdmissionError> {
    match model {
        m if registry::is_passthrough(m) => Ok(None),
        Some(m) => Ok(Some(registry::lookup(m)?)),
        None => Ok(None),
    }
}

/// Resolve the effective output format: `response_format` (the OpenAI
/// field) overrides `output_format` when both are present.
pub fn resolve_output_format(
    output_format: Option<&str>,
    response_format: Option<&str>,
) -> Result<OutputFormat, AdmissionError> {
    match (response_format, output_format) {
        (Some(rf), _) => {
            OutputFormat::parse_response_format(rf).map_err(AdmissionError::InvalidParameter)
        }
        (None, Some(of)) => OutputFormat::parse(of).map_err(AdmissionError::InvalidParameter),
        (None, None) => Ok(OutputFormat::Json),
    }
}

pub fn resolve_language(language: Option<&str>) -> Result<Language, AdmissionError> {
    match language {
        Some(l) => Language::parse(l).map_err(AdmissionError::InvalidParameter),
        None => Ok(Language::Auto),
    }
}

/// Reject format requests the target model cannot honour. Formats are
/// never silently downgraded; the error names the missing capability.
pub fn check_capabilities(
    format: OutputFormat,
    with_timestamp: bool,
    capabilities: &EngineCapabilities,
    model_label: &str,
) -> Result<(), AdmissionError> {
    if format == OutputFormat::Srt && !capabilities.timestamp {
        return Err(AdmissionError::CapabilityMismatch(format!(
            "SRT format requires timestamp support, but model '{}' does not produce timestamps. \
             Use output_format=json or output_format=txt instead, or switch to a model with the \
             timestamp capability.",
            model_label
        )));
    }
    if with_timestamp && !capabilities.timestamp {
        return Err(AdmissionError::CapabilityMismatch(format!(
            "with_timestamp=true requires timestamp support, but model '{}' does not produce \
             timestamps. Set with_timestamp=false, or switch to a model with the timestamp \
             capability.",
            model_label
        )));
    }
    Ok(())
}

/// `language=auto` against a model without detection is advisory, not
/// an error: fall back to the default language instead.
pub fn effective_language(language: Language, capabilities: &EngineCapabilities) -> Language {
    if language == Language::Auto && !capabilities.language_detect {
        Language::Zh
    } else {
        language
    }
}
