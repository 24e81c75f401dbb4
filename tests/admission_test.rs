use axum::http::StatusCode;

use lyrebird::application::services::admission::{self, AdmissionError, AdmissionPolicy};
use lyrebird::domain::{registry, EngineCapabilities, Language, OutputFormat};

fn policy() -> AdmissionPolicy {
    AdmissionPolicy::new(200)
}

#[test]
fn given_allowlisted_mime_types_when_checking_then_accepted() {
    for mime in ["audio/wav", "audio/mpeg", "audio/flac", "audio/webm"] {
        assert!(policy().check_media_type(Some(mime), None).is_ok(), "{mime}");
    }
}

#[test]
fn given_non_audio_mime_type_when_checking_then_rejected_with_415() {
    let err = policy()
        .check_media_type(Some("application/pdf"), Some("a.pdf"))
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[test]
fn given_octet_stream_when_extension_is_audio_then_accepted_by_fallback() {
    let policy = policy();
    assert!(policy
        .check_media_type(Some("application/octet-stream"), Some("a.m4a"))
        .is_ok());
    assert!(policy.check_media_type(None, Some("b.WAV")).is_ok());
    assert!(policy
        .check_media_type(Some("application/octet-stream"), Some("c.exe"))
        .is_err());
    assert!(policy
        .check_media_type(Some("application/octet-stream"), None)
        .is_err());
}

#[test]
fn given_size_at_limit_when_checking_then_accepted_but_one_byte_over_rejected() {
    let policy = policy();
    let limit = 200 * 1024 * 1024;
    assert!(policy.check_size(limit).is_ok());

    let err = policy.check_size(limit + 1).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(err.to_string().contains("200"));
}

#[test]
fn given_passthrough_model_values_when_resolving_then_keep_current() {
    assert!(admission::resolve_requested_model(None).unwrap().is_none());
    assert!(admission::resolve_requested_model(Some("")).unwrap().is_none());
    assert!(admission::resolve_requested_model(Some("whisper-1"))
        .unwrap()
        .is_none());
}

#[test]
fn given_alias_when_resolving_model_then_returns_spec() {
    let spec = admission::resolve_requested_model(Some("paraformer"))
        .unwrap()
        .unwrap();
    assert_eq!(spec.alias, "paraformer");
}

#[test]
fn given_unknown_model_when_resolving_then_400() {
    let err = admission::resolve_requested_model(Some("nope")).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[test]
fn given_response_format_when_resolving_then_overrides_output_format() {
    let format = admission::resolve_output_format(Some("json"), Some("vtt")).unwrap();
    assert_eq!(format, OutputFormat::Srt);

    let format = admission::resolve_output_format(Some("srt"), None).unwrap();
    assert_eq!(format, OutputFormat::Srt);

    let format = admission::resolve_output_format(None, Some("verbose_json")).unwrap();
    assert_eq!(format, OutputFormat::Json);

    let format = admission::resolve_output_format(None, Some("text")).unwrap();
    assert_eq!(format, OutputFormat::Txt);

    let format = admission::resolve_output_format(None, None).unwrap();
    assert_eq!(format, OutputFormat::Json);
}

#[test]
fn given_unknown_format_when_resolving_then_validation_error_not_silent_default() {
    assert!(admission::resolve_output_format(Some("yaml"), None).is_err());
    assert!(admission::resolve_output_format(None, Some("mp3")).is_err());
}

#[test]
fn given_language_values_when_resolving_then_only_known_codes_accepted() {
    assert_eq!(admission::resolve_language(None).unwrap(), Language::Auto);
    assert_eq!(admission::resolve_language(Some("zh")).unwrap(), Language::Zh);
    assert_eq!(admission::resolve_language(Some("en")).unwrap(), Language::En);
    assert!(admission::resolve_language(Some("klingon")).is_err());
}

#[test]
fn given_model_without_timestamps_when_requesting_srt_then_mismatch_names_capability() {
    let caps = registry::lookup("sensevoice-small").unwrap().capabilities;
    let err =
        admission::check_capabilities(OutputFormat::Srt, false, &caps, "sensevoice-small")
            .unwrap_err();
    assert!(matches!(err, AdmissionError::CapabilityMismatch(_)));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(err.to_string().contains("timestamp"));
    assert!(err.to_string().contains("sensevoice-small"));
}

#[test]
fn given_model_with_timestamps_when_requesting_srt_then_accepted() {
    let caps = registry::lookup("paraformer").unwrap().capabilities;
    assert!(admission::check_capabilities(OutputFormat::Srt, true, &caps, "paraformer").is_ok());
}

#[test]
fn given_auto_language_without_detection_when_downgrading_then_falls_back_to_default() {
    let no_detect = EngineCapabilities {
        timestamp: true,
        ..EngineCapabilities::default()
    };
    assert_eq!(
        admission::effective_language(Language::Auto, &no_detect),
        Language::Zh
    );

    let with_detect = EngineCapabilities {
        language_detect: true,
        ..EngineCapabilities::default()
    };
    assert_eq!(
        admission::effective_language(Language::Auto, &with_detect),
        Language::Auto
    );
    assert_eq!(
        admission::effective_language(Language::En, &no_detect),
        Language::En
    );
}
