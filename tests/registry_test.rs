use lyrebird::domain::registry::{self, RegistryError};
use lyrebird::domain::EngineKind;

#[test]
fn given_alias_when_looking_up_then_returns_registered_spec() {
    let spec = registry::lookup("paraformer").unwrap();
    assert_eq!(spec.engine_kind, EngineKind::FunAsr);
    assert!(spec.model_id.starts_with("iic/"));
    assert!(spec.capabilities.diarization);
    assert!(spec.capabilities.timestamp);
}

#[test]
fn given_registered_model_id_when_looking_up_then_resolves_to_same_spec() {
    let by_alias = registry::lookup("qwen3-asr-mini").unwrap();
    let by_id = registry::lookup("mlx-community/Qwen3-ASR-1.7B-4bit").unwrap();
    assert_eq!(by_alias, by_id);
    assert_eq!(by_id.alias, "qwen3-asr-mini");
}

#[test]
fn given_unregistered_mlx_path_when_looking_up_then_infers_engine_with_conservative_caps() {
    let spec = registry::lookup("mlx-community/some-future-model-4bit").unwrap();
    assert_eq!(spec.engine_kind, EngineKind::Mlx);
    assert_eq!(spec.model_id, "mlx-community/some-future-model-4bit");
    assert!(spec.capabilities.timestamp);
    assert!(!spec.capabilities.diarization);
    assert!(!spec.capabilities.emotion_tags);
    assert!(!spec.capabilities.language_detect);
}

#[test]
fn given_unregistered_iic_path_when_looking_up_then_infers_funasr() {
    let spec = registry::lookup("iic/some-new-paraformer").unwrap();
    assert_eq!(spec.engine_kind, EngineKind::FunAsr);
}

#[test]
fn given_unknown_string_when_looking_up_then_returns_unknown_model() {
    let err = registry::lookup("gpt-4o-transcribe").unwrap_err();
    assert!(matches!(err, RegistryError::UnknownModel(_)));
    assert!(err.to_string().contains("gpt-4o-transcribe"));
}

#[test]
fn given_openai_placeholder_values_when_checking_passthrough_then_all_mean_keep_current() {
    assert!(registry::is_passthrough(None));
    assert!(registry::is_passthrough(Some("")));
    assert!(registry::is_passthrough(Some("whisper-1")));
    assert!(!registry::is_passthrough(Some("paraformer")));
}

#[test]
fn given_registry_when_listing_then_sorted_by_alias() {
    let all = registry::list_all();
    assert!(all.len() >= 5);
    let aliases: Vec<&str> = all.iter().map(|s| s.alias.as_str()).collect();
    let mut sorted = aliases.clone();
    sorted.sort();
    assert_eq!(aliases, sorted);
}

#[test]
fn given_model_id_when_reverse_resolving_then_returns_alias_only_for_builtins() {
    assert_eq!(registry::alias_for("iic/SenseVoiceSmall"), Some("sensevoice-small"));
    assert_eq!(registry::alias_for("mlx-community/unknown"), None);
}
