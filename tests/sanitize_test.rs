use lyrebird::infrastructure::engines::{sanitize_segments, strip_annotation_tags, RawSegment};

fn raw(spk: Option<u32>, start: Option<f64>, end: Option<f64>, text: &str) -> RawSegment {
    serde_json::from_value(serde_json::json!({
        "spk": spk,
        "start": start,
        "end": end,
        "text": text,
    }))
    .unwrap()
}

#[test]
fn given_segments_without_timestamps_when_sanitizing_then_they_are_dropped() {
    let segments = sanitize_segments(
        vec![
            raw(Some(0), Some(0.0), Some(2.0), "kept"),
            raw(Some(1), None, Some(4.0), "no start"),
            raw(Some(1), Some(4.0), None, "no end"),
            raw(Some(1), Some(5.0), Some(6.0), "also kept"),
        ],
        true,
    );

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].text, "kept");
    assert_eq!(segments[1].text, "also kept");
    // Ids are reassigned after filtering.
    assert_eq!(segments[0].id, 0);
    assert_eq!(segments[1].id, 1);
}

#[test]
fn given_diarizing_engine_when_speaker_missing_then_falls_back_to_speaker_zero() {
    let segments = sanitize_segments(vec![raw(None, Some(0.0), Some(1.0), "hi")], true);
    assert_eq!(segments[0].speaker.as_deref(), Some("Speaker 0"));

    let segments = sanitize_segments(vec![raw(Some(2), Some(0.0), Some(1.0), "hi")], true);
    assert_eq!(segments[0].speaker.as_deref(), Some("Speaker 2"));
}

#[test]
fn given_non_diarizing_engine_when_sanitizing_then_speaker_is_null() {
    let segments = sanitize_segments(vec![raw(Some(3), Some(0.0), Some(1.0), "hi")], false);
    assert_eq!(segments[0].speaker, None);
}

#[test]
fn given_sensevoice_output_when_stripping_tags_then_only_text_remains() {
    assert_eq!(
        strip_annotation_tags("<|zh|><|NEUTRAL|><|Speech|>你好，世界"),
        "你好，世界"
    );
    assert_eq!(strip_annotation_tags("plain text"), "plain text");
    assert_eq!(strip_annotation_tags("a<|zh|>b<|EMO|>c"), "abc");
}

#[test]
fn given_unterminated_tag_when_stripping_then_remainder_kept_verbatim() {
    assert_eq!(strip_annotation_tags("hello <|zh"), "hello <|zh");
}
