//! Normalisation of raw runner output before the scheduler sees it.

use crate::domain::Segment;

use super::runner::RawSegment;

/// Turn raw runner segments into domain segments.
///
/// Entries without a start or end time are dropped: some upstream
/// models intermittently emit null timestamps and a segment without a
/// position in the audio is useless to every formatter. Speaker labels
/// are only attached when the engine diarizes; a diarizing engine that
/// omits the speaker id gets the documented fallback, speaker 0.
pub fn sanitize_segments(raw: Vec<RawSegment>, diarization: bool) -> Vec<Segment> {
    raw.into_iter()
        .filter_map(|s| match (s.start, s.end) {
            (Some(start), Some(end)) => Some((start, end, s.spk, s.text)),
            _ => {
                tracing::debug!("dropping segment without timestamps");
                None
            }
        })
        .enumerate()
        .map(|(id, (start, end, spk, text))| Segment {
            id,
            speaker: diarization.then(|| format!("Speaker {}", spk.unwrap_or(0))),
            start,
            end,
            text,
        })
        .collect()
}

/// Strip SenseVoice-style annotation tokens (`<|zh|>`, `<|NEUTRAL|>`,
/// `<|Speech|>`, …) from transcribed text.
pub fn strip_annotation_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("<|") {
        out.push_str(&rest[..open]);
        match rest[open..].find("|>") {
            Some(close) => rest = &rest[open + close + 2..],
            None => {
                // Unterminated tag: keep the remainder verbatim.
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}
