//! Plain-text rendering of a transcript.

use crate::domain::Transcript;

/// One line per segment. Diarized segments get a `[Speaker N]: ` label;
/// `with_timestamp` prepends a `[MM:SS]` marker. Falls back to the full
/// text when the engine produced no segments.
pub fn format_txt(transcript: &Transcript, with_timestamp: bool) -> String {
    let segments = match &transcript.segments {
        Some(segments) if !segments.is_empty() => segments,
        _ => return transcript.text.clone(),
    };

    let mut lines = Vec::with_capacity(segments.len());
    for segment in segments {
        let mut line = String::new();
        if with_timestamp {
            line.push_str(&format!("[{}] ", mm_ss(segment.start)));
        }
        match &segment.speaker {
            Some(speaker) => line.push_str(&format!("[{}]: {}", speaker, segment.text)),
            None => line.push_str(&segment.text),
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn mm_ss(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
