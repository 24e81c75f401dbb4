//! SubRip (SRT) rendering of timestamped segments.

use crate::domain::Segment;

/// Standard SRT: 1-based index, `HH:MM:SS,mmm --> HH:MM:SS,mmm`, one
/// text line (speaker-labelled when diarized), blank separator.
pub fn format_srt(segments: &[Segment]) -> String {
    let mut lines = Vec::with_capacity(segments.len() * 4);
    for (idx, segment) in segments.iter().enumerate() {
        lines.push((idx + 1).to_string());
        lines.push(format!(
            "{} --> {}",
            srt_time(segment.start),
            srt_time(segment.end)
        ));
        match &segment.speaker {
            Some(speaker) => lines.push(format!("[{}]: {}", speaker, segment.text)),
            None => lines.push(segment.text.clone()),
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn srt_time(seconds: f64) -> String {
    let ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = ms / 3_600_000;
    let mins = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::srt_time;

    #[test]
    fn given_fractional_seconds_when_formatting_then_renders_milliseconds() {
        assert_eq!(srt_time(5.0), "00:00:05,000");
        assert_eq!(srt_time(3725.25), "01:02:05,250");
    }
}
