use lyrebird::domain::{Segment, Transcript};
use lyrebird::infrastructure::formatting::{format_srt, format_txt};

fn diarized_segments() -> Vec<Segment> {
    vec![
        Segment {
            id: 0,
            speaker: Some("Speaker 0".to_string()),
            start: 5.0,
            end: 20.0,
            text: "so what are some of the questions?".to_string(),
        },
        Segment {
            id: 1,
            speaker: Some("Speaker 1".to_string()),
            start: 135.0,
            end: 140.5,
            text: "well, let me think.".to_string(),
        },
    ]
}

fn transcript_with(segments: Option<Vec<Segment>>) -> Transcript {
    Transcript {
        text: "so what are some of the questions? well, let me think.".to_string(),
        duration: Some(141.0),
        language: Some("en".to_string()),
        segments,
    }
}

#[test]
fn given_diarized_segments_when_formatting_txt_then_one_labelled_line_per_segment() {
    let txt = format_txt(&transcript_with(Some(diarized_segments())), false);
    assert_eq!(
        txt,
        "[Speaker 0]: so what are some of the questions?\n\
         [Speaker 1]: well, let me think."
    );
}

#[test]
fn given_with_timestamp_when_formatting_txt_then_lines_get_minute_second_prefix() {
    let txt = format_txt(&transcript_with(Some(diarized_segments())), true);
    assert!(txt.starts_with("[00:05] [Speaker 0]: "));
    assert!(txt.lines().nth(1).unwrap().starts_with("[02:15] [Speaker 1]: "));
}

#[test]
fn given_undiarized_segments_when_formatting_txt_then_plain_text_lines() {
    let mut segments = diarized_segments();
    for s in &mut segments {
        s.speaker = None;
    }
    let txt = format_txt(&transcript_with(Some(segments)), false);
    assert_eq!(
        txt,
        "so what are some of the questions?\nwell, let me think."
    );
}

#[test]
fn given_no_segments_when_formatting_txt_then_falls_back_to_full_text() {
    let txt = format_txt(&transcript_with(None), true);
    assert_eq!(txt, "so what are some of the questions? well, let me think.");

    let txt = format_txt(&transcript_with(Some(Vec::new())), false);
    assert_eq!(txt, "so what are some of the questions? well, let me think.");
}

#[test]
fn given_diarized_segments_when_formatting_srt_then_standard_subrip_blocks() {
    let srt = format_srt(&diarized_segments());
    assert_eq!(
        srt,
        "1\n\
         00:00:05,000 --> 00:00:20,000\n\
         [Speaker 0]: so what are some of the questions?\n\
         \n\
         2\n\
         00:02:15,000 --> 00:02:20,500\n\
         [Speaker 1]: well, let me think.\n"
    );
}

#[test]
fn given_undiarized_segment_when_formatting_srt_then_no_speaker_label() {
    let segments = vec![Segment {
        id: 0,
        speaker: None,
        start: 0.0,
        end: 1.25,
        text: "hello".to_string(),
    }];
    let srt = format_srt(&segments);
    assert_eq!(srt, "1\n00:00:00,000 --> 00:00:01,250\nhello\n");
}

#[test]
fn given_empty_segments_when_formatting_srt_then_empty_body() {
    assert_eq!(format_srt(&[]), "");
}
