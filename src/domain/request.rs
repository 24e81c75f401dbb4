use std::fmt;

/// Transcription language requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Zh,
    En,
    Auto,
}

impl Language {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "zh" => Ok(Self::Zh),
            "en" => Ok(Self::En),
            "auto" => Ok(Self::Auto),
            other => Err(format!(
                "Invalid language: '{}'. Expected: zh, en, or auto",
                other
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::En => "en",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response body shape for a completed transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Txt,
    Srt,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "json" => Ok(Self::Json),
            "txt" => Ok(Self::Txt),
            "srt" => Ok(Self::Srt),
            other => Err(format!(
                "Invalid output_format: '{}'. Expected: json, txt, or srt",
                other
            )),
        }
    }

    /// Parse an OpenAI `response_format` value, mapping the aliases the
    /// OpenAI API uses onto our three formats.
    pub fn parse_response_format(s: &str) -> Result<Self, String> {
        match s {
            "json" | "verbose_json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Txt),
            "vtt" | "srt" => Ok(Self::Srt),
            other => Err(format!(
                "Invalid response_format: '{}'. Expected: json, verbose_json, text, vtt, or srt",
                other
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
            Self::Srt => "srt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
