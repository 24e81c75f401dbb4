mod srt;
mod txt;

pub use srt::format_srt;
pub use txt::format_txt;
