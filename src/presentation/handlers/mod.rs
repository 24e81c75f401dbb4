mod health;
mod models;
pub mod openai_types;
mod transcriptions;

pub use health::health_handler;
pub use models::{current_model_handler, models_handler};
pub use transcriptions::create_transcription_handler;
