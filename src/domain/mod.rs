mod capabilities;
mod model_spec;
pub mod registry;
mod request;
mod transcript;

pub use capabilities::EngineCapabilities;
pub use model_spec::{EngineKind, ModelSpec};
pub use request::{Language, OutputFormat};
pub use transcript::{Segment, Transcript};
