mod settings;

pub use settings::{
    CorsSettings, EngineSettings, LoggingSettings, QueueSettings, ServerSettings, Settings,
    SettingsError, UploadSettings,
};
