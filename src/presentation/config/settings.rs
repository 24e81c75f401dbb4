use std::path::PathBuf;

use crate::domain::registry::{self, RegistryError};
use crate::domain::{EngineKind, ModelSpec};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub engine: EngineSettings,
    pub queue: QueueSettings,
    pub upload: UploadSettings,
    pub cors: CorsSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub engine_kind: EngineKind,
    pub model_id: String,
}

#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub max_queue_size: usize,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub max_upload_size_mb: u64,
    pub spool_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

fn default_model_id(engine_kind: EngineKind) -> &'static str {
    match engine_kind {
        EngineKind::FunAsr => "iic/SenseVoiceSmall",
        EngineKind::Mlx => "mlx-community/Qwen3-ASR-1.7B-4bit",
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| SettingsError::Invalid {
            var,
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 50070,
            },
            engine: EngineSettings {
                engine_kind: EngineKind::FunAsr,
                model_id: default_model_id(EngineKind::FunAsr).to_string(),
            },
            queue: QueueSettings { max_queue_size: 50 },
            upload: UploadSettings {
                max_upload_size_mb: 200,
                spool_dir: std::env::temp_dir(),
            },
            cors: CorsSettings {
                allowed_origins: vec!["*".to_string()],
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let defaults = Self::default();

        let engine_kind = match std::env::var("ENGINE_TYPE") {
            Ok(raw) => {
                EngineKind::try_from(raw.as_str()).map_err(|message| SettingsError::Invalid {
                    var: "ENGINE_TYPE",
                    message,
                })?
            }
            Err(_) => defaults.engine.engine_kind,
        };
        let model_id = std::env::var("MODEL_ID")
            .unwrap_or_else(|_| default_model_id(engine_kind).to_string());

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            server: ServerSettings {
                host: std::env::var("HOST").unwrap_or(defaults.server.host),
                port: parse_env("PORT", defaults.server.port)?,
            },
            engine: EngineSettings {
                engine_kind,
                model_id,
            },
            queue: QueueSettings {
                max_queue_size: parse_env("MAX_QUEUE_SIZE", defaults.queue.max_queue_size)?,
            },
            upload: UploadSettings {
                max_upload_size_mb: parse_env(
                    "MAX_UPLOAD_SIZE_MB",
                    defaults.upload.max_upload_size_mb,
                )?,
                spool_dir: std::env::var("UPLOAD_SPOOL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.upload.spool_dir),
            },
            cors: CorsSettings { allowed_origins },
            logging: LoggingSettings {
                level: std::env::var("LOG_LEVEL").unwrap_or(defaults.logging.level),
                json_format: std::env::var("LOG_FORMAT")
                    .map(|v| v.to_lowercase() == "json")
                    .unwrap_or(false),
            },
        })
    }

    /// Resolve the configured model to a full spec. The registry's view
    /// of the model wins if it disagrees with `ENGINE_TYPE`.
    pub fn initial_model_spec(&self) -> Result<ModelSpec, RegistryError> {
        let spec = registry::lookup(&self.engine.model_id)?;
        if spec.engine_kind != self.engine.engine_kind {
            tracing::warn!(
                configured = %self.engine.engine_kind,
                resolved = %spec.engine_kind,
                model = %spec.model_id,
                "ENGINE_TYPE disagrees with the configured model; using the model's engine"
            );
        }
        Ok(spec)
    }
}
