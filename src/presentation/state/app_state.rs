use std::sync::Arc;

use crate::application::services::admission::AdmissionPolicy;
use crate::application::services::TranscriptionScheduler;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<TranscriptionScheduler>,
    pub admission: AdmissionPolicy,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(scheduler: Arc<TranscriptionScheduler>, settings: Settings) -> Self {
        Self {
            admission: AdmissionPolicy::new(settings.upload.max_upload_size_mb),
            scheduler,
            settings: Arc::new(settings),
        }
    }
}
