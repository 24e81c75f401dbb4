pub mod admission;
mod scheduler;

pub use scheduler::{
    CompletedTranscription, JobError, JobReceiver, SchedulerError, ServiceState, SubmitError,
    TranscriptionRequest, TranscriptionScheduler,
};
