mod init_tracing;
mod request_id;
mod tracing_config;

pub use init_tracing::init_tracing;
pub use request_id::{RequestId, request_id_middleware, REQUEST_ID_HEADER};
pub use tracing_config::TracingConfig;
