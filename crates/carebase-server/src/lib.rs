pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod storage_adapter;

pub use config::{AppConfig, LoggingConfig, PostgresStorageConfig, ServerConfig, StorageBackend};
pub use error::ApiError;
pub use observability::init_tracing;
pub use server::{AppState, CarebaseServer, ServerBuilder, build_app};
pub use storage_adapter::Storage;
