pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod server;
pub mod validation;

pub use config::{AppConfig, AuthConfig, PostgresStorageConfig, ServerConfig, StorageBackend};
pub use observability::{LogLevel, init_tracing};
pub use server::{AppState, JoblyServer, ServerBuilder, build_app, build_router, build_state};
