use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::get,
};
use jobly_auth::{AuthState, JwtService};
use jobly_db_memory::InMemoryStorage;
use jobly_storage::DynStorage;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{AppConfig, StorageBackend},
    handlers, middleware as app_middleware, routes,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: DynStorage,
    pub auth: AuthState,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub struct JoblyServer {
    addr: SocketAddr,
    app: Router,
}

/// Creates the storage backend selected in the configuration.
pub async fn build_storage(cfg: &AppConfig) -> anyhow::Result<DynStorage> {
    let storage: DynStorage = match cfg.storage.backend {
        StorageBackend::Memory => {
            let companies = cfg.storage.memory.companies.clone();
            tracing::info!(companies = companies.len(), "Using in-memory storage");
            Arc::new(InMemoryStorage::new().with_companies(companies))
        }
        StorageBackend::Postgres => {
            let pg = cfg.storage.postgres.to_postgres_config();
            tracing::info!(pool_size = pg.pool.max_connections, "Using PostgreSQL storage");
            jobly_db_postgres::create_storage(pg).await?
        }
    };
    Ok(storage)
}

/// Builds the application state from configuration.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let storage = build_storage(cfg).await?;
    let jwt = JwtService::new(&cfg.auth.secret_key, cfg.auth.token_ttl_secs);
    Ok(AppState {
        storage,
        auth: AuthState::new(Arc::new(jwt)),
    })
}

/// Wires routes and the middleware stack around a ready state.
pub fn build_router(state: AppState, cfg: &AppConfig) -> Router {
    let body_limit = cfg.server.body_limit_bytes;

    let http_layers = ServiceBuilder::new()
        // Outermost: the request id must exist before the trace span is created
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new());

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .merge(routes::jobs::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(http_layers)
        .with_state(state)
}

pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = build_state(cfg).await?;
    Ok(build_router(state, cfg))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<JoblyServer> {
        let app = build_app(&self.config).await?;

        Ok(JoblyServer {
            addr: self.addr,
            app,
        })
    }
}

impl JoblyServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
