use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::{get, post},
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use carebase_auth::{
    AuthConfig, AuthService, AuthState, HospitalStorage, TokenCodec, TokenError,
    middleware::require_staff,
};
use carebase_search::PatientStorage;

use crate::{
    config::AppConfig,
    handlers,
    middleware::{self as app_middleware, RequestId},
    storage_adapter::{self, Storage},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub service: AuthService,
    pub hospitals: Arc<dyn HospitalStorage>,
    pub patients: Arc<dyn PatientStorage>,
}

impl AppState {
    /// Builds the token codec once and wires it to the storage handles.
    pub fn new(auth: &AuthConfig, storage: Storage) -> Result<Self, TokenError> {
        let codec = Arc::new(TokenCodec::from_config(auth)?);

        Ok(Self {
            auth: AuthState::new(codec.clone(), storage.staff.clone(), storage.hospitals.clone()),
            service: AuthService::new(storage.hospitals.clone(), storage.staff, codec),
            hospitals: storage.hospitals,
            patients: storage.patients,
        })
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    let body_limit = cfg.server.body_limit_bytes;

    // Patient routes sit behind the bearer gate
    let protected = Router::new()
        .route("/patient/search", get(handlers::search_patients))
        .route("/{hospital}/patient/search/{id}", get(handlers::get_patient))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_staff,
        ));

    Router::new()
        // Health endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        // Administration
        .route("/hospital", post(handlers::create_hospital))
        // Staff accounts, addressed by hospital id or name
        .route("/{hospital}/staff/create", post(handlers::create_staff))
        .route("/{hospital}/staff/login", post(handlers::login_staff))
        .merge(protected)
        .with_state(state)
        // Middleware stack (inner to outer: body limit -> compression/cors -> trace -> request id)
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<RequestId>()
                        .map(|id| id.0.as_str())
                        .unwrap_or("");
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
        .layer(middleware::from_fn(app_middleware::request_id))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    storage: Option<Storage>,
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
            storage: None,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Uses the given storage instead of opening the configured backend.
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub async fn build(self) -> anyhow::Result<CarebaseServer> {
        let storage = match self.storage {
            Some(storage) => storage,
            None => storage_adapter::connect(&self.config.storage).await?,
        };
        let state = AppState::new(&self.config.auth, storage)?;
        let app = build_app(&self.config, state);

        Ok(CarebaseServer {
            addr: self.addr,
            app,
        })
    }
}

pub struct CarebaseServer {
    addr: SocketAddr,
    app: Router,
}

impl CarebaseServer {
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
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
