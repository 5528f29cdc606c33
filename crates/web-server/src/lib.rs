use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Method, Request},
    routing::{delete, get, post, put},
    Router,
};
use configuration::ServerSettings;
use database::DietStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{field::Empty, Span};
use uuid::Uuid;

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
///
/// The store is the only shared resource; each call on it borrows its own
/// pooled connection for the duration of one transaction.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DietStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DietStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }
}

/// Opens one span per request. Handlers fill in the entity ids they learn
/// about, so every log line for the request (including the error logged when
/// the response is built) carries them.
fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        uri = %request.uri(),
        external_user_id = Empty,
        diet_plan_id = Empty,
        food_id = Empty,
    )
}

/// Builds the application router with all routes and middleware attached.
pub fn build_router(state: Arc<AppState>, body_limit_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    // --- DEFINE THE APPLICATION ROUTES ---
    Router::new()
        .route("/health", get(handlers::health))
        .route("/dietas", post(handlers::create_diet_plan))
        .route("/dietas/:id", delete(handlers::delete_diet_plan_by_id))
        .route("/delete_dietas", delete(handlers::delete_diet_plans))
        .route("/dieta", get(handlers::get_diet_plan))
        .route("/update_quantidade", put(handlers::update_food_quantity))
        .route("/delete_alimento", delete(handlers::delete_food))
        .with_state(state)
        .layer(cors)
        // This middleware opens the request span and logs every request/response pair.
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
}

/// Binds the listener and serves until Ctrl+C or SIGTERM.
pub async fn run_server(settings: &ServerSettings, store: Arc<dyn DietStore>) -> anyhow::Result<()> {
    let app = build_router(AppState::new(store), settings.body_limit_bytes);

    let listener = TcpListener::bind(settings.bind_address()).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server shut down.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler.");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
