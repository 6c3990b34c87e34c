pub mod booking;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod query;
pub mod settings;
pub mod store;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use chrono_tz::Tz;
use handlers::{
    book_class, create_class, get_bookings, get_classes, healthz_live, healthz_ready, root,
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::BookingError;
use crate::openapi::ApiDoc;
use crate::settings::Settings;
use crate::store::{BookingStore, SqliteStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub default_tz: Tz,
    pub store: Arc<dyn BookingStore>,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn BookingStore>) -> Result<Self, BookingError> {
        let default_tz = settings.default_tz()?;
        Ok(Self {
            settings,
            default_tz,
            store,
        })
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let store = SqliteStore::connect(&settings.database_url, settings.max_connections).await?;
    let state = AppState::new(settings, Arc::new(store))?;

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!(
        "Starting Fitness Booking API on {addr} (default timezone {})",
        state.default_tz
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/api/classes", get(get_classes).post(create_class))
        .route("/api/book", post(book_class))
        .route("/api/bookings", get(get_bookings))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(trace_layer)
}
