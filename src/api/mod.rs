use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::classifier::{Classifier, ModelHub, OnnxClassifier, Preprocessor};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, FeedbackService, PredictionService, ReviewService, SeaOrmAuthService,
    SeaOrmFeedbackService, SeaOrmPredictionService, SeaOrmReviewService, UploadStorage,
};

mod assets;
pub mod auth;
mod error;
mod feedback;
mod images;
mod observability;
mod popup;
mod predict;
mod produce;
mod reviews;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub classifier: Arc<dyn Classifier>,

    pub prediction_service: Arc<dyn PredictionService>,

    pub feedback_service: Arc<dyn FeedbackService>,

    pub auth_service: Arc<dyn AuthService>,

    pub review_service: Arc<dyn ReviewService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

/// Loads the ONNX checkpoint (downloading it if needed) and builds the state.
pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let classifier = load_classifier(&config).await?;
    create_app_state_with_classifier(config, classifier, prometheus_handle).await
}

pub async fn load_classifier(config: &Config) -> anyhow::Result<Arc<dyn Classifier>> {
    let files = ModelHub::new(config.classifier.clone()).ensure_files().await?;
    let preprocessor = Preprocessor::from_config(&config.classifier);

    let classifier = tokio::task::spawn_blocking(move || OnnxClassifier::load(&files, preprocessor))
        .await
        .map_err(|e| anyhow::anyhow!("Model loading task panicked: {e}"))??;

    Ok(Arc::new(classifier))
}

pub async fn create_app_state_with_classifier(
    config: Config,
    classifier: Arc<dyn Classifier>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let storage = UploadStorage::new(&config.general.uploads_path);

    let prediction_service = Arc::new(SeaOrmPredictionService::new(
        store.clone(),
        classifier.clone(),
        storage,
        config.classifier.top_k,
    ));
    let feedback_service = Arc::new(SeaOrmFeedbackService::new(store.clone()));
    let auth_service = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.security.clone(),
    ));
    let review_service = Arc::new(SeaOrmReviewService::new(store.clone()));

    Ok(Arc::new(AppState {
        config,
        store,
        classifier,
        prediction_service,
        feedback_service,
        auth_service,
        review_service,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;
    let uploads_dir = Path::new(&state.config.general.uploads_path).join("uploads");

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    let api_router = Router::new()
        .route("/predict", post(predict::predict))
        .route("/feedback", post(feedback::submit_feedback))
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_user))
        .route("/instruction-popup", get(popup::get_state))
        .route("/instruction-popup/hide", post(popup::set_hidden))
        .route("/produce", get(produce::list_produce))
        .route("/produce/groups", get(produce::list_groups))
        .route("/produce/{id}/reviews", get(produce::list_reviews))
        .route("/reviews", post(reviews::create_review))
        .route("/images", get(images::list_images))
        .route(
            "/images/{id}",
            get(images::get_image).delete(images::delete_image),
        )
        .route("/system/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_origins = &server.cors_allowed_origins;
    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(assets::home))
        .route("/what-is-foodlens", get(assets::what_is_foodlens))
        .nest("/api", api_router)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .fallback(assets::serve_asset)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(observability::security_headers_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer.allow_methods(Any).allow_headers(Any))
                .layer(DefaultBodyLimit::max(server.max_upload_bytes)),
        )
}
