mod app_state;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;

use axum::{routing::delete, routing::get, routing::patch, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing workshop-ops server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");

    // Register application metrics
    metrics::describe_counter!(
        "workshop_status_transitions_total",
        "Lifecycle transitions, labeled by target status"
    );
    metrics::describe_counter!(
        "qc_boards_initialized_total",
        "QC boards snapshotted from the holding point catalog"
    );
    metrics::describe_counter!(
        "qc_signoff_decisions_total",
        "Holding point decisions, labeled pass/fail"
    );
    metrics::describe_counter!(
        "job_completions_total",
        "Jobs signed off as ready for delivery"
    );

    // Initialize database connection pool
    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run database migrations
    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    // Create shared application state
    let state = AppState::new(db_pool);

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Worker directory (read-only)
        .route("/api/v1/workers", get(routes::workers::list_workers))
        // Job intake and detail
        .route("/api/v1/jobs", post(routes::jobs::create_job))
        .route("/api/v1/jobs/{id}", get(routes::jobs::get_job))
        // Assignment ledger
        .route(
            "/api/v1/jobs/{id}/assign",
            post(routes::assignments::assign_worker),
        )
        .route(
            "/api/v1/jobs/{id}/assign/{worker_id}",
            delete(routes::assignments::remove_assignment),
        )
        .route(
            "/api/v1/jobs/{id}/assignments",
            get(routes::assignments::list_assignments),
        )
        // Time ledger
        .route(
            "/api/v1/jobs/{id}/time",
            post(routes::time_entries::log_time).get(routes::time_entries::list_time),
        )
        // Holding point catalog
        .route("/api/v1/qc/holding-points", get(routes::qc::list_holding_points))
        .route(
            "/api/v1/qc/holding-points/{id}",
            patch(routes::qc::update_holding_point),
        )
        // QC signoff board
        .route("/api/v1/qc/jobs/{id}/init", post(routes::qc::initialize_board))
        .route("/api/v1/qc/jobs/{id}", get(routes::qc::get_board))
        .route("/api/v1/qc/jobs/{id}/progress", get(routes::qc::get_progress))
        .route(
            "/api/v1/qc/jobs/{id}/holding-points/{hp_id}/pass",
            post(routes::qc::pass_holding_point),
        )
        .route(
            "/api/v1/qc/jobs/{id}/holding-points/{hp_id}/fail",
            post(routes::qc::fail_holding_point),
        )
        // Lifecycle & completion
        .route("/api/v1/workshop/kanban", get(routes::workshop::kanban))
        .route(
            "/api/v1/workshop/jobs/{id}/advance",
            post(routes::workshop::advance_job),
        )
        .route(
            "/api/v1/workshop/jobs/{id}/complete",
            post(routes::workshop::complete_job),
        )
        .route(
            "/api/v1/workshop/jobs/{id}/completion",
            get(routes::workshop::get_completion),
        )
        .with_state(state)
        // Prometheus scrape endpoint (no app state)
        .route(
            "/metrics",
            get(move || {
                let handle = prometheus_handle.clone();
                async move { handle.render() }
            }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(256 * 1024)); // JSON bodies only

    tracing::info!("Starting workshop-ops on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
