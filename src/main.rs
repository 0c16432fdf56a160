//! Loyalty Card Service - Main Application Entry Point
//!
//! REST API server for the loyalty-card subsystem of a barbershop/salon
//! management application: cards, stamps, rewards, stamp history, and
//! the invoicing hook that converts a saved invoice's service units into
//! stamps.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

use loyalty_card_service::{config, db, handlers};

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging. Reads RUST_LOG (defaults to "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        // Client collaborator routes
        .route("/clientes", post(handlers::clients::create_client))
        .route("/clientes", get(handlers::clients::list_clients))
        .route("/clientes/{id}", get(handlers::clients::get_client))
        // Loyalty card routes
        .route("/tarjetas-fidelidad", get(handlers::cards::list_cards))
        .route("/tarjetas-fidelidad", post(handlers::cards::create_card))
        .route(
            "/tarjetas-fidelidad/cliente/{cliente_id}",
            get(handlers::cards::get_card_by_client),
        )
        .route(
            "/tarjetas-fidelidad/{id}/sello",
            post(handlers::cards::add_stamp),
        )
        .route(
            "/tarjetas-fidelidad/{id}/quitar-sello",
            post(handlers::cards::remove_stamp),
        )
        .route(
            "/tarjetas-fidelidad/{id}/historial",
            get(handlers::cards::get_history),
        )
        .route(
            "/tarjetas-fidelidad/{id}",
            delete(handlers::cards::delete_card),
        )
        // Invoicing hook
        .route(
            "/tarjetas-fidelidad/procesar-factura",
            post(handlers::invoices::process_invoice),
        )
        // The administration screens are browser pages
        .layer(CorsLayer::permissive())
        // Request tracing for observability
        .layer(TraceLayer::new_for_http())
        // Share database pool with all handlers via State extraction
        .with_state(pool);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
