use std::panic;
use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use padsync::config::{self, Config};
use padsync::db::memory::MemoryDocumentStore;
use padsync::db::pg::PgDocumentStore;
use padsync::db::store::DocumentStore;
use padsync::jobs::expiry_sweep;
use padsync::routes::create_api_routes;
use padsync::state::AppState;
use padsync::ws::heartbeat;
use padsync::ws::registry::SessionRegistry;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "padsync=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let cfg = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });
    config::init_config(cfg.clone());

    if cfg.auth_jwt_secret.is_none() {
        warn!("No JWT secret configured - authenticated connections will be rejected");
    }

    // Initialize the document store
    let store: Arc<dyn DocumentStore> = match &cfg.db_url {
        Some(db_url) => match PgDocumentStore::connect(db_url).await {
            Ok(store) => {
                info!("Database initialized successfully");
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to initialize database: {}", e);
                warn!("Falling back to in-memory document store");
                Arc::new(MemoryDocumentStore::new())
            }
        },
        None => {
            warn!("No database URL configured - using in-memory document store");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let registry = Arc::new(SessionRegistry::new());
    let app_state = AppState {
        store: store.clone(),
        registry: registry.clone(),
    };

    // Background tasks: connection liveness and expired-document cleanup
    heartbeat::start_heartbeat(registry);
    expiry_sweep::start_expiry_sweep(store);

    // Combine all routes
    let app_routes = create_api_routes(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&cfg));

    // Start the server
    let listener = tokio::net::TcpListener::bind(cfg.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", cfg.server_address()));

    info!("🚀 Server running on http://{}", cfg.server_address());
    info!("📡 WebSocket available at ws://{}/ws", cfg.server_address());

    axum::serve(listener, app_routes)
        .await
        .expect("Server failed to start");
}

fn cors_layer(cfg: &Config) -> CorsLayer {
    match cfg
        .cors_origins
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}
