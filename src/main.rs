use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blankcards::{
    api,
    cards::{BuiltinCards, CardSource, JsonCards},
    config::ServerConfig,
    state::AppState,
    types::GameConfig,
    ws,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blankcards=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting blankcards...");

    let server_config = ServerConfig::from_env();
    let game_config = GameConfig::from_env();
    tracing::info!(
        "Rounds last {}s, hands hold {} cards, {} players needed",
        game_config.round_seconds,
        game_config.hand_size,
        game_config.min_players
    );

    let cards: Arc<dyn CardSource> = match &server_config.cards_path {
        Some(path) => match JsonCards::load(path) {
            Ok(cards) => {
                tracing::info!("Loaded cards from {}", path.display());
                Arc::new(cards)
            }
            Err(e) => {
                tracing::warn!("Failed to load cards: {}. Using the built-in deck.", e);
                Arc::new(BuiltinCards)
            }
        },
        None => Arc::new(BuiltinCards),
    };

    let state = Arc::new(AppState::new(game_config, cards));

    let api_routes = Router::new()
        .route("/api/parties", post(api::create_party))
        .route("/api/parties/{code}", delete(api::delete_party))
        .route("/api/parties/{code}/scores", get(api::party_scores))
        .route("/api/parties/{code}/rounds", get(api::party_rounds));

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(|| async { "ok" }))
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
