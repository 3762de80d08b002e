use geofence_server::config::ServerConfig;
use geofence_server::engine::GeofenceEngine;
use geofence_server::seed::SeedData;
use geofence_server::web::{AppState, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("geofence_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("Invalid configuration");

    // Load seed data (fail fast if invalid)
    let seed = match &config.seed_file {
        Some(path) => SeedData::load(path).expect("Failed to load seed file"),
        None => SeedData::builtin(),
    };

    let engine = GeofenceEngine::new(config.geofence.clone(), config.simulation.clone());
    seed.apply(engine.registry(), engine.geofence_config())
        .await
        .expect("Failed to apply seed data");
    let report = engine.evaluate().await;
    info!(alerts = report.created(), "Initial evaluation complete");

    // Build app state and start the periodic evaluation loop
    let state = AppState::new(engine, config.monitor.clone());
    state.monitor.start();

    let app = create_router(state);

    let addr = config.bind_addr;
    info!("Rail geofence server listening on http://{addr}");
    info!("  GET  /health                           - Health check");
    info!("  GET  /api/trains, /api/objects         - Tracked entities");
    info!("  GET  /api/alerts                       - Alerts");
    info!("  POST /api/simulate/train-movement      - Advance trains");
    info!("  POST /api/simulate/object-theft/{{id}}   - Displace an object");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
