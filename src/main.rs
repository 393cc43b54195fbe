use tracing::info;

use mmllo::{create_router, select_stores, Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = mmllo::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        mmllo::logging::init_console_only(&config.logging.level);
    }

    info!("mmllo task board server");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database at {}: {e}", config.database.path);
            std::process::exit(1);
        }
    };

    let (stores, selection) = select_stores(&config.database, &db).await;
    info!("Storage backend: {:?}", selection);

    let router = create_router(stores, config.auth.clone(), &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    info!("Listening on {addr}");

    if let Err(e) = axum::serve(listener, router).await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
