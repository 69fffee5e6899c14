//! Parchment - contract lifecycle service

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parchment::db::schemas::{BlueprintDoc, ContractDoc, BLUEPRINT_COLLECTION, CONTRACT_COLLECTION};
use parchment::db::MongoClient;
use parchment::{server, AppState, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("parchment={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Parchment - Contract Lifecycle API");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("MongoDB: {}", args.mongodb_uri);
    info!("Database: {}", args.mongodb_db);
    info!("CORS origin: {}", args.cors_origin);
    info!("======================================");

    // Connect to MongoDB (required)
    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => {
            info!("MongoDB connected successfully");
            client
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    // Touch both collections up front so indexes exist before traffic arrives
    mongo
        .collection::<BlueprintDoc>(BLUEPRINT_COLLECTION)
        .await
        .map_err(|e| anyhow::anyhow!("blueprint collection init failed: {e}"))?;
    mongo
        .collection::<ContractDoc>(CONTRACT_COLLECTION)
        .await
        .map_err(|e| anyhow::anyhow!("contract collection init failed: {e}"))?;
    info!("Collections ready: {}, {}", BLUEPRINT_COLLECTION, CONTRACT_COLLECTION);

    let state = Arc::new(AppState::new(args, mongo));

    // Serve until ctrl-c
    tokio::select! {
        result = server::run(Arc::clone(&state)) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down gracefully...");
        }
    }

    Ok(())
}
