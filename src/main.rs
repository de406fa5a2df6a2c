use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;
use log::info;

use quantum_tictactoe::api;
use quantum_tictactoe::config::AppConfig;
use quantum_tictactoe::errors::json_error_handler;

/// The main entry point for the Quantum Tic-Tac-Toe service
#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize environment variables from .env file
    dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    info!("Starting Quantum Tic-Tac-Toe service");

    // Load configuration
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded, board size {}",
        config.game.board_size
    );

    let app_config = web::Data::new(config.clone());

    // Start the HTTP server
    info!(
        "Starting web server on {}:{}",
        config.server.host, config.server.port
    );

    HttpServer::new(move || {
        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            // Register application state
            .app_data(app_config.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            // Add middleware
            .wrap(middleware::Logger::default())
            .wrap(cors)
            // Register API routes
            .configure(api::configure_routes)
    })
    .bind(format!("{}:{}", config.server.host, config.server.port))?
    .workers(config.server.workers)
    .run()
    .await
    .context("Server error")?;

    info!("Quantum Tic-Tac-Toe service stopped");
    Ok(())
}
