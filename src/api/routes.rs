use actix_web::{get, web, HttpResponse};

use crate::api::game;
use crate::config::AppConfig;
use crate::game::board::EngineKind;

/// Registers all API routes with the application.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/games").configure(game::configure))
        .service(health_check);
}

/// Liveness probe. Reports the build version, the configured board size and
/// the rulesets requests can be routed to.
#[get("/health")]
async fn health_check(config: web::Data<AppConfig>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "board_size": config.game.board_size,
        "engines": [EngineKind::Dummy, EngineKind::Case],
        "checked_at": chrono::Utc::now().to_rfc3339(),
    }))
}
