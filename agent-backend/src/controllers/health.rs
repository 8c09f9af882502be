use actix_web::{web, HttpResponse, Responder};

use crate::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/api/health/config").route(web::get().to(get_config_status)));
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": VERSION
    }))
}

async fn get_config_status(state: web::Data<AppState>) -> impl Responder {
    let config = &state.config;
    HttpResponse::Ok().json(serde_json::json!({
        "agent_fid": config.agent_fid,
        "agent_handle": config.agent_handle,
        "neynar_configured": !config.neynar_api_key.is_empty(),
        "openai_configured": !config.openai_api_key.is_empty(),
        "signer_configured": config.signer_private_key.is_some(),
        "custody_address": config.custody_address,
        "follow_api_enabled": config.follow_api_token.is_some()
    }))
}
