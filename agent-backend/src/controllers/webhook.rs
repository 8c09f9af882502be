use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::AppState;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    // Every method reaches the handler so non-POST gets a JSON 405
    cfg.service(web::resource("/api/webhook").route(web::route().to(receive_webhook)));
}

/// ANY /api/webhook: Neynar webhook deliveries
async fn receive_webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    let outcome = state.pipeline.handle(req.method(), &body).await;
    HttpResponse::build(outcome.status).json(outcome.body)
}
