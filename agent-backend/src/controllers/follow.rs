use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::controllers::validate_follow_token;
use crate::follow::FollowDecision;
use crate::AppState;

// ── Request types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateFollowRequest {
    #[serde(default)]
    pub target_fid: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateUnfollowRequest {
    pub target_fid: u64,
    #[serde(default)]
    pub message: String,
}

// ── Route configuration ─────────────────────────────────────────────────

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/follow/evaluate", web::post().to(evaluate_follow))
            .route("/follow/record", web::post().to(record_follow))
            .route("/follow/quota", web::get().to(get_quota))
            .route("/unfollow/evaluate", web::post().to(evaluate_unfollow)),
    );
}

/// Decode a JSON body once the caller is authorized
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, HttpResponse> {
    serde_json::from_slice(body).map_err(|e| {
        log::debug!("[FOLLOW] Rejected request body: {}", e);
        HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid request body"
        }))
    })
}

fn error_response(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
}

// ── Endpoint handlers ───────────────────────────────────────────────────

/// POST /api/follow/evaluate: decide whether the agent should follow someone
async fn evaluate_follow(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    if let Err(resp) = validate_follow_token(&state, &req) {
        return resp;
    }
    let body: EvaluateFollowRequest = match parse_body(&body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let target_fid = match (body.target_fid, body.username.as_deref()) {
        (Some(fid), _) => fid,
        (None, Some(username)) if !username.trim().is_empty() => {
            match state.graph.user_by_username(username.trim()).await {
                Ok(Some(user)) => user.fid,
                Ok(None) => {
                    return HttpResponse::Ok()
                        .json(with_remaining(&state, FollowDecision::user_not_found()));
                }
                Err(e) => return error_response(e),
            }
        }
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "targetFid or username is required"
            }));
        }
    };

    match state
        .follow_evaluator
        .evaluate_follow(target_fid, state.config.agent_fid)
        .await
    {
        Ok(decision) => HttpResponse::Ok().json(with_remaining(&state, decision)),
        Err(e) => {
            log::error!("[FOLLOW] Follow evaluation for fid {} failed: {}", target_fid, e);
            error_response(e)
        }
    }
}

/// Decision plus how many follows are left today
fn with_remaining(state: &AppState, decision: FollowDecision) -> serde_json::Value {
    let mut value = serde_json::to_value(decision).unwrap_or_default();
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "followsRemaining".to_string(),
            state.follow_evaluator.quota().remaining().into(),
        );
    }
    value
}

/// POST /api/follow/record: count a follow the caller actually performed
async fn record_follow(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = validate_follow_token(&state, &req) {
        return resp;
    }

    let quota = state.follow_evaluator.quota();
    quota.increment();
    log::info!("[FOLLOW] Follow recorded, {} remaining today", quota.remaining());
    HttpResponse::Ok().json(serde_json::json!({
        "followsRemaining": quota.remaining()
    }))
}

/// GET /api/follow/quota
async fn get_quota(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = validate_follow_token(&state, &req) {
        return resp;
    }

    let quota = state.follow_evaluator.quota();
    HttpResponse::Ok().json(serde_json::json!({
        "followsRemaining": quota.remaining(),
        "canFollowToday": quota.can_follow_today(),
        "maxPerDay": quota.max_per_day()
    }))
}

/// POST /api/unfollow/evaluate: in-character answer to "please unfollow me"
async fn evaluate_unfollow(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    if let Err(resp) = validate_follow_token(&state, &req) {
        return resp;
    }
    let body: EvaluateUnfollowRequest = match parse_body(&body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    match state
        .follow_evaluator
        .evaluate_unfollow(body.target_fid, state.config.agent_fid, &body.message)
        .await
    {
        Ok(decision) => HttpResponse::Ok().json(decision),
        Err(e) => {
            log::error!("[FOLLOW] Unfollow evaluation for fid {} failed: {}", body.target_fid, e);
            error_response(e)
        }
    }
}
