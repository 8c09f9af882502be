pub mod follow;
pub mod health;
pub mod webhook;

use actix_web::{web, HttpRequest, HttpResponse};
use crate::AppState;

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
}

/// Guard for the follow routes. They stay closed until FOLLOW_API_TOKEN is set.
pub fn validate_follow_token(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<(), HttpResponse> {
    let expected = match &state.config.follow_api_token {
        Some(t) => t,
        None => {
            return Err(HttpResponse::Forbidden().json(serde_json::json!({
                "error": "Follow API disabled"
            })));
        }
    };

    match extract_bearer_token(req) {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
        Some(_) => Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid token"
        }))),
        None => Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "No authorization token provided"
        }))),
    }
}
