/*
 * Responsibility
 * - GET /health (疎通用、匿名でも 200)
 * - 認証 middleware を通った結果 (authenticated かどうか) も返す
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn health(AuthCtxExtractor(ctx): AuthCtxExtractor) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "authenticated": ctx.is_authenticated()})),
    )
}
