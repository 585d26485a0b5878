/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証 middleware は app.rs で Router 全体に掛ける (ここでは掛けない)
 * - 認証が必須かどうかは handler の extractor (CurrentPrincipal) で決まる
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, me::me};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/me", get(me))
}
