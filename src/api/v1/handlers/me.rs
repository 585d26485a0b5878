/*
 * Responsibility
 * - GET /me: 認証済み principal を返す
 * - 匿名リクエストは CurrentPrincipal extractor が 401 にする
 */
use axum::Json;

use crate::api::v1::dto::me::MeResponse;
use crate::api::v1::extractors::CurrentPrincipal;

pub async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> Json<MeResponse> {
    Json(MeResponse {
        subject: principal.subject,
        roles: principal.roles.into_iter().collect(),
    })
}
