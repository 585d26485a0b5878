//! access token（HS256 JWT）検証 → AuthCtx を extensions に入れる
//!
//! - 1 リクエストにつき 1 回だけ実行される (既に認証済みなら何もしない)
//! - token が無い/壊れている/期限切れ → 匿名のまま次へ (認可は下流の責務)
//! - subject が identity lookup で解決できない → 401 で打ち切り

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AuthOutcome;
use crate::state::AppState;

/// Router 全体に認証 middleware を適用する。
///
/// 例：
/// ```ignore
/// let router = Router::new().nest("/api/v1", api::v1::routes());
/// let router = middleware::auth::access::apply(router, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let mut ctx = req.extensions_mut().remove::<AuthCtx>().unwrap_or_default();

    let outcome = state
        .auth
        .authenticate(req.headers(), ctx.is_authenticated())
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "identity lookup failed for bearer token");
            AppError::from(err)
        })?;

    match outcome {
        AuthOutcome::Authenticated(principal) => {
            tracing::debug!(subject = %principal.subject, "request authenticated");
            if let Err(err) = ctx.authenticate(principal) {
                tracing::warn!(error = %err, "auth context was already populated");
            }
        }
        AuthOutcome::AlreadyAuthenticated => {}
        AuthOutcome::Anonymous(reason) => {
            tracing::debug!(?reason, "request continues anonymously");
        }
    }

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
