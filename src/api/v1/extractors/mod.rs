/*
 * Responsibility
 * - v1 handler 向け extractor の公開ポイント
 */
pub mod auth_ctx;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor, CurrentPrincipal};
