/*
 * Responsibility
 * - middleware の公開インターフェース
 *   - auth::access::apply (bearer 認証 → AuthCtx)
 *   - http::apply (request id / trace / limit / timeout)
 */
pub mod auth;
pub mod http;
