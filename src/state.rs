/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: token 検証 + identity lookup (secret/TTL は起動後 read-only)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use crate::services::auth::Authenticator;

#[derive(Clone)]
pub struct AppState {
    pub auth: Authenticator,
}

impl AppState {
    pub fn new(auth: Authenticator) -> Self {
        Self { auth }
    }
}
