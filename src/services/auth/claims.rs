use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Claims carried by every token this service signs.
///
/// Field names follow the registered JWT claims so any standard verifier can
/// read them. `roles` is a private claim; it is informational only (the
/// authenticated principal always takes its roles from the identity source).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    pub sub: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    pub iat: i64,
    pub exp: i64,
}

impl ClaimSet {
    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    pub fn expires_at(&self) -> i64 {
        self.exp
    }

    /// Live iff expiration is strictly after `now`.
    pub fn is_live_at(&self, now: i64) -> bool {
        self.exp > now
    }
}
