use std::collections::BTreeSet;

use crate::services::identity::Identity;

/// A resolved, authenticated principal.
///
/// Roles come from the identity source at authentication time, never from the
/// token's own `roles` claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn from_identity(identity: &dyn Identity) -> Self {
        Self {
            subject: identity.subject().to_string(),
            roles: identity.roles(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl Identity for Principal {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn roles(&self) -> BTreeSet<String> {
        self.roles.clone()
    }
}
