/*
 * Responsibility
 * - Handler から見える「認証コンテキスト」の型 (request-scoped)
 * - middleware が 1 リクエストにつき 1 つ request extensions に格納する
 * - 空で始まり、principal は高々 1 回だけセットされる
 */
use crate::services::auth::Principal;

#[derive(Debug, Clone, Default)]
pub struct AuthCtx {
    principal: Option<Principal>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request is already authenticated")]
pub struct AlreadyAuthenticated;

impl AuthCtx {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// One-shot transition Unauthenticated → Authenticated.
    pub fn authenticate(&mut self, principal: Principal) -> Result<(), AlreadyAuthenticated> {
        if self.principal.is_some() {
            return Err(AlreadyAuthenticated);
        }
        self.principal = Some(principal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn principal(subject: &str) -> Principal {
        Principal {
            subject: subject.to_string(),
            roles: BTreeSet::from(["ROLE_USER".to_string()]),
        }
    }

    #[test]
    fn starts_anonymous() {
        let ctx = AuthCtx::anonymous();
        assert!(!ctx.is_authenticated());
        assert!(ctx.principal().is_none());
    }

    #[test]
    fn principal_is_set_at_most_once() {
        let mut ctx = AuthCtx::anonymous();
        ctx.authenticate(principal("alice@example.com")).unwrap();

        assert_eq!(
            ctx.authenticate(principal("mallory@example.com")),
            Err(AlreadyAuthenticated)
        );
        assert_eq!(ctx.principal().unwrap().subject, "alice@example.com");
    }
}
