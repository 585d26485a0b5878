//! Per-request authentication decision.
//!
//! `Authorization: Bearer <jwt>` → TokenService::parse → identity lookup → expiry check.
//! Token problems never fail the request; they only leave it anonymous. The one
//! error that escapes is a failed identity lookup.

use std::sync::Arc;

use axum::http::{HeaderMap, header};

use crate::services::auth::principal::Principal;
use crate::services::auth::token_service::{TokenError, TokenService};
use crate::services::identity::{IdentityError, IdentityLookup};

pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug)]
pub enum AuthOutcome {
    Authenticated(Principal),
    /// The request context already holds a principal; nothing was checked.
    AlreadyAuthenticated,
    Anonymous(AnonymousReason),
}

#[derive(Debug)]
pub enum AnonymousReason {
    MissingHeader,
    NotBearer,
    InvalidToken(TokenError),
    EmptySubject,
    Expired,
}

#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<TokenService>,
    identities: Arc<dyn IdentityLookup>,
}

impl Authenticator {
    pub fn new(tokens: Arc<TokenService>, identities: Arc<dyn IdentityLookup>) -> Self {
        Self { tokens, identities }
    }

    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        already_authenticated: bool,
    ) -> Result<AuthOutcome, IdentityError> {
        // once per request
        if already_authenticated {
            return Ok(AuthOutcome::AlreadyAuthenticated);
        }

        let token = match bearer_token(headers) {
            Ok(token) => token,
            Err(reason) => return Ok(AuthOutcome::Anonymous(reason)),
        };

        let claims = match self.tokens.parse(token) {
            Ok(claims) => claims,
            Err(e) => return Ok(AuthOutcome::Anonymous(AnonymousReason::InvalidToken(e))),
        };

        if claims.subject().is_empty() {
            return Ok(AuthOutcome::Anonymous(AnonymousReason::EmptySubject));
        }

        // Lookup precedes the expiry check: an unknown subject is an error even
        // when its token has also expired.
        let identity = self.identities.lookup(claims.subject()).await?;

        match self.tokens.check_expiry(&claims) {
            Ok(()) => Ok(AuthOutcome::Authenticated(Principal::from_identity(
                identity.as_ref(),
            ))),
            Err(_) => Ok(AuthOutcome::Anonymous(AnonymousReason::Expired)),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AnonymousReason> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AnonymousReason::MissingHeader)?;
    let value = value.to_str().map_err(|_| AnonymousReason::NotBearer)?;
    value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AnonymousReason::NotBearer)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::services::auth::clock::ManualClock;
    use crate::services::identity::{Identity, IdentityRecord, InMemoryIdentityStore};

    const ALICE: &str = "alice@example.com";

    struct CountingLookup {
        inner: InMemoryIdentityStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityLookup for CountingLookup {
        async fn lookup(&self, subject: &str) -> Result<Box<dyn Identity>, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(subject).await
        }
    }

    struct Fixture {
        authenticator: Authenticator,
        tokens: Arc<TokenService>,
        clock: Arc<ManualClock>,
        lookup: Arc<CountingLookup>,
    }

    impl Fixture {
        fn new() -> Self {
            let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
            let clock = Arc::new(ManualClock::new(start));
            let tokens = Arc::new(
                TokenService::new("s3cr3t", Duration::from_secs(3600))
                    .unwrap()
                    .with_clock(clock.clone()),
            );
            let lookup = Arc::new(CountingLookup {
                inner: InMemoryIdentityStore::with_identities([IdentityRecord::new(
                    ALICE,
                    ["ROLE_USER", "ROLE_ADMIN"],
                )]),
                calls: AtomicUsize::new(0),
            });
            let authenticator = Authenticator::new(tokens.clone(), lookup.clone());

            Self {
                authenticator,
                tokens,
                clock,
                lookup,
            }
        }

        fn token_for(&self, subject: &str, roles: &[&str]) -> String {
            let roles: BTreeSet<String> = roles.iter().map(|r| r.to_string()).collect();
            self.tokens.generate(subject, &roles).unwrap()
        }

        fn lookups(&self) -> usize {
            self.lookup.calls.load(Ordering::SeqCst)
        }
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn valid_token_authenticates_with_identity_roles() {
        let fx = Fixture::new();
        // token claims only ROLE_USER; the store grants ROLE_ADMIN too
        let token = fx.token_for(ALICE, &["ROLE_USER"]);

        let outcome = fx
            .authenticator
            .authenticate(&headers_with(&format!("Bearer {token}")), false)
            .await
            .unwrap();

        match outcome {
            AuthOutcome::Authenticated(principal) => {
                assert_eq!(principal.subject, ALICE);
                assert!(principal.has_role("ROLE_ADMIN"));
                assert!(principal.has_role("ROLE_USER"));
            }
            other => panic!("expected Authenticated, got {other:?}"),
        }
        assert_eq!(fx.lookups(), 1);
    }

    #[tokio::test]
    async fn missing_header_is_anonymous_without_lookup() {
        let fx = Fixture::new();

        let outcome = fx
            .authenticator
            .authenticate(&HeaderMap::new(), false)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            AuthOutcome::Anonymous(AnonymousReason::MissingHeader)
        ));
        assert_eq!(fx.lookups(), 0);
    }

    #[tokio::test]
    async fn other_schemes_are_anonymous_without_lookup() {
        let fx = Fixture::new();
        let token = fx.token_for(ALICE, &["ROLE_USER"]);

        for value in [
            format!("Basic {token}"),
            format!("bearer {token}"),
            format!("Bearer{token}"),
            token.clone(),
        ] {
            let outcome = fx
                .authenticator
                .authenticate(&headers_with(&value), false)
                .await
                .unwrap();
            assert!(
                matches!(outcome, AuthOutcome::Anonymous(AnonymousReason::NotBearer)),
                "{value:?}"
            );
        }
        assert_eq!(fx.lookups(), 0);
    }

    #[tokio::test]
    async fn malformed_token_is_anonymous_without_lookup() {
        let fx = Fixture::new();

        let outcome = fx
            .authenticator
            .authenticate(&headers_with("Bearer not-a-jwt"), false)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            AuthOutcome::Anonymous(AnonymousReason::InvalidToken(TokenError::Malformed(_)))
        ));
        assert_eq!(fx.lookups(), 0);
    }

    #[tokio::test]
    async fn foreign_signature_is_anonymous() {
        let fx = Fixture::new();
        let other = TokenService::new("someone-else", Duration::from_secs(3600)).unwrap();
        let token = other.generate(ALICE, &BTreeSet::new()).unwrap();

        let outcome = fx
            .authenticator
            .authenticate(&headers_with(&format!("Bearer {token}")), false)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            AuthOutcome::Anonymous(AnonymousReason::InvalidToken(TokenError::Signature))
        ));
        assert_eq!(fx.lookups(), 0);
    }

    #[tokio::test]
    async fn expired_token_is_anonymous_not_an_error() {
        let fx = Fixture::new();
        let token = fx.token_for(ALICE, &["ROLE_USER"]);
        fx.clock.advance_secs(3600);

        let outcome = fx
            .authenticator
            .authenticate(&headers_with(&format!("Bearer {token}")), false)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            AuthOutcome::Anonymous(AnonymousReason::Expired)
        ));
    }

    #[tokio::test]
    async fn unknown_subject_propagates_not_found() {
        let fx = Fixture::new();
        let token = fx.token_for("ghost@example.com", &["ROLE_USER"]);

        let err = fx
            .authenticator
            .authenticate(&headers_with(&format!("Bearer {token}")), false)
            .await
            .unwrap_err();

        assert!(matches!(err, IdentityError::NotFound { .. }));
        assert_eq!(fx.lookups(), 1);
    }

    #[tokio::test]
    async fn expired_token_for_unknown_subject_is_still_not_found() {
        let fx = Fixture::new();
        let token = fx.token_for("ghost@example.com", &["ROLE_USER"]);
        fx.clock.advance_secs(3601);

        let result = fx
            .authenticator
            .authenticate(&headers_with(&format!("Bearer {token}")), false)
            .await;

        // lookup runs before the expiry check
        assert!(matches!(
            result,
            Err(IdentityError::NotFound { ref subject }) if subject == "ghost@example.com"
        ));
        assert_eq!(fx.lookups(), 1);
    }

    #[tokio::test]
    async fn already_authenticated_context_is_left_alone() {
        let fx = Fixture::new();
        let token = fx.token_for(ALICE, &["ROLE_USER"]);

        let outcome = fx
            .authenticator
            .authenticate(&headers_with(&format!("Bearer {token}")), true)
            .await
            .unwrap();

        assert!(matches!(outcome, AuthOutcome::AlreadyAuthenticated));
        assert_eq!(fx.lookups(), 0);
    }
}
