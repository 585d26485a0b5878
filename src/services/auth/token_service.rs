use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::error;

use crate::services::auth::claims::ClaimSet;
use crate::services::auth::clock::{Clock, SystemClock};
use crate::services::identity::Identity;

/// Upper bound for a token lifetime (ten years).
pub const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature does not match")]
    Signature,

    #[error("token expired")]
    Expired,

    #[error("token subject must not be empty")]
    EmptySubject,

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token configuration: {0}")]
    Config(&'static str),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            // A header naming another algorithm is a forged or foreign token,
            // treat it like a bad signature rather than a parse failure.
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::Signature,
            _ => Self::Malformed(e.to_string()),
        }
    }
}

/// HS256 token issuer + verifier backed by a single static secret.
///
/// - `parse` checks shape and signature only.
/// - Expiration is a separate, explicit step (`check_expiry`).
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("validation", &self.validation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::Config("signing secret must not be empty"));
        }
        if ttl.as_secs() == 0 {
            return Err(TokenError::Config("token ttl must be positive"));
        }
        if ttl.as_secs() > MAX_TTL_SECONDS {
            return Err(TokenError::Config("token ttl is out of range"));
        }
        let ttl_seconds = i64::try_from(ttl.as_secs())
            .map_err(|_| TokenError::Config("token ttl is out of range"))?;

        let mut validation = Validation::new(Algorithm::HS256);
        // exp is inspected by `check_expiry` against our own clock
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Sign a new token for `subject` carrying `roles`.
    pub fn generate(&self, subject: &str, roles: &BTreeSet<String>) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let now = self.clock.now();
        let exp = now
            .checked_add(self.ttl_seconds)
            .ok_or(TokenError::Config("token expiry overflows the clock"))?;
        let claims = ClaimSet {
            sub: subject.to_string(),
            roles: roles.clone(),
            iat: now,
            exp,
        };

        // Header::new sets typ=JWT
        let header = Header::new(Algorithm::HS256);
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            TokenError::Signing(e)
        })
    }

    /// Sign a token for an identity using the roles it currently holds.
    pub fn generate_for(&self, identity: &dyn Identity) -> Result<String, TokenError> {
        self.generate(identity.subject(), &identity.roles())
    }

    /// Verify shape + signature and decode the claims. Expiration is NOT checked.
    ///
    /// The HMAC covers `header.payload` and is checked before either segment is
    /// decoded, so a changed byte anywhere in a well-formed token is a
    /// `Signature` error.
    pub fn parse(&self, token: &str) -> Result<ClaimSet, TokenError> {
        check_shape(token)?;
        self.verify_signature(token)?;
        let data = jsonwebtoken::decode::<ClaimSet>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    fn verify_signature(&self, token: &str) -> Result<(), TokenError> {
        let Some((message, signature)) = token.rsplit_once('.') else {
            return Err(TokenError::Malformed("missing signature segment".to_string()));
        };
        match jsonwebtoken::crypto::verify(
            signature,
            message.as_bytes(),
            &self.decoding_key,
            Algorithm::HS256,
        ) {
            Ok(true) => Ok(()),
            // 署名が base64 として読めない場合も不一致扱い
            Ok(false) | Err(_) => Err(TokenError::Signature),
        }
    }

    pub fn check_expiry(&self, claims: &ClaimSet) -> Result<(), TokenError> {
        if claims.is_live_at(self.clock.now()) {
            Ok(())
        } else {
            Err(TokenError::Expired)
        }
    }

    /// `true` only for a correctly signed, unexpired token.
    pub fn validate(&self, token: &str) -> bool {
        self.parse(token)
            .and_then(|claims| self.check_expiry(&claims))
            .is_ok()
    }
}

fn check_shape(token: &str) -> Result<(), TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(TokenError::Malformed("empty segment".to_string()));
    }
    if !segments.iter().all(|s| is_base64url(s)) {
        return Err(TokenError::Malformed(
            "segment is not base64url encoded".to_string(),
        ));
    }
    Ok(())
}

fn is_base64url(segment: &str) -> bool {
    segment
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
