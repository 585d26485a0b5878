/// Factory: build authentication services from application `Config`.
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::{error, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::{Authenticator, TokenService};
use crate::services::identity::{IdentityLookup, InMemoryIdentityStore, PgIdentityLookup};

pub fn build_token_service(config: &Config) -> Result<Arc<TokenService>, AppError> {
    let tokens = TokenService::new(&config.jwt_secret, config.jwt_ttl).map_err(|e| {
        error!(error = %e, "failed to build token service");
        AppError::Internal
    })?;

    Ok(Arc::new(tokens))
}

pub async fn build_identity_lookup(config: &Config) -> Result<Arc<dyn IdentityLookup>, AppError> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set; using an empty in-memory identity store");
        return Ok(Arc::new(InMemoryIdentityStore::new()));
    };

    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to connect to identity database");
            AppError::Internal
        })?;

    Ok(Arc::new(PgIdentityLookup::new(db)))
}

pub fn build_authenticator(
    config: &Config,
    identities: Arc<dyn IdentityLookup>,
) -> Result<Authenticator, AppError> {
    let tokens = build_token_service(config)?;
    Ok(Authenticator::new(tokens, identities))
}
