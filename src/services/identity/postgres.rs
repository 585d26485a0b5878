use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

use super::{Identity, IdentityError, IdentityLookup, IdentityRecord};
use crate::repos::user_repo;

/// Identity lookup backed by the `users` table. The subject is the user's email.
#[derive(Debug, Clone)]
pub struct PgIdentityLookup {
    db: PgPool,
}

impl PgIdentityLookup {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityLookup for PgIdentityLookup {
    async fn lookup(&self, subject: &str) -> Result<Box<dyn Identity>, IdentityError> {
        let row = user_repo::find_by_email(&self.db, subject)
            .await
            .map_err(|e| {
                error!(error = %e, "user_repo::find_by_email failed");
                IdentityError::Backend(e.to_string())
            })?
            .ok_or_else(|| IdentityError::NotFound {
                subject: subject.to_string(),
            })?;

        Ok(Box::new(IdentityRecord::new(row.email, row.roles)))
    }
}
