/*
 * Responsibility
 * - subject → principal の解決 (identity lookup) の契約
 * - 実装は memory (dev/test) と postgres (sqlx)
 */
use std::collections::BTreeSet;
use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryIdentityStore;
pub use postgres::PgIdentityLookup;

/// Anything that can stand in as an authenticated principal.
pub trait Identity: Debug + Send + Sync {
    fn subject(&self) -> &str;
    fn roles(&self) -> BTreeSet<String>;
}

/// Plain identity value returned by the bundled lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub subject: String,
    pub roles: BTreeSet<String>,
}

impl IdentityRecord {
    pub fn new<I, S>(subject: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl Identity for IdentityRecord {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn roles(&self) -> BTreeSet<String> {
        self.roles.clone()
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no identity found for subject: {subject}")]
    NotFound { subject: String },

    #[error("identity backend failure: {0}")]
    Backend(String),
}

/// Resolves a token subject to the principal it names.
///
/// Implementations may block on a store; callers must not hold shared locks
/// across `lookup`.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn lookup(&self, subject: &str) -> Result<Box<dyn Identity>, IdentityError>;
}
