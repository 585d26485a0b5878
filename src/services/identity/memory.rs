use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Identity, IdentityError, IdentityLookup, IdentityRecord};

/// Process-local identity store. Used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    identities: RwLock<HashMap<String, IdentityRecord>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identities(records: impl IntoIterator<Item = IdentityRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert or replace the identity keyed by its subject.
    pub fn insert(&self, record: IdentityRecord) {
        let mut guard = match self.identities.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(record.subject.clone(), record);
    }

    fn get(&self, subject: &str) -> Option<IdentityRecord> {
        let guard = match self.identities.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.get(subject).cloned()
    }
}

#[async_trait]
impl IdentityLookup for InMemoryIdentityStore {
    async fn lookup(&self, subject: &str) -> Result<Box<dyn Identity>, IdentityError> {
        // The read guard is released before returning; nothing is held across an await.
        match self.get(subject) {
            Some(record) => Ok(Box::new(record)),
            None => Err(IdentityError::NotFound {
                subject: subject.to_string(),
            }),
        }
    }
}
