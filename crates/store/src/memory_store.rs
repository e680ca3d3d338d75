use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use eyre::Result;

use crate::{UserId, UserRecord, UserStore};

/// Non-persistent store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, UserRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    fn get(&self, user: UserId) -> Result<Option<UserRecord>> {
        Ok(self.users.get(&user).map(|r| r.value().clone()))
    }

    async fn insert_if_absent(&self, record: UserRecord) -> Result<(UserRecord, bool)> {
        match self.users.entry(record.telegram_id) {
            Entry::Occupied(e) => Ok((e.get().clone(), false)),
            Entry::Vacant(e) => {
                e.insert(record.clone());
                Ok((record, true))
            }
        }
    }

    async fn record_claim(&self, user: UserId, at: DateTime<Utc>) -> Result<bool> {
        Ok(match self.users.get_mut(&user) {
            Some(mut record) => {
                record.last_faucet_claim = Some(at);
                true
            }
            None => false,
        })
    }

    fn user_count(&self) -> Result<usize> {
        Ok(self.users.len())
    }
}
