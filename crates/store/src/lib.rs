mod file_store;
mod memory_store;
pub mod session;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use serde::{Deserialize, Serialize};

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use session::{MemorySessionStore, PendingSend, SendKind, SessionStore};

/// Telegram user id.
pub type UserId = u64;

/// Hex-encoded wallet secret. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub telegram_id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    pub wallet_address: String,
    pub private_key: SecretKey,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_faucet_claim: Option<DateTime<Utc>>,
}

/// Persistent user records.
///
/// `insert_if_absent` is the only way to create a record: when two callers race for the
/// same id, exactly one record wins and both get it back.
#[async_trait]
pub trait UserStore: Send + Sync {
    fn get(&self, user: UserId) -> Result<Option<UserRecord>>;

    /// Returns the stored record and whether `record` was the one inserted.
    async fn insert_if_absent(&self, record: UserRecord) -> Result<(UserRecord, bool)>;

    /// Sets `last_faucet_claim`. Returns false if the user has no record.
    async fn record_claim(&self, user: UserId, at: DateTime<Utc>) -> Result<bool>;

    fn user_count(&self) -> Result<usize>;
}

#[cfg(test)]
pub(crate) fn sample_record(id: UserId, address: &str) -> UserRecord {
    UserRecord {
        telegram_id: id,
        username: Some(format!("user{id}")),
        wallet_address: address.to_string(),
        private_key: SecretKey::new(format!("0x{:064x}", id)),
        created_at: DateTime::parse_from_rfc3339("2024-05-01T12:00:00.000Z")
            .map(|t| t.with_timezone(&Utc))
            .unwrap(),
        last_faucet_claim: None,
    }
}
