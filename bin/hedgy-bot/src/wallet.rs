use std::sync::Arc;

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use eyre::{eyre, Result, WrapErr};
use hedgy_store::{SecretKey, UserId, UserRecord, UserStore};
use tracing::info;

use crate::cooldown::Clock;

/// A provisioned wallet, ready to sign.
#[derive(Clone)]
pub struct Wallet {
    pub user: UserId,
    pub address: Address,
    pub signer: PrivateKeySigner,
    pub last_claim: Option<chrono::DateTime<chrono::Utc>>,
    secret: SecretKey,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("user", &self.user)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    fn from_record(record: &UserRecord) -> Result<Self> {
        let signer: PrivateKeySigner = record
            .private_key
            .expose()
            .parse()
            .map_err(|_| eyre!("stored key for user {} is not a valid secp256k1 key", record.telegram_id))?;
        let address: Address = record
            .wallet_address
            .parse()
            .wrap_err_with(|| format!("stored address for user {}", record.telegram_id))?;
        if address != signer.address() {
            return Err(eyre!("stored address for user {} does not match its key", record.telegram_id));
        }
        Ok(Self {
            user: record.telegram_id,
            address,
            signer,
            last_claim: record.last_faucet_claim,
            secret: record.private_key.clone(),
        })
    }

    /// The only way the key leaves the process: the export flow.
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

#[derive(Clone)]
pub struct Wallets {
    store: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl Wallets {
    pub fn new(store: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn get(&self, user: UserId) -> Result<Option<Wallet>> {
        self.store.get(user)?.as_ref().map(Wallet::from_record).transpose()
    }

    /// Returns the user's wallet and whether it was created by this call.
    ///
    /// A fresh key is generated only when no record exists; if another request wins the
    /// insert, its record is returned and ours is dropped.
    pub async fn get_or_create(&self, user: UserId, username: Option<&str>) -> Result<(Wallet, bool)> {
        if let Some(record) = self.store.get(user)? {
            return Ok((Wallet::from_record(&record)?, false));
        }

        let signer = PrivateKeySigner::random();
        let record = UserRecord {
            telegram_id: user,
            username: username.map(str::to_string),
            wallet_address: signer.address().to_checksum(None),
            private_key: SecretKey::new(signer.to_bytes().to_string()),
            created_at: self.clock.now(),
            last_faucet_claim: None,
        };
        let (stored, created) = self.store.insert_if_absent(record).await?;
        if created {
            info!(user, address = %stored.wallet_address, "wallet created");
        }
        Ok((Wallet::from_record(&stored)?, created))
    }
}
