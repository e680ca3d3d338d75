use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{UserId, UserRecord, UserStore};

/// Single JSON document on disk, rewritten on every mutation.
///
/// The document lock is only held in memory. Flushes run on the blocking pool, one at a
/// time, and a failed flush undoes its change.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: Arc<PathBuf>,
    doc: Arc<Mutex<Document>>,
    flush: Arc<tokio::sync::Mutex<()>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    // keys are decimal telegram ids, as in the JSON layout
    #[serde(default)]
    users: BTreeMap<String, UserRecord>,
}

impl FileStore {
    /// Opens `path`, creating the parent directory and an empty document if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).wrap_err_with(|| format!("create {}", dir.display()))?;
        }

        let doc = if path.exists() {
            let file = File::open(&path).wrap_err_with(|| format!("open {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .wrap_err_with(|| format!("parse {}", path.display()))?
        } else {
            let doc = Document::default();
            write_atomically(&path, &serde_json::to_vec_pretty(&doc)?)?;
            doc
        };
        info!(path = %path.display(), users = doc.users.len(), "user store loaded");

        Ok(Self {
            path: Arc::new(path),
            doc: Arc::new(Mutex::new(doc)),
            flush: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Document>> {
        self.doc.lock().map_err(|_| eyre!("user store lock poisoned"))
    }

    /// Writes `bytes` on the blocking pool. Callers hold `flush`.
    async fn persist(&self, bytes: Vec<u8>) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| eyre!("user store flush task failed: {e}"))?
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp).wrap_err_with(|| format!("create {}", tmp.display()))?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path).wrap_err_with(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "user store flushed");
    Ok(())
}

#[async_trait]
impl UserStore for FileStore {
    fn get(&self, user: UserId) -> Result<Option<UserRecord>> {
        Ok(self.lock()?.users.get(&user.to_string()).cloned())
    }

    async fn insert_if_absent(&self, record: UserRecord) -> Result<(UserRecord, bool)> {
        let _flush = self.flush.lock().await;
        let key = record.telegram_id.to_string();
        let bytes = {
            let mut doc = self.lock()?;
            if let Some(existing) = doc.users.get(&key) {
                return Ok((existing.clone(), false));
            }
            doc.users.insert(key.clone(), record.clone());
            serde_json::to_vec_pretty(&*doc)?
        };

        if let Err(e) = self.persist(bytes).await {
            // keep memory and disk in agreement
            self.lock()?.users.remove(&key);
            return Err(e);
        }
        Ok((record, true))
    }

    async fn record_claim(&self, user: UserId, at: DateTime<Utc>) -> Result<bool> {
        let _flush = self.flush.lock().await;
        let key = user.to_string();
        let (previous, bytes) = {
            let mut doc = self.lock()?;
            let Some(record) = doc.users.get_mut(&key) else {
                return Ok(false);
            };
            let previous = record.last_faucet_claim.replace(at);
            (previous, serde_json::to_vec_pretty(&*doc)?)
        };

        if let Err(e) = self.persist(bytes).await {
            if let Some(record) = self.lock()?.users.get_mut(&key) {
                record.last_faucet_claim = previous;
            }
            return Err(e);
        }
        Ok(true)
    }

    fn user_count(&self) -> Result<usize> {
        Ok(self.lock()?.users.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::sample_record;

    fn temp_path(tag: &str) -> PathBuf {
        static N: AtomicUsize = AtomicUsize::new(0);
        let n = N.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("hedgy-store-{}-{tag}-{n}", std::process::id()))
            .join("users.json")
    }

    #[test]
    fn creates_empty_document() {
        let path = temp_path("empty");
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.user_count().unwrap(), 0);
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"users\""));
    }

    #[tokio::test]
    async fn insert_is_first_writer_wins_and_survives_reopen() {
        let path = temp_path("insert");
        let store = FileStore::open(&path).unwrap();

        let (first, inserted) = store.insert_if_absent(sample_record(7, "0xaaaa")).await.unwrap();
        assert!(inserted);
        let (second, inserted) = store.insert_if_absent(sample_record(7, "0xbbbb")).await.unwrap();
        assert!(!inserted);
        assert_eq!(first.wallet_address, second.wallet_address);

        let reopened = FileStore::open(&path).unwrap();
        let loaded = reopened.get(7).unwrap().unwrap();
        assert_eq!(loaded.wallet_address, "0xaaaa");
        assert_eq!(reopened.user_count().unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_agree_on_one_record() {
        let store = FileStore::open(temp_path("race")).unwrap();
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let store = store.clone();
            tasks.spawn(async move {
                store
                    .insert_if_absent(sample_record(99, &format!("0x{i:040x}")))
                    .await
                    .unwrap()
                    .0
                    .wallet_address
            });
        }
        let mut addresses = Vec::new();
        while let Some(address) = tasks.join_next().await {
            addresses.push(address.unwrap());
        }
        assert_eq!(addresses.len(), 8);
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.user_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_flush_is_rolled_back() {
        let path = temp_path("rollback");
        let store = FileStore::open(&path).unwrap();
        store.insert_if_absent(sample_record(1, "0x01")).await.unwrap();

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
        assert!(store.insert_if_absent(sample_record(2, "0x02")).await.is_err());
        assert!(store.get(2).unwrap().is_none());
        assert!(store.record_claim(1, Utc::now()).await.is_err());
        assert_eq!(store.get(1).unwrap().unwrap().last_faucet_claim, None);
        assert_eq!(store.user_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn record_claim_persists() {
        let path = temp_path("claim");
        let store = FileStore::open(&path).unwrap();
        let at = Utc::now();

        assert!(!store.record_claim(5, at).await.unwrap());
        store.insert_if_absent(sample_record(5, "0x05")).await.unwrap();
        assert!(store.record_claim(5, at).await.unwrap());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(5).unwrap().unwrap().last_faucet_claim, Some(at));
    }

    #[test]
    fn loads_existing_document() {
        let path = temp_path("existing");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"users":{"123":{"telegramId":123,"username":"alice","walletAddress":"0x0123","privateKey":"0xfeed","createdAt":"2024-01-01T00:00:00.000Z","lastFaucetClaim":null}}}"#,
        )
        .unwrap();

        let store = FileStore::open(&path).unwrap();
        let record = store.get(123).unwrap().unwrap();
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(record.last_faucet_claim, None);
    }
}
