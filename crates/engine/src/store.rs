//! Durable storage for accounts.
//!
//! The ledger never touches a file or a map directly: it goes through
//! [`AccountStore`]. [`MemoryStore`] backs tests, [`JsonFileStore`] keeps one
//! pretty-printed JSON document (`{"users": {"<id>": Account}}`) on disk and
//! replaces it atomically on every save.

use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};

use crate::{Account, EngineError, ResultEngine};

/// Load/save access to per-user accounts.
pub trait AccountStore: Send + Sync + 'static {
    /// The stored account, or `None` if the user has never been saved.
    fn load(&self, user_id: &str) -> impl Future<Output = ResultEngine<Option<Account>>> + Send;

    /// Replaces the stored account of `user_id`.
    fn save(&self, user_id: &str, account: &Account) -> impl Future<Output = ResultEngine<()>> + Send;

    /// Every user with a stored account.
    fn user_ids(&self) -> impl Future<Output = ResultEngine<Vec<String>>> + Send;

    /// Every stored account with its user id, from a single read.
    fn load_all(&self) -> impl Future<Output = ResultEngine<Vec<(String, Account)>>> + Send;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<String, Account>>,
}

impl AccountStore for MemoryStore {
    async fn load(&self, user_id: &str) -> ResultEngine<Option<Account>> {
        Ok(self.accounts.lock().await.get(user_id).cloned())
    }

    async fn save(&self, user_id: &str, account: &Account) -> ResultEngine<()> {
        self.accounts
            .lock()
            .await
            .insert(user_id.to_string(), account.clone());
        Ok(())
    }

    async fn user_ids(&self) -> ResultEngine<Vec<String>> {
        let mut ids: Vec<String> = self.accounts.lock().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn load_all(&self) -> ResultEngine<Vec<(String, Account)>> {
        let mut accounts: Vec<(String, Account)> = self
            .accounts
            .lock()
            .await
            .iter()
            .map(|(id, account)| (id.clone(), account.clone()))
            .collect();
        accounts.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(accounts)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    users: BTreeMap<String, Account>,
}

/// Whole-document JSON file store.
///
/// Reads and writes are serialized by a document lock so saves for different
/// users never overwrite each other.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document. A missing file is an empty document; an
    /// unreadable one is moved aside and replaced by an empty document, and
    /// the caller still gets [`EngineError::PersistenceCorrupt`].
    async fn read_document(&self) -> ResultEngine<Document> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Document::default()),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(document) => Ok(document),
            Err(err) => {
                let quarantined = self.quarantine().await?;
                tracing::error!(
                    path = %self.path.display(),
                    moved_to = %quarantined.display(),
                    "ledger document is corrupt, starting from an empty one: {err}"
                );
                write_atomic(&self.path, &Document::default()).await?;
                Err(EngineError::PersistenceCorrupt(err.to_string()))
            }
        }
    }

    async fn quarantine(&self) -> ResultEngine<PathBuf> {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S")));
        let target = self.path.with_file_name(name);
        fs::rename(&self.path, &target).await?;
        Ok(target)
    }
}

impl AccountStore for JsonFileStore {
    async fn load(&self, user_id: &str) -> ResultEngine<Option<Account>> {
        let _guard = self.document.lock().await;
        let mut document = self.read_document().await?;
        Ok(document.users.remove(user_id))
    }

    async fn save(&self, user_id: &str, account: &Account) -> ResultEngine<()> {
        let _guard = self.document.lock().await;
        let mut document = self.read_document().await?;
        document.users.insert(user_id.to_string(), account.clone());
        write_atomic(&self.path, &document).await
    }

    async fn user_ids(&self) -> ResultEngine<Vec<String>> {
        let _guard = self.document.lock().await;
        let document = self.read_document().await?;
        Ok(document.users.into_keys().collect())
    }

    async fn load_all(&self) -> ResultEngine<Vec<(String, Account)>> {
        let _guard = self.document.lock().await;
        let document = self.read_document().await?;
        Ok(document.users.into_iter().collect())
    }
}

/// Serializes `value` next to `path` and renames it into place, so a crash
/// leaves either the old or the new document, never a truncated one.
pub async fn write_atomic<T: Serialize + Sync>(path: &Path, value: &T) -> ResultEngine<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(value)?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(&json).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MoneyCents;

    fn scratch_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../target/test_stores")
            .join(format!("unit_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::default();
        assert_eq!(store.load("1").await.unwrap(), None);

        let mut account = Account::default();
        account
            .push_income(MoneyCents::new(100), "Salary", Utc::now())
            .unwrap();
        store.save("1", &account).await.unwrap();

        assert_eq!(store.load("1").await.unwrap(), Some(account));
        assert_eq!(store.user_ids().await.unwrap(), vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn file_store_keeps_other_users() {
        let path = scratch_path();
        let store = JsonFileStore::new(&path);

        let mut alice = Account::default();
        alice.budgets.set("Food", MoneyCents::new(1_000)).unwrap();
        store.save("alice", &alice).await.unwrap();
        store.save("bob", &Account::default()).await.unwrap();

        assert_eq!(store.load("alice").await.unwrap(), Some(alice.clone()));
        assert_eq!(
            store.user_ids().await.unwrap(),
            vec!["alice".to_string(), "bob".to_string()]
        );
        assert_eq!(
            store.load_all().await.unwrap(),
            vec![
                ("alice".to_string(), alice),
                ("bob".to_string(), Account::default()),
            ]
        );
        assert!(!path.with_file_name(format!(
            "{}.tmp",
            path.file_name().unwrap().to_string_lossy()
        ))
        .exists());

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn corrupt_document_is_quarantined_and_replaced() {
        let path = scratch_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.load("1").await.unwrap_err();
        assert!(matches!(err, EngineError::PersistenceCorrupt(_)));

        // The replacement document is valid and empty.
        assert_eq!(store.load("1").await.unwrap(), None);

        let prefix = format!("{}.corrupt-", path.file_name().unwrap().to_string_lossy());
        let quarantined: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .collect();
        assert_eq!(quarantined.len(), 1);
        assert_eq!(
            std::fs::read_to_string(quarantined[0].path()).unwrap(),
            "{ not json"
        );

        std::fs::remove_file(quarantined[0].path()).unwrap();
        std::fs::remove_file(&path).unwrap();
    }
}
