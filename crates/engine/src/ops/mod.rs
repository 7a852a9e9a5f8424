use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{Account, AccountStore, ResultEngine};

mod budgets;
mod catalog;
mod entries;
mod reminders;
mod reports;

pub use reports::{Summary, Window};

/// Per-user transactional access to accounts.
///
/// Every public operation takes the user's lock first, so for one user
/// "check funds, then append" can never interleave with another mutation.
/// Different users only meet inside the store. Locks nobody holds or waits
/// for are swept on every acquisition, so `locks` stays as small as the
/// number of users in flight.
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: AccountStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The user's account, created with defaults when absent.
    ///
    /// Never fails: a store error is logged and an empty account returned.
    pub async fn account(&self, user_id: &str) -> Account {
        match self.read(user_id, Account::clone).await {
            Ok(account) => account,
            Err(err) => {
                tracing::error!(user_id, "failed to load account, using an empty one: {err}");
                Account::default()
            }
        }
    }

    async fn lock_user(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|id, lock| id == user_id || Arc::strong_count(lock) > 1);
            locks.entry(user_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    async fn load(&self, user_id: &str) -> ResultEngine<Account> {
        Ok(self.store.load(user_id).await?.unwrap_or_default())
    }

    /// Runs `f` on a consistent snapshot of the account.
    pub(crate) async fn read<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&Account) -> T,
    ) -> ResultEngine<T> {
        let _guard = self.lock_user(user_id).await;
        let account = self.load(user_id).await?;
        Ok(f(&account))
    }

    /// Load → mutate → save under the user's lock. Nothing is saved when `f`
    /// fails, so a rejected operation leaves the stored account untouched.
    pub(crate) async fn write<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut Account) -> ResultEngine<T>,
    ) -> ResultEngine<T> {
        let _guard = self.lock_user(user_id).await;
        let mut account = self.load(user_id).await?;
        let value = f(&mut account)?;
        self.store.save(user_id, &account).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{MemoryStore, MoneyCents};

    #[tokio::test]
    async fn idle_user_locks_are_swept() {
        let ledger = Ledger::new(MemoryStore::default());
        for user in ["a", "b", "c", "d"] {
            ledger
                .record_income(user, MoneyCents::new(100), "Salary", Utc::now())
                .await
                .unwrap();
        }
        assert_eq!(ledger.locks.lock().await.len(), 1);

        // A held lock survives the sweep triggered by another user.
        let held = ledger.lock_user("a").await;
        ledger.current_balance("b").await.unwrap();
        assert_eq!(ledger.locks.lock().await.len(), 2);
        drop(held);

        ledger.current_balance("b").await.unwrap();
        assert_eq!(ledger.locks.lock().await.len(), 1);
    }
}
