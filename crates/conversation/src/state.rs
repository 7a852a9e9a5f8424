//! Where each user is in a conversation, and the store keeping it.

use std::{
    collections::{BTreeMap, HashMap},
    io::ErrorKind,
    path::Path,
    sync::Arc,
};

use chrono::{DateTime, TimeDelta, Utc};
use engine::EngineError;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum IncomeStep {
    SelectCategory,
    AwaitCustomCategory,
    AwaitAmount { category: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ExpenseStep {
    SelectCategory,
    SelectProductOrManual { category: String },
    AwaitManualAmount { category: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ProductsStep {
    Menu,
    AddSelectCategory,
    AddAwaitPair { category: String },
    RemoveSelect,
    RemoveConfirm { category: String, name: String },
    UpdateSelect,
    UpdateAwaitPrice { category: String, name: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum BudgetStep {
    SelectCategory,
    AwaitAmount { category: String },
}

/// The active topic of a user and its step. Idle users have none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "state", rename_all = "snake_case")]
pub enum Flow {
    Income(IncomeStep),
    Expense(ExpenseStep),
    Products(ProductsStep),
    Budget(BudgetStep),
    Reminder,
}

impl Flow {
    /// `topic.step`, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Flow::Income(IncomeStep::SelectCategory) => "income.select_category",
            Flow::Income(IncomeStep::AwaitCustomCategory) => "income.await_custom_category",
            Flow::Income(IncomeStep::AwaitAmount { .. }) => "income.await_amount",
            Flow::Expense(ExpenseStep::SelectCategory) => "expense.select_category",
            Flow::Expense(ExpenseStep::SelectProductOrManual { .. }) => {
                "expense.select_product_or_manual"
            }
            Flow::Expense(ExpenseStep::AwaitManualAmount { .. }) => "expense.await_manual_amount",
            Flow::Products(ProductsStep::Menu) => "products.menu",
            Flow::Products(ProductsStep::AddSelectCategory) => "products.add_select_category",
            Flow::Products(ProductsStep::AddAwaitPair { .. }) => "products.add_await_pair",
            Flow::Products(ProductsStep::RemoveSelect) => "products.remove_select",
            Flow::Products(ProductsStep::RemoveConfirm { .. }) => "products.remove_confirm",
            Flow::Products(ProductsStep::UpdateSelect) => "products.update_select",
            Flow::Products(ProductsStep::UpdateAwaitPrice { .. }) => "products.update_await_price",
            Flow::Budget(BudgetStep::SelectCategory) => "budget.select_category",
            Flow::Budget(BudgetStep::AwaitAmount { .. }) => "budget.await_amount",
            Flow::Reminder => "reminder.await_setting",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub flow: Option<Flow>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Session {
    /// `true` when a topic is active but untouched for longer than `ttl`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Option<TimeDelta>) -> bool {
        match (&self.flow, self.last_activity, ttl) {
            (Some(_), Some(last), Some(ttl)) => now - last > ttl,
            _ => false,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionsFile {
    #[serde(default)]
    sessions: BTreeMap<String, Session>,
}

/// One session per user, each behind its own FIFO mutex.
///
/// Holding the guard returned by [`SessionStore::lock`] for the whole handling
/// of an event keeps events of one user strictly ordered. Idle sessions that
/// nobody holds or waits for are dropped on the next [`SessionStore::lock`],
/// so the map only keeps users that are mid-topic or in flight.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub async fn lock(&self, user_id: &str) -> OwnedMutexGuard<Session> {
        let session = {
            let mut guard = self.inner.lock().await;
            guard.retain(|id, session| id == user_id || !is_disposable(session));
            guard.entry(user_id.to_string()).or_default().clone()
        };
        session.lock_owned().await
    }

    pub async fn get(&self, user_id: &str) -> Session {
        self.lock(user_id).await.clone()
    }

    /// Sessions with an active topic.
    pub async fn snapshot(&self) -> BTreeMap<String, Session> {
        let entries: Vec<(String, Arc<Mutex<Session>>)> = {
            let guard = self.inner.lock().await;
            guard
                .iter()
                .map(|(user_id, session)| (user_id.clone(), session.clone()))
                .collect()
        };

        let mut snapshot = BTreeMap::new();
        for (user_id, session) in entries {
            let session = session.lock().await;
            if session.flow.is_some() {
                snapshot.insert(user_id, session.clone());
            }
        }
        snapshot
    }

    pub async fn save(&self, path: &Path) -> Result<usize, EngineError> {
        let file = SessionsFile {
            sessions: self.snapshot().await,
        };
        engine::write_atomic(path, &file).await?;
        Ok(file.sessions.len())
    }

    /// Replaces the current sessions with the ones saved at `path`. A missing
    /// or unreadable file leaves no session at all.
    pub async fn load(&self, path: &Path) -> usize {
        let file = match tokio::fs::read_to_string(path).await {
            Ok(raw) => serde_json::from_str::<SessionsFile>(&raw).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), "ignoring unreadable sessions file: {err}");
                SessionsFile::default()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => SessionsFile::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), "failed to read sessions file: {err}");
                SessionsFile::default()
            }
        };

        let count = file.sessions.len();
        let mut guard = self.inner.lock().await;
        guard.clear();
        for (user_id, session) in file.sessions {
            guard.insert(user_id, Arc::new(Mutex::new(session)));
        }
        count
    }
}

/// Unreferenced outside the map and idle: dropping it loses nothing.
fn is_disposable(session: &Arc<Mutex<Session>>) -> bool {
    Arc::strong_count(session) == 1
        && session
            .try_lock()
            .is_ok_and(|session| session.flow.is_none())
}
