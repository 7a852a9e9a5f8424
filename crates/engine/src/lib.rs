//! Ledger engine.
//!
//! Holds every user's income/expense history, product catalog, budgets and
//! reminder preference behind [`Ledger`], which runs each operation as a
//! per-user transaction (load → mutate → save) on an injected
//! [`AccountStore`].

pub use account::{
    Account, EntryKind, ExpenseEntry, ExportRow, IncomeEntry, PeriodEntries, Reminder,
};
pub use analytics::{HabitSummary, habit_summary};
pub use budget::{Budget, Budgets, CategoryConsumption, consumption_report};
pub use catalog::{Catalog, CatalogCategory, CatalogItem, Product};
pub use error::EngineError;
pub use money::{CURRENCY_LABEL, MoneyCents};
pub use ops::{Ledger, Summary, Window};
pub use store::{AccountStore, JsonFileStore, MemoryStore, write_atomic};

mod account;
mod analytics;
mod budget;
mod catalog;
mod error;
mod money;
mod ops;
mod store;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
