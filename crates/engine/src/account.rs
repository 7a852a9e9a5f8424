//! Per-user financial state and the pure operations on it.
//!
//! An [`Account`] is what the store persists for one user. Entries are
//! append-only; only the catalog, the budgets and the reminder change in place.

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Budgets, Catalog, EngineError, MoneyCents, ResultEngine,
    util::{require_positive_amount, required_name},
};

const DEFAULT_REMINDER_TIME: NaiveTime = match NaiveTime::from_hms_opt(20, 0, 0) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeEntry {
    pub amount: MoneyCents,
    pub category: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub amount: MoneyCents,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Daily balance reminder preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub enabled: bool,
    #[serde(with = "hh_mm")]
    pub time_of_day: NaiveTime,
}

impl Default for Reminder {
    fn default() -> Self {
        Self {
            enabled: false,
            time_of_day: DEFAULT_REMINDER_TIME,
        }
    }
}

/// Entries that fall inside a reporting window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeriodEntries {
    pub income: Vec<IncomeEntry>,
    pub expenses: Vec<ExpenseEntry>,
}

impl PeriodEntries {
    pub fn income_total(&self) -> MoneyCents {
        self.income.iter().map(|e| e.amount).sum()
    }

    pub fn expense_total(&self) -> MoneyCents {
        self.expenses.iter().map(|e| e.amount).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

/// One line of the export handed to the file-format collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub kind: EntryKind,
    pub category: String,
    pub product: Option<String>,
    pub amount: MoneyCents,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub income_entries: Vec<IncomeEntry>,
    #[serde(default)]
    pub expense_entries: Vec<ExpenseEntry>,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub budgets: Budgets,
    #[serde(default)]
    pub reminder: Reminder,
}

impl Account {
    /// Σ income − Σ expense over the whole history.
    ///
    /// Totals are summed wide, so a history whose gross income exceeds the
    /// `i64` range still yields its exact net.
    pub fn balance(&self) -> MoneyCents {
        let income: i128 = self
            .income_entries
            .iter()
            .map(|e| i128::from(e.amount.cents()))
            .sum();
        let expenses: i128 = self
            .expense_entries
            .iter()
            .map(|e| i128::from(e.amount.cents()))
            .sum();
        MoneyCents::from_wide(income - expenses)
    }

    /// Appends an income entry and returns the new balance.
    pub fn push_income(
        &mut self,
        amount: MoneyCents,
        category: &str,
        timestamp: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let amount = require_positive_amount(amount)?;
        let category = required_name(category, "category")?;
        let balance = self.balance().checked_add(amount).ok_or_else(|| {
            EngineError::InvalidAmount(format!("{amount} would push the balance out of range"))
        })?;
        self.income_entries.push(IncomeEntry {
            amount,
            category,
            timestamp,
        });
        Ok(balance)
    }

    /// Appends an expense entry when the current balance covers it and
    /// returns the new balance.
    pub fn push_expense(
        &mut self,
        amount: MoneyCents,
        category: &str,
        product: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let amount = require_positive_amount(amount)?;
        let category = required_name(category, "category")?;
        let product = product
            .map(|p| required_name(p, "product"))
            .transpose()?;

        let balance = self.balance();
        if amount > balance {
            return Err(EngineError::InsufficientFunds {
                balance,
                requested: amount,
            });
        }

        self.expense_entries.push(ExpenseEntry {
            amount,
            category,
            product,
            timestamp,
        });
        Ok(balance - amount)
    }

    /// Entries in the calendar month of `as_of` (in its timezone), up to `as_of`.
    pub fn month_to_date<Tz: TimeZone>(&self, as_of: &DateTime<Tz>) -> PeriodEntries {
        let tz = as_of.timezone();
        let in_month = |ts: &DateTime<Utc>| {
            let local = ts.with_timezone(&tz);
            local.year() == as_of.year() && local.month() == as_of.month() && ts <= as_of
        };
        self.filter_entries(in_month)
    }

    /// Entries with a timestamp at or after `cutoff`.
    pub fn since(&self, cutoff: DateTime<Utc>) -> PeriodEntries {
        self.filter_entries(|ts| *ts >= cutoff)
    }

    fn filter_entries(&self, keep: impl Fn(&DateTime<Utc>) -> bool) -> PeriodEntries {
        PeriodEntries {
            income: self
                .income_entries
                .iter()
                .filter(|e| keep(&e.timestamp))
                .cloned()
                .collect(),
            expenses: self
                .expense_entries
                .iter()
                .filter(|e| keep(&e.timestamp))
                .cloned()
                .collect(),
        }
    }

    /// All incomes, then all expenses, each in recording order.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        let income = self.income_entries.iter().map(|e| ExportRow {
            kind: EntryKind::Income,
            category: e.category.clone(),
            product: None,
            amount: e.amount,
            timestamp: e.timestamp,
        });
        let expenses = self.expense_entries.iter().map(|e| ExportRow {
            kind: EntryKind::Expense,
            category: e.category.clone(),
            product: e.product.clone(),
            amount: e.amount,
            timestamp: e.timestamp,
        });
        income.chain(expenses).collect()
    }
}

/// `HH:MM` (de)serialization for the reminder time.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub(super) fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}
