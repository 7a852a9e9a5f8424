use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Account, AccountStore, CategoryConsumption, HabitSummary, MoneyCents, PeriodEntries,
    ResultEngine, consumption_report, habit_summary,
};

use super::Ledger;

/// Reporting window of a [`Summary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// The last 24 hours.
    Day,
    /// The last 7 days.
    Week,
    /// The calendar month so far.
    Month,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::Day, Window::Week, Window::Month];

    pub fn label(self) -> &'static str {
        match self {
            Window::Day => "Today",
            Window::Week => "This week",
            Window::Month => "This month",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub window: Window,
    pub income_total: MoneyCents,
    pub expense_total: MoneyCents,
    pub net: MoneyCents,
    /// Expenses of the window per category, with budget consumption.
    pub categories: Vec<CategoryConsumption>,
}

impl<S: AccountStore> Ledger<S> {
    pub async fn summary<Tz>(&self, user_id: &str, window: Window, now: &DateTime<Tz>) -> ResultEngine<Summary>
    where
        Tz: TimeZone + Sync,
        Tz::Offset: Sync,
    {
        self.read(user_id, |account| {
            let period = period(account, window, now);
            let income_total = period.income_total();
            let expense_total = period.expense_total();
            Summary {
                window,
                income_total,
                expense_total,
                net: income_total - expense_total,
                categories: consumption_report(&account.budgets, &period.expenses),
            }
        })
        .await
    }

    /// The individual entries of `window`, each list in recording order.
    pub async fn entries_in<Tz>(
        &self,
        user_id: &str,
        window: Window,
        now: &DateTime<Tz>,
    ) -> ResultEngine<PeriodEntries>
    where
        Tz: TimeZone + Sync,
        Tz::Offset: Sync,
    {
        self.read(user_id, |account| period(account, window, now))
            .await
    }

    /// Habit statistics over the whole expense history, with weekdays taken
    /// in `tz`. `None` when the user has no expense yet.
    pub async fn habit_summary<Tz>(&self, user_id: &str, tz: &Tz) -> ResultEngine<Option<HabitSummary>>
    where
        Tz: TimeZone + Sync,
    {
        self.read(user_id, |account| habit_summary(&account.expense_entries, tz))
            .await
    }
}

fn period<Tz: TimeZone>(account: &Account, window: Window, now: &DateTime<Tz>) -> PeriodEntries {
    match window {
        Window::Day => account.since(now.with_timezone(&Utc) - TimeDelta::days(1)),
        Window::Week => account.since(now.with_timezone(&Utc) - TimeDelta::days(7)),
        Window::Month => account.month_to_date(now),
    }
}
