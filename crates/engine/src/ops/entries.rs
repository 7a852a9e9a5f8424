use chrono::{DateTime, TimeZone, Utc};

use crate::{AccountStore, EngineError, ExportRow, MoneyCents, PeriodEntries, ResultEngine};

use super::Ledger;

impl<S: AccountStore> Ledger<S> {
    /// Appends an income entry and returns the new balance.
    pub async fn record_income(
        &self,
        user_id: &str,
        amount: MoneyCents,
        category: &str,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let balance = self
            .write(user_id, |account| {
                account.push_income(amount, category, occurred_at)
            })
            .await?;
        tracing::info!(user_id, %amount, category, %balance, "income recorded");
        Ok(balance)
    }

    /// Appends an expense entry if the balance covers it and returns the new
    /// balance. On [`EngineError::InsufficientFunds`] nothing is stored.
    pub async fn record_expense(
        &self,
        user_id: &str,
        amount: MoneyCents,
        category: &str,
        product: Option<&str>,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let result = self
            .write(user_id, |account| {
                account.push_expense(amount, category, product, occurred_at)
            })
            .await;
        log_expense(user_id, amount, category, &result);
        result
    }

    /// Upserts `product` at `price` in `category` and records an expense of
    /// `price` for it, both or neither.
    pub async fn record_expense_with_new_product(
        &self,
        user_id: &str,
        category: &str,
        product: &str,
        price: MoneyCents,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let result = self
            .write(user_id, |account| {
                account.catalog.upsert(category, product, price)?;
                account.push_expense(price, category, Some(product), occurred_at)
            })
            .await;
        log_expense(user_id, price, category, &result);
        result
    }

    /// Σ income − Σ expense, recomputed from the stored history.
    pub async fn current_balance(&self, user_id: &str) -> ResultEngine<MoneyCents> {
        self.read(user_id, |account| account.balance()).await
    }

    /// Entries of the calendar month of `as_of`, up to `as_of`.
    pub async fn month_to_date<Tz>(
        &self,
        user_id: &str,
        as_of: &DateTime<Tz>,
    ) -> ResultEngine<PeriodEntries>
    where
        Tz: TimeZone + Sync,
        Tz::Offset: Sync,
    {
        self.read(user_id, |account| account.month_to_date(as_of))
            .await
    }

    /// Entries recorded at or after `cutoff`.
    pub async fn since(&self, user_id: &str, cutoff: DateTime<Utc>) -> ResultEngine<PeriodEntries> {
        self.read(user_id, |account| account.since(cutoff)).await
    }

    pub async fn export_rows(&self, user_id: &str) -> ResultEngine<Vec<ExportRow>> {
        self.read(user_id, |account| account.export_rows()).await
    }
}

fn log_expense(
    user_id: &str,
    amount: MoneyCents,
    category: &str,
    result: &ResultEngine<MoneyCents>,
) {
    match result {
        Ok(balance) => tracing::info!(user_id, %amount, category, %balance, "expense recorded"),
        Err(EngineError::InsufficientFunds { balance, .. }) => {
            tracing::info!(user_id, %amount, %balance, "expense rejected: insufficient funds")
        }
        Err(err) => tracing::debug!(user_id, "expense rejected: {err}"),
    }
}
