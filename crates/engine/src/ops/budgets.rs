use crate::{
    AccountStore, Budget, CategoryConsumption, MoneyCents, PeriodEntries, ResultEngine,
    consumption_report,
};

use super::Ledger;

impl<S: AccountStore> Ledger<S> {
    /// Sets the spending limit of `category`; the last write wins.
    pub async fn set_budget(&self, user_id: &str, category: &str, limit: MoneyCents) -> ResultEngine<()> {
        self.write(user_id, |account| account.budgets.set(category, limit))
            .await?;
        tracing::info!(user_id, category, %limit, "budget set");
        Ok(())
    }

    pub async fn budgets(&self, user_id: &str) -> ResultEngine<Vec<Budget>> {
        self.read(user_id, |account| account.budgets.iter().cloned().collect())
            .await
    }

    /// Spend per category of `period`, related to the user's budgets.
    pub async fn consumption_report(
        &self,
        user_id: &str,
        period: &PeriodEntries,
    ) -> ResultEngine<Vec<CategoryConsumption>> {
        self.read(user_id, |account| {
            consumption_report(&account.budgets, &period.expenses)
        })
        .await
    }
}
