use chrono::NaiveTime;

use crate::{AccountStore, Reminder, ResultEngine};

use super::Ledger;

impl<S: AccountStore> Ledger<S> {
    pub async fn reminder(&self, user_id: &str) -> ResultEngine<Reminder> {
        self.read(user_id, |account| account.reminder).await
    }

    /// Turns the daily reminder on or off, keeping its time of day.
    pub async fn set_reminder_enabled(&self, user_id: &str, enabled: bool) -> ResultEngine<Reminder> {
        let reminder = self
            .write(user_id, |account| {
                account.reminder.enabled = enabled;
                Ok(account.reminder)
            })
            .await?;
        tracing::info!(user_id, enabled, "reminder toggled");
        Ok(reminder)
    }

    /// Moves the reminder to `time_of_day` and enables it.
    pub async fn set_reminder_time(&self, user_id: &str, time_of_day: NaiveTime) -> ResultEngine<Reminder> {
        let reminder = self
            .write(user_id, |account| {
                account.reminder = Reminder {
                    enabled: true,
                    time_of_day,
                };
                Ok(account.reminder)
            })
            .await?;
        tracing::info!(user_id, time = %time_of_day.format("%H:%M"), "reminder time set");
        Ok(reminder)
    }

    /// Every user with an enabled reminder, with its time of day.
    ///
    /// Reads all accounts in one pass over the store; it does not take the
    /// per-user locks, so a toggle racing with this call shows up next time.
    pub async fn reminder_recipients(&self) -> ResultEngine<Vec<(String, NaiveTime)>> {
        let accounts = self.store().load_all().await?;
        Ok(accounts
            .into_iter()
            .filter(|(_, account)| account.reminder.enabled)
            .map(|(user_id, account)| (user_id, account.reminder.time_of_day))
            .collect())
    }

    pub async fn reminder_message_for(&self, user_id: &str) -> ResultEngine<String> {
        let balance = self.current_balance(user_id).await?;
        Ok(format!("Daily reminder: your current balance is {balance}."))
    }
}
