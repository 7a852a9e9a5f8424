//! Daily balance reminders.
//!
//! Wakes up twice a minute and, once per local minute, messages every user
//! whose reminder is enabled for that minute.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use engine::{AccountStore, Ledger};
use teloxide::{prelude::*, types::ChatId};
use tokio::time::MissedTickBehavior;

const TICK: Duration = Duration::from_secs(30);

pub(crate) async fn run<S: AccountStore>(bot: Bot, ledger: Arc<Ledger<S>>, timezone: Tz) {
    tracing::info!(%timezone, "reminder scheduler started");
    let mut ticker = tokio::time::interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_minute: Option<NaiveDateTime> = None;

    loop {
        ticker.tick().await;
        let minute = local_minute(Utc::now(), timezone);
        if last_minute == Some(minute) {
            continue;
        }
        last_minute = Some(minute);
        send_due(&bot, &ledger, minute.time()).await;
    }
}

/// `now` in `timezone`, truncated to the minute.
fn local_minute(now: DateTime<Utc>, timezone: Tz) -> NaiveDateTime {
    let local = now.with_timezone(&timezone).naive_local();
    local
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(local)
}

/// Users whose reminder time falls on `minute`.
fn due(recipients: Vec<(String, NaiveTime)>, minute: NaiveTime) -> Vec<String> {
    recipients
        .into_iter()
        .filter(|(_, at)| at.hour() == minute.hour() && at.minute() == minute.minute())
        .map(|(user_id, _)| user_id)
        .collect()
}

async fn send_due<S: AccountStore>(bot: &Bot, ledger: &Ledger<S>, minute: NaiveTime) {
    let recipients = match ledger.reminder_recipients().await {
        Ok(recipients) => recipients,
        Err(err) => {
            tracing::error!("failed to list reminder recipients: {err}");
            return;
        }
    };

    for user_id in due(recipients, minute) {
        let Ok(chat) = user_id.parse::<i64>() else {
            tracing::warn!(user_id = %user_id, "reminder recipient is not a telegram id");
            continue;
        };
        let message = match ledger.reminder_message_for(&user_id).await {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(user_id = %user_id, "failed to build reminder: {err}");
                continue;
            }
        };
        match bot.send_message(ChatId(chat), message).await {
            Ok(_) => tracing::info!(user_id = %user_id, "reminder sent"),
            Err(err) => tracing::warn!(user_id = %user_id, "failed to send reminder: {err}"),
        }
    }
}
