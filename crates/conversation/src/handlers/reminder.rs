use engine::{AccountStore, Reminder};

use crate::{
    event::{Button, Input, ReminderSetting},
    parsing::parse_reminder_setting,
    reply::Reply,
    state::Flow,
};

use super::{Context, Outcome, aborted};

fn describe(reminder: &Reminder) -> String {
    let time = reminder.time_of_day.format("%H:%M");
    if reminder.enabled {
        format!("The daily reminder is on at {time}.")
    } else {
        format!("The daily reminder is off (time {time}).")
    }
}

fn prompt(text: impl Into<String>) -> Reply {
    Reply::with_buttons(
        text,
        vec![
            ("🔔 On".to_string(), Button::Reminder(ReminderSetting::On)),
            ("🔕 Off".to_string(), Button::Reminder(ReminderSetting::Off)),
        ],
    )
}

pub(super) async fn start<S: AccountStore>(ctx: &Context<'_, S>) -> Outcome {
    match ctx.ledger.reminder(ctx.user_id).await {
        Ok(reminder) => Outcome::next(
            Flow::Reminder,
            prompt(format!(
                "{}\nSend on, off, or a time such as 20:00.",
                describe(&reminder)
            )),
        ),
        Err(err) => aborted(ctx, err),
    }
}

pub(super) async fn handle<S: AccountStore>(ctx: &Context<'_, S>, input: Input) -> Outcome {
    let Input::Text(text) = input else {
        return Outcome::rejected(prompt("Send on, off, or a time such as 20:00."));
    };
    match parse_reminder_setting(&text) {
        Ok(setting) => apply(ctx, setting).await,
        Err(err) => {
            tracing::warn!(user_id = ctx.user_id, "reminder setting refused: {err}");
            Outcome::next(Flow::Reminder, prompt(format!("⚠️ {err}")))
        }
    }
}

/// Applies a setting in one step, whatever the user was doing.
pub(super) async fn apply<S: AccountStore>(ctx: &Context<'_, S>, setting: ReminderSetting) -> Outcome {
    let updated = match setting {
        ReminderSetting::On => ctx.ledger.set_reminder_enabled(ctx.user_id, true).await,
        ReminderSetting::Off => ctx.ledger.set_reminder_enabled(ctx.user_id, false).await,
        ReminderSetting::At(time) => ctx.ledger.set_reminder_time(ctx.user_id, time).await,
    };
    match updated {
        Ok(reminder) => Outcome::idle(Reply::main_menu(format!("⏰ {}", describe(&reminder)))),
        Err(err) => aborted(ctx, err),
    }
}
