//! Per-topic step handlers.
//!
//! Each handler consumes the current step and one input and resolves to an
//! [`Outcome`]: the transition the controller applies plus the reply.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::{AccountStore, EngineError, Ledger};

use crate::{
    event::{Button, Input, Topic},
    reply::Reply,
    state::Flow,
};

mod budget;
mod expense;
mod income;
mod products;
mod reminder;
mod reports;

pub(crate) const INCOME_CATEGORIES: [&str; 3] = ["Salary", "Extra", "Other"];
/// The income category that asks for a custom name instead.
pub(crate) const CUSTOM_INCOME_CATEGORY: &str = "Other";
pub(crate) const EXPENSE_CATEGORIES: [&str; 9] = [
    "Food",
    "Gifts",
    "Transport",
    "Emergency",
    "Home",
    "Leisure",
    "Education",
    "Health",
    "Others",
];

const GENERIC_FAILURE: &str = "Something went wrong while saving your data. Please try again.";

pub(crate) struct Context<'a, S> {
    pub ledger: &'a Ledger<S>,
    pub user_id: &'a str,
    pub now: DateTime<Utc>,
    pub timezone: Tz,
}

#[derive(Debug)]
pub(crate) enum Transition {
    Next(Flow),
    Idle,
    /// The input means nothing in the current step; the step is kept.
    Rejected,
}

#[derive(Debug)]
pub(crate) struct Outcome {
    pub transition: Transition,
    pub reply: Reply,
}

impl Outcome {
    pub fn next(flow: Flow, reply: Reply) -> Self {
        Self {
            transition: Transition::Next(flow),
            reply,
        }
    }

    pub fn idle(reply: Reply) -> Self {
        Self {
            transition: Transition::Idle,
            reply,
        }
    }

    pub fn rejected(reply: Reply) -> Self {
        Self {
            transition: Transition::Rejected,
            reply,
        }
    }
}

pub(crate) async fn dispatch<S: AccountStore>(
    ctx: &Context<'_, S>,
    flow: Option<Flow>,
    input: Input,
) -> Outcome {
    match (flow, input) {
        (_, Input::Button(Button::MainMenu)) => {
            Outcome::idle(Reply::main_menu("Main menu. What would you like to do?"))
        }
        (_, Input::Button(Button::Start(topic))) => start(ctx, topic).await,
        (_, Input::Button(Button::Balance)) => reports::balance(ctx).await,
        (_, Input::Button(Button::Summary(window))) => reports::summary(ctx, window).await,
        (_, Input::Button(Button::Entries(kind, window))) => {
            reports::entries(ctx, kind, window).await
        }
        (_, Input::Button(Button::Habits)) => reports::habits(ctx).await,
        (_, Input::Button(Button::Reminder(setting))) => reminder::apply(ctx, setting).await,
        (None, _) => Outcome::rejected(Reply::main_menu(
            "There is no operation in progress. Choose one from the menu.",
        )),
        (Some(Flow::Income(step)), input) => income::handle(ctx, step, input).await,
        (Some(Flow::Expense(step)), input) => expense::handle(ctx, step, input).await,
        (Some(Flow::Products(step)), input) => products::handle(ctx, step, input).await,
        (Some(Flow::Budget(step)), input) => budget::handle(ctx, step, input).await,
        (Some(Flow::Reminder), input) => reminder::handle(ctx, input).await,
    }
}

async fn start<S: AccountStore>(ctx: &Context<'_, S>, topic: Topic) -> Outcome {
    match topic {
        Topic::Income => income::start(),
        Topic::Expense => expense::start(),
        Topic::Products => products::start(),
        Topic::Budget => budget::start(ctx).await,
        Topic::Reminder => reminder::start(ctx).await,
    }
}

/// Maps an engine error to the next step.
///
/// Recoverable errors keep the user on `stay` and repeat `reprompt` under the
/// error message. Insufficient funds end the topic. Anything else is a
/// storage failure: the topic ends with a generic message.
pub(crate) fn failure<S>(ctx: &Context<'_, S>, err: EngineError, stay: Flow, reprompt: Reply) -> Outcome {
    if err.is_recoverable() {
        tracing::warn!(user_id = ctx.user_id, state = stay.name(), "input refused: {err}");
        return Outcome::next(stay, reprompt.prefixed(&format!("⚠️ {err}")));
    }
    aborted(ctx, err)
}

/// The topic cannot go on.
pub(crate) fn aborted<S>(ctx: &Context<'_, S>, err: EngineError) -> Outcome {
    match err {
        EngineError::InsufficientFunds { balance, requested } => {
            tracing::info!(user_id = ctx.user_id, %balance, %requested, "expense refused");
            Outcome::idle(Reply::main_menu(format!(
                "Insufficient funds: your balance is {balance} and this expense is {requested}. Nothing was recorded."
            )))
        }
        err => {
            tracing::error!(user_id = ctx.user_id, "operation failed: {err}");
            Outcome::idle(Reply::main_menu(GENERIC_FAILURE))
        }
    }
}

pub(crate) fn category_buttons(categories: &[&str]) -> Vec<(String, Button)> {
    categories
        .iter()
        .map(|name| (name.to_string(), Button::Category(name.to_string())))
        .collect()
}

/// The category picked by `input` among `options`, either as a button or as
/// typed text (ASCII case is ignored). Returns the option's own spelling.
pub(crate) fn selected_category(input: &Input, options: &[&str]) -> Option<String> {
    let picked = match input {
        Input::Button(Button::Category(name)) => name.as_str(),
        Input::Text(text) => text.trim(),
        Input::Button(_) => return None,
    };
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(picked))
        .map(|option| option.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_match_buttons_and_text() {
        let pick = |input: Input| selected_category(&input, &EXPENSE_CATEGORIES);

        assert_eq!(pick(Input::Button(Button::Category("Food".into()))).as_deref(), Some("Food"));
        assert_eq!(pick(Input::Text(" transport ".into())).as_deref(), Some("Transport"));
        assert_eq!(pick(Input::Text("Rent".into())), None);
        assert_eq!(pick(Input::Button(Button::Balance)), None);
    }
}
