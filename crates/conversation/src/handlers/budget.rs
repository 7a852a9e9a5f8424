use engine::AccountStore;

use crate::{
    event::Input,
    parsing::parse_amount,
    reply::Reply,
    state::{BudgetStep, Flow},
};

use super::{Context, EXPENSE_CATEGORIES, Outcome, aborted, category_buttons, failure, selected_category};

fn category_prompt(text: impl Into<String>) -> Reply {
    Reply::with_buttons(text, category_buttons(&EXPENSE_CATEGORIES))
}

fn amount_prompt(category: &str) -> Reply {
    Reply::with_buttons(format!("What is the spending limit for {category}?"), Vec::new())
}

pub(super) async fn start<S: AccountStore>(ctx: &Context<'_, S>) -> Outcome {
    let budgets = match ctx.ledger.budgets(ctx.user_id).await {
        Ok(budgets) => budgets,
        Err(err) => return aborted(ctx, err),
    };

    let mut text = String::from("Which category do you want to limit?");
    if !budgets.is_empty() {
        text.push_str("\n\nCurrent limits:");
        for budget in &budgets {
            text.push_str(&format!("\n• {}: {}", budget.category, budget.limit));
        }
    }
    Outcome::next(Flow::Budget(BudgetStep::SelectCategory), category_prompt(text))
}

pub(super) async fn handle<S: AccountStore>(
    ctx: &Context<'_, S>,
    step: BudgetStep,
    input: Input,
) -> Outcome {
    match (step, input) {
        (BudgetStep::SelectCategory, input) => match selected_category(&input, &EXPENSE_CATEGORIES) {
            Some(category) => {
                let reply = amount_prompt(&category);
                Outcome::next(Flow::Budget(BudgetStep::AwaitAmount { category }), reply)
            }
            None => Outcome::rejected(category_prompt("Pick one of the categories.")),
        },
        (BudgetStep::AwaitAmount { category }, Input::Text(text)) => {
            let saved = match parse_amount(&text) {
                Ok(limit) => ctx
                    .ledger
                    .set_budget(ctx.user_id, &category, limit)
                    .await
                    .map(|()| limit),
                Err(err) => Err(err.into()),
            };
            match saved {
                Ok(limit) => Outcome::idle(Reply::main_menu(format!(
                    "🎯 Spending limit for {category} set to {limit}."
                ))),
                Err(err) => {
                    let reprompt = amount_prompt(&category);
                    failure(ctx, err, Flow::Budget(BudgetStep::AwaitAmount { category }), reprompt)
                }
            }
        }
        (BudgetStep::AwaitAmount { category }, _) => Outcome::rejected(amount_prompt(&category)),
    }
}
