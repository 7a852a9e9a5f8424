use engine::AccountStore;

use crate::{
    event::Input,
    parsing::parse_amount,
    reply::Reply,
    state::{Flow, IncomeStep},
};

use super::{
    CUSTOM_INCOME_CATEGORY, Context, INCOME_CATEGORIES, Outcome, category_buttons, failure,
    selected_category,
};

pub(super) fn start() -> Outcome {
    let step = IncomeStep::SelectCategory;
    Outcome::next(Flow::Income(step.clone()), prompt(&step))
}

fn prompt(step: &IncomeStep) -> Reply {
    match step {
        IncomeStep::SelectCategory => Reply::with_buttons(
            "Where does this income come from?",
            category_buttons(&INCOME_CATEGORIES),
        ),
        IncomeStep::AwaitCustomCategory => {
            Reply::with_buttons("Type a name for the income category.", Vec::new())
        }
        IncomeStep::AwaitAmount { category } => {
            Reply::with_buttons(format!("How much did you receive ({category})?"), Vec::new())
        }
    }
}

pub(super) async fn handle<S: AccountStore>(
    ctx: &Context<'_, S>,
    step: IncomeStep,
    input: Input,
) -> Outcome {
    match (step, input) {
        (IncomeStep::SelectCategory, input) => {
            match selected_category(&input, &INCOME_CATEGORIES) {
                Some(category) if category == CUSTOM_INCOME_CATEGORY => {
                    let next = IncomeStep::AwaitCustomCategory;
                    Outcome::next(Flow::Income(next.clone()), prompt(&next))
                }
                Some(category) => {
                    let next = IncomeStep::AwaitAmount { category };
                    Outcome::next(Flow::Income(next.clone()), prompt(&next))
                }
                None => Outcome::rejected(prompt(&IncomeStep::SelectCategory)),
            }
        }
        (IncomeStep::AwaitCustomCategory, Input::Text(text)) => {
            let category = text.trim();
            if category.is_empty() {
                let step = IncomeStep::AwaitCustomCategory;
                return Outcome::next(Flow::Income(step.clone()), prompt(&step));
            }
            let next = IncomeStep::AwaitAmount {
                category: category.to_string(),
            };
            Outcome::next(Flow::Income(next.clone()), prompt(&next))
        }
        (IncomeStep::AwaitAmount { category }, Input::Text(text)) => {
            let recorded = match parse_amount(&text) {
                Ok(amount) => ctx
                    .ledger
                    .record_income(ctx.user_id, amount, &category, ctx.now)
                    .await
                    .map(|balance| (amount, balance)),
                Err(err) => Err(err.into()),
            };
            match recorded {
                Ok((amount, balance)) => Outcome::idle(Reply::main_menu(format!(
                    "✅ Income of {amount} recorded under {category}.\nBalance: {balance}"
                ))),
                Err(err) => {
                    let step = IncomeStep::AwaitAmount { category };
                    let reprompt = prompt(&step);
                    failure(ctx, err, Flow::Income(step), reprompt)
                }
            }
        }
        (step, _) => Outcome::rejected(prompt(&step)),
    }
}
