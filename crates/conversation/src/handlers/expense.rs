use engine::{AccountStore, EngineError, MoneyCents, Product};

use crate::{
    event::{Button, Input},
    parsing::{ManualEntry, parse_manual_entry},
    reply::Reply,
    state::{ExpenseStep, Flow},
};

use super::{
    Context, EXPENSE_CATEGORIES, Outcome, aborted, category_buttons, failure, selected_category,
};

pub(super) fn start() -> Outcome {
    Outcome::next(Flow::Expense(ExpenseStep::SelectCategory), category_prompt())
}

fn category_prompt() -> Reply {
    Reply::with_buttons(
        "What did you spend on?",
        category_buttons(&EXPENSE_CATEGORIES),
    )
}

fn manual_prompt(category: &str) -> Reply {
    Reply::with_buttons(
        format!(
            "{category}: send the amount, or a new product as \"name, price\" to save it for next time."
        ),
        Vec::new(),
    )
}

fn picker(category: &str, products: &[Product]) -> Reply {
    let mut buttons: Vec<(String, Button)> = products
        .iter()
        .map(|p| {
            (
                format!("{} · {}", p.name, p.price),
                Button::Product(p.name.clone()),
            )
        })
        .collect();
    buttons.push(("🆕 New product".to_string(), Button::NewProduct));
    Reply::with_buttons(
        format!("{category}: pick a product, or type the amount."),
        buttons,
    )
}

/// The prompt of `step`, reading the catalog when it lists products.
async fn prompt<S: AccountStore>(ctx: &Context<'_, S>, step: &ExpenseStep) -> Reply {
    match step {
        ExpenseStep::SelectCategory => category_prompt(),
        ExpenseStep::SelectProductOrManual { category } => {
            match ctx.ledger.products_in(ctx.user_id, category).await {
                Ok(products) if !products.is_empty() => picker(category, &products),
                _ => manual_prompt(category),
            }
        }
        ExpenseStep::AwaitManualAmount { category } => manual_prompt(category),
    }
}

async fn refuse<S: AccountStore>(ctx: &Context<'_, S>, err: EngineError, step: ExpenseStep) -> Outcome {
    if !err.is_recoverable() {
        return aborted(ctx, err);
    }
    let reprompt = prompt(ctx, &step).await;
    failure(ctx, err, Flow::Expense(step), reprompt)
}

pub(super) async fn handle<S: AccountStore>(
    ctx: &Context<'_, S>,
    step: ExpenseStep,
    input: Input,
) -> Outcome {
    match (step, input) {
        (ExpenseStep::SelectCategory, input) => {
            match selected_category(&input, &EXPENSE_CATEGORIES) {
                Some(category) => enter_category(ctx, category).await,
                None => Outcome::rejected(category_prompt()),
            }
        }
        (ExpenseStep::SelectProductOrManual { category }, Input::Button(Button::Product(name))) => {
            pay_for_product(ctx, category, name).await
        }
        (ExpenseStep::SelectProductOrManual { category }, Input::Button(Button::NewProduct)) => {
            let reply = manual_prompt(&category);
            Outcome::next(
                Flow::Expense(ExpenseStep::AwaitManualAmount { category }),
                reply,
            )
        }
        (
            step @ (ExpenseStep::SelectProductOrManual { .. }
            | ExpenseStep::AwaitManualAmount { .. }),
            Input::Text(text),
        ) => record_manual(ctx, step, &text).await,
        (step, _) => {
            let reply = prompt(ctx, &step).await;
            Outcome::rejected(reply)
        }
    }
}

/// Offers the category's products, or goes straight to the amount when the
/// category has none.
async fn enter_category<S: AccountStore>(ctx: &Context<'_, S>, category: String) -> Outcome {
    match ctx.ledger.products_in(ctx.user_id, &category).await {
        Ok(products) if products.is_empty() => {
            let reply = manual_prompt(&category);
            Outcome::next(
                Flow::Expense(ExpenseStep::AwaitManualAmount { category }),
                reply,
            )
        }
        Ok(products) => {
            let reply = picker(&category, &products);
            Outcome::next(
                Flow::Expense(ExpenseStep::SelectProductOrManual { category }),
                reply,
            )
        }
        Err(err) => refuse(ctx, err, ExpenseStep::SelectCategory).await,
    }
}

async fn pay_for_product<S: AccountStore>(ctx: &Context<'_, S>, category: String, name: String) -> Outcome {
    let result = match ctx.ledger.product_price(ctx.user_id, &category, &name).await {
        Ok(price) => ctx
            .ledger
            .record_expense(ctx.user_id, price, &category, Some(&name), ctx.now)
            .await
            .map(|balance| (price, balance)),
        Err(err) => Err(err),
    };
    match result {
        Ok((price, balance)) => recorded(price, &category, Some(&name), balance),
        Err(err) => refuse(ctx, err, ExpenseStep::SelectProductOrManual { category }).await,
    }
}

async fn record_manual<S: AccountStore>(ctx: &Context<'_, S>, step: ExpenseStep, text: &str) -> Outcome {
    let category = match &step {
        ExpenseStep::SelectProductOrManual { category }
        | ExpenseStep::AwaitManualAmount { category } => category.clone(),
        ExpenseStep::SelectCategory => return Outcome::rejected(category_prompt()),
    };

    let entry = match parse_manual_entry(text) {
        Ok(entry) => entry,
        Err(err) => return refuse(ctx, err.into(), step).await,
    };

    let result = match &entry {
        ManualEntry::Amount(amount) => ctx
            .ledger
            .record_expense(ctx.user_id, *amount, &category, None, ctx.now)
            .await
            .map(|balance| (*amount, None, balance)),
        ManualEntry::Product { name, price } => ctx
            .ledger
            .record_expense_with_new_product(ctx.user_id, &category, name, *price, ctx.now)
            .await
            .map(|balance| (*price, Some(name.as_str()), balance)),
    };

    match result {
        Ok((amount, product, balance)) => recorded(amount, &category, product, balance),
        Err(err) => refuse(ctx, err, step).await,
    }
}

fn recorded(amount: MoneyCents, category: &str, product: Option<&str>, balance: MoneyCents) -> Outcome {
    let what = match product {
        Some(product) => format!("{product} ({category})"),
        None => category.to_string(),
    };
    Outcome::idle(Reply::main_menu(format!(
        "✅ Expense of {amount} recorded for {what}.\nBalance: {balance}"
    )))
}
