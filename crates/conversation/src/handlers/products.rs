use engine::{AccountStore, CatalogItem, EngineError};

use crate::{
    event::{Button, Input, ProductsAction},
    parsing::{parse_amount, parse_product_pair},
    reply::Reply,
    state::{Flow, ProductsStep},
};

use super::{
    Context, EXPENSE_CATEGORIES, Outcome, aborted, category_buttons, failure, selected_category,
};

pub(super) fn start() -> Outcome {
    menu("What do you want to do with your products?")
}

fn menu_reply(text: impl Into<String>) -> Reply {
    Reply::with_buttons(
        text,
        vec![
            ("➕ Add".to_string(), Button::Products(ProductsAction::Add)),
            ("🗑 Remove".to_string(), Button::Products(ProductsAction::Remove)),
            ("✏️ Update price".to_string(), Button::Products(ProductsAction::Update)),
            ("📋 List".to_string(), Button::Products(ProductsAction::List)),
        ],
    )
}

fn menu(text: impl Into<String>) -> Outcome {
    Outcome::next(Flow::Products(ProductsStep::Menu), menu_reply(text))
}

fn entry_buttons(items: &[CatalogItem]) -> Vec<(String, Button)> {
    items
        .iter()
        .map(|item| {
            (
                format!("{} · {} · {}", item.category, item.name, item.price),
                Button::CatalogEntry {
                    category: item.category.clone(),
                    name: item.name.clone(),
                },
            )
        })
        .collect()
}

fn pair_prompt(category: &str) -> Reply {
    Reply::with_buttons(
        format!("{category}: send the product as \"name, price\"."),
        Vec::new(),
    )
}

fn price_prompt(name: &str) -> Reply {
    Reply::with_buttons(format!("Send the new price for {name}."), Vec::new())
}

fn confirm_reply(category: &str, name: &str) -> Reply {
    Reply::with_buttons(
        format!("Remove {name} from {category}?"),
        vec![
            ("✅ Remove".to_string(), Button::Confirm),
            ("↩ Keep".to_string(), Button::Cancel),
        ],
    )
}

fn listing(items: &[CatalogItem]) -> String {
    if items.is_empty() {
        return "Your catalog is empty.".to_string();
    }
    let mut text = String::from("📋 Your products:");
    let mut current: Option<&str> = None;
    for item in items {
        if current != Some(item.category.as_str()) {
            text.push_str(&format!("\n\n{}:", item.category));
            current = Some(item.category.as_str());
        }
        text.push_str(&format!("\n• {} · {}", item.name, item.price));
    }
    text
}

/// The user is shown the menu again; missing products and bad prices end the
/// sub-action there instead of aborting the topic.
fn back_to_menu<S>(ctx: &Context<'_, S>, err: EngineError) -> Outcome {
    match err {
        EngineError::NotFound(_) | EngineError::InvalidPrice(_) => {
            tracing::warn!(user_id = ctx.user_id, "catalog change refused: {err}");
            menu(format!("⚠️ {err}"))
        }
        err => aborted(ctx, err),
    }
}

/// Shows the catalog as a picker for `step`, or the menu when it is empty.
async fn pick_entry<S: AccountStore>(ctx: &Context<'_, S>, step: ProductsStep, text: &str) -> Outcome {
    match ctx.ledger.list_products(ctx.user_id).await {
        Ok(items) if items.is_empty() => menu("Your catalog is empty. Add a product first."),
        Ok(items) => Outcome::next(
            Flow::Products(step),
            Reply::with_buttons(text, entry_buttons(&items)),
        ),
        Err(err) => aborted(ctx, err),
    }
}

pub(super) async fn handle<S: AccountStore>(
    ctx: &Context<'_, S>,
    step: ProductsStep,
    input: Input,
) -> Outcome {
    match (step, input) {
        (ProductsStep::Menu, Input::Button(Button::Products(action))) => match action {
            ProductsAction::Add => Outcome::next(
                Flow::Products(ProductsStep::AddSelectCategory),
                Reply::with_buttons(
                    "Which category does the product belong to?",
                    category_buttons(&EXPENSE_CATEGORIES),
                ),
            ),
            ProductsAction::Remove => {
                pick_entry(ctx, ProductsStep::RemoveSelect, "Which product do you want to remove?")
                    .await
            }
            ProductsAction::Update => {
                pick_entry(ctx, ProductsStep::UpdateSelect, "Which product changed price?").await
            }
            ProductsAction::List => match ctx.ledger.list_products(ctx.user_id).await {
                Ok(items) => menu(listing(&items)),
                Err(err) => aborted(ctx, err),
            },
        },
        (ProductsStep::AddSelectCategory, input) => {
            match selected_category(&input, &EXPENSE_CATEGORIES) {
                Some(category) => {
                    let reply = pair_prompt(&category);
                    Outcome::next(Flow::Products(ProductsStep::AddAwaitPair { category }), reply)
                }
                None => Outcome::rejected(Reply::with_buttons(
                    "Pick one of the categories.",
                    category_buttons(&EXPENSE_CATEGORIES),
                )),
            }
        }
        (ProductsStep::AddAwaitPair { category }, Input::Text(text)) => {
            let (name, price) = match parse_product_pair(&text) {
                Ok(pair) => pair,
                Err(err) => {
                    let reprompt = pair_prompt(&category);
                    return failure(
                        ctx,
                        err.into(),
                        Flow::Products(ProductsStep::AddAwaitPair { category }),
                        reprompt,
                    );
                }
            };
            match ctx.ledger.add_product(ctx.user_id, &category, &name, price).await {
                Ok(()) => menu(format!("✅ {name} saved in {category} at {price}.")),
                Err(err) => back_to_menu(ctx, err),
            }
        }
        (ProductsStep::RemoveSelect, Input::Button(Button::CatalogEntry { category, name })) => {
            let reply = confirm_reply(&category, &name);
            Outcome::next(
                Flow::Products(ProductsStep::RemoveConfirm { category, name }),
                reply,
            )
        }
        (ProductsStep::RemoveConfirm { category, name }, Input::Button(Button::Confirm)) => {
            match ctx.ledger.remove_product(ctx.user_id, &category, &name).await {
                Ok(()) => menu(format!("🗑 {name} removed from {category}.")),
                Err(err) => back_to_menu(ctx, err),
            }
        }
        (ProductsStep::RemoveConfirm { .. }, Input::Button(Button::Cancel)) => {
            menu("Nothing was removed.")
        }
        (ProductsStep::UpdateSelect, Input::Button(Button::CatalogEntry { category, name })) => {
            let reply = price_prompt(&name);
            Outcome::next(
                Flow::Products(ProductsStep::UpdateAwaitPrice { category, name }),
                reply,
            )
        }
        (ProductsStep::UpdateAwaitPrice { category, name }, Input::Text(text)) => {
            let price = match parse_amount(&text) {
                Ok(price) => price,
                Err(err) => {
                    let reprompt = price_prompt(&name);
                    return failure(
                        ctx,
                        err.into(),
                        Flow::Products(ProductsStep::UpdateAwaitPrice { category, name }),
                        reprompt,
                    );
                }
            };
            match ctx
                .ledger
                .update_product_price(ctx.user_id, &category, &name, price)
                .await
            {
                Ok(()) => menu(format!("✏️ {name} now costs {price}.")),
                Err(err) => back_to_menu(ctx, err),
            }
        }
        (step, _) => reprompt(ctx, step).await,
    }
}

async fn reprompt<S: AccountStore>(ctx: &Context<'_, S>, step: ProductsStep) -> Outcome {
    let reply = match &step {
        ProductsStep::Menu => menu_reply("Choose an option."),
        ProductsStep::AddSelectCategory => Reply::with_buttons(
            "Pick one of the categories.",
            category_buttons(&EXPENSE_CATEGORIES),
        ),
        ProductsStep::AddAwaitPair { category } => pair_prompt(category),
        ProductsStep::RemoveSelect | ProductsStep::UpdateSelect => {
            match ctx.ledger.list_products(ctx.user_id).await {
                Ok(items) => Reply::with_buttons("Pick one of the products.", entry_buttons(&items)),
                Err(err) => return aborted(ctx, err),
            }
        }
        ProductsStep::RemoveConfirm { category, name } => confirm_reply(category, name),
        ProductsStep::UpdateAwaitPrice { name, .. } => price_prompt(name),
    };
    Outcome::rejected(reply)
}
