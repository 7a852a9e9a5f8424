use chrono::Weekday;
use chrono_tz::Tz;
use engine::{AccountStore, CURRENCY_LABEL, EntryKind, HabitSummary, PeriodEntries, Summary, Window};

use crate::{event::Button, reply::Reply};

use super::{Context, Outcome, aborted};

/// Lines of an itemized listing; older entries beyond it are only counted.
const MAX_LISTED: usize = 40;

pub(super) async fn balance<S: AccountStore>(ctx: &Context<'_, S>) -> Outcome {
    match ctx.ledger.current_balance(ctx.user_id).await {
        Ok(balance) => Outcome::idle(Reply::main_menu(format!("💰 Your balance is {balance}."))),
        Err(err) => aborted(ctx, err),
    }
}

pub(super) async fn summary<S: AccountStore>(ctx: &Context<'_, S>, window: Window) -> Outcome {
    let now = ctx.now.with_timezone(&ctx.timezone);
    match ctx.ledger.summary(ctx.user_id, window, &now).await {
        Ok(summary) => {
            let mut buttons = vec![
                (
                    "🧾 Expense details".to_string(),
                    Button::Entries(EntryKind::Expense, window),
                ),
                (
                    "💵 Income details".to_string(),
                    Button::Entries(EntryKind::Income, window),
                ),
            ];
            buttons.extend(
                Window::ALL
                    .into_iter()
                    .filter(|w| *w != window)
                    .map(|w| (w.label().to_string(), Button::Summary(w))),
            );
            Outcome::idle(Reply::with_buttons(render_summary(&summary), buttons))
        }
        Err(err) => aborted(ctx, err),
    }
}

pub(super) async fn entries<S: AccountStore>(ctx: &Context<'_, S>, kind: EntryKind, window: Window) -> Outcome {
    let now = ctx.now.with_timezone(&ctx.timezone);
    match ctx.ledger.entries_in(ctx.user_id, window, &now).await {
        Ok(period) => {
            let other = match kind {
                EntryKind::Income => ("🧾 Expense details", EntryKind::Expense),
                EntryKind::Expense => ("💵 Income details", EntryKind::Income),
            };
            let buttons = vec![
                ("📊 Summary".to_string(), Button::Summary(window)),
                (other.0.to_string(), Button::Entries(other.1, window)),
            ];
            let text = render_entries(&period, kind, window, ctx.timezone);
            Outcome::idle(Reply::with_buttons(text, buttons))
        }
        Err(err) => aborted(ctx, err),
    }
}

pub(super) async fn habits<S: AccountStore>(ctx: &Context<'_, S>) -> Outcome {
    match ctx.ledger.habit_summary(ctx.user_id, &ctx.timezone).await {
        Ok(Some(habits)) => Outcome::idle(Reply::main_menu(render_habits(&habits))),
        Ok(None) => Outcome::idle(Reply::main_menu(
            "There are no expenses yet, so there are no habits to show.",
        )),
        Err(err) => aborted(ctx, err),
    }
}

fn render_summary(summary: &Summary) -> String {
    let mut text = format!(
        "📊 {}\nIncome: {}\nExpenses: {}\nNet: {}",
        summary.window.label(),
        summary.income_total,
        summary.expense_total,
        summary.net
    );
    if summary.categories.is_empty() {
        return text;
    }

    text.push_str("\n\nBy category:");
    for line in &summary.categories {
        text.push_str(&format!("\n• {}: {}", line.category, line.spent));
        if let (Some(limit), Some(percent)) = (line.limit, line.percent) {
            let flag = if percent > 100.0 { " ⚠️" } else { "" };
            text.push_str(&format!(" of {limit} ({percent:.1}%){flag}"));
        }
    }
    text
}

fn render_entries(period: &PeriodEntries, kind: EntryKind, window: Window, timezone: Tz) -> String {
    let mut lines: Vec<String> = match kind {
        EntryKind::Expense => period
            .expenses
            .iter()
            .map(|e| {
                let what = match &e.product {
                    Some(product) => format!("{} → {product}", e.category),
                    None => e.category.clone(),
                };
                let date = e.timestamp.with_timezone(&timezone).format("%d/%m %H:%M");
                format!("• {date} {what}: {}", e.amount)
            })
            .collect(),
        EntryKind::Income => period
            .income
            .iter()
            .map(|e| {
                let date = e.timestamp.with_timezone(&timezone).format("%d/%m %H:%M");
                format!("• {date} {}: {}", e.category, e.amount)
            })
            .collect(),
    };
    let (title, total, empty) = match kind {
        EntryKind::Expense => (
            "🧾 Expenses",
            period.expense_total(),
            "No expenses recorded in this period.",
        ),
        EntryKind::Income => (
            "💵 Income",
            period.income_total(),
            "No income recorded in this period.",
        ),
    };

    let mut text = format!("{title} · {}", window.label());
    if lines.is_empty() {
        text.push('\n');
        text.push_str(empty);
        return text;
    }

    let count = lines.len();
    if count > MAX_LISTED {
        lines.drain(..count - MAX_LISTED);
        text.push_str(&format!("\n(latest {MAX_LISTED} of {count})"));
    }
    for line in lines {
        text.push('\n');
        text.push_str(&line);
    }
    text.push_str(&format!("\nTotal: {total}"));
    text
}

fn render_habits(habits: &HabitSummary) -> String {
    let mut text = format!(
        "🔍 Spending habits\nExpenses recorded: {}\nTotal spent: {}\nAverage per expense: {:.2} {CURRENCY_LABEL}\nBusiest day: {}\nMost frequent category: {}",
        habits.expense_count,
        habits.total_spent,
        habits.avg_daily_spend(),
        weekday_name(habits.busiest_weekday),
        habits.most_frequent_category,
    );
    if let Some(product) = &habits.top_product_by_spend {
        text.push_str(&format!("\nTop product: {product}"));
    }
    text
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
