//! Spending habit statistics computed from the raw expense history.

use chrono::{Datelike, TimeZone, Weekday};

use crate::{ExpenseEntry, MoneyCents};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Clone, Debug, PartialEq)]
pub struct HabitSummary {
    pub total_spent: MoneyCents,
    pub expense_count: usize,
    pub busiest_weekday: Weekday,
    pub most_frequent_category: String,
    pub top_product_by_spend: Option<String>,
}

impl HabitSummary {
    /// Average amount per recorded expense, in major units.
    ///
    /// Reported to users as the "daily" average even though it divides by the
    /// number of expenses, not by the number of days.
    pub fn avg_daily_spend(&self) -> f64 {
        self.total_spent.as_major() / self.expense_count as f64
    }
}

/// Returns `None` when there is no expense to analyse.
///
/// Weekdays are taken from each entry's local date in `tz`. Ties go to the
/// earliest weekday (Mon..Sun) and to the first-seen category/product.
pub fn habit_summary<Tz: TimeZone>(expenses: &[ExpenseEntry], tz: &Tz) -> Option<HabitSummary> {
    if expenses.is_empty() {
        return None;
    }

    let mut per_weekday = [MoneyCents::ZERO; 7];
    let mut categories: Vec<(&str, usize)> = Vec::new();
    let mut products: Vec<(&str, MoneyCents)> = Vec::new();

    for entry in expenses {
        let weekday = entry.timestamp.with_timezone(tz).weekday();
        per_weekday[weekday.num_days_from_monday() as usize] += entry.amount;

        match categories.iter_mut().find(|(c, _)| *c == entry.category) {
            Some((_, count)) => *count += 1,
            None => categories.push((entry.category.as_str(), 1)),
        }

        if let Some(product) = entry.product.as_deref() {
            match products.iter_mut().find(|(p, _)| *p == product) {
                Some((_, total)) => *total += entry.amount,
                None => products.push((product, entry.amount)),
            }
        }
    }

    let mut busiest = 0;
    for (idx, total) in per_weekday.iter().enumerate() {
        if *total > per_weekday[busiest] {
            busiest = idx;
        }
    }

    Some(HabitSummary {
        total_spent: expenses.iter().map(|e| e.amount).sum(),
        expense_count: expenses.len(),
        busiest_weekday: WEEK[busiest],
        most_frequent_category: first_max(&categories)?.to_string(),
        top_product_by_spend: first_max(&products).map(ToString::to_string),
    })
}

/// Key with the strictly largest value; earlier keys win ties.
fn first_max<'a, V: PartialOrd + Copy>(tally: &[(&'a str, V)]) -> Option<&'a str> {
    let (mut best, mut best_value) = *tally.first()?;
    for (key, value) in &tally[1..] {
        if *value > best_value {
            best = *key;
            best_value = *value;
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    // 2025-03-03 is a Monday.
    fn on(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn expense(major: i64, category: &str, product: Option<&str>, ts: DateTime<Utc>) -> ExpenseEntry {
        ExpenseEntry {
            amount: MoneyCents::new(major * 100),
            category: category.to_string(),
            product: product.map(str::to_string),
            timestamp: ts,
        }
    }

    #[test]
    fn no_expenses_means_no_summary() {
        assert_eq!(habit_summary(&[], &Utc), None);
    }

    #[test]
    fn food_monday_example() {
        let expenses = [
            expense(30, "Food", None, on(3, 10)),
            expense(30, "Food", None, on(3, 18)),
            expense(10, "Transport", None, on(4, 9)),
        ];
        let summary = habit_summary(&expenses, &Utc).unwrap();

        assert_eq!(summary.most_frequent_category, "Food");
        assert_eq!(summary.busiest_weekday, Weekday::Mon);
        assert!((summary.avg_daily_spend() - 70.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.top_product_by_spend, None);
    }

    #[test]
    fn frequency_counts_entries_not_amounts() {
        let expenses = [
            expense(500, "Home", None, on(3, 10)),
            expense(1, "Food", None, on(4, 10)),
            expense(1, "Food", None, on(5, 10)),
        ];
        let summary = habit_summary(&expenses, &Utc).unwrap();
        assert_eq!(summary.most_frequent_category, "Food");
        assert_eq!(summary.busiest_weekday, Weekday::Mon);
    }

    #[test]
    fn ties_prefer_earliest_weekday_and_first_seen() {
        let expenses = [
            // Wednesday first in the history, Tuesday later: equal totals.
            expense(20, "Transport", Some("Bus"), on(5, 10)),
            expense(20, "Food", Some("Rice"), on(4, 10)),
        ];
        let summary = habit_summary(&expenses, &Utc).unwrap();
        assert_eq!(summary.busiest_weekday, Weekday::Tue);
        assert_eq!(summary.most_frequent_category, "Transport");
        assert_eq!(summary.top_product_by_spend.as_deref(), Some("Bus"));
    }

    #[test]
    fn top_product_sums_amounts_and_skips_unnamed() {
        let expenses = [
            expense(100, "Food", None, on(3, 10)),
            expense(10, "Food", Some("Rice"), on(3, 11)),
            expense(15, "Food", Some("Beans"), on(3, 12)),
            expense(10, "Food", Some("Rice"), on(3, 13)),
        ];
        let summary = habit_summary(&expenses, &Utc).unwrap();
        assert_eq!(summary.top_product_by_spend.as_deref(), Some("Rice"));
    }

    #[test]
    fn weekday_follows_the_local_date() {
        // Monday 02:00 UTC is still Sunday evening in Havana.
        let expenses = [expense(10, "Food", None, on(3, 2))];
        let summary = habit_summary(&expenses, &chrono_tz::America::Havana).unwrap();
        assert_eq!(summary.busiest_weekday, Weekday::Sun);
    }
}
