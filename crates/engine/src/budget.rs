//! Per-category spending limits and how much of them a period consumed.

use serde::{Deserialize, Serialize};

use crate::{
    ExpenseEntry, MoneyCents, ResultEngine,
    util::{require_positive_amount, required_name},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub limit: MoneyCents,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Budgets(Vec<Budget>);

impl Budgets {
    /// Sets the limit for `category`; the last write wins.
    pub fn set(&mut self, category: &str, limit: MoneyCents) -> ResultEngine<()> {
        let limit = require_positive_amount(limit)?;
        let category = required_name(category, "category")?;
        match self.0.iter_mut().find(|b| b.category == category) {
            Some(budget) => budget.limit = limit,
            None => self.0.push(Budget { category, limit }),
        }
        Ok(())
    }

    pub fn limit_for(&self, category: &str) -> Option<MoneyCents> {
        self.0
            .iter()
            .find(|b| b.category == category)
            .map(|b| b.limit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Budget> {
        self.0.iter()
    }
}

/// Spend of one category over a period, with its budget when one is set.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryConsumption {
    pub category: String,
    pub spent: MoneyCents,
    pub limit: Option<MoneyCents>,
    /// `100 × spent / limit`. Values above 100 mean the budget was exceeded.
    pub percent: Option<f64>,
}

/// Sums `expenses` per category (first-seen order) and relates each sum to
/// its budget.
pub fn consumption_report(budgets: &Budgets, expenses: &[ExpenseEntry]) -> Vec<CategoryConsumption> {
    let mut spent: Vec<(&str, MoneyCents)> = Vec::new();
    for entry in expenses {
        match spent.iter_mut().find(|(c, _)| *c == entry.category) {
            Some((_, total)) => *total += entry.amount,
            None => spent.push((entry.category.as_str(), entry.amount)),
        }
    }

    spent
        .into_iter()
        .map(|(category, spent)| {
            let limit = budgets.limit_for(category);
            CategoryConsumption {
                category: category.to_string(),
                spent,
                limit,
                percent: limit.and_then(|l| spent.percent_of(l)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::EngineError;

    fn expense(cents: i64, category: &str) -> ExpenseEntry {
        ExpenseEntry {
            amount: MoneyCents::new(cents),
            category: category.to_string(),
            product: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn last_write_wins() {
        let mut budgets = Budgets::default();
        budgets.set("Food", MoneyCents::new(10_000)).unwrap();
        budgets.set("Food", MoneyCents::new(20_000)).unwrap();
        assert_eq!(budgets.limit_for("Food"), Some(MoneyCents::new(20_000)));
        assert_eq!(budgets.iter().count(), 1);
    }

    #[test]
    fn rejects_non_positive_limits() {
        let mut budgets = Budgets::default();
        assert!(matches!(
            budgets.set("Food", MoneyCents::ZERO),
            Err(EngineError::InvalidAmount(_))
        ));
        assert_eq!(budgets.limit_for("Food"), None);
    }

    #[test]
    fn report_surfaces_overspend_unclamped() {
        let mut budgets = Budgets::default();
        budgets.set("Food", MoneyCents::new(10_000)).unwrap();

        let expenses = [
            expense(8_000, "Food"),
            expense(500, "Transport"),
            expense(4_000, "Food"),
        ];
        let report = consumption_report(&budgets, &expenses);

        assert_eq!(
            report,
            vec![
                CategoryConsumption {
                    category: "Food".to_string(),
                    spent: MoneyCents::new(12_000),
                    limit: Some(MoneyCents::new(10_000)),
                    percent: Some(120.0),
                },
                CategoryConsumption {
                    category: "Transport".to_string(),
                    spent: MoneyCents::new(500),
                    limit: None,
                    percent: None,
                },
            ]
        );
    }

    #[test]
    fn budget_without_spend_is_not_reported() {
        let mut budgets = Budgets::default();
        budgets.set("Home", MoneyCents::new(10_000)).unwrap();
        assert!(consumption_report(&budgets, &[]).is_empty());
    }
}
