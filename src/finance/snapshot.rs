//! Rolling weekly overview.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::period::DateRange;
use crate::database::models::{Expense, Income};
use crate::error::Result;
use crate::util::{checked_add, checked_sub, checked_total, round_money};

/// Label for expenses saved without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// How many categories the snapshot lists.
const TOP_CATEGORIES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiggestExpense {
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySnapshot {
    pub start_date_range: NaiveDate,
    pub end_date_range: NaiveDate,
    pub total_income_last_period: Decimal,
    pub total_expenses_last_period: Decimal,
    pub net_flow_last_period: Decimal,
    pub biggest_expense: Option<BiggestExpense>,
    pub top_spending_categories: Vec<CategoryTotal>,
    pub current_focus: Option<String>,
}

/// Summarize the entries that fall inside `range`.
///
/// Entries outside the range are ignored, so callers may pass a wider slice.
pub fn weekly_snapshot(
    expenses: &[Expense],
    incomes: &[Income],
    range: DateRange,
    current_focus: Option<String>,
) -> Result<WeeklySnapshot> {
    let expenses: Vec<&Expense> = expenses
        .iter()
        .filter(|e| range.contains(e.date_created))
        .collect();
    let total_income = checked_total(
        incomes
            .iter()
            .filter(|i| range.contains(i.date_created))
            .map(|i| i.amount),
    )?;
    let total_expenses = checked_total(expenses.iter().map(|e| e.amount))?;

    // First maximum wins on ties.
    let biggest_expense = expenses
        .iter()
        .copied()
        .fold(None::<&Expense>, |best, e| match best {
            Some(b) if b.amount >= e.amount => Some(b),
            _ => Some(e),
        })
        .map(|e| BiggestExpense {
            description: e.description.clone(),
            amount: round_money(e.amount),
        });

    Ok(WeeklySnapshot {
        start_date_range: range.first_day(),
        end_date_range: range.last_day(),
        total_income_last_period: round_money(total_income),
        total_expenses_last_period: round_money(total_expenses),
        net_flow_last_period: round_money(checked_sub(total_income, total_expenses)?),
        biggest_expense,
        top_spending_categories: top_categories(&expenses, TOP_CATEGORIES)?,
        current_focus,
    })
}

/// Largest spending categories, biggest first. Equal totals keep first-seen order.
pub fn top_categories(expenses: &[&Expense], limit: usize) -> Result<Vec<CategoryTotal>> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for expense in expenses {
        let category = expense.category.as_deref().unwrap_or(UNCATEGORIZED);
        match totals.get_mut(category) {
            Some(total) => *total = checked_add(*total, expense.amount)?,
            None => {
                order.push(category);
                totals.insert(category, expense.amount);
            }
        }
    }

    let mut ranked: Vec<CategoryTotal> = order
        .into_iter()
        .map(|category| CategoryTotal {
            category: category.to_string(),
            amount: round_money(totals[category]),
        })
        .collect();
    ranked.sort_by(|a, b| b.amount.cmp(&a.amount));
    ranked.truncate(limit);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::finance::testing::{expense_on, income_on};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn empty_week() {
        let snapshot = weekly_snapshot(&[], &[], DateRange::last_7_days(day(14)), None).unwrap();
        assert_eq!(snapshot.start_date_range, day(8));
        assert_eq!(snapshot.end_date_range, day(14));
        assert_eq!(snapshot.total_expenses_last_period, Decimal::ZERO);
        assert_eq!(snapshot.net_flow_last_period, Decimal::ZERO);
        assert!(snapshot.biggest_expense.is_none());
        assert!(snapshot.top_spending_categories.is_empty());
        assert!(snapshot.current_focus.is_none());
    }

    #[test]
    fn totals_only_count_the_window() {
        let expenses = vec![
            expense_on(day(9), "Lidl", Some("Groceries"), "42.10"),
            expense_on(day(12), "Bus pass", Some("Transport"), "25"),
            expense_on(day(2), "Old", Some("Groceries"), "500"),
        ];
        let incomes = vec![income_on(day(10), "Salary", "300"), income_on(day(1), "Old", "999")];

        let snapshot = weekly_snapshot(
            &expenses,
            &incomes,
            DateRange::last_7_days(day(14)),
            Some("Cook at home".to_string()),
        )
        .unwrap();

        assert_eq!(snapshot.total_income_last_period, Decimal::from(300));
        assert_eq!(snapshot.total_expenses_last_period, Decimal::new(6710, 2));
        assert_eq!(snapshot.net_flow_last_period, Decimal::new(23290, 2));
        assert_eq!(
            snapshot.biggest_expense,
            Some(BiggestExpense {
                description: "Lidl".to_string(),
                amount: Decimal::new(4210, 2),
            })
        );
        assert_eq!(snapshot.current_focus.as_deref(), Some("Cook at home"));
    }

    #[test]
    fn net_flow_can_be_negative() {
        let expenses = vec![expense_on(day(13), "Laptop", Some("Tech"), "900")];
        let incomes = vec![income_on(day(13), "Gift", "100")];
        let snapshot =
            weekly_snapshot(&expenses, &incomes, DateRange::last_7_days(day(14)), None).unwrap();
        assert_eq!(snapshot.net_flow_last_period, Decimal::from(-800));
    }

    #[test]
    fn biggest_expense_keeps_first_on_tie() {
        let expenses = vec![
            expense_on(day(9), "First", None, "30"),
            expense_on(day(10), "Second", None, "30"),
        ];
        let snapshot =
            weekly_snapshot(&expenses, &[], DateRange::last_7_days(day(14)), None).unwrap();
        assert_eq!(snapshot.biggest_expense.unwrap().description, "First");
    }

    #[test]
    fn top_three_categories_with_uncategorized_bucket() {
        let expenses = vec![
            expense_on(day(9), "a", Some("Food"), "10"),
            expense_on(day(9), "b", None, "50"),
            expense_on(day(10), "c", Some("Fun"), "5"),
            expense_on(day(10), "d", Some("Food"), "35"),
            expense_on(day(11), "e", Some("Transport"), "20"),
        ];
        let snapshot =
            weekly_snapshot(&expenses, &[], DateRange::last_7_days(day(14)), None).unwrap();
        let names: Vec<&str> = snapshot
            .top_spending_categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, vec![UNCATEGORIZED, "Food", "Transport"]);
        assert_eq!(snapshot.top_spending_categories[1].amount, Decimal::from(45));
    }

    #[test]
    fn week_total_past_the_decimal_range_is_an_error() {
        let half = "50000000000000000000000000000";
        let expenses = vec![
            expense_on(day(9), "a", Some("Food"), half),
            expense_on(day(10), "b", Some("Food"), half),
        ];
        let result = weekly_snapshot(&expenses, &[], DateRange::last_7_days(day(14)), None);
        assert!(matches!(result, Err(Error::AmountOverflow(_))));
    }
}
