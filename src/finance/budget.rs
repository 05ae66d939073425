//! Budget consumption and the 50/30/20 rule.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::{Budget, Expense, RuleCategory};
use crate::error::Result;
use crate::util::{checked_add, checked_sub, percent_of, round_money};

/// How much of one category budget has been used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub id: i64,
    pub category: String,
    pub budgeted_amount: Decimal,
    pub spent_amount: Decimal,
    /// Negative once the budget is overspent.
    pub remaining_amount: Decimal,
    pub percentage_spent: Decimal,
}

/// One bucket of the 50/30/20 rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleBucket {
    pub budgeted_percent: u32,
    pub spent_percent: Decimal,
    pub spent_amount: Decimal,
}

impl RuleBucket {
    fn empty(rule: RuleCategory) -> Self {
        Self {
            budgeted_percent: rule.target_percent(),
            spent_percent: Decimal::ZERO,
            spent_amount: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleStatus {
    pub needs: RuleBucket,
    pub wants: RuleBucket,
    pub savings_expenses: RuleBucket,
    pub unclassified_amount: Decimal,
    pub total_income: Decimal,
}

/// Status of every budget against the given expenses, in budget order.
///
/// `expenses` should already be limited to the budgets' month.
///
/// # Errors
///
/// [`Error::AmountOverflow`](crate::error::Error::AmountOverflow) when a
/// category total or its percentage leaves the `Decimal` range.
pub fn budget_status(budgets: &[Budget], expenses: &[Expense]) -> Result<Vec<BudgetStatus>> {
    if budgets.is_empty() {
        return Ok(Vec::new());
    }

    let mut spent_by_category: HashMap<&str, Decimal> = HashMap::new();
    for expense in expenses {
        if let Some(category) = expense.category.as_deref() {
            let total = spent_by_category.entry(category).or_default();
            *total = checked_add(*total, expense.amount)?;
        }
    }

    budgets
        .iter()
        .map(|budget| -> Result<BudgetStatus> {
            let spent = spent_by_category
                .get(budget.category.as_str())
                .copied()
                .unwrap_or_default();
            Ok(BudgetStatus {
                id: budget.id,
                category: budget.category.clone(),
                budgeted_amount: round_money(budget.amount),
                spent_amount: round_money(spent),
                remaining_amount: round_money(checked_sub(budget.amount, spent)?),
                percentage_spent: percent_of(spent, budget.amount)?,
            })
        })
        .collect()
}

/// Spending per 50/30/20 bucket relative to `total_income`.
///
/// With no positive income there is nothing to measure against, so every
/// bucket reports zero.
///
/// # Errors
///
/// [`Error::AmountOverflow`](crate::error::Error::AmountOverflow) when a
/// bucket total or its percentage leaves the `Decimal` range.
pub fn rule_status(expenses: &[Expense], total_income: Decimal) -> Result<RuleStatus> {
    if total_income <= Decimal::ZERO {
        return Ok(RuleStatus {
            needs: RuleBucket::empty(RuleCategory::Needs),
            wants: RuleBucket::empty(RuleCategory::Wants),
            savings_expenses: RuleBucket::empty(RuleCategory::Savings),
            unclassified_amount: Decimal::ZERO,
            total_income,
        });
    }

    let mut spent: HashMap<RuleCategory, Decimal> = HashMap::new();
    let mut unclassified = Decimal::ZERO;
    for expense in expenses {
        let total = match expense.rule_category {
            Some(rule) => spent.entry(rule).or_default(),
            None => &mut unclassified,
        };
        *total = checked_add(*total, expense.amount)?;
    }

    let bucket = |rule: RuleCategory| -> Result<RuleBucket> {
        let amount = spent.get(&rule).copied().unwrap_or_default();
        Ok(RuleBucket {
            budgeted_percent: rule.target_percent(),
            spent_percent: percent_of(amount, total_income)?,
            spent_amount: round_money(amount),
        })
    };

    Ok(RuleStatus {
        needs: bucket(RuleCategory::Needs)?,
        wants: bucket(RuleCategory::Wants)?,
        savings_expenses: bucket(RuleCategory::Savings)?,
        unclassified_amount: round_money(unclassified),
        total_income: round_money(total_income),
    })
}
