//! Monthly report: summary, transaction lists and budget sections, as JSON or CSV.

use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use super::budget::{BudgetStatus, RuleStatus};
use super::period::Period;
use crate::database::models::{Expense, Income};
use crate::error::Result;
use crate::util::{checked_sub, checked_total, fmt_money, round_money};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub period: Period,
    pub summary: ReportSummary,
    /// Oldest first.
    pub expenses: Vec<Expense>,
    /// Oldest first.
    pub incomes: Vec<Income>,
    pub budgets: Vec<BudgetStatus>,
    pub rule_status: RuleStatus,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    section: &'a str,
    date: String,
    description: &'a str,
    category: &'a str,
    amount: String,
}

pub fn monthly_report(
    period: Period,
    mut expenses: Vec<Expense>,
    mut incomes: Vec<Income>,
    budgets: Vec<BudgetStatus>,
    rule_status: RuleStatus,
) -> Result<MonthlyReport> {
    expenses.sort_by_key(|e| (e.date_created, e.id));
    incomes.sort_by_key(|i| (i.date_created, i.id));

    let total_income = checked_total(incomes.iter().map(|i| i.amount))?;
    let total_expenses = checked_total(expenses.iter().map(|e| e.amount))?;

    Ok(MonthlyReport {
        period,
        summary: ReportSummary {
            total_income: round_money(total_income),
            total_expenses: round_money(total_expenses),
            balance: round_money(checked_sub(total_income, total_expenses)?),
        },
        expenses,
        incomes,
        budgets,
        rule_status,
    })
}

impl MonthlyReport {
    /// Suggested download name, e.g. `report-2024-05.csv`.
    pub fn csv_file_name(&self) -> String {
        format!("report-{}.csv", self.period.label())
    }

    /// Write the report as one CSV table. Expenses carry negative amounts.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let first_day = self.period.first_day().to_string();

        let summary = [
            ("Total income", self.summary.total_income),
            ("Total expenses", -self.summary.total_expenses),
            ("Balance", self.summary.balance),
        ];
        for (label, amount) in summary {
            csv.serialize(CsvRow {
                section: "summary",
                date: first_day.clone(),
                description: label,
                category: "",
                amount: fmt_money(&amount),
            })?;
        }

        for expense in &self.expenses {
            csv.serialize(CsvRow {
                section: "expense",
                date: expense.date_created.date().to_string(),
                description: &expense.description,
                category: expense.category.as_deref().unwrap_or("-"),
                amount: fmt_money(&-expense.amount),
            })?;
        }

        for income in &self.incomes {
            csv.serialize(CsvRow {
                section: "income",
                date: income.date_created.date().to_string(),
                description: &income.description,
                category: income.source.as_deref().unwrap_or("-"),
                amount: fmt_money(&income.amount),
            })?;
        }

        csv.flush()?;
        Ok(())
    }
}
