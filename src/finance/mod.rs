//! Budget, 50/30/20 and reporting computations.
//!
//! Everything here is a pure function over already-loaded rows; the HTTP
//! layer fetches the rows for a period and hands them over.

pub mod budget;
pub mod period;
pub mod report;
pub mod snapshot;

pub use budget::{budget_status, rule_status, BudgetStatus, RuleBucket, RuleStatus};
pub use period::{week_start, DateRange, Period};
pub use report::{monthly_report, MonthlyReport, ReportSummary};
pub use snapshot::{weekly_snapshot, BiggestExpense, CategoryTotal, WeeklySnapshot};
