use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Amount, CategoryTotal, Entry, Ledger, Recommendation, Slice, Totals, category_totals,
    distribution, totals,
};

/// Everything the tabular export and the summary views show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetReport {
    pub generated_on: NaiveDate,
    pub entries: Vec<Entry>,
    pub summary: SummaryReport,
    pub categories: Vec<CategoryTotal>,
    pub distribution: Vec<Slice>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total_money: Amount,
    pub total_expenses: Amount,
    pub total_savings: Amount,
    pub remaining: Amount,
}

impl BudgetReport {
    pub fn build(ledger: &Ledger, generated_on: NaiveDate) -> Self {
        let totals: Totals = totals(ledger);

        Self {
            generated_on,
            entries: ledger.entries.clone(),
            summary: SummaryReport {
                total_money: ledger.total_money,
                total_expenses: totals.expenses,
                total_savings: totals.savings,
                remaining: totals.remaining,
            },
            categories: category_totals(ledger),
            distribution: distribution(&totals),
            recommendation: Recommendation::from_totals(&totals).message().to_string(),
        }
    }
}
