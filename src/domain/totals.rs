use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Amount, Ledger};

/// Summary figures derived from a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub expenses: Amount,
    pub savings: Amount,
    /// Funds left after expenses and savings. May be negative.
    pub remaining: Amount,
}

/// Expense and savings sums for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub expenses: Amount,
    pub savings: Amount,
}

/// One slice of the budget distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub label: String,
    pub amount: Amount,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ReduceExpenses,
    SavingsHealthy,
}

impl Recommendation {
    /// Expenses strictly above savings call for a cut; ties count as healthy.
    pub fn from_totals(totals: &Totals) -> Self {
        if totals.expenses > totals.savings {
            Recommendation::ReduceExpenses
        } else {
            Recommendation::SavingsHealthy
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::ReduceExpenses => {
                "Expenses exceed savings - consider reducing expenses"
            }
            Recommendation::SavingsHealthy => "Savings are healthy - keep it up!",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Compute expense, savings and remaining totals.
pub fn totals(ledger: &Ledger) -> Totals {
    let (expenses, savings) = ledger
        .entries
        .iter()
        .fold((0.0, 0.0), |(expenses, savings), entry| {
            if entry.is_expense() {
                (expenses + entry.amount, savings)
            } else {
                (expenses, savings + entry.amount)
            }
        });

    Totals {
        expenses,
        savings,
        remaining: ledger.total_money - expenses - savings,
    }
}

/// Per-category sums, in order of first appearance.
/// Categories without entries never appear.
pub fn category_totals(ledger: &Ledger) -> Vec<CategoryTotal> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut result: Vec<CategoryTotal> = Vec::new();

    for entry in &ledger.entries {
        let index = *positions.entry(entry.category.as_str()).or_insert_with(|| {
            result.push(CategoryTotal {
                category: entry.category.clone(),
                expenses: 0.0,
                savings: 0.0,
            });
            result.len() - 1
        });

        let total = &mut result[index];
        if entry.is_expense() {
            total.expenses += entry.amount;
        } else {
            total.savings += entry.amount;
        }
    }

    result
}

/// Expenses / Savings / Remaining shares for charting.
/// Negative slices are shown as zero and excluded from the percentage base.
pub fn distribution(totals: &Totals) -> Vec<Slice> {
    let slices = [
        ("Expenses", totals.expenses),
        ("Savings", totals.savings),
        ("Remaining", totals.remaining),
    ];
    let base: Amount = slices.iter().map(|(_, amount)| amount.max(0.0)).sum();

    slices
        .iter()
        .map(|(label, amount)| {
            let amount = amount.max(0.0);
            let percentage = if base > 0.0 {
                (amount / base) * 100.0
            } else {
                0.0
            };
            Slice {
                label: label.to_string(),
                amount,
                percentage,
            }
        })
        .collect()
}
