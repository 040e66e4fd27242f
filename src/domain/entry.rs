use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Amount;

/// Category assigned to entries that arrive without one.
pub const DEFAULT_CATEGORY: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntryType {
    /// Money spent
    #[default]
    Expense,
    /// Money set aside
    Savings,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Expense => "Expense",
            EntryType::Savings => "Savings",
        }
    }

    /// Lenient parse for user input ("savings", "EXPENSE", ...).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Some(EntryType::Expense),
            "savings" => Some(EntryType::Savings),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single recorded expense or savings transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub category: String,
    pub amount: Amount,
}

impl Entry {
    pub fn new(
        date: NaiveDate,
        entry_type: EntryType,
        category: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self {
            date,
            entry_type,
            category: category.into(),
            amount,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.entry_type == EntryType::Expense
    }

    /// The entry's fields as editable form values.
    pub fn to_form(&self) -> EntryForm {
        EntryForm {
            date: self.date.format("%Y-%m-%d").to_string(),
            entry_type: self.entry_type,
            category: self.category.clone(),
            amount: self.amount.to_string(),
        }
    }
}

/// Raw field values as a user typed them. Blank date means today.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    pub date: String,
    pub entry_type: EntryType,
    pub category: String,
    pub amount: String,
}

impl EntryForm {
    pub fn new(entry_type: EntryType, category: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            date: String::new(),
            entry_type,
            category: category.into(),
            amount: amount.into(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }
}
