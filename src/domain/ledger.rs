use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::normalize::parse_date_text;
use super::{Amount, DEFAULT_CATEGORY, Entry, EntryForm, safe_number};

/// The complete budget state: funds available plus the ordered entry list.
/// Entry order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub total_money: Amount,
    pub entries: Vec<Entry>,
}

impl Ledger {
    pub fn new(total_money: Amount, entries: Vec<Entry>) -> Self {
        Self {
            total_money,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Replace the available funds with the coerced value of `input`.
    pub fn set_total(&mut self, input: &str) -> Amount {
        self.total_money = safe_number(input);
        self.total_money
    }

    /// Append an entry built from form values. Returns the new entry's index.
    pub fn add_entry(&mut self, form: &EntryForm, today: NaiveDate) -> Result<usize, LedgerError> {
        let entry = entry_from_form(form, today)?;
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    /// Overwrite the entry at `index` in place.
    /// Out-of-range positions are a no-op and return `Ok(None)`.
    pub fn replace_entry(
        &mut self,
        index: usize,
        form: &EntryForm,
        today: NaiveDate,
    ) -> Result<Option<Entry>, LedgerError> {
        if index >= self.entries.len() {
            return Ok(None);
        }
        let entry = entry_from_form(form, today)?;
        Ok(Some(std::mem::replace(&mut self.entries[index], entry)))
    }

    /// Remove the entry at `index`. Out-of-range positions are a no-op.
    pub fn remove_entry(&mut self, index: usize) -> Option<Entry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }
}

/// Validate form values into an entry.
/// Non-positive amounts and unreadable dates are rejected; a blank date means `today`.
pub fn entry_from_form(form: &EntryForm, today: NaiveDate) -> Result<Entry, LedgerError> {
    let amount = safe_number(&form.amount);
    if amount <= 0.0 {
        return Err(LedgerError::NonPositiveAmount {
            input: form.amount.clone(),
        });
    }

    let date = if form.date.trim().is_empty() {
        today
    } else {
        parse_date_text(&form.date).ok_or_else(|| LedgerError::InvalidDate {
            input: form.date.clone(),
        })?
    };
    let category = match form.category.trim() {
        "" => DEFAULT_CATEGORY.to_string(),
        category => category.to_string(),
    };

    Ok(Entry::new(date, form.entry_type, category, amount))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    NonPositiveAmount { input: String },
    InvalidDate { input: String },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::NonPositiveAmount { input } => {
                write!(f, "Please enter an amount greater than 0 (got '{}')", input)
            }
            LedgerError::InvalidDate { input } => {
                write!(f, "Invalid date '{}', expected YYYY-MM-DD", input)
            }
        }
    }
}

impl std::error::Error for LedgerError {}
