//! Conversion of untrusted payloads into a valid [`Ledger`].
//!
//! Normalization is total: every input produces a ledger, with field-level
//! defaults substituted wherever the payload is missing or malformed.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use super::{Amount, DEFAULT_CATEGORY, Entry, EntryType, Ledger, coerce_value};

/// Field names tried, in order, for an entry's amount.
const AMOUNT_KEYS: [&str; 3] = ["amount", "value", "amt"];

/// Shape of a raw payload, resolved once before normalization.
#[derive(Debug, Clone, Copy)]
pub enum RawPayload<'a> {
    Absent,
    Sequence(&'a [Value]),
    Keyed(&'a Map<String, Value>),
    Other,
}

impl<'a> From<&'a Value> for RawPayload<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => RawPayload::Absent,
            Value::Array(items) => RawPayload::Sequence(items),
            Value::Object(map) => RawPayload::Keyed(map),
            _ => RawPayload::Other,
        }
    }
}

/// Outcome of validating one field: the input was usable, or a default was substituted.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Given(T),
    Fallback(T),
}

impl<T> Field<T> {
    pub fn into_inner(self) -> T {
        match self {
            Field::Given(v) | Field::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Field::Fallback(_))
    }
}

/// Normalize an arbitrary payload into a ledger.
pub fn normalize(raw: &Value, today: NaiveDate) -> Ledger {
    normalize_counted(raw, today).0
}

/// Like [`normalize`], also reporting how many entry fields fell back to defaults.
pub fn normalize_counted(raw: &Value, today: NaiveDate) -> (Ledger, usize) {
    match RawPayload::from(raw) {
        RawPayload::Absent | RawPayload::Other => (Ledger::default(), 0),
        RawPayload::Sequence(items) => {
            let (entries, fallbacks) = normalize_entries(items, today);
            (Ledger::new(0.0, entries), fallbacks)
        }
        RawPayload::Keyed(map) => {
            let total_money = map.get("totalMoney").map(coerce_value).unwrap_or(0.0);
            let items = ["entries", "data"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let (entries, fallbacks) = normalize_entries(items, today);
            (Ledger::new(total_money, entries), fallbacks)
        }
    }
}

fn normalize_entries(items: &[Value], today: NaiveDate) -> (Vec<Entry>, usize) {
    items
        .iter()
        .map(|item| normalize_entry_counted(item, today))
        .fold((Vec::with_capacity(items.len()), 0), |(mut entries, total), (entry, n)| {
            entries.push(entry);
            (entries, total + n)
        })
}

/// Normalize one candidate entry. Non-object candidates yield an all-default entry.
pub fn normalize_entry(candidate: &Value, today: NaiveDate) -> Entry {
    normalize_entry_counted(candidate, today).0
}

/// Like [`normalize_entry`], also reporting how many fields fell back to defaults.
pub fn normalize_entry_counted(candidate: &Value, today: NaiveDate) -> (Entry, usize) {
    let field = |name: &str| candidate.get(name).filter(|v| !v.is_null());

    let date = coerce_date(field("date"), today);
    let entry_type = coerce_type(field("type"));
    let category = coerce_category(field("category"));
    let amount = coerce_amount(AMOUNT_KEYS.iter().find_map(|&key| field(key)));

    let fallbacks = [
        date.is_fallback(),
        entry_type.is_fallback(),
        category.is_fallback(),
        amount.is_fallback(),
    ]
    .iter()
    .filter(|f| **f)
    .count();

    let entry = Entry::new(
        date.into_inner(),
        entry_type.into_inner(),
        category.into_inner(),
        amount.into_inner(),
    );
    (entry, fallbacks)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; anything else is today.
pub fn coerce_date(value: Option<&Value>, today: NaiveDate) -> Field<NaiveDate> {
    match value.and_then(Value::as_str) {
        Some(text) => parse_date_text(text)
            .map(Field::Given)
            .unwrap_or(Field::Fallback(today)),
        None => Field::Fallback(today),
    }
}

/// Parse user or payload date text. Blank or unrecognised text is `None`.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Only the exact spellings "Expense" and "Savings" are honoured.
pub fn coerce_type(value: Option<&Value>) -> Field<EntryType> {
    match value.and_then(Value::as_str) {
        Some("Expense") => Field::Given(EntryType::Expense),
        Some("Savings") => Field::Given(EntryType::Savings),
        _ => Field::Fallback(EntryType::Expense),
    }
}

pub fn coerce_category(value: Option<&Value>) -> Field<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Field::Given(s.clone()),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Field::Given(n.to_string()),
        _ => Field::Fallback(DEFAULT_CATEGORY.to_string()),
    }
}

/// Negative, missing and non-numeric amounts become 0.
pub fn coerce_amount(value: Option<&Value>) -> Field<Amount> {
    let Some(value) = value else {
        return Field::Fallback(0.0);
    };
    let numeric = match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim_start().starts_with(|c: char| {
            c.is_ascii_digit() || c == '.' || c == '-' || c == '+'
        }),
        _ => false,
    };
    let amount = coerce_value(value);
    if numeric && amount >= 0.0 && (amount > 0.0 || is_literal_zero(value)) {
        Field::Given(amount)
    } else {
        Field::Fallback(0.0)
    }
}

fn is_literal_zero(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.trim().parse::<f64>() == Ok(0.0),
        _ => false,
    }
}
