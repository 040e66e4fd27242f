// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use purse::application::BudgetService;
use purse::domain::{EntryForm, EntryType};
use tempfile::TempDir;

/// Fixed "today" so date defaults are deterministic
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Path of the database file inside a temporary directory
pub fn db_path(temp_dir: &TempDir) -> String {
    temp_dir.path().join("test.db").to_str().unwrap().to_string()
}

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BudgetService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = BudgetService::open_with_clock(&db_path(&temp_dir), today).await?;
    Ok((service, temp_dir))
}

/// Reopen the database behind a test service, as a new session would
pub async fn reopen(temp_dir: &TempDir) -> Result<BudgetService> {
    Ok(BudgetService::open_with_clock(&db_path(temp_dir), today).await?)
}

pub fn expense(category: &str, amount: &str) -> EntryForm {
    EntryForm::new(EntryType::Expense, category, amount)
}

pub fn savings(category: &str, amount: &str) -> EntryForm {
    EntryForm::new(EntryType::Savings, category, amount)
}

/// Test fixture: a month of typical entries
pub struct StandardBudget;

impl StandardBudget {
    /// Total 1000; Food 50 + 30, Rent 400, Bank savings 200
    pub async fn create(service: &mut BudgetService) -> Result<()> {
        service.set_total("1000").await?;
        service
            .add_entry(expense("Food", "50").with_date("2024-06-01"))
            .await?;
        service
            .add_entry(expense("Rent", "400").with_date("2024-06-02"))
            .await?;
        service
            .add_entry(savings("Bank", "200").with_date("2024-06-03"))
            .await?;
        service
            .add_entry(expense("Food", "30").with_date("2024-06-04"))
            .await?;
        Ok(())
    }
}
