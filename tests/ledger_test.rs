mod common;

use anyhow::Result;
use common::{StandardBudget, expense, parse_date, reopen, savings, test_service, today};
use purse::application::AppError;
use purse::domain::{EntryType, Ledger, LedgerError, Totals};
use purse::storage::{Repository, STORAGE_KEY};

#[tokio::test]
async fn test_new_database_starts_empty() -> Result<()> {
    let (service, _temp) = test_service().await?;

    assert_eq!(service.ledger(), &Ledger::default());
    assert_eq!(service.totals(), Totals::default());
    assert!(service.category_totals().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_mutations_are_persisted() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;
    let before = service.ledger().clone();
    service.close().await;

    let reopened = reopen(&temp).await?;
    assert_eq!(reopened.ledger(), &before);
    assert_eq!(reopened.ledger().total_money, 1000.0);
    assert_eq!(reopened.ledger().len(), 4);

    Ok(())
}

#[tokio::test]
async fn test_totals_and_categories() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;

    assert_eq!(
        service.totals(),
        Totals {
            expenses: 480.0,
            savings: 200.0,
            remaining: 320.0
        }
    );

    let categories = service.category_totals();
    let names: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["Food", "Rent", "Bank"]);
    assert_eq!(categories[0].expenses, 80.0);
    assert_eq!(categories[2].savings, 200.0);

    Ok(())
}

#[tokio::test]
async fn test_set_total_with_invalid_input() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    assert_eq!(service.set_total("750.25").await?, 750.25);
    assert_eq!(service.set_total("plenty").await?, 0.0);
    assert_eq!(service.ledger().total_money, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_add_entry_defaults_date_to_today() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let index = service.add_entry(savings("", "15")).await?;
    let entry = &service.ledger().entries[index];

    assert_eq!(entry.date, today());
    assert_eq!(entry.category, "Other");
    assert_eq!(entry.entry_type, EntryType::Savings);

    Ok(())
}

#[tokio::test]
async fn test_add_entry_rejects_non_positive_amounts() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;
    let before = service.ledger().clone();

    for amount in ["0", "-10", "zero"] {
        let result = service.add_entry(expense("Food", amount)).await;
        assert!(matches!(result, Err(AppError::InvalidEntry(_))));
    }
    assert_eq!(service.ledger(), &before);

    service.close().await;
    assert_eq!(reopen(&temp).await?.ledger(), &before);

    Ok(())
}

#[tokio::test]
async fn test_delete_entry_requires_confirmation() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;
    let before = service.ledger().clone();

    let removed = service.delete_entry(1, |_| false).await?;
    assert!(removed.is_none());
    assert_eq!(service.ledger(), &before);

    let removed = service
        .delete_entry(1, |entry| entry.category == "Rent")
        .await?
        .unwrap();
    assert_eq!(removed.amount, 400.0);
    assert_eq!(service.ledger().len(), 3);
    assert_eq!(service.ledger().entries[1].category, "Bank");

    Ok(())
}

#[tokio::test]
async fn test_delete_out_of_range_is_noop() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;
    let before = service.ledger().clone();

    let mut asked = false;
    let removed = service
        .delete_entry(4, |_| {
            asked = true;
            true
        })
        .await?;

    assert!(removed.is_none());
    assert!(!asked, "confirmation is only requested for existing entries");
    assert_eq!(service.ledger(), &before);

    Ok(())
}

#[tokio::test]
async fn test_edit_replaces_entry_in_place() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;

    let mut form = service.begin_edit(1).unwrap();
    assert_eq!(form.category, "Rent");
    assert_eq!(form.amount, "400");
    assert_eq!(form.date, "2024-06-02");

    form.amount = "425".into();
    form.entry_type = EntryType::Expense;
    let updated = service.commit_edit(form).await?;

    assert_eq!(updated.amount, 425.0);
    assert_eq!(updated.date, parse_date("2024-06-02"));
    assert_eq!(service.ledger().len(), 4);
    assert_eq!(service.ledger().entries[1], updated);
    assert_eq!(service.editing(), None);

    service.close().await;
    assert_eq!(reopen(&temp).await?.ledger().entries[1].amount, 425.0);

    Ok(())
}

#[tokio::test]
async fn test_abandoned_edit_keeps_entry() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;
    let before = service.ledger().clone();

    // Caller opens an edit and never commits it
    assert!(service.begin_edit(2).is_some());
    assert_eq!(service.editing(), Some(2));
    assert_eq!(service.ledger(), &before);
    service.close().await;

    let reopened = reopen(&temp).await?;
    assert_eq!(reopened.ledger(), &before);
    assert_eq!(reopened.editing(), None);

    Ok(())
}

#[tokio::test]
async fn test_cancel_edit_returns_original() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;

    service.begin_edit(0).unwrap();
    let original = service.cancel_edit().unwrap();

    assert_eq!(original.category, "Food");
    assert_eq!(service.ledger().entries[0], original);
    assert!(matches!(
        service.commit_edit(expense("Food", "1")).await,
        Err(AppError::NoPendingEdit)
    ));

    Ok(())
}

#[tokio::test]
async fn test_rejected_edit_stays_open() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;
    let before = service.ledger().clone();

    let mut form = service.begin_edit(0).unwrap();
    form.amount = "0".into();
    assert!(matches!(
        service.commit_edit(form.clone()).await,
        Err(AppError::InvalidEntry(_))
    ));
    assert_eq!(service.ledger(), &before);
    assert_eq!(service.editing(), Some(0));

    form.amount = "55".into();
    service.commit_edit(form).await?;
    assert_eq!(service.ledger().entries[0].amount, 55.0);

    Ok(())
}

#[tokio::test]
async fn test_edit_with_unreadable_date_keeps_stored_date() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;
    let before = service.ledger().clone();

    let mut form = service.begin_edit(1).unwrap();
    form.date = "2024-02-30".into();
    assert!(matches!(
        service.commit_edit(form).await,
        Err(AppError::InvalidEntry(LedgerError::InvalidDate { .. }))
    ));
    assert_eq!(service.ledger().entries[1].date, parse_date("2024-06-02"));
    assert_eq!(service.ledger(), &before);
    assert_eq!(service.editing(), Some(1));

    service.close().await;
    assert_eq!(reopen(&temp).await?.ledger(), &before);

    Ok(())
}

#[tokio::test]
async fn test_add_entry_rejects_unreadable_date() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let result = service
        .add_entry(expense("Food", "12").with_date("06/01/2024"))
        .await;

    assert!(matches!(
        result,
        Err(AppError::InvalidEntry(LedgerError::InvalidDate { .. }))
    ));
    assert!(service.ledger().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_delete_adjusts_pending_edit() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;

    service.begin_edit(3).unwrap();
    service.delete_entry(0, |_| true).await?;
    assert_eq!(service.editing(), Some(2));

    let mut form = service.begin_edit(2).unwrap();
    assert_eq!(form.amount, "30");
    form.category = "Groceries".into();
    service.commit_edit(form).await?;
    assert_eq!(service.ledger().entries[2].category, "Groceries");

    service.begin_edit(1).unwrap();
    service.delete_entry(1, |_| true).await?;
    assert_eq!(service.editing(), None);

    Ok(())
}

#[tokio::test]
async fn test_corrupt_payload_falls_back_to_empty() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    StandardBudget::create(&mut service).await?;
    service.close().await;

    let db_url = format!("sqlite:{}", common::db_path(&temp));
    let repo = Repository::connect(&db_url).await?;
    repo.set_payload(STORAGE_KEY, "{\"totalMoney\": 12, \"entries\": [").await?;
    repo.close().await;

    let reopened = reopen(&temp).await?;
    assert_eq!(reopened.ledger(), &Ledger::default());
    reopened.close().await;

    let repo = Repository::connect(&db_url).await?;
    assert_eq!(repo.get_payload(STORAGE_KEY).await?, None);

    Ok(())
}

#[tokio::test]
async fn test_stored_payload_is_normalized_on_load() -> Result<()> {
    let (service, temp) = test_service().await?;
    service.close().await;

    let db_url = format!("sqlite:{}", common::db_path(&temp));
    let repo = Repository::connect(&db_url).await?;
    repo.set_payload(
        STORAGE_KEY,
        r#"{"totalMoney": "90", "data": [{"type": "Savings", "value": "12.5"}, 7]}"#,
    )
    .await?;
    repo.close().await;

    let reopened = reopen(&temp).await?;
    let ledger = reopened.ledger();
    assert_eq!(ledger.total_money, 90.0);
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.entries[0].entry_type, EntryType::Savings);
    assert_eq!(ledger.entries[0].amount, 12.5);
    assert_eq!(ledger.entries[1].category, "Other");
    assert_eq!(ledger.entries[1].date, today());

    Ok(())
}

#[tokio::test]
async fn test_persisted_payload_schema() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    service.set_total("100").await?;
    service
        .add_entry(expense("Food", "30").with_date("2024-01-05"))
        .await?;
    service.close().await;

    let db_url = format!("sqlite:{}", common::db_path(&temp));
    let repo = Repository::connect(&db_url).await?;
    let payload = repo.get_payload(STORAGE_KEY).await?.unwrap();
    let json: serde_json::Value = serde_json::from_str(&payload)?;

    assert_eq!(json["totalMoney"], 100.0);
    assert_eq!(json["entries"][0]["date"], "2024-01-05");
    assert_eq!(json["entries"][0]["type"], "Expense");
    assert_eq!(json["entries"][0]["category"], "Food");
    assert_eq!(json["entries"][0]["amount"], 30.0);

    Ok(())
}

#[tokio::test]
async fn test_write_failure_keeps_memory_state() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    service.close().await;

    let result = service.add_entry(expense("Food", "12")).await;

    assert!(matches!(result, Err(AppError::Storage(_))));
    assert_eq!(service.ledger().len(), 1);
    assert_eq!(service.ledger().entries[0].amount, 12.0);

    Ok(())
}
