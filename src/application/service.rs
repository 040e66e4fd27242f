use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::domain::{
    Amount, CategoryTotal, Entry, EntryForm, Ledger, Totals, category_totals, normalize, totals,
};
use crate::storage::{Repository, STORAGE_KEY};

use super::{AppError, BudgetReport};

/// Source of "today" for date defaults.
pub type Clock = fn() -> NaiveDate;

/// Current date in UTC.
pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Entry currently open for editing. It stays in the ledger until the edit is committed.
#[derive(Debug, Clone)]
struct PendingEdit {
    index: usize,
    original: Entry,
}

/// Application service owning the ledger for one session.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
/// Every mutation is written through to storage before returning.
pub struct BudgetService {
    repo: Repository,
    ledger: Ledger,
    pending_edit: Option<PendingEdit>,
    clock: Clock,
}

impl BudgetService {
    /// Open (creating if needed) the database at the given path and load the ledger.
    pub async fn open(database_path: &str) -> Result<Self, AppError> {
        Self::open_with_clock(database_path, utc_today).await
    }

    /// Like [`BudgetService::open`], with a custom clock for date defaults.
    pub async fn open_with_clock(database_path: &str, clock: Clock) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        let ledger = Self::load(&repo, clock()).await?;

        info!(
            database = database_path,
            entries = ledger.len(),
            "ledger loaded"
        );

        Ok(Self {
            repo,
            ledger,
            pending_edit: None,
            clock,
        })
    }

    /// Read the stored ledger. A corrupt payload is discarded and an empty ledger returned.
    async fn load(repo: &Repository, today: NaiveDate) -> Result<Ledger, AppError> {
        let Some(payload) = repo.get_payload(STORAGE_KEY).await? else {
            return Ok(Ledger::default());
        };

        match serde_json::from_str::<Value>(&payload) {
            Ok(raw) => Ok(normalize(&raw, today)),
            Err(e) => {
                warn!("Failed to load stored data, starting empty: {}", e);
                repo.remove_payload(STORAGE_KEY).await?;
                Ok(Ledger::default())
            }
        }
    }

    async fn save(&self) -> Result<(), AppError> {
        let payload = serde_json::to_string(&self.ledger)?;
        self.repo
            .set_payload(STORAGE_KEY, &payload)
            .await
            .map_err(|e| {
                error!("Failed to save data: {:#}", e);
                AppError::Storage(e)
            })
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ========================
    // Mutations
    // ========================

    /// Replace the available funds. Unparsable input sets them to 0.
    pub async fn set_total(&mut self, input: &str) -> Result<Amount, AppError> {
        let total = self.ledger.set_total(input);
        debug!(total, "total money set");
        self.save().await?;
        Ok(total)
    }

    /// Append a new entry. Returns its index.
    /// Non-positive amounts are rejected without touching the ledger.
    pub async fn add_entry(&mut self, form: EntryForm) -> Result<usize, AppError> {
        let today = self.today();
        let index = self.ledger.add_entry(&form, today).inspect_err(|e| {
            debug!("entry rejected: {}", e);
        })?;
        debug!(index, "entry added");
        self.save().await?;
        Ok(index)
    }

    /// Remove the entry at `index` once `confirm` approves it.
    ///
    /// Returns `Ok(None)` when the position is out of range or confirmation is refused;
    /// the ledger is unchanged in both cases.
    pub async fn delete_entry<F>(&mut self, index: usize, confirm: F) -> Result<Option<Entry>, AppError>
    where
        F: FnOnce(&Entry) -> bool,
    {
        let Some(entry) = self.ledger.entry(index) else {
            debug!(index, "delete ignored: no such entry");
            return Ok(None);
        };
        if !confirm(entry) {
            debug!(index, "delete declined");
            return Ok(None);
        }

        let removed = self.ledger.remove_entry(index);
        self.pending_edit = match self.pending_edit.take() {
            Some(edit) if edit.index == index => None,
            Some(mut edit) if edit.index > index => {
                edit.index -= 1;
                Some(edit)
            }
            other => other,
        };
        debug!(index, "entry deleted");
        self.save().await?;
        Ok(removed)
    }

    /// Open the entry at `index` for editing and return its fields.
    ///
    /// The entry stays in the ledger until [`BudgetService::commit_edit`] succeeds, so an
    /// abandoned edit loses nothing. Out-of-range positions return `None`.
    pub fn begin_edit(&mut self, index: usize) -> Option<EntryForm> {
        let entry = self.ledger.entry(index)?;
        let form = entry.to_form();
        self.pending_edit = Some(PendingEdit {
            index,
            original: entry.clone(),
        });
        Some(form)
    }

    /// Position of the entry being edited, if any.
    pub fn editing(&self) -> Option<usize> {
        self.pending_edit.as_ref().map(|edit| edit.index)
    }

    /// Replace the entry being edited with `form`, keeping its position.
    /// A rejected form leaves the edit open so it can be corrected.
    pub async fn commit_edit(&mut self, form: EntryForm) -> Result<Entry, AppError> {
        let index = self.editing().ok_or(AppError::NoPendingEdit)?;
        let today = self.today();

        self.ledger
            .replace_entry(index, &form, today)?
            .ok_or(AppError::NoPendingEdit)?;
        self.pending_edit = None;

        let updated = self.ledger.entries[index].clone();
        debug!(index, "entry edited");
        self.save().await?;
        Ok(updated)
    }

    /// Abandon the current edit. Returns the untouched original entry.
    pub fn cancel_edit(&mut self) -> Option<Entry> {
        self.pending_edit.take().map(|edit| edit.original)
    }

    /// Replace the whole ledger with an imported one.
    pub async fn import(&mut self, ledger: Ledger) -> Result<(), AppError> {
        info!(entries = ledger.len(), "ledger replaced by import");
        self.ledger = ledger;
        self.pending_edit = None;
        self.save().await
    }

    // ========================
    // Aggregation
    // ========================

    pub fn totals(&self) -> Totals {
        totals(&self.ledger)
    }

    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        category_totals(&self.ledger)
    }

    pub fn report(&self) -> BudgetReport {
        BudgetReport::build(&self.ledger, self.today())
    }

    /// Close the underlying storage. Later mutations fail to persist.
    pub async fn close(&self) {
        self.repo.close().await;
    }
}
