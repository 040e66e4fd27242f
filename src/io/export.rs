use chrono::NaiveDate;
use std::io::Write;

use crate::application::{AppError, BudgetReport, BudgetService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed backup in the persisted schema
    Json,
    /// Entry table only
    Csv,
    /// Entries, summary, per-category, distribution and recommendation
    Report,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Report => "report",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "report" => Some(ExportFormat::Report),
            _ => None,
        }
    }

    /// File name used when exporting into a directory.
    pub fn default_filename(&self, today: NaiveDate) -> String {
        match self {
            ExportFormat::Json => format!("budget-backup-{}.json", today.format("%Y-%m-%d")),
            ExportFormat::Csv => format!("budget-entries-{}.csv", today.format("%Y-%m-%d")),
            ExportFormat::Report => "budget-report.csv".to_string(),
        }
    }
}

/// Exporter for converting the ledger to various formats
pub struct Exporter<'a> {
    service: &'a BudgetService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a BudgetService) -> Self {
        Self { service }
    }

    /// Render an export fully in memory. Callers write the bytes in one go,
    /// so a failure never leaves a partial file behind.
    pub fn render(&self, format: ExportFormat) -> Result<Vec<u8>, AppError> {
        let mut buffer = Vec::new();
        match format {
            ExportFormat::Json => {
                self.export_json(&mut buffer)?;
            }
            ExportFormat::Csv => {
                self.export_entries_csv(&mut buffer)?;
            }
            ExportFormat::Report => {
                self.export_report_csv(&mut buffer)?;
            }
        }
        Ok(buffer)
    }

    /// Export the ledger as pretty-printed JSON in the persisted schema
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<usize, AppError> {
        let ledger = self.service.ledger();
        let json = serde_json::to_string_pretty(ledger)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        Ok(ledger.len())
    }

    /// Export entries to CSV format
    pub fn export_entries_csv<W: Write>(&self, writer: W) -> Result<usize, AppError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["Date", "Type", "Category", "Amount"])?;

        let mut count = 0;
        for entry in &self.service.ledger().entries {
            csv_writer.write_record([
                entry.date.format("%Y-%m-%d").to_string(),
                entry.entry_type.as_str().to_string(),
                entry.category.clone(),
                entry.amount.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full tabular report as one CSV document with titled sections
    pub fn export_report_csv<W: Write>(&self, writer: W) -> Result<BudgetReport, AppError> {
        let report = self.service.report();
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);

        csv_writer.write_record(["Entries"])?;
        csv_writer.write_record(["Date", "Type", "Category", "Amount"])?;
        for entry in &report.entries {
            csv_writer.write_record([
                entry.date.format("%Y-%m-%d").to_string(),
                entry.entry_type.as_str().to_string(),
                entry.category.clone(),
                entry.amount.to_string(),
            ])?;
        }

        csv_writer.write_record([""])?;
        csv_writer.write_record(["Summary"])?;
        let summary = &report.summary;
        for (label, amount) in [
            ("Total Money", summary.total_money),
            ("Total Expenses", summary.total_expenses),
            ("Total Savings", summary.total_savings),
            ("Remaining", summary.remaining),
        ] {
            csv_writer.write_record([label.to_string(), amount.to_string()])?;
        }

        csv_writer.write_record([""])?;
        csv_writer.write_record(["By Category"])?;
        csv_writer.write_record(["Category", "Expenses", "Savings"])?;
        for cat in &report.categories {
            csv_writer.write_record([
                cat.category.clone(),
                cat.expenses.to_string(),
                cat.savings.to_string(),
            ])?;
        }

        csv_writer.write_record([""])?;
        csv_writer.write_record(["Budget Distribution"])?;
        csv_writer.write_record(["Slice", "Amount", "Percent"])?;
        for slice in &report.distribution {
            csv_writer.write_record([
                slice.label.clone(),
                slice.amount.to_string(),
                format!("{:.2}", slice.percentage),
            ])?;
        }

        csv_writer.write_record([""])?;
        csv_writer.write_record(["Recommendation", report.recommendation.as_str()])?;

        csv_writer.flush()?;
        Ok(report)
    }
}
