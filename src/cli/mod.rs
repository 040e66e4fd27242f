use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::application::{AppError, BudgetService, SummaryReport};
use crate::domain::{CategoryTotal, DEFAULT_CURRENCY, EntryForm, EntryType, format_amount};
use crate::io::{ExportFormat, ImportFormat, Importer};

/// Purse - Personal Budget Tracker
#[derive(Parser)]
#[command(name = "purse")]
#[command(about = "A local-first personal budget tracker for expenses and savings")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "PURSE_DATABASE", default_value = "purse.db", global = true)]
    pub database: String,

    /// Currency symbol used when displaying amounts
    #[arg(long, env = "PURSE_CURRENCY", default_value = DEFAULT_CURRENCY, global = true)]
    pub currency: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Set the total money available before allocation
    Total {
        /// Amount (e.g., "1500" or "1500.50"); unparsable input sets 0
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Record an expense or savings entry
    Add {
        /// Amount, must be greater than 0
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Entry type: expense, savings
        #[arg(short = 't', long = "type", default_value = "expense")]
        entry_type: String,

        /// Category label (defaults to "Other")
        #[arg(short, long)]
        category: Option<String>,

        /// Date of the entry (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Edit an entry in place; omitted fields keep their current value
    Edit {
        /// Entry position as shown by `list`
        position: usize,

        /// New amount
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,

        /// New entry type: expense, savings
        #[arg(short = 't', long = "type")]
        entry_type: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an entry
    Delete {
        /// Entry position as shown by `list`
        position: usize,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List entries
    List {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Filter by entry type: expense, savings
        #[arg(short = 't', long = "type")]
        entry_type: Option<String>,
    },

    /// Show total money, expenses, savings and remaining funds
    Summary {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show expenses and savings per category
    Categories {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export data to JSON or CSV
    Export {
        /// What to export: json (backup), csv (entries), report (tabular report)
        export_type: String,

        /// Output file or directory (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import data, replacing the current ledger
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Format: json, csv (default: from file extension, else json)
        #[arg(short, long)]
        format: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },
}

/// Initialise the global `tracing` subscriber on stderr.
/// `RUST_LOG` wins over the verbosity flag when set.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // A second initialisation (e.g. in tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        if matches!(self.command, Commands::Init) {
            BudgetService::open(&self.database).await?;
            println!("Database initialized: {}", self.database);
            return Ok(());
        }

        let mut service = BudgetService::open(&self.database).await?;
        let result = self.dispatch(&mut service).await;
        service.close().await;
        result
    }

    async fn dispatch(self, service: &mut BudgetService) -> Result<()> {
        let currency = self.currency.as_str();

        match self.command {
            Commands::Init => {}

            Commands::Total { amount } => {
                let total = service.set_total(&amount).await?;
                println!("Total money set to {}", format_amount(currency, total));
            }

            Commands::Add {
                amount,
                entry_type,
                category,
                date,
            } => {
                let entry_type = parse_entry_type(&entry_type)?;
                let form = EntryForm::new(entry_type, category.unwrap_or_default(), amount)
                    .with_date(date.unwrap_or_default());

                match service.add_entry(form).await {
                    Ok(index) => {
                        let entry = &service.ledger().entries[index];
                        println!(
                            "Added #{}: {} {} {} ({})",
                            index + 1,
                            entry.date,
                            entry.entry_type,
                            format_amount(currency, entry.amount),
                            entry.category
                        );
                    }
                    Err(AppError::InvalidEntry(e)) => anyhow::bail!("{}", e),
                    Err(e) => return Err(e.into()),
                }
            }

            Commands::Edit {
                position,
                amount,
                entry_type,
                category,
                date,
            } => {
                let index = to_index(position)?;
                let Some(mut form) = service.begin_edit(index) else {
                    println!("No entry at position {}", position);
                    return Ok(());
                };

                if let Some(amount) = amount {
                    form.amount = amount;
                }
                if let Some(entry_type) = entry_type {
                    form.entry_type = parse_entry_type(&entry_type)?;
                }
                if let Some(category) = category {
                    form.category = category;
                }
                if let Some(date) = date {
                    form.date = date;
                }

                match service.commit_edit(form).await {
                    Ok(entry) => println!(
                        "Updated #{}: {} {} {} ({})",
                        position,
                        entry.date,
                        entry.entry_type,
                        format_amount(currency, entry.amount),
                        entry.category
                    ),
                    Err(e) => {
                        service.cancel_edit();
                        return Err(e.into());
                    }
                }
            }

            Commands::Delete { position, yes } => {
                let index = to_index(position)?;
                let removed = service
                    .delete_entry(index, |entry| {
                        yes || confirm(&format!(
                            "Delete #{} {} {} {} ({})?",
                            position,
                            entry.date,
                            entry.entry_type,
                            format_amount(currency, entry.amount),
                            entry.category
                        ))
                    })
                    .await?;

                match removed {
                    Some(entry) => println!("Deleted #{} ({})", position, entry.category),
                    None if index >= service.ledger().len() => {
                        println!("No entry at position {}", position)
                    }
                    None => println!("Nothing deleted"),
                }
            }

            Commands::List {
                category,
                entry_type,
            } => {
                let entry_type = entry_type.as_deref().map(parse_entry_type).transpose()?;
                run_list_command(service, currency, category.as_deref(), entry_type);
            }

            Commands::Summary { format } => run_summary_command(service, currency, &format)?,

            Commands::Categories { format } => run_categories_command(service, currency, &format)?,

            Commands::Export {
                export_type,
                output,
            } => run_export_command(service, &export_type, output.as_deref())?,

            Commands::Import {
                input,
                format,
                dry_run,
            } => {
                run_import_command(
                    service,
                    currency,
                    input.as_deref(),
                    format.as_deref(),
                    dry_run,
                )
                .await?
            }
        }

        Ok(())
    }
}

fn parse_entry_type(s: &str) -> Result<EntryType> {
    EntryType::from_str(s)
        .ok_or_else(|| anyhow::anyhow!("Invalid entry type '{}'. Valid: expense, savings", s))
}

/// Positions are 1-based on the command line.
fn to_index(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .context("Positions start at 1")
}

fn confirm(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn run_list_command(
    service: &BudgetService,
    currency: &str,
    category: Option<&str>,
    entry_type: Option<EntryType>,
) {
    let ledger = service.ledger();
    if ledger.is_empty() {
        println!("No entries yet.");
        return;
    }

    println!(
        "{:>4}  {:<10}  {:<8}  {:<20}  {:>12}",
        "#", "DATE", "TYPE", "CATEGORY", "AMOUNT"
    );
    println!("{}", "-".repeat(62));

    let mut shown = 0;
    for (index, entry) in ledger.entries.iter().enumerate() {
        if category.is_some_and(|c| !entry.category.eq_ignore_ascii_case(c)) {
            continue;
        }
        if entry_type.is_some_and(|t| entry.entry_type != t) {
            continue;
        }
        println!(
            "{:>4}  {:<10}  {:<8}  {:<20}  {:>12}",
            index + 1,
            entry.date.format("%Y-%m-%d"),
            entry.entry_type,
            truncate(&entry.category, 20),
            format_amount(currency, entry.amount)
        );
        shown += 1;
    }

    if shown < ledger.len() {
        println!("{}", "-".repeat(62));
        println!("Showing {} of {} entries", shown, ledger.len());
    }
}

fn run_summary_command(service: &BudgetService, currency: &str, format: &str) -> Result<()> {
    let report = service.report();
    let summary = &report.summary;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "csv" => write_summary_csv(std::io::stdout().lock(), summary)?,
        _ => {
            println!("Budget Summary");
            println!();
            println!("Total Money:    {:>15}", format_amount(currency, summary.total_money));
            println!("Expenses:       {:>15}", format_amount(currency, summary.total_expenses));
            println!("Savings:        {:>15}", format_amount(currency, summary.total_savings));
            println!("{}", "-".repeat(31));
            println!("Remaining:      {:>15}", format_amount(currency, summary.remaining));

            println!();
            println!("Distribution:");
            for slice in &report.distribution {
                println!(
                    "  {:<10} {:>6.1}% {}",
                    slice.label,
                    slice.percentage,
                    "#".repeat((slice.percentage / 5.0).round() as usize)
                );
            }

            println!();
            println!("Recommendation: {}", report.recommendation);
        }
    }

    Ok(())
}

fn write_summary_csv<W: Write>(out: W, summary: &SummaryReport) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["item", "amount"])?;
    for (item, amount) in [
        ("total_money", summary.total_money),
        ("expenses", summary.total_expenses),
        ("savings", summary.total_savings),
        ("remaining", summary.remaining),
    ] {
        writer.write_record([item.to_string(), amount.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_categories_csv<W: Write>(out: W, categories: &[CategoryTotal]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["category", "expenses", "savings"])?;
    for cat in categories {
        writer.write_record([
            cat.category.clone(),
            cat.expenses.to_string(),
            cat.savings.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn run_categories_command(service: &BudgetService, currency: &str, format: &str) -> Result<()> {
    let categories = service.category_totals();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        "csv" => write_categories_csv(std::io::stdout().lock(), &categories)?,
        _ => {
            if categories.is_empty() {
                println!("No entries yet.");
                return Ok(());
            }

            println!("{:<20} {:>14} {:>14}", "CATEGORY", "EXPENSES", "SAVINGS");
            println!("{}", "-".repeat(50));
            for cat in &categories {
                println!(
                    "{:<20} {:>14} {:>14}",
                    truncate(&cat.category, 20),
                    format_amount(currency, cat.expenses),
                    format_amount(currency, cat.savings)
                );
            }

            let totals = service.totals();
            println!("{}", "-".repeat(50));
            println!(
                "{:<20} {:>14} {:>14}",
                "TOTAL",
                format_amount(currency, totals.expenses),
                format_amount(currency, totals.savings)
            );
        }
    }

    Ok(())
}

fn run_export_command(service: &BudgetService, export_type: &str, output: Option<&str>) -> Result<()> {
    use crate::io::Exporter;

    let format = ExportFormat::from_str(export_type).with_context(|| {
        format!(
            "Invalid export type '{}'. Valid types: json, csv, report",
            export_type
        )
    })?;

    let bytes = Exporter::new(service)
        .render(format)
        .context("Export failed")?;

    match output {
        Some(path) => {
            let path = Path::new(path);
            let target = if path.is_dir() {
                path.join(format.default_filename(service.today()))
            } else {
                path.to_path_buf()
            };
            std::fs::write(&target, &bytes)
                .with_context(|| format!("Failed to write output file: {}", target.display()))?;
            eprintln!(
                "Exported {} ({} entries) to {}",
                format.as_str(),
                service.ledger().len(),
                target.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            if format == ExportFormat::Json {
                writeln!(stdout)?;
            }
            stdout.flush()?;
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &mut BudgetService,
    currency: &str,
    input: Option<&str>,
    format: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use std::fs::File;
    use std::io::{Read, stdin};

    let format = match format {
        Some(f) => ImportFormat::from_str(f)
            .with_context(|| format!("Invalid import format '{}'. Valid: json, csv", f))?,
        None => match input.and_then(|p| Path::new(p).extension()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ImportFormat::Csv,
            _ => ImportFormat::Json,
        },
    };

    // Determine input reader
    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let result = Importer::new(service.today()).import(reader, format)?;

    if dry_run {
        println!("Validation successful (nothing imported)");
    } else {
        service.import(result.ledger.clone()).await?;
        println!("Import successful!");
    }
    println!("  Format:           {}", format.as_str());
    println!("  Entries:          {}", result.imported);
    println!(
        "  Total money:      {}",
        format_amount(currency, result.ledger.total_money)
    );
    println!("  Defaulted fields: {}", result.defaulted_fields);

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
