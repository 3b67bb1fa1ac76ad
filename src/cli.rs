//! Command-line front end over the generator and the JSON table.

use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use clap::{Parser, Subcommand};
use colored::Colorize;
use fintrack_config::{Config, ConfigError, ConfigManager};
use fintrack_core::{
    Clock, CoreError, GenerationSummary, GeneratorOptions, OccurrenceGenerator, StoreError,
    SystemClock, TemplateStore,
};
use fintrack_domain::TemplateId;
use fintrack_storage_json::JsonTemplateStore;
use thiserror::Error;

use crate::api::{ApiError, GenerateRequest, GenerateResponse};

#[derive(Debug, Parser)]
#[command(name = "fintrack", version, about = "Recurring transaction scheduler")]
pub struct Cli {
    /// Directory holding the transactions table; overrides the configured one.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Materialize occurrences of every recurring template inside a window.
    Generate {
        /// First day of the window (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        start: Option<String>,
        /// Last day of the window (YYYY-MM-DD). Defaults to start plus the configured window.
        #[arg(long)]
        end: Option<String>,
        /// Print the API response body instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// List recurring templates and whether they can be expanded.
    Templates,
    /// List the occurrences generated from one template.
    Occurrences {
        /// Row id of the recurring template.
        template_id: i64,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Entry point used by the `fintrack_cli` binary.
pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    crate::init_with_filter(&config.log_filter);
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| manager.data_dir(&config));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli.command, &config, data_dir, &SystemClock, &mut out)
}

/// Executes `command` against the table under `data_dir`, writing to `out`.
pub fn run(
    command: Command,
    config: &Config,
    data_dir: PathBuf,
    clock: &dyn Clock,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let store = Arc::new(JsonTemplateStore::open(&data_dir)?);
    match command {
        Command::Generate { start, end, json } => {
            let request = GenerateRequest::from_parts(start.as_deref(), end.as_deref())?;
            let window = request.resolve_window(clock.today(), config.default_window_days)?;
            let generator = OccurrenceGenerator::with_options(
                store,
                GeneratorOptions {
                    max_per_template: config.max_occurrences_per_template,
                },
            );
            let summary = generator.generate(window)?;
            if json {
                let body = serde_json::to_string_pretty(&GenerateResponse::from(&summary))?;
                writeln!(out, "{body}")?;
            } else {
                print_summary(out, &summary)?;
            }
        }
        Command::Templates => {
            let templates = store.list_recurring_templates()?;
            if templates.is_empty() {
                writeln!(out, "{}", "No recurring templates.".dimmed())?;
            }
            for template in templates {
                let status = match template.eligibility() {
                    Ok(_) => "ok".green().to_string(),
                    Err(issue) => issue.to_string().yellow().to_string(),
                };
                writeln!(
                    out,
                    "#{:<5} {:<10} {:<16} {:>10} from {} until {}  {}",
                    template.id,
                    template.frequency,
                    template.category,
                    format_amount(template.amount),
                    format_bound(template.activation_date),
                    format_bound(template.expiration_date),
                    status
                )?;
            }
        }
        Command::Occurrences { template_id } => {
            let occurrences = store.occurrences_for(TemplateId(template_id))?;
            writeln!(
                out,
                "{}",
                format!("Template #{template_id}: {} occurrence(s)", occurrences.len()).bold()
            )?;
            for occurrence in occurrences {
                writeln!(
                    out,
                    "  #{:<5} {}  {:<16} {:>10}",
                    occurrence.id,
                    occurrence.date,
                    occurrence.category,
                    format_amount(occurrence.amount)
                )?;
            }
        }
    }
    Ok(())
}

fn print_summary(out: &mut dyn Write, summary: &GenerationSummary) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        format!(
            "Generated {} occurrence(s) for {}",
            summary.created_count(),
            summary.window
        )
        .green()
        .bold()
    )?;
    for occurrence in &summary.created {
        writeln!(
            out,
            "  {}  {:<16} {:>10}  (template #{})",
            occurrence.date,
            occurrence.category,
            format_amount(occurrence.amount),
            occurrence.parent_template_id
        )?;
    }
    for skipped in &summary.skipped_templates {
        writeln!(
            out,
            "{}",
            format!("Skipped template #{}: {}", skipped.template_id, skipped.issue).yellow()
        )?;
    }
    for failed in &summary.failed {
        writeln!(
            out,
            "{}",
            format!(
                "Failed template #{} on {}: {}",
                failed.template_id, failed.date, failed.reason
            )
            .red()
        )?;
    }
    for deferred in &summary.deferred {
        writeln!(
            out,
            "{}",
            format!(
                "Limit reached for template #{}; run again to continue from {}",
                deferred.template_id, deferred.next_date
            )
            .yellow()
        )?;
    }
    if let Some(reason) = &summary.interrupted {
        writeln!(out, "{}", format!("Run interrupted: {reason}").red())?;
    }
    Ok(())
}

fn format_amount(amount: Option<f64>) -> String {
    amount.map_or_else(|| "-".to_string(), |value| format!("{value:.2}"))
}

fn format_bound(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |value| value.to_string())
}
