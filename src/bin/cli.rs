//! Symptom Lens CLI
//!
//! Command-line interface over journal and metric files:
//! - Analyze a symptom against lifestyle factors
//! - List the symptoms present in a journal
//! - Summarize a period
//! - Prepare for a doctor visit
//! - Generate a default config file
//!
//! Journal and metric files are JSON arrays or CSV, chosen by extension.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use symptom_lens::analysis::{
    available_symptoms, prepare_doctor_visit, summarize, AnalysisResult, CorrelationAnalyzer,
    DayPolicy, HealthSummary, NarrativeInput,
};
use symptom_lens::config::{generate_default_config, Config};
use symptom_lens::narrative::{fallback_narrative, generate_or, HttpNarrator, Narrative};
use symptom_lens::records::{
    load_journal_file, load_metrics_file, parse_day, DateRange, HealthMetricRecord, ImportResult,
    JournalEntry,
};

#[derive(Parser)]
#[command(name = "symptom-lens")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find lifestyle factors that differ on symptom days")]
#[command(long_about = "Symptom Lens compares days on which a symptom was reported against symptom-free days.\nIt reports correlations, not causes.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare symptom days against symptom-free days
    Analyze {
        /// Journal file (.json or .csv)
        #[arg(short, long)]
        journal: PathBuf,
        /// Metrics file (.json or .csv)
        #[arg(short, long)]
        metrics: Option<PathBuf>,
        /// Symptom name (case-insensitive)
        #[arg(short, long)]
        symptom: String,
        #[command(flatten)]
        period: PeriodArgs,
        /// Same-day policy (symptom_dominates, per_entry)
        #[arg(short, long)]
        policy: Option<DayPolicy>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Tags listed in the prompt
        #[arg(long)]
        top_tags: Option<usize>,
        /// Ask the configured narrative service for a write-up
        #[arg(long)]
        narrate: bool,
    },

    /// List symptoms present in a journal
    Symptoms {
        /// Journal file (.json or .csv)
        #[arg(short, long)]
        journal: PathBuf,
    },

    /// Summarize a period
    Summary {
        /// Journal file (.json or .csv)
        #[arg(short, long)]
        journal: PathBuf,
        /// Metrics file (.json or .csv)
        #[arg(short, long)]
        metrics: Option<PathBuf>,
        #[command(flatten)]
        period: PeriodArgs,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Ask the configured narrative service for a write-up
        #[arg(long)]
        narrate: bool,
    },

    /// Prepare key symptoms, patterns and questions for a doctor visit
    Visit {
        /// Journal file (.json or .csv)
        #[arg(short, long)]
        journal: PathBuf,
        /// Metrics file (.json or .csv)
        #[arg(short, long)]
        metrics: Option<PathBuf>,
        #[command(flatten)]
        period: PeriodArgs,
        /// Extra question to bring (repeatable)
        #[arg(short, long = "question")]
        questions: Vec<String>,
        /// Output format (prompt prints the shareable text)
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
pub struct PeriodArgs {
    /// First day (default: end minus --last)
    #[arg(long)]
    start: Option<String>,
    /// Last day (default: latest journal day)
    #[arg(long)]
    end: Option<String>,
    /// Window length when --start is omitted (e.g. 30d, 4w)
    #[arg(short, long)]
    last: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Prompt,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::load_default(),
    };
    symptom_lens::logging::init_stderr(&config.logging);

    match cli.command {
        Commands::Analyze {
            journal,
            metrics,
            symptom,
            period,
            policy,
            format,
            top_tags,
            narrate,
        } => {
            let (entries, records) = load_records(&journal, metrics.as_deref())?;
            let range = resolve_period(&period, &entries, config.analysis.window_days)?;

            let mut analyzer = CorrelationAnalyzer::new(config.analysis.options());
            if let Some(policy) = policy {
                analyzer = analyzer.day_policy(policy);
            }

            let result = analyzer
                .build(&symptom, range, &entries, &records)
                .with_context(|| format!("Analysis of {:?} failed", symptom))?;
            let top_tags = top_tags.unwrap_or(config.analysis.top_tags);
            let input = NarrativeInput::from_result(&result, top_tags);

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Prompt => println!("{}", input.to_prompt()),
                OutputFormat::Table => print_analysis(&result),
            }

            if narrate {
                let fallback = || fallback_narrative(&result);
                let narrative = match narrator(&config)? {
                    Some(narrator) => generate_or(&narrator, &input.to_prompt(), fallback).await,
                    None => Narrative {
                        text: fallback(),
                        generated: false,
                    },
                };
                println!();
                println!("{}", narrative.text);
                if !narrative.generated {
                    eprintln!("(narrative service unavailable or disabled, showing local summary)");
                }
            }
        }

        Commands::Symptoms { journal } => {
            let entries = load_journal(&journal)?;
            let symptoms = available_symptoms(&entries);

            if symptoms.is_empty() {
                println!("No symptoms recorded.");
            } else {
                for name in symptoms {
                    println!("{}", name);
                }
            }
        }

        Commands::Summary {
            journal,
            metrics,
            period,
            format,
            narrate,
        } => {
            let (entries, records) = load_records(&journal, metrics.as_deref())?;
            let range = resolve_period(&period, &entries, config.analysis.window_days)?;
            let summary = summarize(range, &entries, &records).context("Summary failed")?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Prompt => println!("{}", summary.to_prompt()),
                OutputFormat::Table => print_summary(&summary),
            }

            if narrate {
                let fallback = || {
                    format!(
                        "You logged {} entries between {} and {}.",
                        summary.entries, summary.range.start, summary.range.end
                    )
                };
                let narrative = match narrator(&config)? {
                    Some(narrator) => generate_or(&narrator, &summary.to_prompt(), fallback).await,
                    None => Narrative {
                        text: fallback(),
                        generated: false,
                    },
                };
                println!();
                println!("{}", narrative.text);
            }
        }

        Commands::Visit {
            journal,
            metrics,
            period,
            questions,
            format,
        } => {
            let (entries, records) = load_records(&journal, metrics.as_deref())?;
            let range = resolve_period(&period, &entries, config.analysis.window_days)?;
            let analyzer = CorrelationAnalyzer::new(config.analysis.options());

            let mut visit = prepare_doctor_visit(&analyzer, range, &entries, &records)
                .context("Doctor visit preparation failed")?;
            for question in &questions {
                visit.add_question(question);
            }

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&visit)?),
                OutputFormat::Table | OutputFormat::Prompt => {
                    print!("{}", visit.to_shareable_text())
                }
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("Failed to create {:?}", parent))?;
                    }
                    std::fs::write(&path, &config)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// HTTP narrator when `[narrative]` is enabled
fn narrator(config: &Config) -> anyhow::Result<Option<HttpNarrator>> {
    if !config.narrative.enabled {
        tracing::info!("Narrative service disabled, using local text");
        return Ok(None);
    }
    let narrator =
        HttpNarrator::from_config(&config.narrative).context("Failed to build narrative client")?;
    Ok(Some(narrator))
}

fn load_journal(path: &Path) -> anyhow::Result<Vec<JournalEntry>> {
    let imported =
        load_journal_file(path).with_context(|| format!("Failed to read journal {:?}", path))?;
    report_skipped("journal", path, &imported);
    Ok(imported.records)
}

fn load_records(
    journal: &Path,
    metrics: Option<&Path>,
) -> anyhow::Result<(Vec<JournalEntry>, Vec<HealthMetricRecord>)> {
    let entries = load_journal(journal)?;
    let records = match metrics {
        Some(path) => {
            let imported = load_metrics_file(path)
                .with_context(|| format!("Failed to read metrics {:?}", path))?;
            report_skipped("metrics", path, &imported);
            imported.records
        }
        None => Vec::new(),
    };
    Ok((entries, records))
}

fn report_skipped<T>(what: &str, path: &Path, imported: &ImportResult<T>) {
    if imported.rows_failed == 0 {
        return;
    }
    eprintln!("Skipped {} malformed {} rows in {:?}", imported.rows_failed, what, path);
    for error in imported.errors.iter().take(5) {
        eprintln!("  {}", error);
    }
}

/// Explicit bounds win; otherwise the window ends on the latest journal day
fn resolve_period(
    period: &PeriodArgs,
    entries: &[JournalEntry],
    window_days: i64,
) -> anyhow::Result<DateRange> {
    let end = match &period.end {
        Some(raw) => parse_date_arg("end", raw)?,
        None => match entries.iter().map(|e| e.date).max() {
            Some(day) => day,
            None => bail!("Journal is empty; pass --end to pick a period"),
        },
    };

    match (&period.start, &period.last) {
        (Some(raw), _) => Ok(DateRange::new(parse_date_arg("start", raw)?, end)),
        (None, Some(last)) => Ok(DateRange::ending_on(end, parse_window(last)?)),
        (None, None) => Ok(DateRange::ending_on(end, window_days)),
    }
}

fn parse_date_arg(field: &str, raw: &str) -> anyhow::Result<NaiveDate> {
    parse_day(raw).with_context(|| format!("Invalid --{} date: {}", field, raw))
}

/// Window length in days from "30d", "4w" or a bare number of days
fn parse_window(s: &str) -> anyhow::Result<i64> {
    let s = s.trim().to_lowercase();

    let days = if let Some(days) = s.strip_suffix('d') {
        days.parse::<i64>()?
    } else if let Some(weeks) = s.strip_suffix('w') {
        match weeks.parse::<i64>()?.checked_mul(7) {
            Some(days) => days,
            None => bail!("Window too large: {}", s),
        }
    } else if let Ok(days) = s.parse::<i64>() {
        days
    } else {
        bail!("Invalid window format: {}. Use: 7d, 4w", s);
    };

    if days < 0 {
        bail!("Window must not be negative: {}", s);
    }
    Ok(days)
}

fn print_analysis(result: &AnalysisResult) {
    println!("{} from {}", result.symptom, result.range);
    println!(
        "Symptom days: {}   Symptom-free days: {}   ({}% of journaled days)",
        result.symptom_days_count, result.symptom_free_days_count, result.occurrence_percentage
    );
    println!();

    if !result.has_symptom_days() {
        println!("No days with {} in this period.", result.symptom);
        println!();
    }

    println!(
        "{:<22} {:>14} {:>14} {:>10} {:>9}",
        "Factor", "With", "Without", "Diff", "Strength"
    );
    println!("{}", "-".repeat(73));

    for c in &result.comparisons {
        let (with, without) = match c.factor() {
            Some(factor) => (
                factor.format_value(c.with_symptom),
                factor.format_value(c.without_symptom),
            ),
            None => (format!("{:.0}%", c.with_symptom), format!("{:.0}%", c.without_symptom)),
        };
        println!(
            "{:<22} {:>14} {:>14} {:>+10.1} {:>9}",
            c.label,
            with,
            without,
            c.difference,
            if c.both_sides_observed {
                c.strength.to_string()
            } else {
                "no data".to_string()
            }
        );
    }

    if !result.insights.is_empty() {
        println!();
        println!("Insights:");
        for insight in &result.insights {
            println!("  - {}", insight.description);
        }
    }
}

fn print_summary(summary: &HealthSummary) {
    println!("Summary {}", summary.range);
    println!();
    println!("  Entries:            {}", summary.entries);
    println!("  Average mood:       {:.1}/5", summary.mood_average);
    println!("  Average energy:     {:.1}/5", summary.energy_average);
    println!("  Average sleep:      {:.1} hours", summary.sleep_average);
    println!("  Average steps:      {:.0}", summary.steps_average);
    println!("  Resting heart rate: {:.1} bpm", summary.resting_heart_rate_average);

    println!();
    if summary.symptoms.is_empty() {
        println!("No symptoms reported.");
    } else {
        println!("{:<20} {:>11} {:>13}", "Symptom", "Occurrences", "Avg severity");
        println!("{}", "-".repeat(46));
        for s in &summary.symptoms {
            println!("{:<20} {:>11} {:>13.1}", s.name, s.occurrences, s.average_severity);
        }
    }

    let tags = summary.top_tags(5);
    if !tags.is_empty() {
        println!();
        let rendered: Vec<String> =
            tags.iter().map(|(tag, n)| format!("#{} ({})", tag, n)).collect();
        println!("Top tags: {}", rendered.join(", "));
    }
}
