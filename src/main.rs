use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use bug_history::error::Error;
use bug_history::ingest::{CaseStatus, SummaryRecord};
use bug_history::{history, ingest, recorder};

#[derive(Parser)]
#[command(name = "bug-history")]
#[command(version = "0.1.0")]
#[command(about = "JUnit test-result ingestion and bug-history CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a JUnit XML report and append it to the bug history
    Record {
        /// Path to the JUnit XML report
        report: PathBuf,

        /// Version label stored with the run
        #[arg(short, long, default_value = "dev")]
        version: String,

        /// Free-form notes stored with the run
        #[arg(short, long, default_value = "")]
        notes: String,

        /// Path to the history JSON file
        #[arg(long, default_value = "bug_history.json")]
        history: PathBuf,
    },

    /// Print the summary of a JUnit XML report without recording it
    Summary {
        /// Path to the JUnit XML report
        report: PathBuf,
    },

    /// List the runs recorded in the history file
    Show {
        /// Path to the history JSON file
        #[arg(long, default_value = "bug_history.json")]
        history: PathBuf,

        /// Show only the most recent N runs
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{} {}", "✗".red().bold(), err);
        std::process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Commands::Record {
            report,
            version,
            notes,
            history,
        } => {
            println!(
                "{} Recording run from: {}",
                "▶".green().bold(),
                report.display()
            );

            let (summary, timestamp) = recorder::record_run(&report, &version, &notes, &history)?;

            print_summary(&summary);
            println!(
                "{} {}/{} passed ({:.2}%) version {} at {}",
                "✅".green(),
                summary.passed,
                summary.total,
                summary.success_rate,
                version.cyan(),
                timestamp
            );
            println!("  History: {}", history.display().to_string().cyan());
        }

        Commands::Summary { report } => {
            let (summary, cases) = ingest::parse_junit_file(&report)?;

            print_summary(&summary);
            for case in cases.iter().filter(|c| !c.status.is_ok()) {
                println!(
                    "  {} {}::{} - {}",
                    status_tag(case.status),
                    case.class,
                    case.name,
                    case.message
                );
            }
        }

        Commands::Show { history, limit } => {
            let entries = history::load(&history)?;
            println!(
                "{} {} recorded runs in {}",
                "📒".to_string().blue(),
                entries.len(),
                history.display()
            );

            let skip = limit.map_or(0, |n| entries.len().saturating_sub(n));
            for entry in entries.iter().skip(skip) {
                let rate = format!("{:.2}%", entry.summary.success_rate);
                let rate = if entry.summary.passed == entry.summary.total {
                    rate.green()
                } else {
                    rate.yellow()
                };
                println!(
                    "  {} {} {}/{} passed ({}) {}",
                    entry.timestamp.dimmed(),
                    entry.version.cyan(),
                    entry.summary.passed,
                    entry.summary.total,
                    rate,
                    entry.notes
                );
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &SummaryRecord) {
    println!("  Total:   {}", summary.total);
    println!("  Passed:  {}", summary.passed.to_string().green());
    println!("  Failed:  {}", colorize_count(summary.failed));
    println!("  Errors:  {}", colorize_count(summary.errors));
    println!("  Skipped: {}", summary.skipped.to_string().yellow());
    println!("  Time:    {:.3}s", summary.execution_time);
}

fn colorize_count(count: u32) -> colored::ColoredString {
    if count > 0 {
        count.to_string().red()
    } else {
        count.to_string().normal()
    }
}

fn status_tag(status: CaseStatus) -> colored::ColoredString {
    match status {
        CaseStatus::Failed => "FAIL".red().bold(),
        CaseStatus::Error => "ERR ".red().bold(),
        CaseStatus::Skipped => "SKIP".yellow(),
        CaseStatus::Passed => "PASS".green(),
    }
}
