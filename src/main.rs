mod capture;
mod cli;
mod config;
mod db;
mod llm;
mod observer;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use capture::WaylandCapture;
use cli::{Cli, Commands};
use db::models::ActivityRecord;
use db::store::{ActivityStore, SqliteStore};
use llm::classifier::ModsClassifier;
use observer::Observer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { interval, data_dir } => handle_run(interval, &data_dir).await,
        Commands::History { minutes, data_dir } => handle_history(minutes, &data_dir),
    }
}

async fn handle_run(interval: u64, data_dir: &Path) -> Result<()> {
    let config = config::settings::load_config()?;
    let store = SqliteStore::open(data_dir)?;
    let capture = WaylandCapture::new(data_dir.join("screenshots"))?;
    let classifier = ModsClassifier::new(config.classifier);
    let observer = Observer::new(capture, classifier, store);

    println!("\n  {} {}\n", "◉".green(), "Starting observer...".green());

    loop {
        tokio::select! {
            result = observer.run_cycle() => match result {
                Ok(record) => print_activity(&record),
                Err(e) => {
                    log::error!("cycle failed: {e:#}");
                    println!("  {} {}\n", "✗".red(), format!("{e:#}").red());
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(interval)) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!("\n  {} {}\n", "■".red(), "Observer stopped".red());
    Ok(())
}

fn handle_history(minutes: i64, data_dir: &Path) -> Result<()> {
    let store = SqliteStore::open(data_dir)?;
    let activities = store.get_recent(minutes)?;

    if activities.is_empty() {
        println!("\n  {} {}\n", "●".dimmed(), "No recent activities found.".dimmed());
        return Ok(());
    }

    print_header("Activity History", activities.len());

    // Stored newest-first; read the session top to bottom.
    for act in activities.iter().rev() {
        let details = if act.details.chars().count() > 60 {
            let truncated: String = act.details.chars().take(60).collect();
            format!("{truncated}...")
        } else {
            act.details.clone()
        };

        println!(
            "  {} {}  {}  {}  {}",
            "│".dimmed(),
            format_time(act.timestamp).dimmed(),
            act.project_name.green(),
            details,
            format!("{:.1}%", act.confidence * 100.0).yellow()
        );
    }

    println!();
    Ok(())
}

// ─── Rich output helpers ────────────────────────────────────

fn print_header(title: &str, count: usize) {
    println!();
    println!(
        "  {} {}  {}",
        "◉".cyan(),
        title.bold(),
        format!("{} activities", count).dimmed()
    );
    println!("  {}", "─".repeat(60).dimmed());
}

fn print_activity(record: &ActivityRecord) {
    println!(
        "  {} {}  {}",
        "◉".cyan(),
        record.project_name.bold(),
        format_time(record.timestamp).dimmed()
    );
    println!("  {} {}", "│".dimmed(), record.project_type.label().cyan());
    println!("  {} {}", "│".dimmed(), record.details);
    println!(
        "  {} {}",
        "└".dimmed(),
        format!("{:.1}% confident", record.confidence * 100.0).dimmed()
    );
    println!();
}

fn format_time(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "?".to_string())
}
