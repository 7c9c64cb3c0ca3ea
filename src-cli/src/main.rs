use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use capture::ChartBoard;
use charts::mount_evaluation_charts;
use clap::{Parser, Subcommand};
use export::naming::chart_archive_name;
use export::{DirectorySink, ExportEngine, ExportEvent, SettingsManager};
use report_model::{JsonDirectoryProvider, ReportProvider};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gymdesk-export")]
#[command(about = "Export evaluation reports, charts and cash ledgers", long_about = None)]
struct Cli {
    /// Directory holding report_<id>.json and ledger_<date>.json snapshots
    #[arg(long, default_value = ".")]
    data: PathBuf,
    /// Output directory; also where export-settings.json is read from
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one evaluation report
    Report {
        evaluation_id: String,
        #[arg(long)]
        pdf: bool,
        #[arg(long)]
        xlsx: bool,
        /// Chart PNGs bundled in a ZIP archive
        #[arg(long)]
        charts: bool,
    },
    /// Export the cash ledger of one day
    Ledger {
        /// ISO date, e.g. 2024-03-05
        date: String,
        #[arg(long)]
        csv: bool,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut settings_manager = SettingsManager::new(cli.out.clone().unwrap_or_else(|| PathBuf::from(".")));
    let settings = settings_manager
        .load_sync()
        .context("failed to read export settings")?
        .clone();
    let out_dir = cli
        .out
        .clone()
        .or_else(|| settings.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let provider = JsonDirectoryProvider::new(&cli.data);
    let engine = ExportEngine::new(settings, Arc::new(DirectorySink::new(&out_dir)));
    engine.notifier().subscribe(|event: &ExportEvent| match event {
        ExportEvent::Completed { file_name, .. } => println!("Saved {file_name}"),
        ExportEvent::Failed { kind, message } => eprintln!("Could not export {}: {message}", kind.label()),
        ExportEvent::ChartUnavailable { slot, reason } => {
            eprintln!("Chart '{}' left out: {reason}", slot.title())
        }
    });

    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Report {
            evaluation_id,
            pdf,
            xlsx,
            charts,
        } => {
            let report = provider
                .report(&evaluation_id)
                .with_context(|| format!("failed to load evaluation {evaluation_id}"))?;
            // no format flag means every format
            let all = !(pdf || xlsx || charts);

            if pdf || all {
                let mut board = ChartBoard::new();
                mount_evaluation_charts(&mut board, &report.evaluation);
                engine.export_report_document(&report, &board, today).await?;
            }
            if xlsx || all {
                engine.export_report_workbook(&report, today)?;
            }
            if charts || all {
                let files = engine.evaluation_chart_files(&report)?;
                let name = chart_archive_name(&report.student.name, today);
                let outcome = engine.export_charts_archive(&files, Some(&name))?;
                if outcome.fell_back {
                    println!("Archive unavailable; saved {} charts individually", outcome.deliveries.len());
                }
            }
        }
        Commands::Ledger { date, csv, json } => {
            let ledger = provider
                .ledger(&date)
                .with_context(|| format!("failed to load ledger for {date}"))?;
            let all = !(csv || json);

            if csv || all {
                engine.export_ledger_csv(&ledger)?;
            }
            if json || all {
                engine.export_ledger_json(&ledger)?;
            }
        }
    }

    tracing::info!("Exports written to {}", out_dir.display());
    Ok(())
}
