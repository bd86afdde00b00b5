mod batch;
mod parser;
mod pdf;
mod report;

use anyhow::{Context, Result};
use batch::{DEFAULT_VALUE_LABELS, process_folder};
use clap::Parser;
use report::save_reports;
use std::env;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Extracts the gross amount and invoice date from every PDF in a folder and
/// writes them to invoice_data.xlsx and invoice_data.csv in that folder.
#[derive(Parser)]
#[command(name = "invoice_extract")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Folder with the invoice PDFs (defaults to the folder of this executable)
    folder: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Folder the running executable lives in.
fn executable_dir() -> Result<PathBuf> {
    let exe = env::current_exe().context("failed to locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("executable has no parent directory")
}

fn run(folder: &Path) -> Result<()> {
    match process_folder(folder, &DEFAULT_VALUE_LABELS)? {
        Some(records) => {
            let (excel, csv) = save_reports(&records, folder)?;
            println!("Excel file created: {}", excel.display());
            println!("CSV file created: {}", csv.display());
        }
        None => println!("No data found to process."),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let folder = match cli.folder {
        Some(folder) => folder,
        None => executable_dir()?,
    };
    run(&folder)
}
