use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mdx_core::{BatchService, MemoryMeasurementStore, SubmitBatchReq};

#[derive(Parser)]
#[command(name = "mdx")]
#[command(about = "Liaison MDX batch tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a batch file and print the rows it would store
    Validate {
        /// Path to a JSON batch ({"AssayName", "CtValues", "ResultValues"})
        file: PathBuf,
        /// Assay name, overriding AssayName in the file
        #[arg(long)]
        assay: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file, assay } => {
            let contents = std::fs::read_to_string(&file)?;
            let mut req: SubmitBatchReq = serde_json::from_str(&contents)?;
            if assay.is_some() {
                req.assay_name = assay;
            }

            // Dry run: the in-memory store numbers rows the way the database would.
            let service = BatchService::new(Arc::new(MemoryMeasurementStore::new()));
            match service.submit(&req).await {
                Ok(rows) => {
                    println!("{} item(s) valid", rows.len());
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("Rejected: {}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
