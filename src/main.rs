use clap::Parser;
use crimes_processor::CrimesError;
use crimes_processor::cli::{Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(command) => result,
            _ = shutdown_signal() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(CrimesError::processing_interrupted("Processing interrupted by user").into())
            }
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

/// Resolves on CTRL+C; never resolves when the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Warning: failed to install CTRL+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Crimes Processor - French crime statistics reshaper");
    println!("===================================================");
    println!();
    println!("Turn PN/GN release workbooks with stacked headers into one long table:");
    println!("annee, service, departement, perimetre, csp, code_index, libelle_index, nombre_faits.");
    println!();
    println!("USAGE:");
    println!("    crimes-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Reshape input files and write a combined CSV or Parquet file");
    println!("    inspect     Show how each sheet of a file would be handled");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Process every release under a directory:");
    println!("    crimes-processor process data/releases -o crimes_clean_2012_2021.csv");
    println!();
    println!("    # Write Parquet with zstd compression:");
    println!("    crimes-processor process data/releases -o crimes.parquet --compression zstd");
    println!();
    println!("    # Check which sheets of a workbook would be kept:");
    println!("    crimes-processor inspect crimes-2015.xlsx");
    println!();
    println!("For detailed help on any command, use:");
    println!("    crimes-processor <COMMAND> --help");
}
