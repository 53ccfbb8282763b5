use std::path::PathBuf;

use clap::Args;

use crate::cli::{print_json, OutputFormat};
use crate::convert::stations::{extract_stations, StationSummary};

/// Default station file name expected by hypoDD
pub const DEFAULT_STATION_FILE: &str = "station.dat";

#[derive(Args)]
pub struct StationsArgs {
    /// StationXML inventories, concatenated in the order given
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Station file to write
    #[arg(short, long, default_value = DEFAULT_STATION_FILE)]
    pub output: PathBuf,
}

/// Execute stations subcommand
///
/// # Errors
///
/// Returns an error if an inventory cannot be read, a station has no
/// coordinates, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: StationsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if verbose {
        eprintln!("Reading {} inventory file(s)", args.inputs.len());
    }

    let summary = extract_stations(&args.inputs, &args.output)?;

    match format {
        OutputFormat::Text => print_text_summary(&summary),
        OutputFormat::Json => print_json(&summary)?,
    }

    Ok(())
}

fn print_text_summary(summary: &StationSummary) {
    println!(
        "Wrote {} station(s) to {}",
        summary.stations,
        summary.output.display()
    );
    if summary.duplicates > 0 {
        println!(
            "  {} repeated code pair(s) ignored (first occurrence kept)",
            summary.duplicates
        );
    }
}
