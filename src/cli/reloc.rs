use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use crate::cli::{print_json, OutputFormat};
use crate::convert::inflate::{relocate_to_quakeml, InflateInputs, RelocationSummary};

#[derive(Args)]
pub struct RelocArgs {
    /// hypoDD relocated hypocenters (hypoDD.reloc)
    #[arg(required = true)]
    pub relocated: PathBuf,

    /// QuakeML catalog to write
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// hypoDD starting locations (hypoDD.loc); builds a new catalog from them
    #[arg(long)]
    pub initial: Option<PathBuf>,

    /// QuakeML catalog the phase file was extracted from
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Correspondence table written with the phase file (use with --catalog)
    #[arg(long)]
    pub conv_ids: Option<PathBuf>,

    /// Phase file to rebuild picks from (use with --initial)
    #[arg(long)]
    pub phases: Option<PathBuf>,
}

impl RelocArgs {
    fn into_parts(self) -> (InflateInputs, PathBuf) {
        let inputs = InflateInputs {
            relocated: self.relocated,
            initial: self.initial,
            catalog: self.catalog,
            correspondence: self.conv_ids,
            phases: self.phases,
        };
        (inputs, self.output)
    }
}

/// Execute reloc subcommand
///
/// # Errors
///
/// Returns an error for an invalid input combination, an unreadable input, a
/// relocated id that matches no single event, or an unwritable output.
pub fn run(args: RelocArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let (inputs, output) = args.into_parts();

    if verbose {
        let source = if inputs.catalog.is_some() {
            "input catalog"
        } else {
            "starting locations"
        };
        eprintln!("Attaching relocations to events from the {source}");
    }

    let summary = relocate_to_quakeml(&inputs, &output, Utc::now())?;

    match format {
        OutputFormat::Text => print_text_summary(&summary),
        OutputFormat::Json => print_json(&summary)?,
    }

    Ok(())
}

fn print_text_summary(summary: &RelocationSummary) {
    println!(
        "Wrote {} event(s), {} relocated, to {}",
        summary.events,
        summary.relocated,
        summary.output.display()
    );
}
