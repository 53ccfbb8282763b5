use std::path::PathBuf;

use clap::Args;

use crate::cli::{print_json, OutputFormat};
use crate::convert::correspondence::DEFAULT_CORRESPONDENCE_FILE;
use crate::convert::flatten::{extract_phases, CorrespondenceNumbering, FlattenConfig, PhaseSummary};

/// Default phase file name expected by hypoDD
pub const DEFAULT_PHASE_FILE: &str = "phase.dat";

#[derive(Args)]
pub struct PhasesArgs {
    /// QuakeML catalogs, concatenated in the order given
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Phase file to write
    #[arg(short, long, default_value = DEFAULT_PHASE_FILE)]
    pub output: PathBuf,

    /// Keep picks of any evaluation status, not only confirmed ones
    #[arg(long)]
    pub all_picks: bool,

    /// Do not write the correspondence table
    #[arg(long)]
    pub no_conv_ids: bool,

    /// Correspondence table to write
    #[arg(long, default_value = DEFAULT_CORRESPONDENCE_FILE, conflicts_with = "no_conv_ids")]
    pub conv_ids: PathBuf,

    /// Record header id + 1 in the correspondence table, as older tooling did
    #[arg(long)]
    pub legacy_ids: bool,
}

impl PhasesArgs {
    fn config(&self) -> FlattenConfig {
        FlattenConfig {
            confirmed: !self.all_picks,
            write_correspondence: !self.no_conv_ids,
            numbering: if self.legacy_ids {
                CorrespondenceNumbering::Legacy
            } else {
                CorrespondenceNumbering::Header
            },
        }
    }
}

/// Execute phases subcommand
///
/// # Errors
///
/// Returns an error if a catalog cannot be read, an event lacks required data,
/// or an output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PhasesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config();

    if verbose {
        eprintln!(
            "Reading {} catalog file(s), {} picks",
            args.inputs.len(),
            if config.confirmed { "confirmed" } else { "all" }
        );
    }

    let summary = extract_phases(&args.inputs, &args.output, &args.conv_ids, &config)?;

    match format {
        OutputFormat::Text => print_text_summary(&summary),
        OutputFormat::Json => print_json(&summary)?,
    }

    Ok(())
}

fn print_text_summary(summary: &PhaseSummary) {
    println!(
        "Wrote {} event(s) with {} pick(s) to {}",
        summary.events,
        summary.picks,
        summary.output.display()
    );
    if summary.skipped_events > 0 {
        println!(
            "  {} event(s) without a preferred magnitude skipped",
            summary.skipped_events
        );
    }
    if summary.unconfirmed_picks > 0 {
        println!("  {} unconfirmed pick(s) dropped", summary.unconfirmed_picks);
    }
    if summary.duplicate_picks > 0 {
        println!("  {} duplicate pick line(s) dropped", summary.duplicate_picks);
    }
    if let Some(path) = &summary.correspondence {
        println!("Wrote correspondence table to {}", path.display());
    }
}
