//! Command-line interface for relocdd.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **stations**: Write a hypoDD station file from StationXML inventories
//! - **phases**: Write a hypoDD phase file and correspondence table from QuakeML
//! - **reloc**: Turn hypoDD relocations back into a QuakeML catalog
//!
//! ## Usage
//!
//! ```text
//! # Station and phase inputs for hypoDD
//! relocdd stations inventory.xml -o station.dat
//! relocdd phases catalog.xml -o phase.dat
//!
//! # Relocated origins on top of the input catalog
//! relocdd reloc hypoDD.reloc --catalog catalog.xml --conv-ids convIDs.txt -o relocated.xml
//!
//! # Relocated catalog from the starting locations alone
//! relocdd reloc hypoDD.reloc --initial hypoDD.loc --phases phase.dat -o relocated.xml
//!
//! # JSON run summary for scripting
//! relocdd --format json phases catalog.xml
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;

pub mod phases;
pub mod reloc;
pub mod stations;

#[derive(Parser)]
#[command(name = "relocdd")]
#[command(version)]
#[command(about = "Convert seismic catalogs to and from hypoDD flat files")]
#[command(
    long_about = "relocdd prepares the station and phase inputs of the hypoDD double-difference relocation program from StationXML and QuakeML, and turns hypoDD's relocated hypocenters back into QuakeML.\n\nRelocated origins are appended to their events and become preferred; earlier origins are kept."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run summary format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a hypoDD station file from StationXML
    Stations(stations::StationsArgs),

    /// Write a hypoDD phase file from QuakeML
    Phases(phases::PhasesArgs),

    /// Write a QuakeML catalog with hypoDD relocations
    Reloc(reloc::RelocArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print a run summary as pretty JSON
pub(crate) fn print_json<T: Serialize>(summary: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
