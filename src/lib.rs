//! # relocdd
//!
//! A library for moving seismic catalogs in and out of the flat text formats of
//! the hypoDD double-difference relocation program.
//!
//! hypoDD reads a station list and a phase list and writes its starting and
//! relocated hypocenters as whitespace-separated text. Seismic networks keep the
//! same information as QuakeML events and FDSN StationXML inventories, keyed by
//! URI-like public ids that hypoDD cannot carry.
//!
//! `relocdd` bridges the two:
//!
//! - **Stations**: one `CODE LAT LON` line per network/station pair
//! - **Phases**: one `#` header per event followed by its picks, with integer
//!   event ids and a persisted table mapping them back to public ids
//! - **Relocations**: relocated hypocenters become new preferred origins of
//!   their events, either in the catalog the phases came from or in a catalog
//!   synthesized from the starting locations
//!
//! ## Example
//!
//! ```rust,no_run
//! use relocdd::catalog::{CatalogFormat, QuakeMl};
//! use relocdd::convert::flatten::{flatten, FlattenConfig};
//!
//! let catalog = QuakeMl::load("catalog.xml".as_ref()).unwrap();
//! let flat = flatten(&catalog, &FlattenConfig::default()).unwrap();
//!
//! print!("{}", flat.render_phases());
//! print!("{}", flat.correspondence.render());
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: QuakeML and StationXML document I/O
//! - [`core`]: Catalog object graph, station inventory and flat record types
//! - [`parsing`]: Parsers for hypoDD hypocenter and phase files
//! - [`convert`]: Station, phase and relocation conversions
//! - [`cli`]: Command-line interface implementation
//! - [`utils`]: Number formatting and file output helpers

pub mod catalog;
pub mod cli;
pub mod convert;
pub mod core;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::{CatalogError, CatalogFormat, QuakeMl, StationXml};
pub use convert::ConvertError;
pub use core::event::{Event, EventParameters};
pub use core::station::Inventory;
pub use core::types::*;
pub use parsing::ParseError;
