//! Conversions between catalogs and hypoDD flat files.
//!
//! - [`stations`]: StationXML inventory to `station.dat`
//! - [`flatten`]: QuakeML events and picks to `phase.dat` plus the
//!   correspondence table
//! - [`correspondence`]: the persisted sequence id to public id map
//! - [`inflate`]: `hypoDD.reloc` back to QuakeML, either on top of the input
//!   catalog or from the starting locations alone
//!
//! ## Errors
//!
//! All conversions fail fast with a [`ConvertError`]. The only condition that is
//! skipped instead of raised is an event without a preferred magnitude while
//! flattening.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::parsing::ParseError;

pub mod correspondence;
pub mod flatten;
pub mod inflate;
pub mod stations;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Catalog(CatalogError),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CatalogError> for ConvertError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(path) => Self::FileNotFound(path),
            other => Self::Catalog(other),
        }
    }
}

/// Read a flat input file, reporting a missing file by path
pub(crate) fn read_input(path: &Path) -> Result<String, ConvertError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConvertError::FileNotFound(path.to_path_buf()),
        _ => ConvertError::Io(e),
    })
}
