//! Catalog file I/O.
//!
//! The conversions never touch XML directly. They work on the object graphs in
//! [`crate::core`] and reach files only through [`CatalogFormat`], which has one
//! implementation per document type:
//!
//! - [`QuakeMl`]: QuakeML 1.2 event catalogs, loaded as
//!   [`EventParameters`](crate::core::event::EventParameters)
//! - [`StationXml`]: FDSN StationXML inventories, loaded as
//!   [`Inventory`](crate::core::station::Inventory)
//!
//! ## Multiple inputs
//!
//! [`CatalogFormat::load_all`] concatenates several files into the first one's
//! document, preserving order. No deduplication happens at this level.
//!
//! ```rust,no_run
//! use relocdd::catalog::{CatalogFormat, QuakeMl};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("2019.xml"), PathBuf::from("2020.xml")];
//! let catalog = QuakeMl::load_all(&paths).unwrap();
//! println!("{} events", catalog.events.len());
//! QuakeMl::dump(&catalog, std::path::Path::new("merged.xml")).unwrap();
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::utils::output::write_whole_file;

pub mod quakeml;
pub mod stationxml;

pub use quakeml::QuakeMl;
pub use stationxml::StationXml;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse {format} document: {message}")]
    ParseError {
        format: &'static str,
        message: String,
    },

    #[error("Failed to write {format} document: {message}")]
    WriteError {
        format: &'static str,
        message: String,
    },

    #[error("No catalog files given")]
    NoInput,
}

/// A catalog document type that can be loaded from and dumped to a file
pub trait CatalogFormat {
    /// In-memory object graph of one document
    type Document;

    /// Human-readable format name used in errors and logs
    const NAME: &'static str;

    /// Parse a document from its XML text
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if the text is not a valid document.
    fn from_xml(text: &str) -> Result<Self::Document, CatalogError>;

    /// Render a document to XML text
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::WriteError` if serialization fails.
    fn to_xml(document: &Self::Document) -> Result<String, CatalogError>;

    /// Append the contents of `other` to `into`
    fn merge(into: &mut Self::Document, other: Self::Document);

    /// Load one document from a file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the file does not exist,
    /// `CatalogError::ReadError` for other I/O failures, or
    /// `CatalogError::ParseError` if the content is invalid.
    fn load(path: &Path) -> Result<Self::Document, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CatalogError::NotFound(path.to_path_buf()),
            _ => CatalogError::ReadError(e),
        })?;
        debug!(path = %path.display(), format = Self::NAME, "loading catalog");
        Self::from_xml(&text)
    }

    /// Load several files and concatenate them, in order, into the first
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoInput` for an empty path list, or any error
    /// from [`CatalogFormat::load`].
    fn load_all(paths: &[PathBuf]) -> Result<Self::Document, CatalogError> {
        let (first, rest) = paths.split_first().ok_or(CatalogError::NoInput)?;
        let mut document = Self::load(first)?;
        for path in rest {
            Self::merge(&mut document, Self::load(path)?);
        }
        Ok(document)
    }

    /// Write a document to a file, replacing it
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::WriteError` if serialization fails or
    /// `CatalogError::ReadError` if the file cannot be written.
    fn dump(document: &Self::Document, path: &Path) -> Result<(), CatalogError> {
        let xml = Self::to_xml(document)?;
        write_whole_file(path, &xml)?;
        Ok(())
    }
}

/// Serialize `value` as an indented XML document under `root`
pub(crate) fn render_xml<T: serde::Serialize>(
    format: &'static str,
    root: &str,
    value: &T,
) -> Result<String, CatalogError> {
    let write_error = |e: &dyn std::fmt::Display| CatalogError::WriteError {
        format,
        message: e.to_string(),
    };

    let mut body = String::new();
    let mut serializer =
        quick_xml::se::Serializer::with_root(&mut body, Some(root)).map_err(|e| write_error(&e))?;
    serializer.indent(' ', 2);
    value.serialize(serializer).map_err(|e| write_error(&e))?;

    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}\n"))
}

/// Deserialize an XML document
pub(crate) fn parse_xml<T: serde::de::DeserializeOwned>(
    format: &'static str,
    text: &str,
) -> Result<T, CatalogError> {
    quick_xml::de::from_str(text).map_err(|e| CatalogError::ParseError {
        format,
        message: e.to_string(),
    })
}
