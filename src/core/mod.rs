//! Core data types for catalog conversion.
//!
//! - [`event`]: the event catalog graph (events, origins, magnitudes, picks)
//! - [`station`]: the station inventory graph and [`StationRecord`](station::StationRecord)
//! - [`records`]: flat hypoDD records and their text layouts
//! - [`types`]: identifiers and evaluation enums shared by both worlds
//!
//! ## Identifiers
//!
//! Catalogs identify events by opaque public IDs ([`PublicId`](types::PublicId)).
//! hypoDD only understands small integers ([`SequenceId`](types::SequenceId)),
//! assigned densely from 1 while flattening.

pub mod event;
pub mod records;
pub mod station;
pub mod types;
