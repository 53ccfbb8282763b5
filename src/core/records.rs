//! Flat hypoDD record types and their exact text layouts.
//!
//! Phase file (`phase.dat`):
//!
//! ```text
//! # 2019 5 3 12 30 15.25 46.512 9.881 5.2 2.31 0.8 1.2 0.15         1
//! CHDAVOX 3.412000 1.00 P
//! CHDAVOX 5.880000 1.00 S
//! ```
//!
//! Station file (`station.dat`): `CODE LAT LON` per line.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::core::station::StationRecord;
use crate::core::types::{PublicId, SequenceId};
use crate::utils::numbers::py_float;

/// Weight written for every pick; the catalog carries no pick weights
pub const DEFAULT_PICK_WEIGHT: f64 = 1.0;

/// One `#` header line of the phase file
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub sequence_id: SequenceId,
    pub origin_time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_km: f64,
    pub magnitude: f64,
    pub horizontal_error_km: f64,
    pub depth_error_km: f64,
    pub rms_residual: f64,
    /// Kept out of the flat line; persisted in the correspondence table
    pub native_id: PublicId,
}

impl EventRecord {
    /// Seconds of the minute including the microsecond fraction
    pub fn fractional_second(&self) -> f64 {
        f64::from(self.origin_time.second())
            + f64::from(self.origin_time.timestamp_subsec_micros()) / 1e6
    }
}

impl std::fmt::Display for EventRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let t = &self.origin_time;
        let id = self.sequence_id.to_string();
        write!(
            f,
            "# {} {} {} {} {} {} {} {} {} {:.2} {} {} {} {:>9.9}",
            t.year(),
            t.month(),
            t.day(),
            t.hour(),
            t.minute(),
            py_float(self.fractional_second()),
            py_float(self.latitude),
            py_float(self.longitude),
            py_float(self.depth_km),
            self.magnitude,
            py_float(self.horizontal_error_km),
            py_float(self.depth_error_km),
            py_float(self.rms_residual),
            id,
        )
    }
}

/// One pick line of the phase file
#[derive(Debug, Clone, PartialEq)]
pub struct PickRecord {
    /// Network and station code concatenated
    pub station_code: String,
    /// Seconds after the event origin time
    pub travel_time: f64,
    pub weight: f64,
    pub phase: String,
}

impl std::fmt::Display for PickRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<7} {:.6} {:.2} {}",
            self.station_code, self.travel_time, self.weight, self.phase
        )
    }
}

/// One line of the station file
impl std::fmt::Display for StationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{} {} {}",
            self.network_code,
            self.station_code,
            py_float(self.latitude),
            py_float(self.longitude)
        )
    }
}
