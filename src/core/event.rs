//! Event catalog object graph.
//!
//! The types mirror the subset of QuakeML 1.2 `BED` that the conversions
//! touch. Field renames map them onto QuakeML element and attribute names so
//! the same graph is what [`crate::catalog::quakeml`] loads and dumps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{EvaluationMode, EvaluationStatus, PublicId};

/// The `eventParameters` container: an ordered list of events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParameters {
    #[serde(rename = "@publicID")]
    pub public_id: PublicId,

    #[serde(rename = "event", default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

impl EventParameters {
    pub fn new(public_id: PublicId, events: Vec<Event>) -> Self {
        Self { public_id, events }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "@publicID")]
    pub public_id: PublicId,

    #[serde(
        rename = "preferredOriginID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_origin_id: Option<PublicId>,

    #[serde(
        rename = "preferredMagnitudeID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_magnitude_id: Option<PublicId>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    #[serde(
        rename = "typeCertainty",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub type_certainty: Option<String>,

    #[serde(rename = "origin", default, skip_serializing_if = "Vec::is_empty")]
    pub origins: Vec<Origin>,

    #[serde(rename = "magnitude", default, skip_serializing_if = "Vec::is_empty")]
    pub magnitudes: Vec<Magnitude>,

    #[serde(rename = "pick", default, skip_serializing_if = "Vec::is_empty")]
    pub picks: Vec<Pick>,
}

impl Event {
    pub fn new(public_id: PublicId) -> Self {
        Self {
            public_id,
            preferred_origin_id: None,
            preferred_magnitude_id: None,
            event_type: None,
            type_certainty: None,
            origins: Vec::new(),
            magnitudes: Vec::new(),
            picks: Vec::new(),
        }
    }

    /// The origin referenced by `preferredOriginID`, if it is set and resolves
    pub fn preferred_origin(&self) -> Option<&Origin> {
        let id = self.preferred_origin_id.as_ref()?;
        self.origins.iter().find(|o| &o.public_id == id)
    }

    /// The magnitude referenced by `preferredMagnitudeID`, if it is set and resolves
    pub fn preferred_magnitude(&self) -> Option<&Magnitude> {
        let id = self.preferred_magnitude_id.as_ref()?;
        self.magnitudes.iter().find(|m| &m.public_id == id)
    }

    /// Append an origin and make it the preferred one. Earlier origins are kept.
    pub fn push_preferred_origin(&mut self, origin: Origin) {
        self.preferred_origin_id = Some(origin.public_id.clone());
        self.origins.push(origin);
    }

    /// Append a magnitude and make it the preferred one
    pub fn push_preferred_magnitude(&mut self, magnitude: Magnitude) {
        self.preferred_magnitude_id = Some(magnitude.public_id.clone());
        self.magnitudes.push(magnitude);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(rename = "@publicID")]
    pub public_id: PublicId,

    pub time: TimeQuantity,

    pub longitude: RealQuantity,

    pub latitude: RealQuantity,

    /// Depth in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<RealQuantity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<OriginQuality>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub origin_type: Option<String>,

    #[serde(
        rename = "evaluationMode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub evaluation_mode: Option<EvaluationMode>,

    #[serde(
        rename = "evaluationStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub evaluation_status: Option<EvaluationStatus>,

    #[serde(
        rename = "originUncertainty",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub uncertainties: Vec<OriginUncertainty>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OriginQuality {
    #[serde(
        rename = "standardError",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub standard_error: Option<f64>,
}

/// Horizontal location uncertainty; lengths in metres
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OriginUncertainty {
    #[serde(
        rename = "minHorizontalUncertainty",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_horizontal_uncertainty: Option<f64>,

    #[serde(
        rename = "maxHorizontalUncertainty",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_horizontal_uncertainty: Option<f64>,

    #[serde(
        rename = "preferredDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_description: Option<String>,
}

impl OriginUncertainty {
    /// Build from a pair of axis errors; the larger becomes the max.
    pub fn horizontal(a: f64, b: f64) -> Self {
        Self {
            min_horizontal_uncertainty: Some(a.min(b)),
            max_horizontal_uncertainty: Some(a.max(b)),
            preferred_description: Some("horizontal uncertainty".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Magnitude {
    #[serde(rename = "@publicID")]
    pub public_id: PublicId,

    pub mag: RealQuantity,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub magnitude_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    #[serde(rename = "@publicID")]
    pub public_id: PublicId,

    pub time: TimeQuantity,

    #[serde(rename = "waveformID")]
    pub waveform_id: WaveformStreamId,

    #[serde(rename = "phaseHint", default, skip_serializing_if = "Option::is_none")]
    pub phase_hint: Option<String>,

    #[serde(
        rename = "evaluationMode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub evaluation_mode: Option<EvaluationMode>,

    #[serde(
        rename = "evaluationStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub evaluation_status: Option<EvaluationStatus>,
}

impl Pick {
    pub fn is_confirmed(&self) -> bool {
        self.evaluation_status == Some(EvaluationStatus::Confirmed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformStreamId {
    #[serde(rename = "@networkCode")]
    pub network_code: String,

    #[serde(rename = "@stationCode")]
    pub station_code: String,

    #[serde(
        rename = "@locationCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub location_code: Option<String>,

    #[serde(
        rename = "@channelCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_code: Option<String>,
}

impl WaveformStreamId {
    pub fn new(network_code: impl Into<String>, station_code: impl Into<String>) -> Self {
        Self {
            network_code: network_code.into(),
            station_code: station_code.into(),
            location_code: None,
            channel_code: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealQuantity {
    pub value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
}

impl RealQuantity {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            uncertainty: None,
        }
    }

    pub fn with_uncertainty(value: f64, uncertainty: f64) -> Self {
        Self {
            value,
            uncertainty: Some(uncertainty),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeQuantity {
    #[serde(with = "quakeml_time")]
    pub value: DateTime<Utc>,
}

impl TimeQuantity {
    pub fn new(value: DateTime<Utc>) -> Self {
        Self { value }
    }
}

/// QuakeML `dateTime` values. Written with microseconds and a `Z` suffix;
/// read with or without a UTC designator.
mod quakeml_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(WRITE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid QuakeML dateTime '{raw}': {e}"))
    }
}
