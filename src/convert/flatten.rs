//! Event catalog to hypoDD phase file (`phase.dat`).
//!
//! Each event with a preferred origin and magnitude becomes one `#` header line
//! followed by its pick lines. Event ids are handed out densely from 1 in
//! catalog order, and every event consumes one, including events skipped for
//! lacking a preferred magnitude, so ids stay aligned with catalog positions.
//!
//! ## Correspondence numbering
//!
//! Older tooling recorded each event in `convIDs.txt` under the id *after* the
//! one written to its header. [`CorrespondenceNumbering::Legacy`] reproduces
//! that for files consumed by existing scripts; the default
//! [`CorrespondenceNumbering::Header`] records the header id, which is what
//! `hypoDD.reloc` lines carry.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogFormat, QuakeMl};
use crate::convert::correspondence::CorrespondenceTable;
use crate::convert::ConvertError;
use crate::core::event::{Event, EventParameters, Magnitude, Origin};
use crate::core::records::{EventRecord, PickRecord, DEFAULT_PICK_WEIGHT};
use crate::core::types::{PublicId, SequenceId};
use crate::utils::output::write_whole_file;

/// Longest station code hypoDD reads from a pick line
pub const MAX_STATION_CODE_LEN: usize = 7;

/// Which id an event is recorded under in the correspondence table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CorrespondenceNumbering {
    /// The id written to the event's `#` header line
    #[default]
    Header,
    /// Header id + 1, as written by older tooling
    Legacy,
}

#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Keep only picks whose evaluation status is `confirmed`
    pub confirmed: bool,
    /// Produce the correspondence table
    pub write_correspondence: bool,
    pub numbering: CorrespondenceNumbering,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            confirmed: true,
            write_correspondence: true,
            numbering: CorrespondenceNumbering::Header,
        }
    }
}

/// One `#` header line and its picks
#[derive(Debug, Clone, PartialEq)]
pub struct EventBlock {
    pub header: EventRecord,
    pub picks: Vec<PickRecord>,
}

/// The flattened catalog, ready to render
#[derive(Debug, Clone, Default)]
pub struct FlatCatalog {
    pub blocks: Vec<EventBlock>,
    pub correspondence: CorrespondenceTable,
    /// Events without a preferred magnitude
    pub skipped_events: usize,
    /// Picks dropped for not being confirmed
    pub unconfirmed_picks: usize,
    /// Picks dropped because an identical line was already written
    pub duplicate_picks: usize,
}

impl FlatCatalog {
    /// Render the phase file
    pub fn render_phases(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            out.push_str(&block.header.to_string());
            out.push('\n');
            for pick in &block.picks {
                out.push_str(&pick.to_string());
                out.push('\n');
            }
        }
        out
    }

    pub fn pick_count(&self) -> usize {
        self.blocks.iter().map(|b| b.picks.len()).sum()
    }
}

/// Running state threaded through the events
struct Accumulator {
    next_id: SequenceId,
    seen_ids: HashSet<PublicId>,
    flat: FlatCatalog,
}

/// Flatten a catalog in event order
///
/// # Errors
///
/// Returns `ConvertError::MissingData` if an event has no preferred origin, its
/// origin has no depth, or a kept pick has no phase hint.
pub fn flatten(catalog: &EventParameters, config: &FlattenConfig) -> Result<FlatCatalog, ConvertError> {
    let start = Accumulator {
        next_id: SequenceId::FIRST,
        seen_ids: HashSet::new(),
        flat: FlatCatalog::default(),
    };

    let done = catalog
        .events
        .iter()
        .try_fold(start, |acc, event| flatten_event(acc, event, config))?;

    Ok(done.flat)
}

fn flatten_event(
    mut acc: Accumulator,
    event: &Event,
    config: &FlattenConfig,
) -> Result<Accumulator, ConvertError> {
    let id = acc.next_id;

    let origin = event.preferred_origin().ok_or_else(|| {
        ConvertError::MissingData(format!("event {} has no preferred origin", event.public_id))
    })?;

    if !acc.seen_ids.insert(event.public_id.clone()) {
        warn!(event = %event.public_id, "event appears more than once in the input catalogs");
    }

    match event.preferred_magnitude() {
        Some(magnitude) => {
            let header = event_record(id, event, origin, magnitude)?;
            let picks = pick_records(event, origin, config, &mut acc.flat)?;
            acc.flat.blocks.push(EventBlock { header, picks });
        }
        None => {
            debug!(event = %event.public_id, %id, "no preferred magnitude, skipping event");
            acc.flat.skipped_events += 1;
        }
    }

    if config.write_correspondence {
        let recorded = match config.numbering {
            CorrespondenceNumbering::Header => id,
            CorrespondenceNumbering::Legacy => id.next(),
        };
        acc.flat
            .correspondence
            .push(recorded, event.public_id.clone());
    }

    acc.next_id = id.next();
    Ok(acc)
}

fn event_record(
    id: SequenceId,
    event: &Event,
    origin: &Origin,
    magnitude: &Magnitude,
) -> Result<EventRecord, ConvertError> {
    let depth = origin.depth.as_ref().ok_or_else(|| {
        ConvertError::MissingData(format!(
            "preferred origin {} of event {} has no depth",
            origin.public_id, event.public_id
        ))
    })?;

    let horizontal_error_km = origin
        .uncertainties
        .first()
        .and_then(|u| u.max_horizontal_uncertainty)
        .map_or(0.0, |m| m / 1000.0);
    let depth_error_km = depth.uncertainty.map_or(0.0, |u| u / 1000.0);
    let rms_residual = origin
        .quality
        .as_ref()
        .and_then(|q| q.standard_error)
        .unwrap_or(0.0);

    Ok(EventRecord {
        sequence_id: id,
        origin_time: origin.time.value,
        latitude: origin.latitude.value,
        longitude: origin.longitude.value,
        depth_km: depth.value / 1000.0,
        magnitude: magnitude.mag.value,
        horizontal_error_km,
        depth_error_km,
        rms_residual,
        native_id: event.public_id.clone(),
    })
}

fn pick_records(
    event: &Event,
    origin: &Origin,
    config: &FlattenConfig,
    flat: &mut FlatCatalog,
) -> Result<Vec<PickRecord>, ConvertError> {
    let mut written: HashSet<String> = HashSet::new();
    let mut picks = Vec::new();

    for pick in &event.picks {
        if config.confirmed && !pick.is_confirmed() {
            flat.unconfirmed_picks += 1;
            continue;
        }

        let phase = pick
            .phase_hint
            .as_deref()
            .and_then(|p| p.trim().chars().next())
            .ok_or_else(|| {
                ConvertError::MissingData(format!("pick {} has no phase hint", pick.public_id))
            })?;

        let station_code = format!(
            "{}{}",
            pick.waveform_id.network_code, pick.waveform_id.station_code
        );
        if station_code.len() > MAX_STATION_CODE_LEN {
            warn!(
                station = %station_code,
                "station code longer than {MAX_STATION_CODE_LEN} characters"
            );
        }

        let record = PickRecord {
            station_code,
            travel_time: seconds_between(origin, &pick.time.value),
            weight: DEFAULT_PICK_WEIGHT,
            phase: phase.to_string(),
        };

        // Identical lines collapse; compare what would be written
        if written.insert(record.to_string()) {
            picks.push(record);
        } else {
            flat.duplicate_picks += 1;
        }
    }

    Ok(picks)
}

/// Signed seconds from the origin time to `time`
#[allow(clippy::cast_precision_loss)]
fn seconds_between(origin: &Origin, time: &chrono::DateTime<chrono::Utc>) -> f64 {
    let delta = *time - origin.time.value;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1e6,
        None => delta.num_seconds() as f64,
    }
}

/// Outcome of a phase extraction run
#[derive(Debug, Clone, Serialize)]
pub struct PhaseSummary {
    pub inputs: usize,
    pub events: usize,
    pub picks: usize,
    pub skipped_events: usize,
    pub unconfirmed_picks: usize,
    pub duplicate_picks: usize,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correspondence: Option<PathBuf>,
}

/// Load one or more QuakeML files and write the phase file and, if enabled,
/// the correspondence table
///
/// # Errors
///
/// Returns `ConvertError::FileNotFound` for a missing input, `ConvertError::Catalog`
/// for an unreadable catalog, any error from [`flatten`], or `ConvertError::Io`
/// if an output cannot be written.
pub fn extract_phases(
    inputs: &[PathBuf],
    output: &Path,
    correspondence_path: &Path,
    config: &FlattenConfig,
) -> Result<PhaseSummary, ConvertError> {
    let catalog = QuakeMl::load_all(inputs)?;
    debug!(events = catalog.events.len(), "loaded event catalog");

    let flat = flatten(&catalog, config)?;
    write_whole_file(output, &flat.render_phases())?;

    let correspondence = if config.write_correspondence {
        write_whole_file(correspondence_path, &flat.correspondence.render())?;
        Some(correspondence_path.to_path_buf())
    } else {
        None
    };

    info!(
        events = flat.blocks.len(),
        picks = flat.pick_count(),
        skipped = flat.skipped_events,
        output = %output.display(),
        "wrote phase file"
    );

    Ok(PhaseSummary {
        inputs: inputs.len(),
        events: flat.blocks.len(),
        picks: flat.pick_count(),
        skipped_events: flat.skipped_events,
        unconfirmed_picks: flat.unconfirmed_picks,
        duplicate_picks: flat.duplicate_picks,
        output: output.to_path_buf(),
        correspondence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::{
        OriginQuality, OriginUncertainty, Pick, RealQuantity, TimeQuantity, WaveformStreamId,
    };
    use crate::core::types::EvaluationStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 5, 3, 12, 30, 15).unwrap() + Duration::milliseconds(250)
    }

    fn origin(id: &str) -> Origin {
        Origin {
            public_id: PublicId::new(id),
            time: TimeQuantity::new(t0()),
            longitude: RealQuantity::new(9.881),
            latitude: RealQuantity::new(46.512),
            depth: Some(RealQuantity::with_uncertainty(5200.0, 1200.0)),
            quality: Some(OriginQuality {
                standard_error: Some(0.15),
            }),
            origin_type: None,
            evaluation_mode: None,
            evaluation_status: None,
            uncertainties: vec![OriginUncertainty {
                max_horizontal_uncertainty: Some(800.0),
                min_horizontal_uncertainty: Some(400.0),
                preferred_description: None,
            }],
        }
    }

    fn pick(id: &str, station: &str, offset_ms: i64, phase: &str, confirmed: bool) -> Pick {
        Pick {
            public_id: PublicId::new(id),
            time: TimeQuantity::new(t0() + Duration::milliseconds(offset_ms)),
            waveform_id: WaveformStreamId::new("CH", station),
            phase_hint: Some(phase.to_string()),
            evaluation_mode: None,
            evaluation_status: confirmed.then_some(EvaluationStatus::Confirmed),
        }
    }

    fn event(n: u32, with_magnitude: bool, picks: Vec<Pick>) -> Event {
        let mut ev = Event::new(PublicId::new(format!("smi:test/event/{n}")));
        ev.push_preferred_origin(origin(&format!("smi:test/origin/{n}")));
        if with_magnitude {
            ev.push_preferred_magnitude(Magnitude {
                public_id: PublicId::new(format!("smi:test/magnitude/{n}")),
                mag: RealQuantity::new(2.31),
                magnitude_type: None,
            });
        }
        ev.picks = picks;
        ev
    }

    fn catalog(events: Vec<Event>) -> EventParameters {
        EventParameters::new(PublicId::new("smi:test/catalog"), events)
    }

    #[test]
    fn test_two_event_scenario() {
        let cat = catalog(vec![
            event(
                1,
                true,
                vec![
                    pick("p1", "DAVOX", 3412, "P", true),
                    pick("p2", "DAVOX", 3412, "P", true),
                ],
            ),
            event(2, false, vec![pick("p3", "ZUR", 1000, "P", true)]),
        ]);

        let flat = flatten(&cat, &FlattenConfig::default()).unwrap();
        assert_eq!(
            flat.render_phases(),
            "# 2019 5 3 12 30 15.25 46.512 9.881 5.2 2.31 0.8 1.2 0.15         1\n\
             CHDAVOX 3.412000 1.00 P\n"
        );
        assert_eq!(flat.duplicate_picks, 1);
        assert_eq!(flat.skipped_events, 1);
        assert_eq!(flat.correspondence.len(), 2);
    }

    #[test]
    fn test_skipped_event_still_consumes_an_id() {
        let cat = catalog(vec![event(1, false, vec![]), event(2, true, vec![])]);
        let flat = flatten(&cat, &FlattenConfig::default()).unwrap();

        assert_eq!(flat.blocks.len(), 1);
        assert_eq!(flat.blocks[0].header.sequence_id, SequenceId(2));
        assert_eq!(
            flat.correspondence.native_id(SequenceId(2)).unwrap().as_str(),
            "smi:test/event/2"
        );
    }

    #[test]
    fn test_legacy_numbering_is_shifted_by_one() {
        let cat = catalog(vec![event(1, true, vec![]), event(2, true, vec![])]);
        let config = FlattenConfig {
            numbering: CorrespondenceNumbering::Legacy,
            ..FlattenConfig::default()
        };
        let flat = flatten(&cat, &config).unwrap();

        assert_eq!(flat.blocks[0].header.sequence_id, SequenceId(1));
        assert_eq!(flat.correspondence.render(), "2;smi:test/event/1\n3;smi:test/event/2\n");
    }

    #[test]
    fn test_confirmed_filter() {
        let picks = vec![
            pick("p1", "DAVOX", 3000, "P", true),
            pick("p2", "ZUR", 4000, "P", false),
            pick("p3", "ZUR", 6500, "Sg", false),
        ];
        let cat = catalog(vec![event(1, true, picks)]);

        let strict = flatten(&cat, &FlattenConfig::default()).unwrap();
        assert_eq!(strict.pick_count(), 1);
        assert_eq!(strict.unconfirmed_picks, 2);

        let all = FlattenConfig {
            confirmed: false,
            ..FlattenConfig::default()
        };
        let loose = flatten(&cat, &all).unwrap();
        assert_eq!(loose.pick_count(), 3);
        // Only the first character of the phase hint is written
        assert_eq!(loose.blocks[0].picks[2].to_string(), "CHZUR   6.500000 1.00 S");
    }

    #[test]
    fn test_missing_preferred_origin_is_fatal() {
        let mut ev = event(1, true, vec![]);
        ev.preferred_origin_id = None;
        let err = flatten(&catalog(vec![ev]), &FlattenConfig::default()).unwrap_err();
        assert!(matches!(err, ConvertError::MissingData(_)));
    }

    #[test]
    fn test_uncertainty_defaults() {
        let mut ev = event(1, true, vec![]);
        let origin = &mut ev.origins[0];
        origin.uncertainties.clear();
        origin.quality = Some(OriginQuality {
            standard_error: None,
        });
        origin.depth = Some(RealQuantity::new(10_000.0));

        let flat = flatten(&catalog(vec![ev]), &FlattenConfig::default()).unwrap();
        let header = &flat.blocks[0].header;
        assert_eq!(header.horizontal_error_km, 0.0);
        assert_eq!(header.depth_error_km, 0.0);
        assert_eq!(header.rms_residual, 0.0);
        assert!(header.to_string().contains(" 10.0 2.31 0.0 0.0 0.0 "));
    }

    #[test]
    fn test_negative_travel_time() {
        let cat = catalog(vec![event(1, true, vec![pick("p1", "DAVOX", -1500, "P", true)])]);
        let flat = flatten(&cat, &FlattenConfig::default()).unwrap();
        assert_eq!(flat.blocks[0].picks[0].to_string(), "CHDAVOX -1.500000 1.00 P");
    }

    #[test]
    fn test_no_correspondence_when_disabled() {
        let cat = catalog(vec![event(1, true, vec![])]);
        let config = FlattenConfig {
            write_correspondence: false,
            ..FlattenConfig::default()
        };
        assert!(flatten(&cat, &config).unwrap().correspondence.is_empty());
    }

    #[test]
    fn test_duplicate_events_across_inputs_are_kept() {
        let cat = catalog(vec![event(1, true, vec![]), event(1, true, vec![])]);
        let flat = flatten(&cat, &FlattenConfig::default()).unwrap();

        assert_eq!(flat.blocks.len(), 2);
        assert_eq!(flat.correspondence.len(), 2);
        // The table resolves the public id to its first occurrence
        assert_eq!(
            flat.correspondence
                .sequence_id(&PublicId::new("smi:test/event/1")),
            Some(SequenceId(1))
        );
    }
}
