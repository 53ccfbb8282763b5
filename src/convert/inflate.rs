//! hypoDD relocations back to a QuakeML catalog.
//!
//! Two ways to obtain the catalog the relocated origins are attached to:
//!
//! - **Synthesize** from `hypoDD.loc`: one event per starting location, with an
//!   initial origin, a magnitude and optionally picks from the phase list.
//!   Events get synthetic ids (`smi:relocDD/event/E-{id}-{epoch}`) from which
//!   the hypoDD id is recovered when attaching relocations.
//! - **Augment** the catalog that was flattened, mapping hypoDD ids back to
//!   event public ids through the correspondence table.
//!
//! Either way, every `hypoDD.reloc` line becomes a new origin appended to its
//! event and made preferred. Existing origins are never replaced.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::{CatalogFormat, QuakeMl};
use crate::convert::correspondence::CorrespondenceTable;
use crate::convert::{read_input, ConvertError};
use crate::core::event::{
    Event, EventParameters, Magnitude, Origin, OriginQuality, OriginUncertainty, Pick,
    RealQuantity, TimeQuantity, WaveformStreamId,
};
use crate::core::records::PickRecord;
use crate::core::types::{EvaluationMode, EvaluationStatus, PublicId, SequenceId};
use crate::parsing::hypocenter::{parse_hypocenter_text, HypocenterKind, HypocenterRecord};
use crate::parsing::phase::{parse_phase_text, PhaseList};
use crate::utils::numbers::py_float;

/// Files taking part in one inflation run
#[derive(Debug, Clone, Default)]
pub struct InflateInputs {
    /// `hypoDD.reloc`
    pub relocated: PathBuf,
    /// `hypoDD.loc`; synthesize the catalog from it
    pub initial: Option<PathBuf>,
    /// QuakeML catalog the phase file was extracted from
    pub catalog: Option<PathBuf>,
    /// Correspondence table written alongside the phase file
    pub correspondence: Option<PathBuf>,
    /// Phase list to rebuild picks from when synthesizing
    pub phases: Option<PathBuf>,
}

/// Where the target catalog comes from, after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource<'a> {
    Synthesize {
        initial: &'a Path,
        phases: Option<&'a Path>,
    },
    Augment {
        catalog: &'a Path,
        correspondence: &'a Path,
    },
}

impl InflateInputs {
    /// Check which inputs go together. No file is touched.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Configuration` unless exactly one of `initial` and
    /// `catalog` is set, `correspondence` is set exactly when `catalog` is, and
    /// `phases` is only set with `initial`.
    pub fn validate(&self) -> Result<CatalogSource<'_>, ConvertError> {
        let config = |msg: &str| Err(ConvertError::Configuration(msg.to_string()));

        match (&self.initial, &self.catalog, &self.correspondence) {
            (None, None, _) => config("either a starting-location file or an input catalog must be given"),
            (Some(_), Some(_), _) => config("give a starting-location file or an input catalog, not both"),
            (Some(_), None, Some(_)) => {
                config("a correspondence table can only be used together with an input catalog")
            }
            (None, Some(_), None) => config("an input catalog requires its correspondence table"),
            (Some(initial), None, None) => Ok(CatalogSource::Synthesize {
                initial,
                phases: self.phases.as_deref(),
            }),
            (None, Some(catalog), Some(correspondence)) => {
                if self.phases.is_some() {
                    return config("a phase list can only be used with a starting-location file");
                }
                Ok(CatalogSource::Augment {
                    catalog,
                    correspondence,
                })
            }
        }
    }
}

/// Synthetic public ids for objects built from hypoDD records
pub mod synthetic {
    use super::{py_float, DateTime, PublicId, SequenceId, Utc};

    pub const PREFIX: &str = "smi:relocDD";
    const EVENT_PREFIX: &str = "smi:relocDD/event/E-";

    /// Epoch seconds with the microsecond fraction, as embedded in ids
    #[allow(clippy::cast_precision_loss)]
    pub fn epoch(time: &DateTime<Utc>) -> String {
        py_float(time.timestamp() as f64 + f64::from(time.timestamp_subsec_micros()) / 1e6)
    }

    pub fn event_id(id: SequenceId, time: &DateTime<Utc>) -> PublicId {
        PublicId::new(format!("{EVENT_PREFIX}{id}-{}", epoch(time)))
    }

    pub fn origin_id(id: SequenceId, time: &DateTime<Utc>, tag: &str) -> PublicId {
        PublicId::new(format!("{PREFIX}/origin/O-{id}-{}-{tag}", epoch(time)))
    }

    pub fn magnitude_id(id: SequenceId, time: &DateTime<Utc>) -> PublicId {
        PublicId::new(format!("{PREFIX}/magnitude/M-{id}-{}", epoch(time)))
    }

    pub fn pick_id(id: SequenceId, station: &str, n: usize) -> PublicId {
        PublicId::new(format!("{PREFIX}/pick/P-{id}-{station}-{n}"))
    }

    pub fn catalog_id(created_at: &DateTime<Utc>) -> PublicId {
        PublicId::new(format!("{PREFIX}/catalog/C-{}", epoch(created_at)))
    }

    /// The hypoDD id embedded in a synthetic event id
    pub fn sequence_of_event(public_id: &PublicId) -> Option<SequenceId> {
        let rest = public_id.as_str().strip_prefix(EVENT_PREFIX)?;
        let (id, _) = rest.split_once('-')?;
        id.parse().ok()
    }
}

const INITIAL_TAG: &str = "init";
const RELOCATED_TAG: &str = "reloc";

/// Build an origin from a hypocenter record. Depth is converted from km to m;
/// the error columns are already in metres.
pub fn origin_from_record(record: &HypocenterRecord, tag: &str) -> Origin {
    let (ex, ey) = record.horizontal_errors;
    Origin {
        public_id: synthetic::origin_id(record.sequence_id, &record.origin_time, tag),
        time: TimeQuantity::new(record.origin_time),
        longitude: RealQuantity::new(record.longitude),
        latitude: RealQuantity::new(record.latitude),
        depth: Some(RealQuantity::with_uncertainty(
            record.depth_km * 1000.0,
            record.depth_error,
        )),
        quality: record.rms.map(|rms| OriginQuality {
            standard_error: Some(rms),
        }),
        origin_type: Some("hypocenter".to_string()),
        evaluation_mode: Some(EvaluationMode::Automatic),
        evaluation_status: Some(EvaluationStatus::Preliminary),
        uncertainties: vec![OriginUncertainty::horizontal(ex, ey)],
    }
}

/// The new preferred origin for a relocated event
pub fn relocated_origin(record: &HypocenterRecord) -> Origin {
    origin_from_record(record, RELOCATED_TAG)
}

fn pick_from_record(
    id: SequenceId,
    origin_time: DateTime<Utc>,
    record: &PickRecord,
    n: usize,
) -> Result<Pick, ConvertError> {
    // First two characters are the network code
    let split = record
        .station_code
        .char_indices()
        .nth(2)
        .map_or(record.station_code.len(), |(i, _)| i);
    let (network, station) = record.station_code.split_at(split);

    let time = travel_time_offset(record.travel_time)
        .and_then(|offset| origin_time.checked_add_signed(offset))
        .ok_or_else(|| {
            ConvertError::MissingData(format!(
                "travel time {} of {} in event {id} does not give a valid pick time",
                record.travel_time, record.station_code
            ))
        })?;

    Ok(Pick {
        public_id: synthetic::pick_id(id, &record.station_code, n),
        time: TimeQuantity::new(time),
        waveform_id: WaveformStreamId::new(network, station),
        phase_hint: Some(record.phase.clone()),
        evaluation_mode: None,
        evaluation_status: None,
    })
}

/// Travel time in seconds as a whole-microsecond offset
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn travel_time_offset(seconds: f64) -> Option<Duration> {
    let micros = (seconds * 1e6).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::microseconds(micros as i64))
}

/// One event for a starting location, with its initial origin and magnitude
/// preferred and picks from the phase list, if any
///
/// # Errors
///
/// Returns `ConvertError::MissingData` if a travel time puts a pick outside
/// the representable time range.
pub fn synthesize_event(
    record: &HypocenterRecord,
    phases: Option<&PhaseList>,
) -> Result<Event, ConvertError> {
    let id = record.sequence_id;
    let time = record.origin_time;

    let mut event = Event::new(synthetic::event_id(id, &time));
    event.event_type = Some("earthquake".to_string());
    event.type_certainty = Some("known".to_string());

    if let Some(phases) = phases {
        event.picks = phases
            .picks_for(id)
            .enumerate()
            .map(|(n, pick)| pick_from_record(id, time, pick, n))
            .collect::<Result<_, _>>()?;
    }

    event.push_preferred_origin(origin_from_record(record, INITIAL_TAG));
    event.push_preferred_magnitude(Magnitude {
        public_id: synthetic::magnitude_id(id, &time),
        mag: RealQuantity::new(record.magnitude),
        magnitude_type: None,
    });
    Ok(event)
}

/// A fresh catalog with one event per starting location
///
/// # Errors
///
/// See [`synthesize_event`].
pub fn synthesize_catalog(
    initial: &[HypocenterRecord],
    phases: Option<&PhaseList>,
    created_at: DateTime<Utc>,
) -> Result<EventParameters, ConvertError> {
    let events = initial
        .iter()
        .map(|r| synthesize_event(r, phases))
        .collect::<Result<_, _>>()?;
    Ok(EventParameters::new(synthetic::catalog_id(&created_at), events))
}

/// Maps hypoDD ids to positions in a catalog's event list
#[derive(Debug, Clone)]
pub enum EventResolver {
    /// Ids recovered from synthetic event ids
    Synthetic(HashMap<SequenceId, Vec<usize>>),
    /// Ids mapped through the correspondence table to event public ids
    Correspondence {
        table: CorrespondenceTable,
        events: HashMap<PublicId, Vec<usize>>,
    },
}

impl EventResolver {
    pub fn synthetic(catalog: &EventParameters) -> Self {
        let mut index: HashMap<SequenceId, Vec<usize>> = HashMap::new();
        for (idx, event) in catalog.events.iter().enumerate() {
            if let Some(id) = synthetic::sequence_of_event(&event.public_id) {
                index.entry(id).or_default().push(idx);
            }
        }
        Self::Synthetic(index)
    }

    pub fn correspondence(catalog: &EventParameters, table: CorrespondenceTable) -> Self {
        let mut events: HashMap<PublicId, Vec<usize>> = HashMap::new();
        for (idx, event) in catalog.events.iter().enumerate() {
            events.entry(event.public_id.clone()).or_default().push(idx);
        }
        Self::Correspondence { table, events }
    }

    /// Position of the single event for a hypoDD id
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Lookup` if the id is unknown, resolves to no
    /// event, or resolves to more than one.
    pub fn resolve(&self, id: SequenceId) -> Result<usize, ConvertError> {
        let (matches, target) = match self {
            Self::Synthetic(index) => (index.get(&id), format!("synthetic event id {id}")),
            Self::Correspondence { table, events } => {
                let native = table.resolve(id)?;
                (events.get(native), format!("event {native} (id {id})"))
            }
        };

        match matches.map(Vec::as_slice) {
            Some([idx]) => Ok(*idx),
            None | Some([]) => Err(ConvertError::Lookup(format!(
                "{target} matches no event in the catalog"
            ))),
            Some(many) => Err(ConvertError::Lookup(format!(
                "{target} matches {} events in the catalog",
                many.len()
            ))),
        }
    }
}

/// Append each relocated origin to its event and make it preferred.
/// Returns the number of origins attached.
///
/// # Errors
///
/// Returns `ConvertError::Lookup` if a record cannot be resolved to exactly one
/// event. The catalog may be partially updated when this happens.
pub fn apply_relocations(
    catalog: &mut EventParameters,
    relocated: &[HypocenterRecord],
    resolver: &EventResolver,
) -> Result<usize, ConvertError> {
    for record in relocated {
        let idx = resolver.resolve(record.sequence_id)?;
        let event = &mut catalog.events[idx];
        debug!(event = %event.public_id, id = %record.sequence_id, "attaching relocated origin");
        event.push_preferred_origin(relocated_origin(record));
    }
    Ok(relocated.len())
}

/// A relocated catalog and the number of origins attached to it
#[derive(Debug, Clone)]
pub struct Inflation {
    pub catalog: EventParameters,
    pub relocated: usize,
}

/// Build the relocated catalog in memory
///
/// `created_at` only feeds the synthetic catalog id when synthesizing.
///
/// # Errors
///
/// Returns `ConvertError::Configuration` for an invalid input combination
/// (before any file is read), `ConvertError::FileNotFound` for a missing file,
/// `ConvertError::Parse` for malformed flat input, `ConvertError::Catalog` for an
/// unreadable catalog, `ConvertError::Lookup` for an unresolvable id, or
/// `ConvertError::MissingData` for a pick time out of range.
pub fn inflate(inputs: &InflateInputs, created_at: DateTime<Utc>) -> Result<Inflation, ConvertError> {
    let source = inputs.validate()?;

    let relocated = parse_hypocenter_text(&read_input(&inputs.relocated)?, HypocenterKind::Relocated)?;
    debug!(records = relocated.len(), "read relocated hypocenters");

    let (mut catalog, resolver) = match source {
        CatalogSource::Synthesize { initial, phases } => {
            let initial = parse_hypocenter_text(&read_input(initial)?, HypocenterKind::Initial)?;
            let phases = phases
                .map(|path| read_input(path).and_then(|text| Ok(parse_phase_text(&text)?)))
                .transpose()?;

            let catalog = synthesize_catalog(&initial, phases.as_ref(), created_at)?;
            let resolver = EventResolver::synthetic(&catalog);
            (catalog, resolver)
        }
        CatalogSource::Augment {
            catalog,
            correspondence,
        } => {
            let catalog = QuakeMl::load(catalog)?;
            let table = CorrespondenceTable::load(correspondence)?;
            let resolver = EventResolver::correspondence(&catalog, table);
            (catalog, resolver)
        }
    };

    let relocated = apply_relocations(&mut catalog, &relocated, &resolver)?;
    Ok(Inflation { catalog, relocated })
}

/// Outcome of a relocation run
#[derive(Debug, Clone, Serialize)]
pub struct RelocationSummary {
    pub mode: &'static str,
    pub events: usize,
    pub relocated: usize,
    pub output: PathBuf,
}

/// Build the relocated catalog and write it as QuakeML
///
/// # Errors
///
/// See [`inflate`]; additionally `ConvertError::Catalog` if the output cannot
/// be written.
pub fn relocate_to_quakeml(
    inputs: &InflateInputs,
    output: &Path,
    created_at: DateTime<Utc>,
) -> Result<RelocationSummary, ConvertError> {
    let mode = match inputs.validate()? {
        CatalogSource::Synthesize { .. } => "synthesize",
        CatalogSource::Augment { .. } => "augment",
    };

    let Inflation { catalog, relocated } = inflate(inputs, created_at)?;
    QuakeMl::dump(&catalog, output)?;

    info!(
        events = catalog.events.len(),
        relocated,
        output = %output.display(),
        "wrote relocated catalog"
    );

    Ok(RelocationSummary {
        mode,
        events: catalog.events.len(),
        relocated,
        output: output.to_path_buf(),
    })
}
