//! QuakeML 1.2 event catalogs.

use serde::{Deserialize, Serialize};

use super::{parse_xml, render_xml, CatalogError, CatalogFormat};
use crate::core::event::EventParameters;

pub const QUAKEML_NAMESPACE: &str = "http://quakeml.org/xmlns/quakeml/1.2";
pub const BED_NAMESPACE: &str = "http://quakeml.org/xmlns/bed/1.2";

/// QuakeML catalog format; documents are [`EventParameters`]
pub struct QuakeMl;

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "eventParameters")]
    event_parameters: EventParameters,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    #[serde(rename = "@xmlns:q")]
    xmlns_q: &'static str,
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "eventParameters")]
    event_parameters: &'a EventParameters,
}

impl CatalogFormat for QuakeMl {
    type Document = EventParameters;

    const NAME: &'static str = "QuakeML";

    fn from_xml(text: &str) -> Result<EventParameters, CatalogError> {
        let envelope: Envelope = parse_xml(Self::NAME, text)?;
        Ok(envelope.event_parameters)
    }

    fn to_xml(document: &EventParameters) -> Result<String, CatalogError> {
        let envelope = EnvelopeRef {
            xmlns_q: QUAKEML_NAMESPACE,
            xmlns: BED_NAMESPACE,
            event_parameters: document,
        };
        render_xml(Self::NAME, "q:quakeml", &envelope)
    }

    fn merge(into: &mut EventParameters, other: EventParameters) {
        into.events.extend(other.events);
    }
}
