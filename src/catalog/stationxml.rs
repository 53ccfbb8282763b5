//! FDSN StationXML inventories.

use serde::{Deserialize, Serialize};

use super::{parse_xml, render_xml, CatalogError, CatalogFormat};
use crate::core::station::{Inventory, Network};

pub const STATIONXML_NAMESPACE: &str = "http://www.fdsn.org/xml/station/1";
pub const STATIONXML_SCHEMA_VERSION: &str = "1.1";

/// StationXML format; documents are [`Inventory`]
pub struct StationXml;

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Network", default)]
    networks: Vec<Network>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "@schemaVersion")]
    schema_version: &'static str,
    #[serde(rename = "Source")]
    source: &'static str,
    #[serde(rename = "Created")]
    created: String,
    #[serde(rename = "Network")]
    networks: &'a [Network],
}

impl CatalogFormat for StationXml {
    type Document = Inventory;

    const NAME: &'static str = "StationXML";

    fn from_xml(text: &str) -> Result<Inventory, CatalogError> {
        let envelope: Envelope = parse_xml(Self::NAME, text)?;
        Ok(Inventory {
            networks: envelope.networks,
        })
    }

    fn to_xml(document: &Inventory) -> Result<String, CatalogError> {
        let envelope = EnvelopeRef {
            xmlns: STATIONXML_NAMESPACE,
            schema_version: STATIONXML_SCHEMA_VERSION,
            source: env!("CARGO_PKG_NAME"),
            created: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S%.6fZ")
                .to_string(),
            networks: &document.networks,
        };
        render_xml(Self::NAME, "FDSNStationXML", &envelope)
    }

    fn merge(into: &mut Inventory, other: Inventory) {
        into.networks.extend(other.networks);
    }
}
