//! Station list extraction (`station.dat`).
//!
//! Resolves every distinct (network, station) code pair of an inventory to the
//! coordinates of the first station carrying that pair.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::catalog::{CatalogFormat, StationXml};
use crate::convert::ConvertError;
use crate::core::station::{Inventory, StationRecord};
use crate::utils::output::write_whole_file;

/// Stations indexed by (network, station) code pair
#[derive(Debug, Default)]
pub struct StationRegistry {
    /// Every located station in inventory order
    records: Vec<StationRecord>,

    /// Index: code pair -> first record carrying it
    index: HashMap<(String, String), usize>,

    /// Distinct code pairs in order of first appearance
    code_pairs: Vec<(String, String)>,

    /// Code pairs seen more than once (e.g. across concatenated inventories)
    duplicates: usize,
}

impl StationRegistry {
    pub fn from_inventory(inventory: &Inventory) -> Self {
        let mut registry = Self::default();

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        for (net, sta) in inventory.code_pairs() {
            if seen.insert((net, sta)) {
                registry.code_pairs.push((net.to_string(), sta.to_string()));
            } else {
                registry.duplicates += 1;
            }
        }

        for record in inventory.station_records() {
            let key = (record.network_code.clone(), record.station_code.clone());
            let idx = registry.records.len();
            registry.index.entry(key).or_insert(idx);
            registry.records.push(record);
        }

        registry
    }

    /// Distinct code pairs in order of first appearance
    pub fn code_pairs(&self) -> &[(String, String)] {
        &self.code_pairs
    }

    /// First station with the given code pair
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Lookup` if no located station has the pair.
    pub fn lookup(&self, network: &str, station: &str) -> Result<&StationRecord, ConvertError> {
        self.index
            .get(&(network.to_string(), station.to_string()))
            .map(|&idx| &self.records[idx])
            .ok_or_else(|| {
                ConvertError::Lookup(format!(
                    "no station coordinates for code pair {network}.{station}"
                ))
            })
    }

    /// Render the station file: one `CODE LAT LON` line per distinct pair
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Lookup` if a code pair has no located station.
    pub fn render(&self) -> Result<String, ConvertError> {
        let mut out = String::new();
        for (net, sta) in &self.code_pairs {
            let record = self.lookup(net, sta)?;
            out.push_str(&record.to_string());
            out.push('\n');
        }
        Ok(out)
    }

    /// Number of distinct code pairs
    pub fn len(&self) -> usize {
        self.code_pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_pairs.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Outcome of a station extraction run
#[derive(Debug, Clone, Serialize)]
pub struct StationSummary {
    pub inputs: usize,
    pub stations: usize,
    pub duplicates: usize,
    pub output: PathBuf,
}

/// Load one or more StationXML files and write `output` as a hypoDD station file
///
/// # Errors
///
/// Returns `ConvertError::FileNotFound` for a missing input, `ConvertError::Catalog`
/// for an unreadable inventory, `ConvertError::Lookup` for a code pair without
/// coordinates, or `ConvertError::Io` if the output cannot be written.
pub fn extract_stations(inputs: &[PathBuf], output: &Path) -> Result<StationSummary, ConvertError> {
    let inventory = StationXml::load_all(inputs)?;
    let registry = StationRegistry::from_inventory(&inventory);

    if registry.duplicates() > 0 {
        warn!(
            duplicates = registry.duplicates(),
            "repeated station code pairs; using the first occurrence of each"
        );
    }

    let text = registry.render()?;
    write_whole_file(output, &text)?;

    info!(
        stations = registry.len(),
        output = %output.display(),
        "wrote station file"
    );

    Ok(StationSummary {
        inputs: inputs.len(),
        stations: registry.len(),
        duplicates: registry.duplicates(),
        output: output.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::station::{Coordinate, Network, Station};

    fn station(code: &str, lat: Option<f64>, lon: f64) -> Station {
        Station {
            code: code.to_string(),
            latitude: lat.map(|value| Coordinate { value }),
            longitude: Some(Coordinate { value: lon }),
            elevation: None,
        }
    }

    fn inventory(networks: Vec<(&str, Vec<Station>)>) -> Inventory {
        Inventory {
            networks: networks
                .into_iter()
                .map(|(code, stations)| Network {
                    code: code.to_string(),
                    stations,
                })
                .collect(),
        }
    }

    #[test]
    fn test_one_line_per_distinct_pair_first_wins() {
        let inv = inventory(vec![
            (
                "CH",
                vec![station("DAVOX", Some(46.78), 9.88), station("ZUR", Some(47.37), 8.54)],
            ),
            // Same pair again, e.g. from a second file, with other coordinates
            ("CH", vec![station("DAVOX", Some(0.0), 0.0)]),
            ("8D", vec![station("NV01", Some(47.1), 8.1)]),
        ]);

        let registry = StationRegistry::from_inventory(&inv);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.duplicates(), 1);
        assert_eq!(
            registry.render().unwrap(),
            "CHDAVOX 46.78 9.88\nCHZUR 47.37 8.54\n8DNV01 47.1 8.1\n"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let inv = inventory(vec![("CH", vec![station("DAVOX", Some(46.78), 9.88)])]);
        let first = StationRegistry::from_inventory(&inv).render().unwrap();
        let second = StationRegistry::from_inventory(&inv).render().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pair_without_coordinates_is_lookup_error() {
        let inv = inventory(vec![("CH", vec![station("NOLAT", None, 9.0)])]);
        let registry = StationRegistry::from_inventory(&inv);

        let err = registry.render().unwrap_err();
        assert!(matches!(err, ConvertError::Lookup(_)));
    }
}
