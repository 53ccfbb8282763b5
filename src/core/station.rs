use serde::{Deserialize, Serialize};

/// A station inventory: the `Network` list of an FDSN StationXML document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "Network", default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<Network>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    #[serde(rename = "@code")]
    pub code: String,

    #[serde(rename = "Station", default, skip_serializing_if = "Vec::is_empty")]
    pub stations: Vec<Station>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "@code")]
    pub code: String,

    #[serde(rename = "Latitude", default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Coordinate>,

    #[serde(rename = "Longitude", default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Coordinate>,

    #[serde(rename = "Elevation", default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<Coordinate>,
}

/// A StationXML float element; attributes such as `unit` or `datum` are ignored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "$text")]
    pub value: f64,
}

impl Inventory {
    /// All (network, station) code pairs in document order, duplicates included
    pub fn code_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.networks.iter().flat_map(|net| {
            net.stations
                .iter()
                .map(move |sta| (net.code.as_str(), sta.code.as_str()))
        })
    }

    /// Every station that carries both coordinates, in document order
    pub fn station_records(&self) -> Vec<StationRecord> {
        self.networks
            .iter()
            .flat_map(|net| {
                net.stations.iter().filter_map(move |sta| {
                    Some(StationRecord {
                        network_code: net.code.clone(),
                        station_code: sta.code.clone(),
                        latitude: sta.latitude?.value,
                        longitude: sta.longitude?.value,
                    })
                })
            })
            .collect()
    }
}

/// Location of one station, identified by its (network, station) code pair
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub network_code: String,
    pub station_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StationRecord {
    /// Network and station code concatenated, as used by hypoDD
    pub fn code(&self) -> String {
        format!("{}{}", self.network_code, self.station_code)
    }
}
