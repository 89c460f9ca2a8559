use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stations on the main and hill country lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Station {
    Colombo,
    Kandy,
    Hatton,
    Nanuoya,
    Ella,
}

impl Station {
    pub const ALL: [Station; 5] = [
        Station::Colombo,
        Station::Kandy,
        Station::Hatton,
        Station::Nanuoya,
        Station::Ella,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Station::Colombo => "Colombo",
            Station::Kandy => "Kandy",
            Station::Hatton => "Hatton",
            Station::Nanuoya => "Nanuoya",
            Station::Ella => "Ella",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Station::Colombo => "Main hub, Fort Station",
            Station::Kandy => "Cultural capital, Hill Country gateway",
            Station::Hatton => "Tea country, Adam's Peak access",
            Station::Nanuoya => "Nuwara Eliya access, Cool climate",
            Station::Ella => "Scenic village, Nine Arch Bridge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Station::ALL
            .into_iter()
            .find(|station| station.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
pub struct StationInfo {
    pub name: Station,
    pub description: &'static str,
}

/// One scheduled service between two stations. Times are local.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainDeparture {
    pub name: &'static str,
    pub number: &'static str,
    pub departs: &'static str,
    pub arrives: &'static str,
    pub duration: &'static str,
    pub classes: &'static [&'static str],
    pub days: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TrainSearchResult {
    pub from: Station,
    pub to: Station,
    pub trains: Vec<TrainDeparture>,
}

#[derive(Debug, Deserialize)]
pub struct TrainBookingInput {
    pub from: String,
    pub to: String,
    pub train_number: String,
    #[serde(default)]
    pub travel_class: Option<String>,
    #[serde(default)]
    pub travel_date: Option<NaiveDate>,
}

/// A train booking is a request forwarded to the operator by e-mail; seats
/// are confirmed by reply.
#[derive(Debug, Serialize)]
pub struct TrainBookingResponse {
    pub status: &'static str,
    pub from: Station,
    pub to: Station,
    pub train: TrainDeparture,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_date: Option<NaiveDate>,
}
