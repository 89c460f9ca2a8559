use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::models::catalog::{Destination, Hotel, HotelCategory, Vehicle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    #[serde(alias = "Culture")]
    Culture,
    #[serde(alias = "Beaches")]
    Beaches,
    #[serde(alias = "Nature")]
    Nature,
    #[serde(alias = "Wildlife")]
    Wildlife,
}

impl Interest {
    /// Category label used by destination rows.
    pub fn label(&self) -> &'static str {
        match self {
            Interest::Culture => "Culture",
            Interest::Beaches => "Beaches",
            Interest::Nature => "Nature",
            Interest::Wildlife => "Wildlife",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        [
            Interest::Culture,
            Interest::Beaches,
            Interest::Nature,
            Interest::Wildlife,
        ]
        .into_iter()
        .find(|interest| interest.label().eq_ignore_ascii_case(label))
    }

    pub fn matches_category(&self, category: &str) -> bool {
        category.trim().eq_ignore_ascii_case(self.label())
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Planner form as submitted. Every field is read leniently: a missing or
/// malformed value becomes `None` (or is dropped from `interests`) and is
/// reported by validation, in field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub days: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub guests: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub budget: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_interests")]
    pub interests: Vec<Interest>,
    #[serde(default, deserialize_with = "deserialize_lenient_category")]
    pub hotel_category: Option<HotelCategory>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub vehicle_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub vehicle_class: Option<String>,
}

/// A trip request that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripParameters {
    pub days: u32,
    pub guests: u32,
    pub budget: f64,
    pub interests: Vec<Interest>,
    pub hotel_category: HotelCategory,
    pub vehicle_type: String,
    #[serde(default)]
    pub vehicle_class: Option<String>,
}

// Form inputs arrive as numbers or as the text typed into the field
fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => Ok(n.as_f64()),
        serde_json::Value::String(s) => Ok(s.trim().parse::<f64>().ok()),
        _ => Ok(None),
    }
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn deserialize_lenient_category<'de, D>(deserializer: D) -> Result<Option<HotelCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(HotelCategory::from_label(&s)),
        _ => Ok(None),
    }
}

fn deserialize_lenient_interests<'de, D>(deserializer: D) -> Result<Vec<Interest>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(items) => Ok(items
            .iter()
            .filter_map(|item| item.as_str())
            .filter_map(Interest::from_label)
            .collect()),
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub interest: Interest,
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    pub hotel: Hotel,
    pub vehicle: Vehicle,
    pub accommodation_cost: f64,
    pub transport_cost: f64,
    pub daily_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResult {
    pub days: Vec<DayPlan>,
    pub total_cost: f64,
    pub hotel: Hotel,
    pub vehicle: Vehicle,
    pub distance_per_day_km: f64,
    pub budget: f64,
    /// Informational only, a plan over budget is still returned.
    pub over_budget: bool,
}
