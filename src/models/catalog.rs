use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HotelCategory {
    #[serde(alias = "low")]
    Low,
    #[serde(alias = "middle")]
    Middle,
    #[serde(alias = "luxury")]
    Luxury,
}

impl HotelCategory {
    /// Case-insensitive match on the category label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        [HotelCategory::Low, HotelCategory::Middle, HotelCategory::Luxury]
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(label))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HotelCategory::Low => "Low",
            HotelCategory::Middle => "Middle",
            HotelCategory::Luxury => "Luxury",
        }
    }
}

impl fmt::Display for HotelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Rows written by the web front end store small integers as doubles
fn deserialize_rounded_u8<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                Ok(i.min(u8::MAX as u64) as u8)
            } else if let Some(f) = n.as_f64() {
                Ok(f.round().clamp(0.0, u8::MAX as f64) as u8)
            } else {
                Ok(0)
            }
        }
        _ => Ok(0),
    }
}

fn deserialize_rounded_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                Ok(i.min(u32::MAX as u64) as u32)
            } else if let Some(f) = n.as_f64() {
                Ok(f.ceil().clamp(0.0, u32::MAX as f64) as u32)
            } else {
                Ok(0)
            }
        }
        _ => Ok(0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub hotel_name: String,
    #[serde(deserialize_with = "deserialize_rounded_u8")]
    pub stars: u8,
    pub per_night_charge: f64,
    pub category: HotelCategory,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub vehicle_type: String,
    #[serde(default, alias = "vehicle_category", skip_serializing_if = "Option::is_none")]
    pub vehicle_class: Option<String>,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    pub per_km_charge: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

/// A place worth visiting, tagged with the interest it serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleType {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(deserialize_with = "deserialize_rounded_u32")]
    pub min_passengers: u32,
    #[serde(deserialize_with = "deserialize_rounded_u32")]
    pub max_passengers: u32,
}

impl VehicleType {
    pub fn accommodates(&self, guests: u32) -> bool {
        self.min_passengers <= guests && guests <= self.max_passengers
    }
}

/// Price tier of a vehicle type. The multiplier is stored but not part of
/// the itinerary cost formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleClass {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub vehicle_type: String,
    pub class_name: String,
    pub price_multiplier: f64,
}

/// In-memory snapshot of the five catalog relations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub hotels: Vec<Hotel>,
    pub vehicles: Vec<Vehicle>,
    pub destinations: Vec<Destination>,
    pub vehicle_types: Vec<VehicleType>,
    pub vehicle_classes: Vec<VehicleClass>,
}

impl Catalog {
    /// Vehicle types whose passenger range covers the party size.
    pub fn offerable_vehicle_types(&self, guests: u32) -> Vec<&VehicleType> {
        self.vehicle_types
            .iter()
            .filter(|vehicle_type| vehicle_type.accommodates(guests))
            .collect()
    }

    pub fn classes_for_type(&self, type_name: &str) -> Vec<&VehicleClass> {
        self.vehicle_classes
            .iter()
            .filter(|class| class.vehicle_type.eq_ignore_ascii_case(type_name))
            .collect()
    }
}
