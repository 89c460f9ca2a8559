use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    catalog::HotelCategory,
    trip::{Interest, ItineraryResult, TripParameters, TripRequest},
};

pub const SAVED_ITINERARY_SCHEMA_VERSION: u32 = 1;

/// Largest difference between the stated total and the sum of daily totals
/// still treated as rounding.
const TOTAL_TOLERANCE: f64 = 0.01;

#[derive(Debug, Deserialize)]
pub struct SaveItineraryInput {
    pub title: Option<String>,
    /// The plan as generated and shown to the user.
    #[serde(default)]
    pub itinerary: Option<ItineraryResult>,
    #[serde(flatten)]
    pub request: TripRequest,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("Please generate an itinerary before saving")]
    Missing,

    #[error("Itinerary has {actual} days but {expected} were requested")]
    DayCountMismatch { expected: u32, actual: usize },

    #[error("Itinerary total does not match its daily totals")]
    TotalMismatch,
}

/// A result supplied by the client is stored as-is once it agrees with
/// itself and with the requested day count.
pub fn check_snapshot(params: &TripParameters, result: &ItineraryResult) -> Result<(), SnapshotError> {
    if result.days.len() != params.days as usize {
        return Err(SnapshotError::DayCountMismatch {
            expected: params.days,
            actual: result.days.len(),
        });
    }

    let sum: f64 = result.days.iter().map(|day| day.daily_total).sum();
    if !result.total_cost.is_finite() || (result.total_cost - sum).abs() > TOTAL_TOLERANCE {
        return Err(SnapshotError::TotalMismatch);
    }
    Ok(())
}

/// A generated plan frozen at save time. The embedded result is a snapshot:
/// later edits to the hotel or vehicle rows are not reflected here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedItinerary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub title: String,
    pub days: u32,
    pub guests: u32,
    pub budget: f64,
    pub interests: Vec<Interest>,
    pub hotel_category: HotelCategory,
    pub vehicle_type: String,
    #[serde(default)]
    pub vehicle_class: Option<String>,
    pub schema_version: u32,
    pub itinerary: ItineraryResult,
    pub created_at: Option<DateTime>,
}

impl SavedItinerary {
    pub fn new(
        user_id: String,
        title: Option<String>,
        params: TripParameters,
        itinerary: ItineraryResult,
    ) -> Self {
        let title = resolve_title(title.as_deref(), params.days);

        Self {
            id: None,
            user_id,
            title,
            days: params.days,
            guests: params.guests,
            budget: params.budget,
            interests: params.interests,
            hotel_category: params.hotel_category,
            vehicle_type: params.vehicle_type,
            vehicle_class: params.vehicle_class,
            schema_version: SAVED_ITINERARY_SCHEMA_VERSION,
            itinerary,
            created_at: Some(DateTime::now()),
        }
    }

    /// Parameters the plan was generated from.
    pub fn trip_parameters(&self) -> TripParameters {
        TripParameters {
            days: self.days,
            guests: self.guests,
            budget: self.budget,
            interests: self.interests.clone(),
            hotel_category: self.hotel_category,
            vehicle_type: self.vehicle_type.clone(),
            vehicle_class: self.vehicle_class.clone(),
        }
    }
}

pub fn default_title(days: u32) -> String {
    format!("{}-Day Sri Lanka Trip", days)
}

/// Trimmed title, or the default for the trip length when blank.
pub fn resolve_title(title: Option<&str>, days: u32) -> String {
    title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_title(days))
}
