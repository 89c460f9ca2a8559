//! Budget planner: turns a trip request and a catalog snapshot into a
//! day-by-day plan with costs.
//!
//! The selection is a single greedy pass. One hotel (most stars, preferring
//! cities that host destinations for the chosen interests) and one vehicle
//! (cheapest per kilometer) are kept for the whole trip, and each day cycles
//! through the selected interests.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{
    catalog::{Catalog, Destination, Hotel, HotelCategory, Vehicle},
    trip::{DayPlan, Interest, ItineraryResult, TripParameters, TripRequest},
};

pub const MIN_TRIP_DAYS: u32 = 1;
pub const MAX_TRIP_DAYS: u32 = 30;
pub const DEFAULT_DAILY_DISTANCE_KM: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    #[error("Please enter a valid number of days (1-30)")]
    DaysOutOfRange,

    #[error("Please enter a valid number of guests (at least 1)")]
    GuestsOutOfRange,

    #[error("Please enter a valid budget")]
    InvalidBudget,

    #[error("Please select at least one interest")]
    NoInterests,

    #[error("Please select a hotel category")]
    NoHotelCategory,

    #[error("Please select a vehicle type")]
    NoVehicleType,

    #[error("No {category} hotels found")]
    NoHotelsFound { category: HotelCategory },

    #[error("No {vehicle_type} vehicles found")]
    NoVehiclesFound { vehicle_type: String },
}

impl SynthesisError {
    /// Rejected before any catalog row was looked at.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            SynthesisError::NoHotelsFound { .. } | SynthesisError::NoVehiclesFound { .. }
        )
    }
}

/// How far the vehicle is assumed to travel on a given day.
pub trait TransportCostPolicy: Send + Sync {
    fn distance_km(&self, day_index: u32) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDailyDistance(pub f64);

impl Default for FixedDailyDistance {
    fn default() -> Self {
        FixedDailyDistance(DEFAULT_DAILY_DISTANCE_KM)
    }
}

impl TransportCostPolicy for FixedDailyDistance {
    fn distance_km(&self, _day_index: u32) -> f64 {
        self.0
    }
}

pub fn synthesize(
    request: &TripRequest,
    catalog: &Catalog,
) -> Result<ItineraryResult, SynthesisError> {
    synthesize_with(request, catalog, &FixedDailyDistance::default())
}

pub fn synthesize_with(
    request: &TripRequest,
    catalog: &Catalog,
    policy: &dyn TransportCostPolicy,
) -> Result<ItineraryResult, SynthesisError> {
    let trip = validate(request)?;

    let destinations = relevant_destinations(&catalog.destinations, &trip.interests);
    let cities = relevant_cities(&destinations);

    let hotels = candidate_hotels(&catalog.hotels, trip.hotel_category, &cities);
    let vehicles = candidate_vehicles(
        &catalog.vehicles,
        &trip.vehicle_type,
        trip.vehicle_class.as_deref(),
    );

    let hotel = match hotels.first() {
        Some(hotel) => (*hotel).clone(),
        None => {
            return Err(SynthesisError::NoHotelsFound {
                category: trip.hotel_category,
            })
        }
    };
    let vehicle = match vehicles.first() {
        Some(vehicle) => (*vehicle).clone(),
        None => {
            return Err(SynthesisError::NoVehiclesFound {
                vehicle_type: trip.vehicle_type.clone(),
            })
        }
    };

    let mut plans = Vec::with_capacity(trip.days as usize);
    for day_index in 0..trip.days {
        let interest = trip.interests[day_index as usize % trip.interests.len()];
        let options: Vec<&Destination> = destinations
            .iter()
            .copied()
            .filter(|destination| interest.matches_category(&destination.category))
            .collect();

        let destination = if options.is_empty() {
            None
        } else {
            Some(options[day_index as usize % options.len()].clone())
        };
        let activity = match &destination {
            Some(destination) => destination.name.clone(),
            None => fallback_activity(interest),
        };

        let accommodation_cost = hotel.per_night_charge;
        let transport_cost = vehicle.per_km_charge * policy.distance_km(day_index);

        plans.push(DayPlan {
            day: day_index + 1,
            interest,
            activity,
            destination,
            hotel: hotel.clone(),
            vehicle: vehicle.clone(),
            accommodation_cost,
            transport_cost,
            daily_total: accommodation_cost + transport_cost,
        });
    }

    let total_cost: f64 = plans.iter().map(|plan| plan.daily_total).sum();
    let over_budget = total_cost > trip.budget;
    if over_budget {
        log::warn!(
            "Generated plan costs {:.2} against a budget of {:.2}",
            total_cost,
            trip.budget
        );
    }

    Ok(ItineraryResult {
        days: plans,
        total_cost,
        hotel,
        vehicle,
        distance_per_day_km: policy.distance_km(0),
        budget: trip.budget,
        over_budget,
    })
}

/// Checks the form in a fixed order; the first failure is reported.
pub fn validate(request: &TripRequest) -> Result<TripParameters, SynthesisError> {
    let days = whole_number(request.days)
        .filter(|days| (MIN_TRIP_DAYS..=MAX_TRIP_DAYS).contains(days))
        .ok_or(SynthesisError::DaysOutOfRange)?;

    let guests = whole_number(request.guests)
        .filter(|guests| *guests >= 1)
        .ok_or(SynthesisError::GuestsOutOfRange)?;

    let budget = request
        .budget
        .filter(|budget| budget.is_finite() && *budget > 0.0)
        .ok_or(SynthesisError::InvalidBudget)?;

    let mut seen = HashSet::new();
    let interests: Vec<Interest> = request
        .interests
        .iter()
        .copied()
        .filter(|interest| seen.insert(*interest))
        .collect();
    if interests.is_empty() {
        return Err(SynthesisError::NoInterests);
    }

    let hotel_category = request
        .hotel_category
        .ok_or(SynthesisError::NoHotelCategory)?;

    let vehicle_type = request
        .vehicle_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(SynthesisError::NoVehicleType)?
        .to_string();

    let vehicle_class = request
        .vehicle_class
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Ok(TripParameters {
        days,
        guests,
        budget,
        interests,
        hotel_category,
        vehicle_type,
        vehicle_class,
    })
}

fn whole_number(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v as u32)
}

fn relevant_destinations<'a>(
    destinations: &'a [Destination],
    interests: &[Interest],
) -> Vec<&'a Destination> {
    destinations
        .iter()
        .filter(|destination| {
            interests
                .iter()
                .any(|interest| interest.matches_category(&destination.category))
        })
        .collect()
}

fn relevant_cities(destinations: &[&Destination]) -> HashSet<String> {
    destinations
        .iter()
        .filter_map(|destination| destination.city.as_deref())
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Hotels of the category, best rated first. Hotels in a relevant city win
/// when there are any; otherwise every hotel of the category qualifies.
fn candidate_hotels<'a>(
    hotels: &'a [Hotel],
    category: HotelCategory,
    cities: &HashSet<String>,
) -> Vec<&'a Hotel> {
    let in_category: Vec<&Hotel> = hotels
        .iter()
        .filter(|hotel| hotel.category == category)
        .collect();

    let mut candidates = if cities.is_empty() {
        in_category
    } else {
        let in_city: Vec<&Hotel> = in_category
            .iter()
            .copied()
            .filter(|hotel| cities.contains(&hotel.city.trim().to_lowercase()))
            .collect();
        if in_city.is_empty() {
            in_category
        } else {
            in_city
        }
    };

    // stable: equal ratings keep catalog order
    candidates.sort_by(|a, b| b.stars.cmp(&a.stars));
    candidates
}

fn candidate_vehicles<'a>(
    vehicles: &'a [Vehicle],
    vehicle_type: &str,
    vehicle_class: Option<&str>,
) -> Vec<&'a Vehicle> {
    let wanted = vehicle_type.to_lowercase();
    let mut candidates: Vec<&Vehicle> = vehicles
        .iter()
        .filter(|vehicle| vehicle.vehicle_type.to_lowercase().contains(&wanted))
        .filter(|vehicle| match vehicle_class {
            Some(class) => vehicle.vehicle_class.as_deref() == Some(class),
            None => true,
        })
        .collect();

    candidates.sort_by(|a, b| a.per_km_charge.total_cmp(&b.per_km_charge));
    candidates
}

fn fallback_activity(interest: Interest) -> String {
    format!(
        "Explore local {} experiences",
        interest.label().to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel(name: &str, stars: u8, rate: f64, category: HotelCategory, city: &str) -> Hotel {
        Hotel {
            id: None,
            user_id: None,
            hotel_name: name.to_string(),
            stars,
            per_night_charge: rate,
            category,
            city: city.to_string(),
            image_url: None,
            owner_email: None,
            created_at: None,
        }
    }

    fn vehicle(model: &str, vehicle_type: &str, class: Option<&str>, rate: f64) -> Vehicle {
        Vehicle {
            id: None,
            user_id: None,
            vehicle_type: vehicle_type.to_string(),
            vehicle_class: class.map(str::to_string),
            model: model.to_string(),
            vehicle_number: None,
            per_km_charge: rate,
            image_url: None,
            owner_email: None,
            created_at: None,
        }
    }

    fn destination(name: &str, category: &str, city: Option<&str>) -> Destination {
        Destination {
            id: None,
            category: category.to_string(),
            name: name.to_string(),
            description: format!("About {}", name),
            city: city.map(str::to_string),
        }
    }

    fn request(days: i64, interests: Vec<Interest>) -> TripRequest {
        TripRequest {
            days: Some(days as f64),
            guests: Some(2.0),
            budget: Some(1000.0),
            interests,
            hotel_category: Some(HotelCategory::Luxury),
            vehicle_type: Some("Car".to_string()),
            vehicle_class: None,
        }
    }

    fn kandy_catalog() -> Catalog {
        Catalog {
            hotels: vec![hotel("Kandy Palace", 5, 100.0, HotelCategory::Luxury, "Kandy")],
            vehicles: vec![vehicle("Axio", "Car", None, 0.50)],
            destinations: vec![destination("Temple of the Tooth", "Culture", Some("Kandy"))],
            ..Default::default()
        }
    }

    fn rich_catalog() -> Catalog {
        Catalog {
            hotels: vec![
                hotel("Galle Fort Hotel", 4, 180.0, HotelCategory::Luxury, "Galle"),
                hotel("Colombo Grand", 5, 250.0, HotelCategory::Luxury, "Colombo"),
                hotel("Kandy Hills", 4, 140.0, HotelCategory::Luxury, "Kandy"),
                hotel("Kandy Lake View", 4, 120.0, HotelCategory::Luxury, "kandy"),
                hotel("Budget Inn", 2, 30.0, HotelCategory::Low, "Kandy"),
            ],
            vehicles: vec![
                vehicle("Hiace", "Van", Some("Luxury"), 0.90),
                vehicle("Prius", "Car", Some("Luxury"), 0.80),
                vehicle("Alto", "Car", Some("Mid"), 0.40),
                vehicle("Vitz", "car", Some("Mid"), 0.40),
            ],
            destinations: vec![
                destination("Temple of the Tooth", "Culture", Some("Kandy")),
                destination("Sigiriya", "culture", Some("Dambulla")),
                destination("Mirissa Beach", "Beaches", Some("Mirissa")),
                destination("Yala Safari", "Wildlife", None),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_concrete_three_day_kandy_trip() {
        let result = synthesize(&request(3, vec![Interest::Culture]), &kandy_catalog()).unwrap();

        assert_eq!(result.days.len(), 3);
        for plan in &result.days {
            assert_eq!(plan.accommodation_cost, 100.0);
            assert_eq!(plan.transport_cost, 50.0);
            assert_eq!(plan.daily_total, 150.0);
            assert_eq!(plan.activity, "Temple of the Tooth");
        }
        assert_eq!(result.total_cost, 450.0);
        assert!(!result.over_budget);
        assert_eq!(
            result.days.iter().map(|p| p.day).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_day_count_matches_request() {
        let catalog = rich_catalog();
        for days in [1, 7, 30] {
            let result = synthesize(&request(days, vec![Interest::Beaches]), &catalog).unwrap();
            assert_eq!(result.days.len(), days as usize);
        }
    }

    #[test]
    fn test_total_is_sum_of_daily_totals() {
        let mut trip = request(11, vec![Interest::Culture, Interest::Wildlife]);
        trip.vehicle_type = Some("van".to_string());
        let result = synthesize(&trip, &rich_catalog()).unwrap();

        let sum: f64 = result.days.iter().map(|p| p.daily_total).sum();
        assert!((result.total_cost - sum).abs() < 1e-6);
    }

    #[test]
    fn test_transport_cost_uses_daily_distance() {
        let result = synthesize(&request(4, vec![Interest::Nature]), &rich_catalog()).unwrap();
        for plan in &result.days {
            assert_eq!(plan.transport_cost, result.vehicle.per_km_charge * 100.0);
        }
        assert_eq!(result.distance_per_day_km, 100.0);
    }

    #[test]
    fn test_custom_transport_policy() {
        let result = synthesize_with(
            &request(2, vec![Interest::Culture]),
            &kandy_catalog(),
            &FixedDailyDistance(40.0),
        )
        .unwrap();

        assert_eq!(result.days[0].transport_cost, 20.0);
        assert_eq!(result.total_cost, 240.0);
    }

    #[test]
    fn test_hotel_prefers_relevant_city_then_stars() {
        // Culture destinations are in Kandy and Dambulla; the five star hotel
        // in Colombo is skipped for the best rated Kandy hotel.
        let result = synthesize(&request(2, vec![Interest::Culture]), &rich_catalog()).unwrap();
        assert_eq!(result.hotel.hotel_name, "Kandy Hills");
    }

    #[test]
    fn test_hotel_falls_back_to_any_city_in_category() {
        // Beaches only point at Mirissa, where there is no Luxury hotel.
        let result = synthesize(&request(2, vec![Interest::Beaches]), &rich_catalog()).unwrap();
        assert_eq!(result.hotel.hotel_name, "Colombo Grand");
    }

    #[test]
    fn test_hotel_star_ties_keep_catalog_order() {
        let catalog = Catalog {
            hotels: vec![
                hotel("First", 3, 90.0, HotelCategory::Middle, "Ella"),
                hotel("Second", 3, 60.0, HotelCategory::Middle, "Ella"),
            ],
            vehicles: vec![vehicle("Axio", "Car", None, 0.5)],
            ..Default::default()
        };
        let mut trip = request(1, vec![Interest::Nature]);
        trip.hotel_category = Some(HotelCategory::Middle);

        let result = synthesize(&trip, &catalog).unwrap();
        assert_eq!(result.hotel.hotel_name, "First");
    }

    #[test]
    fn test_vehicle_is_cheapest_matching_type() {
        let result = synthesize(&request(1, vec![Interest::Culture]), &rich_catalog()).unwrap();
        // "Car" matches "car" too; Alto and Vitz tie at 0.40, first one wins
        assert_eq!(result.vehicle.model, "Alto");
    }

    #[test]
    fn test_vehicle_class_must_match_exactly() {
        let mut trip = request(1, vec![Interest::Culture]);
        trip.vehicle_class = Some("Luxury".to_string());
        let result = synthesize(&trip, &rich_catalog()).unwrap();
        assert_eq!(result.vehicle.model, "Prius");

        trip.vehicle_class = Some("luxury".to_string());
        assert_eq!(
            synthesize(&trip, &rich_catalog()),
            Err(SynthesisError::NoVehiclesFound {
                vehicle_type: "Car".to_string()
            })
        );
    }

    #[test]
    fn test_blank_vehicle_class_is_ignored() {
        let mut trip = request(1, vec![Interest::Culture]);
        trip.vehicle_class = Some("  ".to_string());
        let result = synthesize(&trip, &rich_catalog()).unwrap();
        assert_eq!(result.vehicle.model, "Alto");
    }

    #[test]
    fn test_days_rotate_through_interests_and_destinations() {
        let result = synthesize(
            &request(5, vec![Interest::Culture, Interest::Wildlife]),
            &rich_catalog(),
        )
        .unwrap();

        let interests: Vec<Interest> = result.days.iter().map(|p| p.interest).collect();
        assert_eq!(
            interests,
            vec![
                Interest::Culture,
                Interest::Wildlife,
                Interest::Culture,
                Interest::Wildlife,
                Interest::Culture
            ]
        );

        // culture options are [Temple, Sigiriya], indexed by the day index
        assert_eq!(result.days[0].activity, "Temple of the Tooth");
        assert_eq!(result.days[2].activity, "Temple of the Tooth");
        assert_eq!(result.days[4].activity, "Temple of the Tooth");
        assert_eq!(result.days[1].activity, "Yala Safari");
    }

    #[test]
    fn test_odd_day_index_picks_second_destination() {
        let result = synthesize(&request(2, vec![Interest::Culture]), &rich_catalog()).unwrap();
        assert_eq!(result.days[1].activity, "Sigiriya");
        assert!(result.days[1].destination.is_some());
    }

    #[test]
    fn test_fallback_activity_without_destinations() {
        let result = synthesize(&request(1, vec![Interest::Nature]), &rich_catalog()).unwrap();
        assert_eq!(result.days[0].activity, "Explore local nature experiences");
        assert!(result.days[0].destination.is_none());
    }

    #[test]
    fn test_duplicate_interests_are_collapsed() {
        let result = synthesize(
            &request(3, vec![Interest::Culture, Interest::Culture, Interest::Wildlife]),
            &rich_catalog(),
        )
        .unwrap();
        assert_eq!(result.days[1].interest, Interest::Wildlife);
    }

    #[test]
    fn test_idempotent() {
        let catalog = rich_catalog();
        let trip = request(9, vec![Interest::Wildlife, Interest::Culture, Interest::Beaches]);

        let first = synthesize(&trip, &catalog).unwrap();
        let second = synthesize(&trip, &catalog).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_budget_is_flagged_not_enforced() {
        let mut trip = request(3, vec![Interest::Culture]);
        trip.budget = Some(10.0);
        let result = synthesize(&trip, &kandy_catalog()).unwrap();

        assert_eq!(result.total_cost, 450.0);
        assert!(result.over_budget);
    }

    #[test]
    fn test_validation_order_and_rejections() {
        let catalog = kandy_catalog();

        let mut trip = request(0, vec![]);
        trip.guests = Some(0.0);
        assert_eq!(
            synthesize(&trip, &catalog),
            Err(SynthesisError::DaysOutOfRange)
        );

        assert_eq!(
            synthesize(&request(31, vec![Interest::Culture]), &catalog),
            Err(SynthesisError::DaysOutOfRange)
        );

        let mut trip = request(3, vec![Interest::Culture]);
        trip.guests = Some(0.0);
        assert_eq!(
            synthesize(&trip, &catalog),
            Err(SynthesisError::GuestsOutOfRange)
        );

        let mut trip = request(3, vec![Interest::Culture]);
        trip.budget = Some(0.0);
        assert_eq!(synthesize(&trip, &catalog), Err(SynthesisError::InvalidBudget));

        trip.budget = Some(f64::NAN);
        assert_eq!(synthesize(&trip, &catalog), Err(SynthesisError::InvalidBudget));

        assert_eq!(
            synthesize(&request(3, vec![]), &catalog),
            Err(SynthesisError::NoInterests)
        );

        let mut trip = request(3, vec![Interest::Culture]);
        trip.budget = None;
        assert_eq!(synthesize(&trip, &catalog), Err(SynthesisError::InvalidBudget));

        let mut trip = request(3, vec![Interest::Culture]);
        trip.hotel_category = None;
        assert_eq!(synthesize(&trip, &catalog), Err(SynthesisError::NoHotelCategory));

        let mut trip = request(3, vec![Interest::Culture]);
        trip.vehicle_type = Some(" ".to_string());
        assert_eq!(synthesize(&trip, &catalog), Err(SynthesisError::NoVehicleType));
    }

    #[test]
    fn test_days_must_be_a_whole_number() {
        let catalog = kandy_catalog();

        let mut trip = request(3, vec![Interest::Culture]);
        trip.days = Some(2.5);
        assert_eq!(synthesize(&trip, &catalog), Err(SynthesisError::DaysOutOfRange));

        trip.days = None;
        assert_eq!(synthesize(&trip, &catalog), Err(SynthesisError::DaysOutOfRange));

        let mut trip = request(3, vec![Interest::Culture]);
        trip.guests = Some(1.5);
        assert_eq!(synthesize(&trip, &catalog), Err(SynthesisError::GuestsOutOfRange));
    }

    #[test]
    fn test_days_error_wins_over_later_fields() {
        let trip = TripRequest {
            days: Some(0.0),
            ..Default::default()
        };
        assert_eq!(validate(&trip), Err(SynthesisError::DaysOutOfRange));

        let trip = TripRequest {
            days: Some(30.0),
            guests: Some(9.0),
            ..Default::default()
        };
        assert_eq!(validate(&trip), Err(SynthesisError::InvalidBudget));
    }

    #[test]
    fn test_validate_normalizes_the_form() {
        let mut trip = request(2, vec![Interest::Nature, Interest::Culture, Interest::Nature]);
        trip.vehicle_type = Some(" Car ".to_string());
        trip.vehicle_class = Some("".to_string());

        let params = validate(&trip).unwrap();
        assert_eq!(params.days, 2);
        assert_eq!(params.guests, 2);
        assert_eq!(params.interests, vec![Interest::Nature, Interest::Culture]);
        assert_eq!(params.vehicle_type, "Car");
        assert_eq!(params.vehicle_class, None);
    }

    #[test]
    fn test_empty_result_rejections() {
        let catalog = kandy_catalog();

        let mut trip = request(3, vec![Interest::Culture]);
        trip.hotel_category = Some(HotelCategory::Low);
        let err = synthesize(&trip, &catalog).unwrap_err();
        assert_eq!(err.to_string(), "No Low hotels found");
        assert!(!err.is_validation());

        let mut trip = request(3, vec![Interest::Culture]);
        trip.vehicle_type = Some("Bus".to_string());
        let err = synthesize(&trip, &catalog).unwrap_err();
        assert_eq!(err.to_string(), "No Bus vehicles found");
    }

    #[test]
    fn test_empty_catalog_reports_missing_hotels() {
        let err = synthesize(&request(2, vec![Interest::Culture]), &Catalog::default()).unwrap_err();
        assert_eq!(
            err,
            SynthesisError::NoHotelsFound {
                category: HotelCategory::Luxury
            }
        );
    }
}
