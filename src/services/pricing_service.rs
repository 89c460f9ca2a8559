use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use thiserror::Error;

/// Service charge added on top of every booking subtotal.
pub const SERVICE_CHARGE_RATE: f64 = 0.10;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Invalid {0} id")]
    InvalidId(&'static str),

    #[error("Vehicle not found")]
    VehicleNotFound,

    #[error("Hotel not found")]
    HotelNotFound,

    #[error("Estimated distance must be greater than zero")]
    InvalidDistance,

    #[error("Rental end date must not be before the start date")]
    InvalidRentalPeriod,

    #[error("Check-out must be at least one night after check-in")]
    InvalidStay,

    #[error("Number of persons must be at least one")]
    InvalidGuests,

    #[error("Room type is required")]
    MissingRoomType,

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl BookingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BookingError::VehicleNotFound | BookingError::HotelNotFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BookingQuote {
    pub subtotal: f64,
    pub service_charge: f64,
    pub total_amount: f64,
}

pub struct PricingService;

impl PricingService {
    pub fn calculate_service_charge(subtotal: f64) -> f64 {
        subtotal * SERVICE_CHARGE_RATE
    }

    pub fn quote(subtotal: f64) -> BookingQuote {
        let service_charge = Self::calculate_service_charge(subtotal);
        BookingQuote {
            subtotal,
            service_charge,
            total_amount: subtotal + service_charge,
        }
    }

    /// Vehicle rentals are charged per estimated kilometer.
    pub fn quote_vehicle(
        estimated_km: f64,
        per_km_charge: f64,
        rental_start: NaiveDate,
        rental_end: NaiveDate,
    ) -> Result<BookingQuote, BookingError> {
        if !estimated_km.is_finite() || estimated_km <= 0.0 {
            return Err(BookingError::InvalidDistance);
        }
        if rental_end < rental_start {
            return Err(BookingError::InvalidRentalPeriod);
        }
        Ok(Self::quote(estimated_km * per_km_charge))
    }

    pub fn calculate_nights(check_in: NaiveDate, check_out: NaiveDate) -> Result<u32, BookingError> {
        let nights = (check_out - check_in).num_days();
        if nights < 1 {
            return Err(BookingError::InvalidStay);
        }
        Ok(nights as u32)
    }

    /// Accommodation is charged per night, independent of the party size.
    pub fn quote_accommodation(nights: u32, per_night_charge: f64) -> BookingQuote {
        Self::quote(nights as f64 * per_night_charge)
    }
}

pub fn parse_object_id(value: &str, what: &'static str) -> Result<ObjectId, BookingError> {
    ObjectId::parse_str(value).map_err(|_| BookingError::InvalidId(what))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_service_charge_calculation() {
        assert_eq!(PricingService::calculate_service_charge(1000.0), 100.0);
        assert_eq!(PricingService::calculate_service_charge(0.0), 0.0);

        let quote = PricingService::quote(2500.0);
        assert_eq!(quote.service_charge, 250.0);
        assert_eq!(quote.total_amount, 2750.0);
    }

    #[test]
    fn test_vehicle_quote() {
        let quote =
            PricingService::quote_vehicle(200.0, 80.0, date(2025, 3, 1), date(2025, 3, 3)).unwrap();
        assert_eq!(quote.subtotal, 16000.0);
        assert_eq!(quote.total_amount, 17600.0);

        // same-day rental is fine
        assert!(PricingService::quote_vehicle(10.0, 80.0, date(2025, 3, 1), date(2025, 3, 1)).is_ok());
    }

    #[test]
    fn test_vehicle_quote_rejections() {
        assert!(matches!(
            PricingService::quote_vehicle(0.0, 80.0, date(2025, 3, 1), date(2025, 3, 2)),
            Err(BookingError::InvalidDistance)
        ));
        assert!(matches!(
            PricingService::quote_vehicle(50.0, 80.0, date(2025, 3, 2), date(2025, 3, 1)),
            Err(BookingError::InvalidRentalPeriod)
        ));
    }

    #[test]
    fn test_nights_and_accommodation_quote() {
        let nights = PricingService::calculate_nights(date(2025, 12, 30), date(2026, 1, 2)).unwrap();
        assert_eq!(nights, 3);

        let quote = PricingService::quote_accommodation(nights, 15000.0);
        assert_eq!(quote.subtotal, 45000.0);
        assert_eq!(quote.service_charge, 4500.0);
        assert_eq!(quote.total_amount, 49500.0);

        assert!(matches!(
            PricingService::calculate_nights(date(2025, 5, 5), date(2025, 5, 5)),
            Err(BookingError::InvalidStay)
        ));
    }

    #[test]
    fn test_parse_object_id() {
        assert!(parse_object_id("65f0c3a2b4d5e6f708192a3b", "hotel").is_ok());
        let err = parse_object_id("not-an-id", "hotel").unwrap_err();
        assert_eq!(err.to_string(), "Invalid hotel id");
    }
}
