use chrono::NaiveDate;
use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Vehicle,
    Accommodation,
    Train,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Vehicle => "vehicle",
            BookingType::Accommodation => "accommodation",
            BookingType::Train => "train",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "booking_type", rename_all = "lowercase")]
pub enum BookingInput {
    Vehicle {
        vehicle_id: String,
        rental_start_date: NaiveDate,
        rental_end_date: NaiveDate,
        estimated_km: f64,
    },
    Accommodation {
        hotel_id: String,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        number_of_persons: u32,
        room_type: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub booking_type: BookingType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_km: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_persons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,

    pub subtotal: f64,
    pub service_charge: f64,
    pub total_amount: f64,
    pub payment_method: String,
    pub booking_status: BookingStatus,
    pub created_at: Option<DateTime>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking: Booking,
    pub notification_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
