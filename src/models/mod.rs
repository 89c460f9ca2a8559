pub mod account;
pub mod bookings;
pub mod catalog;
pub mod itinerary;
pub mod profile;
pub mod train;
pub mod trip;
