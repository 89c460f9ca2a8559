pub mod catalog_service;
pub mod directions_service;
pub mod export_service;
pub mod itinerary_synthesis_service;
pub mod notification_service;
pub mod pricing_service;
pub mod train_schedule_service;
pub mod weather_service;
