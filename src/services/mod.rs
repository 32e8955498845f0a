pub mod availability_service;
pub mod booking_service;
pub mod error;
pub mod gemini_service;
pub mod mileage_service;
pub mod pricing_service;
pub mod reservation_service;
