pub mod audit;
pub mod bookings;
pub mod clients;
pub mod commissions;
pub mod profiles;
pub mod reference;
pub mod trips;
pub mod vendors;
