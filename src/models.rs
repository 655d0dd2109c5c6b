pub mod audit;
pub mod booking;
pub mod client;
pub mod profile;
pub mod reference;
pub mod trip;
pub mod vendor;
pub mod report;
