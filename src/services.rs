pub mod access;
pub mod audit_service;
pub mod booking_service;
pub mod client_service;
pub mod commission;
pub mod commission_report;
pub mod csv_import;
pub mod filters;
pub mod profile_service;
pub mod reference_service;
pub mod trip_service;
pub mod vendor_service;
