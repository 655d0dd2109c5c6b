pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod booking_repo;
pub use booking_repo::BookingRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod reference_repo;
pub use reference_repo::ReferenceRepository;
pub mod trip_repo;
pub use trip_repo::TripRepository;
pub mod vendor_repo;
pub use vendor_repo::VendorRepository;
