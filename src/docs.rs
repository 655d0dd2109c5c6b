// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::list_client_bookings,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Vendors ---
        handlers::vendors::list_vendors,
        handlers::vendors::get_vendor,
        handlers::vendors::get_booking_defaults,
        handlers::vendors::create_vendor,
        handlers::vendors::update_vendor,
        handlers::vendors::delete_vendor,

        // --- Bookings ---
        handlers::bookings::list_bookings,
        handlers::bookings::get_booking,
        handlers::bookings::preview_booking,
        handlers::bookings::create_booking,
        handlers::bookings::update_booking,
        handlers::bookings::update_booking_status,
        handlers::bookings::delete_booking,

        // --- Trips ---
        handlers::trips::list_trips,
        handlers::trips::get_trip,
        handlers::trips::create_trip,
        handlers::trips::update_trip,
        handlers::trips::delete_trip,

        // --- Reference data ---
        handlers::reference::list_service_types,
        handlers::reference::create_service_type,
        handlers::reference::delete_service_type,
        handlers::reference::list_tags,
        handlers::reference::create_tag,
        handlers::reference::delete_tag,
        handlers::reference::list_location_tags,
        handlers::reference::create_location_tag,
        handlers::reference::import_location_tags,
        handlers::reference::delete_location_tag,

        // --- Profiles ---
        handlers::profiles::get_me,
        handlers::profiles::list_profiles,
        handlers::profiles::update_profile,

        // --- Commissions / Audit ---
        handlers::commissions::get_commission_report,
        handlers::audit::list_audit_logs,
    ),
    components(
        schemas(
            // --- Clients ---
            models::client::Client,
            models::client::ClientPayload,

            // --- Vendors ---
            models::vendor::Vendor,
            models::vendor::VendorPayload,

            // --- Bookings ---
            models::booking::BookingStatus,
            models::booking::CommissionStatus,
            models::booking::Booking,
            models::booking::BookingPayload,
            models::booking::UpdateBookingStatusPayload,
            models::booking::BookingPreviewPayload,
            models::booking::BookingPreview,

            // --- Trips ---
            models::trip::TripStatus,
            models::trip::Trip,
            models::trip::TripPayload,
            models::trip::TripDetail,

            // --- Reference data ---
            models::reference::ServiceType,
            models::reference::Tag,
            models::reference::LocationTag,
            models::reference::CreateServiceTypePayload,
            models::reference::CreateTagPayload,
            models::reference::CreateLocationTagPayload,
            models::reference::ImportSummary,
            services::csv_import::CsvRowError,

            // --- Profiles ---
            models::profile::UserRole,
            models::profile::Profile,
            models::profile::UpdateProfilePayload,

            // --- Report / Audit ---
            models::report::CommissionReport,
            models::report::CommissionStatusTotal,
            models::report::AgentCommission,
            models::audit::AuditAction,
            models::audit::AuditLog,
        )
    ),
    tags(
        (name = "Clients", description = "Cadastro de clientes"),
        (name = "Vendors", description = "Fornecedores e suas taxas de comissão"),
        (name = "Bookings", description = "Reservas e acompanhamento de comissões"),
        (name = "Trips", description = "Viagens que agrupam reservas"),
        (name = "Reference Data", description = "Tipos de serviço, tags e rótulos de localização"),
        (name = "Profiles", description = "Perfis e papéis dos agentes"),
        (name = "Commissions", description = "Relatório de comissões"),
        (name = "Audit", description = "Log de auditoria")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented_under_api_jwt() {
        let doc = ApiDoc::openapi();

        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/clients/{id}/bookings",
            "/api/vendors/{id}/booking-defaults",
            "/api/bookings/preview",
            "/api/bookings/{id}/status",
            "/api/location-tags/import",
            "/api/commissions/report",
            "/api/audit-logs",
        ] {
            assert!(paths.contains(&expected), "{expected} ausente da documentação");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
        assert!(components.schemas.contains_key("BookingPreview"));
    }
}
