// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = app_router(app_state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn app_router(app_state: AppState) -> Router {
    let client_routes = Router::new()
        .route("/", get(handlers::clients::list_clients).post(handlers::clients::create_client))
        .route(
            "/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route("/{id}/bookings", get(handlers::clients::list_client_bookings));

    let vendor_routes = Router::new()
        .route("/", get(handlers::vendors::list_vendors).post(handlers::vendors::create_vendor))
        .route(
            "/{id}",
            get(handlers::vendors::get_vendor)
                .put(handlers::vendors::update_vendor)
                .delete(handlers::vendors::delete_vendor),
        )
        .route("/{id}/booking-defaults", get(handlers::vendors::get_booking_defaults));

    let booking_routes = Router::new()
        .route("/", get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking))
        .route("/preview", post(handlers::bookings::preview_booking))
        .route(
            "/{id}",
            get(handlers::bookings::get_booking)
                .put(handlers::bookings::update_booking)
                .delete(handlers::bookings::delete_booking),
        )
        .route("/{id}/status", patch(handlers::bookings::update_booking_status));

    let trip_routes = Router::new()
        .route("/", get(handlers::trips::list_trips).post(handlers::trips::create_trip))
        .route(
            "/{id}",
            get(handlers::trips::get_trip)
                .put(handlers::trips::update_trip)
                .delete(handlers::trips::delete_trip),
        );

    let reference_routes = Router::new()
        .route(
            "/service-types",
            get(handlers::reference::list_service_types).post(handlers::reference::create_service_type),
        )
        .route("/service-types/{id}", delete(handlers::reference::delete_service_type))
        .route("/tags", get(handlers::reference::list_tags).post(handlers::reference::create_tag))
        .route("/tags/{id}", delete(handlers::reference::delete_tag))
        .route(
            "/location-tags",
            get(handlers::reference::list_location_tags).post(handlers::reference::create_location_tag),
        )
        .route("/location-tags/import", post(handlers::reference::import_location_tags))
        .route("/location-tags/{id}", delete(handlers::reference::delete_location_tag));

    let profile_routes = Router::new()
        .route("/", get(handlers::profiles::list_profiles))
        .route("/me", get(handlers::profiles::get_me))
        .route("/{id}", patch(handlers::profiles::update_profile));

    // Tudo abaixo de /api exige sessão válida
    let api_routes = Router::new()
        .nest("/clients", client_routes)
        .nest("/vendors", vendor_routes)
        .nest("/bookings", booking_routes)
        .nest("/trips", trip_routes)
        .nest("/profiles", profile_routes)
        .route("/commissions/report", get(handlers::commissions::get_commission_report))
        .route("/audit-logs", get(handlers::audit::list_audit_logs))
        .merge(reference_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::handler::Handler;

    fn is_handler<H, T>(_: H)
    where
        H: Handler<T, AppState>,
    {
    }

    #[test]
    fn read_paths_sharing_one_connection_are_valid_handlers() {
        is_handler(handlers::clients::list_client_bookings);
        is_handler(handlers::trips::get_trip);
        is_handler(handlers::commissions::get_commission_report);
        is_handler(handlers::vendors::get_booking_defaults);
        is_handler(handlers::bookings::preview_booking);
    }
}
