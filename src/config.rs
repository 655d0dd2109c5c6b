// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, net::SocketAddr, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{
        AuditRepository, BookingRepository, ClientRepository, ProfileRepository,
        ReferenceRepository, TripRepository, VendorRepository,
    },
    services::{
        audit_service::AuditService, booking_service::BookingService,
        client_service::ClientService, commission_report::CommissionReportService,
        profile_service::ProfileService, reference_service::ReferenceService,
        trip_service::TripService, vendor_service::VendorService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;

const RESET_SESSION_SQL: &str =
    "SELECT set_config('app.user_id', '', false), set_config('app.user_role', '', false)";

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR inválido")?;

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v.parse::<u32>().context("DB_MAX_CONNECTIONS inválido")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };
        let acquire_timeout_secs = match env::var("DB_ACQUIRE_TIMEOUT_SECS") {
            Ok(v) => v.parse::<u64>().context("DB_ACQUIRE_TIMEOUT_SECS inválido")?,
            Err(_) => DEFAULT_ACQUIRE_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub i18n_store: I18nStore,
    pub profile_repo: ProfileRepository,

    pub client_service: ClientService,
    pub vendor_service: VendorService,
    pub booking_service: BookingService,
    pub trip_service: TripService,
    pub reference_service: ReferenceService,
    pub profile_service: ProfileService,
    pub commission_report_service: CommissionReportService,
    pub audit_service: AuditService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            // A identidade gravada por get_rls_connection não sobrevive à devolução da conexão
            .after_release(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query(RESET_SESSION_SQL).execute(&mut *conn).await?;
                    Ok(true)
                })
            })
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let audit_repo = AuditRepository::new();
        let booking_repo = BookingRepository::new();
        let client_repo = ClientRepository::new();
        let reference_repo = ReferenceRepository::new();
        let trip_repo = TripRepository::new();
        let vendor_repo = VendorRepository::new();
        let profile_repo = ProfileRepository::new(db_pool.clone());

        Ok(Self {
            client_service: ClientService::new(client_repo, booking_repo.clone(), audit_repo.clone()),
            vendor_service: VendorService::new(vendor_repo.clone(), reference_repo.clone(), audit_repo.clone()),
            booking_service: BookingService::new(
                booking_repo.clone(),
                vendor_repo,
                reference_repo.clone(),
                audit_repo.clone(),
            ),
            trip_service: TripService::new(trip_repo, booking_repo.clone(), audit_repo.clone()),
            reference_service: ReferenceService::new(reference_repo, audit_repo.clone()),
            profile_service: ProfileService::new(profile_repo.clone(), audit_repo.clone()),
            commission_report_service: CommissionReportService::new(booking_repo, profile_repo.clone()),
            audit_service: AuditService::new(audit_repo),
            profile_repo,
            i18n_store: I18nStore::new(),
            jwt_secret: config.jwt_secret.clone(),
            db_pool,
        })
    }
}
