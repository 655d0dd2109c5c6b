// src/services/commission_report.rs

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, ProfileRepository},
    models::{
        booking::{Booking, CommissionStatus},
        profile::Profile,
        report::{AgentCommission, CommissionReport, CommissionStatusTotal},
    },
    services::{
        commission::compute_commission,
        filters::{BookingFilter, RecordFilter},
    },
};

const STATUS_ORDER: [CommissionStatus; 4] = [
    CommissionStatus::Unreceived,
    CommissionStatus::Received,
    CommissionStatus::Completed,
    CommissionStatus::Canceled,
];

#[derive(Clone)]
pub struct CommissionReportService {
    booking_repo: BookingRepository,
    profile_repo: ProfileRepository,
}

impl CommissionReportService {
    pub fn new(booking_repo: BookingRepository, profile_repo: ProfileRepository) -> Self {
        Self { booking_repo, profile_repo }
    }

    pub async fn report(&self, conn: &mut PgConnection, filter: &BookingFilter) -> Result<CommissionReport, AppError> {
        let bookings = filter.apply(self.booking_repo.list(&mut *conn).await?);
        let profiles = self.profile_repo.list(conn).await?;

        Ok(build_report(&bookings, &profiles))
    }
}

/// Agrega as reservas já filtradas. Reservas sem viagem (ou viagem sem agente)
/// entram nos totais mas não na parte de nenhum agente.
pub fn build_report(bookings: &[Booking], profiles: &[Profile]) -> CommissionReport {
    let profiles: HashMap<Uuid, &Profile> = profiles.iter().map(|p| (p.id, p)).collect();

    let mut by_status: HashMap<CommissionStatus, (usize, Decimal)> = HashMap::new();
    // BTreeMap para saída estável
    let mut by_agent: BTreeMap<Uuid, (usize, Decimal)> = BTreeMap::new();

    for booking in bookings {
        let entry = by_status.entry(booking.commission_status).or_default();
        entry.0 += 1;
        entry.1 += booking.commission_amount;

        if let Some(agent_id) = booking.agent_id {
            let entry = by_agent.entry(agent_id).or_default();
            entry.0 += 1;
            entry.1 += booking.commission_amount;
        }
    }

    let agents: Vec<AgentCommission> = by_agent
        .into_iter()
        .map(|(agent_id, (booking_count, total_commission))| {
            let profile = profiles.get(&agent_id);
            let percentage = profile.and_then(|p| p.agent_commission_percentage);
            AgentCommission {
                agent_id,
                agent_name: profile.map(|p| p.display_name()).unwrap_or_default(),
                booking_count,
                total_commission,
                agent_commission_percentage: percentage,
                agent_share: percentage
                    .map(|pct| compute_commission(total_commission, pct))
                    .unwrap_or(Decimal::ZERO),
            }
        })
        .collect();

    CommissionReport {
        booking_count: bookings.len(),
        total_cost: bookings.iter().map(|b| b.cost).sum(),
        total_commission: bookings.iter().map(|b| b.commission_amount).sum(),
        by_status: STATUS_ORDER
            .iter()
            .filter_map(|status| {
                by_status.get(status).map(|(count, total)| CommissionStatusTotal {
                    status: *status,
                    booking_count: *count,
                    total_commission: *total,
                })
            })
            .collect(),
        total_agent_share: agents.iter().map(|a| a.agent_share).sum(),
        agents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;

    use crate::models::{booking::BookingStatus, profile::UserRole};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn booking(cost: &str, rate: &str, status: CommissionStatus, agent_id: Option<Uuid>) -> Booking {
        let cost = dec(cost);
        let rate = dec(rate);
        Booking {
            id: Uuid::new_v4(),
            client_ids: vec![],
            client_names: vec![],
            vendor_id: Uuid::new_v4(),
            vendor_name: "Hotel Central".into(),
            service_type_id: Uuid::new_v4(),
            service_type_name: "Hotel".into(),
            trip_id: agent_id.map(|_| Uuid::new_v4()),
            agent_id,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: None,
            location: None,
            cost,
            commission_rate: rate,
            commission_amount: compute_commission(cost, rate),
            booking_status: BookingStatus::Confirmed,
            commission_status: status,
            is_completed: false,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn agent(id: Uuid, pct: Option<&str>) -> Profile {
        Profile {
            id,
            first_name: Some("Marta".into()),
            last_name: Some("Lima".into()),
            email: None,
            role: UserRole::Agent,
            is_active: true,
            agent_commission_percentage: pct.map(dec),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_gives_zero_totals() {
        let report = build_report(&[], &[]);
        assert_eq!(report.booking_count, 0);
        assert_eq!(report.total_commission, Decimal::ZERO);
        assert!(report.by_status.is_empty());
        assert!(report.agents.is_empty());
    }

    #[test]
    fn totals_are_grouped_by_commission_status() {
        let bookings = vec![
            booking("1000", "10", CommissionStatus::Received, None),
            booking("250.5", "7.25", CommissionStatus::Unreceived, None),
            booking("500", "10", CommissionStatus::Received, None),
        ];

        let report = build_report(&bookings, &[]);

        assert_eq!(report.total_cost, dec("1750.5"));
        assert_eq!(report.total_commission, dec("168.16125"));
        assert_eq!(
            report.by_status,
            vec![
                CommissionStatusTotal {
                    status: CommissionStatus::Unreceived,
                    booking_count: 1,
                    total_commission: dec("18.16125"),
                },
                CommissionStatusTotal {
                    status: CommissionStatus::Received,
                    booking_count: 2,
                    total_commission: dec("150"),
                },
            ]
        );
    }

    #[test]
    fn agent_share_uses_profile_percentage() {
        let (marta, joao) = (Uuid::new_v4(), Uuid::new_v4());
        let bookings = vec![
            booking("1000", "10", CommissionStatus::Received, Some(marta)),
            booking("2000", "5", CommissionStatus::Received, Some(marta)),
            booking("400", "10", CommissionStatus::Received, Some(joao)),
            booking("300", "10", CommissionStatus::Received, None),
        ];
        let profiles = vec![agent(marta, Some("40")), agent(joao, None)];

        let report = build_report(&bookings, &profiles);

        let share: HashMap<Uuid, Decimal> = report.agents.iter().map(|a| (a.agent_id, a.agent_share)).collect();
        assert_eq!(share[&marta], dec("80"));
        assert_eq!(share[&joao], Decimal::ZERO);
        assert_eq!(report.total_agent_share, dec("80"));
        assert_eq!(report.booking_count, 4);
    }
}
