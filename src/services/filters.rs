// src/services/filters.rs
//
// Filtros em memória das telas de listagem. Recebem registros já buscados
// no banco e devolvem o subconjunto visível, na mesma ordem.
//
// Regras comuns:
// - E entre critérios, OU dentro de um critério de múltipla escolha;
// - critério vazio (texto em branco, lista vazia, faixa sem limites) não filtra;
// - texto: substring sem diferenciar maiúsculas/minúsculas;
// - faixas de data e número: limites inclusivos.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use utoipa::IntoParams;

use crate::models::{
    booking::{Booking, BookingStatus, CommissionStatus},
    client::Client,
    trip::{Trip, TripStatus},
    vendor::Vendor,
};

pub trait RecordFilter<T> {
    fn matches(&self, record: &T) -> bool;

    fn apply(&self, records: Vec<T>) -> Vec<T> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

// =========================================================================
//  BLOCOS BÁSICOS
// =========================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Para campos de data opcionais: sem data só passa se a faixa estiver aberta.
    pub fn contains_opt(&self, date: Option<NaiveDate>) -> bool {
        match date {
            Some(d) => self.contains(d),
            None => self.is_unbounded(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Normaliza o termo de busca: `None` quando vazio ou só espaços.
fn search_term(term: &Option<String>) -> Option<String> {
    term.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn opt_contains_ci(haystack: &Option<String>, needle_lower: &str) -> bool {
    haystack.as_deref().is_some_and(|h| contains_ci(h, needle_lower))
}

fn any_of<T: PartialEq>(selected: &[T], value: &T) -> bool {
    selected.is_empty() || selected.contains(value)
}

fn intersects<T: PartialEq>(selected: &[T], values: &[T]) -> bool {
    selected.is_empty() || values.iter().any(|v| selected.contains(v))
}

// =========================================================================
//  RESERVAS
// =========================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingFilter {
    pub client_search_term: Option<String>,
    pub service_types: Vec<Uuid>,
    pub vendor_ids: Vec<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub booking_statuses: Vec<BookingStatus>,
    pub commission_statuses: Vec<CommissionStatus>,
}

impl BookingFilter {
    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.date_from, self.date_to)
    }
}

impl RecordFilter<Booking> for BookingFilter {
    fn matches(&self, booking: &Booking) -> bool {
        if let Some(term) = search_term(&self.client_search_term) {
            if !booking.client_names.iter().any(|name| contains_ci(name, &term)) {
                return false;
            }
        }

        any_of(&self.service_types, &booking.service_type_id)
            && any_of(&self.vendor_ids, &booking.vendor_id)
            && self.date_range().contains(booking.start_date)
            && any_of(&self.booking_statuses, &booking.booking_status)
            && any_of(&self.commission_statuses, &booking.commission_status)
    }
}

// =========================================================================
//  FORNECEDORES
// =========================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorFilter {
    pub search_term: Option<String>,
    pub service_types: Vec<Uuid>,
    pub tags: Vec<Uuid>,
    pub min_price_range: Option<i16>,
    pub max_price_range: Option<i16>,
    pub min_commission: Option<Decimal>,
    pub max_commission: Option<Decimal>,
    pub min_rating: Option<Decimal>,
}

impl RecordFilter<Vendor> for VendorFilter {
    fn matches(&self, vendor: &Vendor) -> bool {
        if let Some(term) = search_term(&self.search_term) {
            let hit = contains_ci(&vendor.name, &term)
                || opt_contains_ci(&vendor.contact_person, &term)
                || opt_contains_ci(&vendor.email, &term)
                || opt_contains_ci(&vendor.service_area, &term);
            if !hit {
                return false;
            }
        }

        intersects(&self.service_types, &vendor.service_type_ids)
            && intersects(&self.tags, &vendor.tag_ids)
            && Range::new(self.min_price_range, self.max_price_range).contains(vendor.price_range)
            && Range::new(self.min_commission, self.max_commission).contains(vendor.commission_rate)
            && self.min_rating.is_none_or(|floor| vendor.rating >= floor)
    }
}

// =========================================================================
//  CLIENTES
// =========================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientFilter {
    pub search_term: Option<String>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

impl RecordFilter<Client> for ClientFilter {
    fn matches(&self, client: &Client) -> bool {
        if let Some(term) = search_term(&self.search_term) {
            let hit = contains_ci(&client.full_name(), &term)
                || opt_contains_ci(&client.email, &term)
                || opt_contains_ci(&client.phone, &term);
            if !hit {
                return false;
            }
        }

        DateRange::new(self.created_from, self.created_to).contains(client.date_created.date_naive())
    }
}

// =========================================================================
//  VIAGENS
// =========================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase", default)]
pub struct TripFilter {
    pub search_term: Option<String>,
    pub statuses: Vec<TripStatus>,
    pub high_priority_only: bool,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl RecordFilter<Trip> for TripFilter {
    fn matches(&self, trip: &Trip) -> bool {
        if let Some(term) = search_term(&self.search_term) {
            let hit = contains_ci(&trip.name, &term)
                || trip.client_names.iter().any(|name| contains_ci(name, &term));
            if !hit {
                return false;
            }
        }

        any_of(&self.statuses, &trip.status)
            && (!self.high_priority_only || trip.high_priority)
            && DateRange::new(self.date_from, self.date_to).contains_opt(trip.start_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn booking(clients: &[&str], start: NaiveDate, status: BookingStatus) -> Booking {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Booking {
            id: Uuid::new_v4(),
            client_ids: clients.iter().map(|_| Uuid::new_v4()).collect(),
            client_names: clients.iter().map(|c| c.to_string()).collect(),
            vendor_id: Uuid::new_v4(),
            vendor_name: "Hotel Lumière".into(),
            service_type_id: Uuid::new_v4(),
            service_type_name: "Hotel".into(),
            trip_id: None,
            agent_id: None,
            start_date: start,
            end_date: None,
            location: Some("Paris".into()),
            cost: dec("1000"),
            commission_rate: dec("10"),
            commission_amount: dec("100"),
            booking_status: status,
            commission_status: CommissionStatus::Unreceived,
            is_completed: false,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_bookings() -> Vec<Booking> {
        vec![
            booking(&["Ana Souza"], date(2024, 6, 15), BookingStatus::Confirmed),
            booking(&["John Smith", "Jane Smith"], date(2024, 7, 2), BookingStatus::Pending),
            booking(&["Carlos Lima"], date(2024, 5, 30), BookingStatus::Canceled),
            booking(&["Joanna Smithers"], date(2024, 6, 1), BookingStatus::Pending),
        ]
    }

    fn vendor(name: &str, price: i16, rate: &str, rating: &str, service_types: Vec<Uuid>) -> Vendor {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Vendor {
            id: Uuid::new_v4(),
            name: name.into(),
            contact_person: None,
            email: None,
            phone: None,
            address: None,
            service_area: Some("Southern Europe".into()),
            commission_rate: dec(rate),
            price_range: price,
            rating: dec(rating),
            service_type_ids: service_types,
            tag_ids: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_filter_is_identity() {
        let bookings = sample_bookings();
        assert_eq!(BookingFilter::default().apply(bookings.clone()), bookings);
    }

    #[test]
    fn result_is_ordered_subset_and_idempotent() {
        let bookings = sample_bookings();
        let filter = BookingFilter {
            client_search_term: Some("smith".into()),
            ..Default::default()
        };

        let once = filter.apply(bookings.clone());
        assert_eq!(once, vec![bookings[1].clone(), bookings[3].clone()]);
        assert_eq!(filter.apply(once.clone()), once);
    }

    #[test]
    fn client_search_is_case_insensitive_and_ignores_blank_terms() {
        let bookings = sample_bookings();
        let upper = BookingFilter {
            client_search_term: Some("  ANA ".into()),
            ..Default::default()
        };
        assert_eq!(upper.apply(bookings.clone()).len(), 1);

        let blank = BookingFilter {
            client_search_term: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(blank.apply(bookings.clone()).len(), bookings.len());
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let june = BookingFilter {
            date_from: Some(date(2024, 6, 1)),
            date_to: Some(date(2024, 6, 30)),
            ..Default::default()
        };
        let july_onwards = BookingFilter {
            date_from: Some(date(2024, 7, 1)),
            ..Default::default()
        };
        let until_june_first = BookingFilter {
            date_to: Some(date(2024, 6, 1)),
            ..Default::default()
        };

        let mid_june = booking(&["Ana Souza"], date(2024, 6, 15), BookingStatus::Pending);
        assert!(june.matches(&mid_june));
        assert!(!july_onwards.matches(&mid_june));

        let dates = |f: &BookingFilter| -> Vec<NaiveDate> {
            f.apply(sample_bookings()).iter().map(|b| b.start_date).collect()
        };
        assert_eq!(dates(&june), vec![date(2024, 6, 15), date(2024, 6, 1)]);
        assert_eq!(dates(&until_june_first), vec![date(2024, 5, 30), date(2024, 6, 1)]);
    }

    #[test]
    fn multi_select_is_or_within_and_across() {
        let bookings = sample_bookings();
        let filter = BookingFilter {
            booking_statuses: vec![BookingStatus::Pending, BookingStatus::Canceled],
            ..Default::default()
        };
        assert_eq!(filter.apply(bookings.clone()).len(), 3);

        let narrowed = BookingFilter {
            booking_statuses: vec![BookingStatus::Pending, BookingStatus::Canceled],
            date_from: Some(date(2024, 6, 1)),
            ..Default::default()
        };
        assert_eq!(narrowed.apply(bookings.clone()).len(), 2);

        let by_service = BookingFilter {
            service_types: vec![bookings[2].service_type_id, bookings[0].service_type_id],
            ..Default::default()
        };
        let ids: Vec<Uuid> = by_service.apply(bookings.clone()).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![bookings[0].id, bookings[2].id]);
    }

    #[test]
    fn empty_status_list_means_no_restriction() {
        let filter = BookingFilter {
            commission_statuses: vec![],
            booking_statuses: vec![],
            ..Default::default()
        };
        assert_eq!(filter.apply(sample_bookings()).len(), 4);

        let none_match = BookingFilter {
            commission_statuses: vec![CommissionStatus::Received],
            ..Default::default()
        };
        assert!(none_match.apply(sample_bookings()).is_empty());
    }

    #[test]
    fn vendor_numeric_ranges_are_inclusive() {
        let hotel = Uuid::new_v4();
        let vendors = vec![
            vendor("Budget Inn", 1, "5", "3.5", vec![hotel]),
            vendor("Grand Palace", 5, "15", "4.8", vec![hotel]),
            vendor("City Tours", 3, "10", "4.0", vec![]),
        ];

        let mid_price = VendorFilter {
            min_price_range: Some(1),
            max_price_range: Some(3),
            ..Default::default()
        };
        assert_eq!(mid_price.apply(vendors.clone()).len(), 2);

        let commission = VendorFilter {
            min_commission: Some(dec("10")),
            max_commission: Some(dec("15")),
            ..Default::default()
        };
        let names: Vec<String> = commission.apply(vendors.clone()).into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["Grand Palace", "City Tours"]);

        let rated = VendorFilter {
            min_rating: Some(dec("4.0")),
            service_types: vec![hotel],
            ..Default::default()
        };
        let names: Vec<String> = rated.apply(vendors).into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["Grand Palace"]);
    }

    #[test]
    fn vendor_search_covers_service_area() {
        let vendors = vec![vendor("Budget Inn", 1, "5", "3.5", vec![])];
        let filter = VendorFilter {
            search_term: Some("southern".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(vendors).len(), 1);
    }

    #[test]
    fn trips_without_start_date_only_pass_open_ranges() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let trip = Trip {
            id: Uuid::new_v4(),
            name: "Honeymoon in Lisbon".into(),
            status: TripStatus::Planned,
            start_date: None,
            end_date: None,
            high_priority: true,
            client_ids: vec![],
            client_names: vec!["Ana Souza".into()],
            location_tag_ids: vec![],
            agent_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let open = TripFilter {
            search_term: Some("souza".into()),
            high_priority_only: true,
            ..Default::default()
        };
        assert!(open.matches(&trip));

        let bounded = TripFilter {
            date_from: Some(date(2024, 1, 1)),
            ..Default::default()
        };
        assert!(!bounded.matches(&trip));
    }

    #[test]
    fn client_filter_uses_creation_day() {
        let client = Client {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Souza".into(),
            email: Some("ana@example.com".into()),
            phone: None,
            notes: None,
            date_created: Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap(),
            last_updated: Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap(),
        };
        let filter = ClientFilter {
            search_term: Some("ana souza".into()),
            created_from: Some(date(2024, 3, 10)),
            created_to: Some(date(2024, 3, 10)),
        };
        assert!(filter.matches(&client));
    }

    #[test]
    fn combined_booking_criteria_are_idempotent() {
        let bookings = sample_bookings();
        let filter = BookingFilter {
            client_search_term: Some("SMITH".into()),
            vendor_ids: vec![bookings[0].vendor_id, bookings[1].vendor_id, bookings[3].vendor_id],
            date_from: Some(date(2024, 6, 1)),
            date_to: Some(date(2024, 7, 31)),
            booking_statuses: vec![BookingStatus::Pending, BookingStatus::Confirmed],
            commission_statuses: vec![CommissionStatus::Unreceived],
            ..Default::default()
        };

        let once = filter.apply(bookings.clone());
        assert_eq!(once, vec![bookings[1].clone(), bookings[3].clone()]);
        assert_eq!(filter.apply(once.clone()), once);
    }

    #[test]
    fn combined_vendor_criteria_are_idempotent() {
        let (hotel, tour, partner) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut vendors = vec![
            vendor("Budget Inn", 1, "5", "3.5", vec![hotel]),
            vendor("Grand Palace", 5, "15", "4.8", vec![hotel]),
            vendor("City Tours", 3, "10", "4.0", vec![tour]),
            vendor("Palace Suites", 4, "12", "4.5", vec![hotel, tour]),
            vendor("Palace Hostel", 2, "12", "4.9", vec![hotel]),
        ];
        for v in &mut vendors[1..] {
            v.tag_ids = vec![partner];
        }

        let filter = VendorFilter {
            search_term: Some("palace".into()),
            service_types: vec![hotel, tour],
            tags: vec![partner],
            min_price_range: Some(3),
            max_price_range: Some(5),
            min_commission: Some(dec("10")),
            max_commission: Some(dec("15")),
            min_rating: Some(dec("4.5")),
        };

        let once = filter.apply(vendors.clone());
        let names: Vec<&str> = once.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Grand Palace", "Palace Suites"]);
        assert_eq!(filter.apply(once.clone()), once);
    }
}
