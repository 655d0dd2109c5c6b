// src/services/commission.rs

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{booking::BookingPreview, vendor::VendorRate},
};

/// Comissão em valor: `cost * rate_percent / 100`. Nunca arredonda.
pub fn compute_commission(cost: Decimal, rate_percent: Decimal) -> Decimal {
    cost * rate_percent / Decimal::ONE_HUNDRED
}

/// Arredondamento de exibição (2 casas). Não usar antes de gravar.
pub fn display_commission(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Tipos de serviço selecionáveis para um fornecedor.
/// Fornecedor sem nenhum tipo vinculado libera todos.
pub fn allowed_service_types(all: &[Uuid], vendor_service_types: &[Uuid]) -> Vec<Uuid> {
    if vendor_service_types.is_empty() {
        return all.to_vec();
    }
    all.iter()
        .filter(|id| vendor_service_types.contains(id))
        .copied()
        .collect()
}

/// De onde vem a taxa configurada de um fornecedor.
#[async_trait]
pub trait VendorRateSource: Send {
    async fn vendor_rate(&mut self, vendor_id: Uuid) -> Result<VendorRate, AppError>;
}

// =========================================================================
//  ESTADO DO FORMULÁRIO DE RESERVA
// =========================================================================

/// Estado do formulário de reserva.
///
/// Taxa e tipos de serviço disponíveis são derivados do fornecedor; só mudam
/// pelo evento `on_vendor_selected`. O valor da comissão é sempre recalculado
/// a partir do custo e da taxa atuais.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    vendor_id: Option<Uuid>,
    service_type_id: Option<Uuid>,
    cost: Decimal,
    commission_rate: Decimal,
    all_service_types: Vec<Uuid>,
    available_service_types: Vec<Uuid>,
}

impl BookingDraft {
    pub fn new(all_service_types: Vec<Uuid>) -> Self {
        Self {
            vendor_id: None,
            service_type_id: None,
            cost: Decimal::ZERO,
            commission_rate: Decimal::ZERO,
            available_service_types: all_service_types.clone(),
            all_service_types,
        }
    }

    pub fn cost(&self) -> Decimal {
        self.cost
    }

    pub fn commission_rate(&self) -> Decimal {
        self.commission_rate
    }

    pub fn set_cost(&mut self, cost: Decimal) {
        self.cost = cost;
    }

    pub fn commission_amount(&self) -> Decimal {
        compute_commission(self.cost, self.commission_rate)
    }

    /// Busca a taxa do fornecedor e recalcula os campos dependentes.
    ///
    /// Em caso de falha o rascunho fica como estava e o erro é devolvido.
    pub async fn on_vendor_selected<S>(&mut self, source: &mut S, vendor_id: Uuid) -> Result<(), AppError>
    where
        S: VendorRateSource + ?Sized,
    {
        match source.vendor_rate(vendor_id).await {
            Ok(rate) => {
                self.apply_vendor(&rate);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Falha ao buscar a taxa do fornecedor {}: {}", vendor_id, e);
                Err(e)
            }
        }
    }

    /// Parte pura do evento: a taxa e as opções passam a ser função do fornecedor.
    pub fn apply_vendor(&mut self, rate: &VendorRate) {
        self.vendor_id = Some(rate.vendor_id);
        self.commission_rate = rate.commission_rate;
        self.available_service_types = allowed_service_types(&self.all_service_types, &rate.service_type_ids);

        if let Some(selected) = self.service_type_id {
            if !self.available_service_types.contains(&selected) {
                self.service_type_id = None;
            }
        }
    }

    pub fn select_service_type(&mut self, service_type_id: Uuid) -> Result<(), AppError> {
        if !self.all_service_types.contains(&service_type_id) {
            return Err(AppError::ResourceNotFound("ServiceType".into()));
        }
        if !self.available_service_types.contains(&service_type_id) {
            return Err(AppError::ServiceTypeNotOffered);
        }
        self.service_type_id = Some(service_type_id);
        Ok(())
    }

    pub fn preview(&self) -> BookingPreview {
        let amount = self.commission_amount();
        BookingPreview {
            vendor_id: self.vendor_id,
            service_type_id: self.service_type_id,
            available_service_type_ids: self.available_service_types.clone(),
            cost: self.cost,
            commission_rate: self.commission_rate,
            commission_amount: amount,
            commission_display: format!("{:.2}", display_commission(amount)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn computes_commission_without_rounding() {
        assert_eq!(compute_commission(dec("1000"), dec("10")), dec("100"));
        assert_eq!(compute_commission(dec("0"), dec("50")), Decimal::ZERO);
        assert_eq!(compute_commission(dec("250.5"), dec("7.25")), dec("18.16125"));
    }

    #[test]
    fn display_rounds_to_two_places() {
        assert_eq!(display_commission(dec("18.16125")), dec("18.16"));
        assert_eq!(display_commission(dec("0.005")), dec("0.01"));
    }

    #[test]
    fn vendor_without_service_types_allows_all() {
        let all = vec![Uuid::new_v4(), Uuid::new_v4()];
        assert_eq!(allowed_service_types(&all, &[]), all);
        assert_eq!(allowed_service_types(&all, &[all[1]]), vec![all[1]]);
    }

    struct FakeRates(HashMap<Uuid, VendorRate>);

    #[async_trait]
    impl VendorRateSource for FakeRates {
        async fn vendor_rate(&mut self, vendor_id: Uuid) -> Result<VendorRate, AppError> {
            self.0
                .get(&vendor_id)
                .cloned()
                .ok_or_else(|| AppError::ResourceNotFound("Vendor".into()))
        }
    }

    struct Unreachable;

    #[async_trait]
    impl VendorRateSource for Unreachable {
        async fn vendor_rate(&mut self, _vendor_id: Uuid) -> Result<VendorRate, AppError> {
            Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut))
        }
    }

    fn fixture() -> (Vec<Uuid>, VendorRate, VendorRate, FakeRates) {
        let hotel = Uuid::new_v4();
        let tour = Uuid::new_v4();
        let cruise = Uuid::new_v4();
        let tagged = VendorRate {
            vendor_id: Uuid::new_v4(),
            commission_rate: dec("12.5"),
            service_type_ids: vec![hotel, tour],
        };
        let untagged = VendorRate {
            vendor_id: Uuid::new_v4(),
            commission_rate: dec("8"),
            service_type_ids: vec![],
        };
        let source = FakeRates(HashMap::from([
            (tagged.vendor_id, tagged.clone()),
            (untagged.vendor_id, untagged.clone()),
        ]));
        (vec![hotel, tour, cruise], tagged, untagged, source)
    }

    #[tokio::test]
    async fn selecting_vendor_copies_rate_and_narrows_service_types() {
        let (all, tagged, _, mut source) = fixture();
        let mut draft = BookingDraft::new(all.clone());
        draft.set_cost(dec("2000"));

        draft.on_vendor_selected(&mut source, tagged.vendor_id).await.unwrap();

        let preview = draft.preview();
        assert_eq!(preview.vendor_id, Some(tagged.vendor_id));
        assert_eq!(draft.commission_rate(), dec("12.5"));
        assert_eq!(preview.available_service_type_ids, &all[..2]);
        assert_eq!(draft.commission_amount(), dec("250"));
    }

    #[tokio::test]
    async fn changing_vendor_drops_service_type_it_does_not_offer() {
        let (all, tagged, untagged, mut source) = fixture();
        let mut draft = BookingDraft::new(all.clone());

        draft.on_vendor_selected(&mut source, untagged.vendor_id).await.unwrap();
        draft.select_service_type(all[2]).unwrap();
        assert_eq!(draft.preview().available_service_type_ids, all);

        draft.on_vendor_selected(&mut source, tagged.vendor_id).await.unwrap();
        assert_eq!(draft.preview().service_type_id, None);
        assert!(matches!(
            draft.select_service_type(all[2]),
            Err(AppError::ServiceTypeNotOffered)
        ));
        draft.select_service_type(all[0]).unwrap();
        assert_eq!(draft.preview().service_type_id, Some(all[0]));
    }

    #[tokio::test]
    async fn failed_rate_fetch_keeps_previous_state() {
        let (all, tagged, _, mut source) = fixture();
        let mut draft = BookingDraft::new(all);
        draft.on_vendor_selected(&mut source, tagged.vendor_id).await.unwrap();
        let before = draft.clone();

        let result = draft.on_vendor_selected(&mut Unreachable, Uuid::new_v4()).await;

        assert!(result.is_err());
        assert_eq!(draft, before);
    }

    #[tokio::test]
    async fn amount_follows_every_cost_change() {
        let (all, tagged, _, mut source) = fixture();
        let mut draft = BookingDraft::new(all);
        draft.on_vendor_selected(&mut source, tagged.vendor_id).await.unwrap();

        draft.set_cost(dec("100"));
        assert_eq!(draft.commission_amount(), dec("12.5"));
        draft.set_cost(dec("250.5"));
        assert_eq!(draft.commission_amount(), dec("31.3125"));
        assert_eq!(draft.preview().commission_display, "31.31");
    }

    #[test]
    fn unknown_service_type_is_not_found() {
        let mut draft = BookingDraft::new(vec![Uuid::new_v4()]);
        assert!(matches!(
            draft.select_service_type(Uuid::new_v4()),
            Err(AppError::ResourceNotFound(_))
        ));
    }
}
