// src/models/report.rs

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use utoipa::ToSchema;

use crate::models::booking::CommissionStatus;

// Relatório de comissões sobre as reservas filtradas
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionReport {
    pub booking_count: usize,
    pub total_cost: Decimal,
    pub total_commission: Decimal,
    pub by_status: Vec<CommissionStatusTotal>,
    pub agents: Vec<AgentCommission>,
    pub total_agent_share: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionStatusTotal {
    pub status: CommissionStatus,
    pub booking_count: usize,
    pub total_commission: Decimal,
}

// Parte do agente: comissão das reservas das viagens dele * percentual do perfil
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentCommission {
    pub agent_id: Uuid,
    pub agent_name: String,
    pub booking_count: usize,
    pub total_commission: Decimal,
    pub agent_commission_percentage: Option<Decimal>,
    pub agent_share: Decimal, // zero quando o perfil não tem percentual
}
