// src/models/payout.rs
//
// Los payouts no se persisten como ledger: se recalculan en fresco desde las
// filas fuente (visitas / trabajos completados) en cada llamada.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutPeriod {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
}

// Un ítem de detalle dentro de un payout (una visita o un trabajo)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutItem {
    pub reference_id: Uuid,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutCalculation {
    pub recipient_id: Uuid,
    pub recipient_name: String,
    pub recipient_email: String,
    // Bruto antes de comisión de plataforma
    pub gross_amount: Decimal,
    pub platform_fee: Decimal,
    pub net_amount: Decimal,
    pub period: PayoutPeriod,
    pub items: Vec<PayoutItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutReport {
    pub payouts: Vec<PayoutCalculation>,
    pub total_recipients: usize,
    pub total_amount: Decimal,
    pub period: PayoutPeriod,
}
