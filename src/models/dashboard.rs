// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;

// Agregados derivados das coleções do tenant. Calculados sob demanda por
// uma varredura síncrona de leads + negócios + estágios.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_leads: u64,
    // Leads que avançaram até (ao menos) a qualificação e não foram perdidos.
    pub qualified_leads: u64,
    // Percentual de leads fechados como ganhos.
    pub conversion_rate: f64,

    pub total_deals: u64,
    pub total_deal_value: Decimal,
    pub avg_deal_value: Decimal,
    // Soma dos negócios cujo estágio tem a flag closed-won.
    pub won_deal_value: Decimal,

    pub open_activities: u64,
}
