// src/services/dashboard_service.rs

use std::collections::HashSet;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::CrmResult;
use crate::db::{ActivityRepository, CrmRepository};
use crate::models::auth::Session;
use crate::models::crm::LeadStatus;
use crate::models::dashboard::DashboardMetrics;

// Agregados do dashboard: varredura pura e síncrona sobre as coleções do
// tenant, cruzando negócios com as flags closed-won dos estágios.
#[derive(Clone)]
pub struct DashboardService {
    crm: CrmRepository,
    activities: ActivityRepository,
}

impl DashboardService {
    pub fn new(crm: CrmRepository, activities: ActivityRepository) -> Self {
        Self { crm, activities }
    }

    pub fn metrics(&self, session: &Session) -> CrmResult<DashboardMetrics> {
        let company_id = session.company.id;
        let leads = self.crm.leads.list(company_id)?;
        let deals = self.crm.deals.list(company_id)?;
        let pipelines = self.crm.pipelines.list(company_id)?;
        let activities = self.activities.repo.list(company_id)?;

        let won_stages: HashSet<Uuid> = pipelines
            .iter()
            .flat_map(|p| p.stages.iter())
            .filter(|s| s.is_closed_won)
            .map(|s| s.id)
            .collect();

        let total_leads = leads.len() as u64;
        let qualified_leads = leads
            .iter()
            .filter(|l| {
                matches!(
                    l.status,
                    LeadStatus::Qualified
                        | LeadStatus::Proposal
                        | LeadStatus::Negotiation
                        | LeadStatus::ClosedWon
                )
            })
            .count() as u64;
        let won_leads = leads
            .iter()
            .filter(|l| l.status == LeadStatus::ClosedWon)
            .count() as u64;
        let conversion_rate = if total_leads == 0 {
            0.0
        } else {
            (won_leads as f64 / total_leads as f64) * 100.0
        };

        let total_deals = deals.len() as u64;
        let total_deal_value: Decimal = deals.iter().map(|d| d.value).sum();
        let avg_deal_value = if total_deals == 0 {
            Decimal::ZERO
        } else {
            total_deal_value / Decimal::from(total_deals)
        };
        let won_deal_value: Decimal = deals
            .iter()
            .filter(|d| won_stages.contains(&d.stage_id))
            .map(|d| d.value)
            .sum();

        let open_activities = activities.iter().filter(|a| !a.completed).count() as u64;

        Ok(DashboardMetrics {
            total_leads,
            qualified_leads,
            conversion_rate,
            total_deals,
            total_deal_value,
            avg_deal_value,
            won_deal_value,
            open_activities,
        })
    }
}
