// src/services/crm_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::{CrmError, CrmResult};
use crate::db::{AuditRepository, CrmRepository, UserRepository};
use crate::events::{CrmEvent, EventBus};
use crate::models::auth::Session;
use crate::models::base::{next_timestamp, EntityKind};
use crate::models::crm::{
    Account, Contact, CreateAccount, CreateContact, CreateDeal, CreateLead, Deal, Lead,
    LeadStatus, UpdateAccount, UpdateContact, UpdateDeal, UpdateLead,
};
use crate::models::custom::AuditAction;
use crate::models::pipeline::{CreatePipeline, Pipeline, PipelineStage};

// Regras de negócio das coleções centrais: carimbo de criação, mesclagem
// parcial nas atualizações, validação referencial (dono, conta, contato,
// pipeline/estágio) e publicação de eventos + auditoria a cada mutação.
// Toda operação recebe a sessão explicitamente; o `company_id` do registro
// vem sempre dela.
#[derive(Clone)]
pub struct CrmService {
    repo: CrmRepository,
    users: UserRepository,
    audit: AuditRepository,
    events: Arc<EventBus>,
}

impl CrmService {
    pub fn new(
        repo: CrmRepository,
        users: UserRepository,
        audit: AuditRepository,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            repo,
            users,
            audit,
            events,
        }
    }

    // O dono precisa ser um usuário ativo da empresa da sessão.
    fn ensure_owner(&self, session: &Session, owner_id: Uuid) -> CrmResult<()> {
        match self.users.find(session.company.id, owner_id)? {
            Some(user) if user.is_active => Ok(()),
            _ => Err(CrmError::InvalidReference {
                field: "owner_id",
                id: owner_id,
            }),
        }
    }

    fn ensure_account(&self, session: &Session, account_id: Uuid) -> CrmResult<()> {
        if self.repo.accounts.exists(session.company.id, account_id)? {
            Ok(())
        } else {
            Err(CrmError::InvalidReference {
                field: "account_id",
                id: account_id,
            })
        }
    }

    fn ensure_contact(&self, session: &Session, contact_id: Uuid) -> CrmResult<()> {
        if self.repo.contacts.exists(session.company.id, contact_id)? {
            Ok(())
        } else {
            Err(CrmError::InvalidReference {
                field: "contact_id",
                id: contact_id,
            })
        }
    }

    // O estágio tem de pertencer ao pipeline indicado (e ambos ao tenant).
    fn resolve_stage(
        &self,
        session: &Session,
        pipeline_id: Uuid,
        stage_id: Uuid,
    ) -> CrmResult<PipelineStage> {
        let Some(pipeline) = self.repo.pipelines.find(session.company.id, pipeline_id)? else {
            return Err(CrmError::InvalidReference {
                field: "pipeline_id",
                id: pipeline_id,
            });
        };
        pipeline
            .stage(stage_id)
            .cloned()
            .ok_or(CrmError::InvalidReference {
                field: "stage_id",
                id: stage_id,
            })
    }

    fn created(&self, session: &Session, kind: EntityKind, id: Uuid, changes: serde_json::Value) -> CrmResult<()> {
        self.audit.record(
            session.company.id,
            session.user.id,
            kind,
            id,
            AuditAction::Created,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityCreated {
            kind,
            id,
            company_id: session.company.id,
        });
        Ok(())
    }

    fn updated(&self, session: &Session, kind: EntityKind, id: Uuid, changes: serde_json::Value) -> CrmResult<()> {
        self.audit.record(
            session.company.id,
            session.user.id,
            kind,
            id,
            AuditAction::Updated,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityUpdated {
            kind,
            id,
            company_id: session.company.id,
        });
        Ok(())
    }

    // =========================================================================
    //  LEADS
    // =========================================================================

    pub fn list_leads(&self, session: &Session) -> CrmResult<Vec<Lead>> {
        self.repo.leads.list(session.company.id)
    }

    pub fn get_lead(&self, session: &Session, id: Uuid) -> CrmResult<Lead> {
        self.repo.leads.get(session.company.id, id)
    }

    pub fn create_lead(&self, session: &Session, payload: CreateLead) -> CrmResult<Lead> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let owner_id = payload.owner_id.unwrap_or(session.user.id);
        self.ensure_owner(session, owner_id)?;

        let now = Utc::now();
        let lead = Lead {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            source: payload.source,
            status: payload.status.unwrap_or(LeadStatus::New),
            score: payload.score.unwrap_or(0),
            estimated_value: payload.estimated_value,
            owner_id,
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.repo.leads.insert(&lead)?;
        self.created(session, EntityKind::Lead, lead.id, changes)?;
        Ok(lead)
    }

    // Mescla apenas os campos presentes no payload; os demais ficam como
    // estão. `updated_at` cresce estritamente a cada chamada.
    pub fn update_lead(&self, session: &Session, id: Uuid, payload: UpdateLead) -> CrmResult<Lead> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let mut lead = self.repo.leads.get(session.company.id, id)?;
        if let Some(owner_id) = payload.owner_id {
            self.ensure_owner(session, owner_id)?;
            lead.owner_id = owner_id;
        }
        if let Some(name) = payload.name {
            lead.name = name;
        }
        if let Some(email) = payload.email {
            lead.email = Some(email);
        }
        if let Some(phone) = payload.phone {
            lead.phone = Some(phone);
        }
        if let Some(source) = payload.source {
            lead.source = Some(source);
        }
        if let Some(status) = payload.status {
            lead.status = status;
        }
        if let Some(score) = payload.score {
            lead.score = score;
        }
        if let Some(value) = payload.estimated_value {
            lead.estimated_value = Some(value);
        }
        lead.updated_at = next_timestamp(lead.updated_at);
        lead.updated_by = session.user.id;

        self.repo.leads.save(&lead)?;
        self.updated(session, EntityKind::Lead, lead.id, changes)?;
        Ok(lead)
    }

    // =========================================================================
    //  ACCOUNTS
    // =========================================================================

    pub fn list_accounts(&self, session: &Session) -> CrmResult<Vec<Account>> {
        self.repo.accounts.list(session.company.id)
    }

    pub fn get_account(&self, session: &Session, id: Uuid) -> CrmResult<Account> {
        self.repo.accounts.get(session.company.id, id)
    }

    pub fn create_account(&self, session: &Session, payload: CreateAccount) -> CrmResult<Account> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            name: payload.name,
            industry: payload.industry,
            website: payload.website,
            phone: payload.phone,
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.repo.accounts.insert(&account)?;
        self.created(session, EntityKind::Account, account.id, changes)?;
        Ok(account)
    }

    pub fn update_account(
        &self,
        session: &Session,
        id: Uuid,
        payload: UpdateAccount,
    ) -> CrmResult<Account> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let mut account = self.repo.accounts.get(session.company.id, id)?;
        if let Some(name) = payload.name {
            account.name = name;
        }
        if let Some(industry) = payload.industry {
            account.industry = Some(industry);
        }
        if let Some(website) = payload.website {
            account.website = Some(website);
        }
        if let Some(phone) = payload.phone {
            account.phone = Some(phone);
        }
        account.updated_at = next_timestamp(account.updated_at);
        account.updated_by = session.user.id;

        self.repo.accounts.save(&account)?;
        self.updated(session, EntityKind::Account, account.id, changes)?;
        Ok(account)
    }

    // =========================================================================
    //  CONTACTS
    // =========================================================================

    pub fn list_contacts(&self, session: &Session) -> CrmResult<Vec<Contact>> {
        self.repo.contacts.list(session.company.id)
    }

    pub fn get_contact(&self, session: &Session, id: Uuid) -> CrmResult<Contact> {
        self.repo.contacts.get(session.company.id, id)
    }

    pub fn create_contact(&self, session: &Session, payload: CreateContact) -> CrmResult<Contact> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        if let Some(account_id) = payload.account_id {
            self.ensure_account(session, account_id)?;
        }

        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone: payload.phone,
            title: payload.title,
            account_id: payload.account_id,
            is_primary: payload.is_primary.unwrap_or(false),
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.repo.contacts.insert(&contact)?;
        self.created(session, EntityKind::Contact, contact.id, changes)?;
        Ok(contact)
    }

    pub fn update_contact(
        &self,
        session: &Session,
        id: Uuid,
        payload: UpdateContact,
    ) -> CrmResult<Contact> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let mut contact = self.repo.contacts.get(session.company.id, id)?;
        if let Some(account_id) = payload.account_id {
            self.ensure_account(session, account_id)?;
            contact.account_id = Some(account_id);
        }
        if let Some(first_name) = payload.first_name {
            contact.first_name = first_name;
        }
        if let Some(last_name) = payload.last_name {
            contact.last_name = last_name;
        }
        if let Some(email) = payload.email {
            contact.email = Some(email);
        }
        if let Some(phone) = payload.phone {
            contact.phone = Some(phone);
        }
        if let Some(title) = payload.title {
            contact.title = Some(title);
        }
        if let Some(is_primary) = payload.is_primary {
            contact.is_primary = is_primary;
        }
        contact.updated_at = next_timestamp(contact.updated_at);
        contact.updated_by = session.user.id;

        self.repo.contacts.save(&contact)?;
        self.updated(session, EntityKind::Contact, contact.id, changes)?;
        Ok(contact)
    }

    // =========================================================================
    //  PIPELINES
    // =========================================================================

    pub fn list_pipelines(&self, session: &Session) -> CrmResult<Vec<Pipeline>> {
        self.repo.pipelines.list(session.company.id)
    }

    pub fn get_pipeline(&self, session: &Session, id: Uuid) -> CrmResult<Pipeline> {
        self.repo.pipelines.get(session.company.id, id)
    }

    // Invariante: exatamente um estágio closed-won e um closed-lost.
    pub fn create_pipeline(
        &self,
        session: &Session,
        payload: CreatePipeline,
    ) -> CrmResult<Pipeline> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let won = payload.stages.iter().filter(|s| s.is_closed_won).count();
        let lost = payload.stages.iter().filter(|s| s.is_closed_lost).count();
        if won != 1 || lost != 1 {
            return Err(CrmError::ValidationMessage(
                "Um pipeline precisa de exatamente um estágio closed-won e um closed-lost."
                    .to_string(),
            ));
        }

        let now = Utc::now();
        let stages = payload
            .stages
            .into_iter()
            .enumerate()
            .map(|(i, s)| PipelineStage {
                id: Uuid::new_v4(),
                name: s.name,
                sort_order: i as i32,
                probability: s.probability,
                is_closed_won: s.is_closed_won,
                is_closed_lost: s.is_closed_lost,
            })
            .collect();

        let pipeline = Pipeline {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            name: payload.name,
            is_default: payload.is_default.unwrap_or(false),
            stages,
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.repo.pipelines.insert(&pipeline)?;
        self.created(session, EntityKind::Pipeline, pipeline.id, changes)?;
        Ok(pipeline)
    }

    // =========================================================================
    //  DEALS
    // =========================================================================

    pub fn list_deals(&self, session: &Session) -> CrmResult<Vec<Deal>> {
        self.repo.deals.list(session.company.id)
    }

    pub fn get_deal(&self, session: &Session, id: Uuid) -> CrmResult<Deal> {
        self.repo.deals.get(session.company.id, id)
    }

    pub fn create_deal(&self, session: &Session, payload: CreateDeal) -> CrmResult<Deal> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let stage = self.resolve_stage(session, payload.pipeline_id, payload.stage_id)?;
        let owner_id = payload.owner_id.unwrap_or(session.user.id);
        self.ensure_owner(session, owner_id)?;
        if let Some(account_id) = payload.account_id {
            self.ensure_account(session, account_id)?;
        }
        if let Some(contact_id) = payload.contact_id {
            self.ensure_contact(session, contact_id)?;
        }

        let now = Utc::now();
        let deal = Deal {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            title: payload.title,
            pipeline_id: payload.pipeline_id,
            stage_id: payload.stage_id,
            value: payload.value,
            // Sem probabilidade explícita, herda o peso do estágio.
            probability: payload.probability.unwrap_or(stage.probability),
            expected_close_date: payload.expected_close_date,
            owner_id,
            account_id: payload.account_id,
            contact_id: payload.contact_id,
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.repo.deals.insert(&deal)?;
        self.created(session, EntityKind::Deal, deal.id, changes)?;
        Ok(deal)
    }

    pub fn update_deal(&self, session: &Session, id: Uuid, payload: UpdateDeal) -> CrmResult<Deal> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let mut deal = self.repo.deals.get(session.company.id, id)?;
        if let Some(stage_id) = payload.stage_id {
            self.resolve_stage(session, deal.pipeline_id, stage_id)?;
            deal.stage_id = stage_id;
        }
        if let Some(owner_id) = payload.owner_id {
            self.ensure_owner(session, owner_id)?;
            deal.owner_id = owner_id;
        }
        if let Some(account_id) = payload.account_id {
            self.ensure_account(session, account_id)?;
            deal.account_id = Some(account_id);
        }
        if let Some(contact_id) = payload.contact_id {
            self.ensure_contact(session, contact_id)?;
            deal.contact_id = Some(contact_id);
        }
        if let Some(title) = payload.title {
            deal.title = title;
        }
        if let Some(value) = payload.value {
            deal.value = value;
        }
        if let Some(probability) = payload.probability {
            deal.probability = probability;
        }
        if let Some(date) = payload.expected_close_date {
            deal.expected_close_date = Some(date);
        }
        deal.updated_at = next_timestamp(deal.updated_at);
        deal.updated_by = session.user.id;

        self.repo.deals.save(&deal)?;
        self.updated(session, EntityKind::Deal, deal.id, changes)?;
        Ok(deal)
    }

    // Equivalente do arrastar-e-soltar do kanban: transição de estágio com
    // validação e sincronização da probabilidade com o novo estágio.
    pub fn move_deal_stage(
        &self,
        session: &Session,
        deal_id: Uuid,
        stage_id: Uuid,
    ) -> CrmResult<Deal> {
        let mut deal = self.repo.deals.get(session.company.id, deal_id)?;
        let stage = self.resolve_stage(session, deal.pipeline_id, stage_id)?;

        deal.stage_id = stage.id;
        deal.probability = stage.probability;
        deal.updated_at = next_timestamp(deal.updated_at);
        deal.updated_by = session.user.id;

        self.repo.deals.save(&deal)?;
        self.updated(
            session,
            EntityKind::Deal,
            deal.id,
            serde_json::json!({ "stageId": stage.id, "stageName": stage.name }),
        )?;
        Ok(deal)
    }
}
