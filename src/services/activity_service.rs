// src/services/activity_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::{CrmError, CrmResult};
use crate::db::{ActivityRepository, AuditRepository, CrmRepository, UserRepository};
use crate::events::{CrmEvent, EventBus};
use crate::models::activity::{Activity, ActivityKind, CreateActivity, Priority, UpdateActivity};
use crate::models::auth::Session;
use crate::models::base::{next_timestamp, EntityKind};
use crate::models::custom::AuditAction;

// Tarefas e demais registros de agenda, com validação dos vínculos
// opcionais (lead/contato/negócio) contra as coleções do tenant.
#[derive(Clone)]
pub struct ActivityService {
    activities: ActivityRepository,
    crm: CrmRepository,
    users: UserRepository,
    audit: AuditRepository,
    events: Arc<EventBus>,
}

impl ActivityService {
    pub fn new(
        activities: ActivityRepository,
        crm: CrmRepository,
        users: UserRepository,
        audit: AuditRepository,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            activities,
            crm,
            users,
            audit,
            events,
        }
    }

    fn ensure_links(&self, session: &Session, payload: &CreateActivity) -> CrmResult<()> {
        let company_id = session.company.id;
        if let Some(lead_id) = payload.lead_id {
            if !self.crm.leads.exists(company_id, lead_id)? {
                return Err(CrmError::InvalidReference {
                    field: "lead_id",
                    id: lead_id,
                });
            }
        }
        if let Some(contact_id) = payload.contact_id {
            if !self.crm.contacts.exists(company_id, contact_id)? {
                return Err(CrmError::InvalidReference {
                    field: "contact_id",
                    id: contact_id,
                });
            }
        }
        if let Some(deal_id) = payload.deal_id {
            if !self.crm.deals.exists(company_id, deal_id)? {
                return Err(CrmError::InvalidReference {
                    field: "deal_id",
                    id: deal_id,
                });
            }
        }
        Ok(())
    }

    pub fn list_activities(&self, session: &Session) -> CrmResult<Vec<Activity>> {
        self.activities.repo.list(session.company.id)
    }

    pub fn list_overdue(&self, session: &Session) -> CrmResult<Vec<Activity>> {
        self.activities.list_overdue(session.company.id)
    }

    pub fn get_activity(&self, session: &Session, id: Uuid) -> CrmResult<Activity> {
        self.activities.repo.get(session.company.id, id)
    }

    pub fn create_activity(
        &self,
        session: &Session,
        payload: CreateActivity,
    ) -> CrmResult<Activity> {
        payload.validate()?;
        self.ensure_links(session, &payload)?;
        let changes = serde_json::to_value(&payload)?;

        let owner_id = payload.owner_id.unwrap_or(session.user.id);
        match self.users.find(session.company.id, owner_id)? {
            Some(user) if user.is_active => {}
            _ => {
                return Err(CrmError::InvalidReference {
                    field: "owner_id",
                    id: owner_id,
                })
            }
        }

        let now = Utc::now();
        let activity = Activity {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            kind: payload.kind.unwrap_or(ActivityKind::Task),
            title: payload.title,
            description: payload.description,
            due_date: payload.due_date,
            completed: false,
            completed_at: None,
            priority: payload.priority.unwrap_or(Priority::Medium),
            lead_id: payload.lead_id,
            contact_id: payload.contact_id,
            deal_id: payload.deal_id,
            owner_id,
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.activities.repo.insert(&activity)?;

        self.audit.record(
            session.company.id,
            session.user.id,
            EntityKind::Activity,
            activity.id,
            AuditAction::Created,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityCreated {
            kind: EntityKind::Activity,
            id: activity.id,
            company_id: session.company.id,
        });
        Ok(activity)
    }

    pub fn update_activity(
        &self,
        session: &Session,
        id: Uuid,
        payload: UpdateActivity,
    ) -> CrmResult<Activity> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let mut activity = self.activities.repo.get(session.company.id, id)?;
        if let Some(title) = payload.title {
            activity.title = title;
        }
        if let Some(description) = payload.description {
            activity.description = Some(description);
        }
        if let Some(due_date) = payload.due_date {
            activity.due_date = Some(due_date);
        }
        if let Some(priority) = payload.priority {
            activity.priority = priority;
        }
        if let Some(completed) = payload.completed {
            activity.completed = completed;
            activity.completed_at = completed.then(Utc::now);
        }
        activity.updated_at = next_timestamp(activity.updated_at);
        activity.updated_by = session.user.id;

        self.activities.repo.save(&activity)?;

        self.audit.record(
            session.company.id,
            session.user.id,
            EntityKind::Activity,
            activity.id,
            AuditAction::Updated,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityUpdated {
            kind: EntityKind::Activity,
            id: activity.id,
            company_id: session.company.id,
        });
        Ok(activity)
    }

    pub fn complete_activity(&self, session: &Session, id: Uuid) -> CrmResult<Activity> {
        self.update_activity(
            session,
            id,
            UpdateActivity {
                completed: Some(true),
                ..UpdateActivity::default()
            },
        )
    }
}
