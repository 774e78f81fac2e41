// src/services/settings_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::{CrmError, CrmResult};
use crate::db::{AuditRepository, CompanyRepository, CustomRepository, UserRepository};
use crate::events::{CrmEvent, EventBus};
use crate::models::auth::{CreateUser, Session, UpdateUser, User};
use crate::models::base::{next_timestamp, EntityKind};
use crate::models::custom::{
    AuditAction, CreateCustomField, CreateDashboard, CustomField, Dashboard,
};
use crate::models::tenancy::{Company, UpdateCompany, UpdateCompanySettings};

// Configurações do tenant, gestão de usuários e metadados de extensão
// (campos personalizados e dashboards).
#[derive(Clone)]
pub struct SettingsService {
    companies: CompanyRepository,
    users: UserRepository,
    customs: CustomRepository,
    audit: AuditRepository,
    events: Arc<EventBus>,
}

impl SettingsService {
    pub fn new(
        companies: CompanyRepository,
        users: UserRepository,
        customs: CustomRepository,
        audit: AuditRepository,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            companies,
            users,
            customs,
            audit,
            events,
        }
    }

    fn company_updated(&self, session: &Session, changes: serde_json::Value) -> CrmResult<()> {
        self.audit.record(
            session.company.id,
            session.user.id,
            EntityKind::Company,
            session.company.id,
            AuditAction::Updated,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityUpdated {
            kind: EntityKind::Company,
            id: session.company.id,
            company_id: session.company.id,
        });
        Ok(())
    }

    // =========================================================================
    //  EMPRESA
    // =========================================================================

    pub fn get_company(&self, session: &Session) -> CrmResult<Company> {
        self.companies.get(session.company.id)
    }

    pub fn update_company(
        &self,
        session: &Session,
        payload: UpdateCompany,
    ) -> CrmResult<Company> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let mut company = self.companies.get(session.company.id)?;
        if let Some(name) = payload.name {
            company.name = name;
        }
        if let Some(tier) = payload.subscription_tier {
            company.subscription_tier = tier;
        }
        company.updated_at = next_timestamp(company.updated_at);
        company.updated_by = session.user.id;

        self.companies.save(&company)?;
        self.company_updated(session, changes)?;
        Ok(company)
    }

    // Mescla parcial das configurações: campos ausentes são preservados.
    pub fn update_company_settings(
        &self,
        session: &Session,
        payload: UpdateCompanySettings,
    ) -> CrmResult<Company> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let mut company = self.companies.get(session.company.id)?;
        if let Some(currency) = payload.currency {
            company.settings.currency = currency;
        }
        if let Some(timezone) = payload.timezone {
            company.settings.timezone = timezone;
        }
        if let Some(date_format) = payload.date_format {
            company.settings.date_format = date_format;
        }
        if let Some(features) = payload.features {
            company.settings.features = features;
        }
        company.updated_at = next_timestamp(company.updated_at);
        company.updated_by = session.user.id;

        self.companies.save(&company)?;
        self.company_updated(session, changes)?;
        Ok(company)
    }

    // =========================================================================
    //  USUÁRIOS
    // =========================================================================

    pub fn list_users(&self, session: &Session) -> CrmResult<Vec<User>> {
        self.users.list(session.company.id)
    }

    pub fn create_user(&self, session: &Session, payload: CreateUser) -> CrmResult<User> {
        payload.validate()?;
        if self.users.email_taken(&payload.email, None)? {
            return Err(CrmError::EmailAlreadyExists);
        }
        let changes = serde_json::to_value(&payload)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            email: payload.email,
            full_name: payload.full_name,
            role: payload.role,
            permissions: payload.permissions.unwrap_or_default(),
            is_active: true,
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.users.insert(&user)?;

        self.audit.record(
            session.company.id,
            session.user.id,
            EntityKind::User,
            user.id,
            AuditAction::Created,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityCreated {
            kind: EntityKind::User,
            id: user.id,
            company_id: session.company.id,
        });
        Ok(user)
    }

    pub fn update_user(
        &self,
        session: &Session,
        id: Uuid,
        payload: UpdateUser,
    ) -> CrmResult<User> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let mut user = self.users.get(session.company.id, id)?;
        if let Some(email) = payload.email {
            if self.users.email_taken(&email, Some(user.id))? {
                return Err(CrmError::EmailAlreadyExists);
            }
            user.email = email;
        }
        if let Some(full_name) = payload.full_name {
            user.full_name = full_name;
        }
        if let Some(role) = payload.role {
            user.role = role;
        }
        if let Some(permissions) = payload.permissions {
            user.permissions = permissions;
        }
        if let Some(is_active) = payload.is_active {
            user.is_active = is_active;
        }
        user.updated_at = next_timestamp(user.updated_at);
        user.updated_by = session.user.id;

        self.users.save(&user)?;

        self.audit.record(
            session.company.id,
            session.user.id,
            EntityKind::User,
            user.id,
            AuditAction::Updated,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityUpdated {
            kind: EntityKind::User,
            id: user.id,
            company_id: session.company.id,
        });
        Ok(user)
    }

    // Usuários nunca são removidos fisicamente.
    pub fn deactivate_user(&self, session: &Session, id: Uuid) -> CrmResult<User> {
        self.update_user(
            session,
            id,
            UpdateUser {
                is_active: Some(false),
                ..UpdateUser::default()
            },
        )
    }

    // =========================================================================
    //  CAMPOS PERSONALIZADOS
    // =========================================================================

    pub fn list_custom_fields(
        &self,
        session: &Session,
        entity: Option<EntityKind>,
    ) -> CrmResult<Vec<CustomField>> {
        let fields = self.customs.fields.list(session.company.id)?;
        Ok(match entity {
            None => fields,
            Some(kind) => fields.into_iter().filter(|f| f.entity == kind).collect(),
        })
    }

    pub fn create_custom_field(
        &self,
        session: &Session,
        payload: CreateCustomField,
    ) -> CrmResult<CustomField> {
        payload.validate()?;
        if self
            .customs
            .key_taken(session.company.id, payload.entity, &payload.key_name)?
        {
            return Err(CrmError::UniqueConstraintViolation(format!(
                "A chave '{}' já existe para {}.",
                payload.key_name, payload.entity
            )));
        }
        let changes = serde_json::to_value(&payload)?;

        let now = Utc::now();
        let field = CustomField {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            entity: payload.entity,
            name: payload.name,
            key_name: payload.key_name,
            field_type: payload.field_type,
            options: payload.options,
            is_required: payload.is_required.unwrap_or(false),
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.customs.fields.insert(&field)?;

        self.audit.record(
            session.company.id,
            session.user.id,
            EntityKind::CustomField,
            field.id,
            AuditAction::Created,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityCreated {
            kind: EntityKind::CustomField,
            id: field.id,
            company_id: session.company.id,
        });
        Ok(field)
    }

    // =========================================================================
    //  DASHBOARDS
    // =========================================================================

    pub fn list_dashboards(&self, session: &Session) -> CrmResult<Vec<Dashboard>> {
        self.customs.dashboards.list(session.company.id)
    }

    pub fn create_dashboard(
        &self,
        session: &Session,
        payload: CreateDashboard,
    ) -> CrmResult<Dashboard> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let now = Utc::now();
        let dashboard = Dashboard {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            name: payload.name,
            widgets: payload.widgets.unwrap_or(serde_json::json!([])),
            is_default: payload.is_default.unwrap_or(false),
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.customs.dashboards.insert(&dashboard)?;

        self.audit.record(
            session.company.id,
            session.user.id,
            EntityKind::Dashboard,
            dashboard.id,
            AuditAction::Created,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityCreated {
            kind: EntityKind::Dashboard,
            id: dashboard.id,
            company_id: session.company.id,
        });
        Ok(dashboard)
    }
}
