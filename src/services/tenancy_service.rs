// src/services/tenancy_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::{CrmError, CrmResult};
use crate::db::{AuditRepository, CompanyRepository, UserRepository};
use crate::events::{CrmEvent, EventBus};
use crate::models::auth::{CreateUser, Session, User};
use crate::models::base::EntityKind;
use crate::models::custom::AuditAction;
use crate::models::tenancy::{Company, CreateCompany, SubscriptionTier};

// Registro de tenants: cria a raiz (Company) e seu primeiro usuário num
// passo só, sem exigir sessão — é o fluxo de bootstrap/onboarding.
// A sessão retornada NÃO é persistida; login continua sendo o único
// caminho que grava o par de continuidade.
#[derive(Clone)]
pub struct TenancyService {
    companies: CompanyRepository,
    users: UserRepository,
    audit: AuditRepository,
    events: Arc<EventBus>,
}

impl TenancyService {
    pub fn new(
        companies: CompanyRepository,
        users: UserRepository,
        audit: AuditRepository,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            companies,
            users,
            audit,
            events,
        }
    }

    pub fn create_company(
        &self,
        payload: CreateCompany,
        admin: CreateUser,
    ) -> CrmResult<Session> {
        payload.validate()?;
        admin.validate()?;

        if self.users.email_taken(&admin.email, None)? {
            return Err(CrmError::EmailAlreadyExists);
        }

        // Ids gerados antes para que os carimbos de autor fechem o ciclo:
        // a empresa é criada pelo admin, o admin por ele mesmo.
        let company_id = Uuid::new_v4();
        let admin_id = Uuid::new_v4();
        let now = Utc::now();

        let company = Company {
            id: company_id,
            name: payload.name,
            settings: payload.settings.unwrap_or_default(),
            subscription_tier: payload.subscription_tier.unwrap_or(SubscriptionTier::Free),
            created_at: now,
            updated_at: now,
            created_by: admin_id,
            updated_by: admin_id,
            deleted_at: None,
        };
        let user = User {
            id: admin_id,
            company_id,
            email: admin.email,
            full_name: admin.full_name,
            role: admin.role,
            permissions: admin.permissions.unwrap_or_default(),
            is_active: true,
            created_at: now,
            updated_at: now,
            created_by: admin_id,
            updated_by: admin_id,
            deleted_at: None,
        };

        self.companies.insert(&company)?;
        self.users.insert(&user)?;

        self.audit.record(
            company_id,
            admin_id,
            EntityKind::Company,
            company_id,
            AuditAction::Created,
            serde_json::json!({ "name": company.name }),
        )?;
        self.events.publish(&CrmEvent::EntityCreated {
            kind: EntityKind::Company,
            id: company_id,
            company_id,
        });
        self.events.publish(&CrmEvent::EntityCreated {
            kind: EntityKind::User,
            id: admin_id,
            company_id,
        });
        tracing::info!(company = %company.name, admin = %user.email, "Tenant criado");

        Ok(Session { user, company })
    }
}
