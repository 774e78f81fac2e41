// src/store.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::CrmResult;
use crate::config::AppConfig;
use crate::db::{
    ActivityRepository, AuditRepository, CompanyRepository, CrmRepository, CustomRepository,
    UserRepository, WorkflowRepository,
};
use crate::events::{CrmEvent, EventBus};
use crate::models::activity::{Activity, CreateActivity, UpdateActivity};
use crate::models::auth::{CreateUser, LoginOutcome, Session, UpdateUser, User};
use crate::models::base::EntityKind;
use crate::models::crm::{
    Account, Contact, CreateAccount, CreateContact, CreateDeal, CreateLead, Deal, Lead,
    UpdateAccount, UpdateContact, UpdateDeal, UpdateLead,
};
use crate::models::custom::{
    AuditLog, CreateCustomField, CreateDashboard, CustomField, Dashboard,
};
use crate::models::dashboard::DashboardMetrics;
use crate::models::pipeline::{CreatePipeline, Pipeline};
use crate::models::tenancy::{Company, CreateCompany, UpdateCompany, UpdateCompanySettings};
use crate::models::workflow::{
    CreateWorkflowTemplate, UpdateWorkflowTemplate, WorkflowExecution, WorkflowTemplate,
};
use crate::seed;
use crate::services::{
    ActivityService, AuthService, CrmService, DashboardService, SettingsService, TenancyService,
    WorkflowService,
};
use crate::storage::{check_schema_version, FileBackend, MemoryBackend, StorageBackend};

// A fachada do núcleo: monta o gráfico de dependências (backend →
// repositórios → serviços) e expõe a superfície de uso diário. Todo método
// de conveniência resolve a sessão persistida e falha com
// `AuthenticationRequired` antes do login.
#[derive(Clone)]
pub struct CrmStore {
    events: Arc<EventBus>,
    auth: AuthService,
    tenancy: TenancyService,
    crm: CrmService,
    activities: ActivityService,
    dashboard: DashboardService,
    settings: SettingsService,
    workflows: WorkflowService,
    audit: AuditRepository,
}

impl CrmStore {
    pub fn open(config: &AppConfig) -> CrmResult<Self> {
        let backend: Arc<dyn StorageBackend> = match &config.data_dir {
            Some(dir) => Arc::new(FileBackend::new(dir)?),
            None => Arc::new(MemoryBackend::new()),
        };
        Self::with_backend(backend, config.seed_demo_data)
    }

    // Estado efêmero com carga de demonstração; o caminho dos testes.
    pub fn in_memory() -> CrmResult<Self> {
        Self::with_backend(Arc::new(MemoryBackend::new()), true)
    }

    pub fn with_backend(backend: Arc<dyn StorageBackend>, seed_demo_data: bool) -> CrmResult<Self> {
        check_schema_version(backend.as_ref())?;

        // --- Monta o gráfico de dependências ---
        let events = Arc::new(EventBus::new());
        let companies = CompanyRepository::new(Arc::clone(&backend));
        let users = UserRepository::new(Arc::clone(&backend));
        let crm_repo = CrmRepository::new(Arc::clone(&backend));
        let activity_repo = ActivityRepository::new(Arc::clone(&backend));
        let workflow_repo = WorkflowRepository::new(Arc::clone(&backend));
        let custom_repo = CustomRepository::new(Arc::clone(&backend));
        let audit = AuditRepository::new(Arc::clone(&backend));

        let auth = AuthService::new(
            Arc::clone(&backend),
            users.clone(),
            companies.clone(),
            Arc::clone(&events),
        );
        let tenancy = TenancyService::new(
            companies.clone(),
            users.clone(),
            audit.clone(),
            Arc::clone(&events),
        );
        let crm = CrmService::new(
            crm_repo.clone(),
            users.clone(),
            audit.clone(),
            Arc::clone(&events),
        );
        let activities = ActivityService::new(
            activity_repo.clone(),
            crm_repo.clone(),
            users.clone(),
            audit.clone(),
            Arc::clone(&events),
        );
        let dashboard = DashboardService::new(crm_repo.clone(), activity_repo.clone());
        let settings = SettingsService::new(
            companies.clone(),
            users.clone(),
            custom_repo.clone(),
            audit.clone(),
            Arc::clone(&events),
        );
        let workflows = WorkflowService::new(
            workflow_repo,
            crm_repo,
            activity_repo,
            audit.clone(),
            Arc::clone(&events),
        );

        let store = Self {
            events,
            auth,
            tenancy,
            crm,
            activities,
            dashboard,
            settings,
            workflows,
            audit,
        };

        if seed_demo_data && !companies.any_exists()? {
            seed::load_demo_data(
                &store.tenancy,
                &store.settings,
                &store.crm,
                &store.activities,
                &store.workflows,
            )?;
        }
        Ok(store)
    }

    // =========================================================================
    //  ACESSO AOS SERVIÇOS
    // =========================================================================

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn tenancy(&self) -> &TenancyService {
        &self.tenancy
    }

    pub fn crm(&self) -> &CrmService {
        &self.crm
    }

    pub fn activities(&self) -> &ActivityService {
        &self.activities
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    pub fn workflows(&self) -> &WorkflowService {
        &self.workflows
    }

    // =========================================================================
    //  SESSÃO
    // =========================================================================

    pub fn login(&self, email: &str, password: &str) -> CrmResult<LoginOutcome> {
        self.auth.login(email, password)
    }

    pub fn logout(&self) -> CrmResult<()> {
        self.auth.logout()
    }

    pub fn current_session(&self) -> CrmResult<Option<Session>> {
        self.auth.current_session()
    }

    // Sessão persistida ou `AuthenticationRequired`.
    pub fn session(&self) -> CrmResult<Session> {
        self.auth.require_session()
    }

    pub fn create_company(&self, payload: CreateCompany, admin: CreateUser) -> CrmResult<Session> {
        self.tenancy.create_company(payload, admin)
    }

    // =========================================================================
    //  COLEÇÕES (conveniência sobre a sessão persistida)
    // =========================================================================

    pub fn leads(&self) -> CrmResult<Vec<Lead>> {
        self.crm.list_leads(&self.session()?)
    }

    pub fn get_lead(&self, id: Uuid) -> CrmResult<Lead> {
        self.crm.get_lead(&self.session()?, id)
    }

    pub fn create_lead(&self, payload: CreateLead) -> CrmResult<Lead> {
        self.crm.create_lead(&self.session()?, payload)
    }

    pub fn update_lead(&self, id: Uuid, payload: UpdateLead) -> CrmResult<Lead> {
        self.crm.update_lead(&self.session()?, id, payload)
    }

    pub fn accounts(&self) -> CrmResult<Vec<Account>> {
        self.crm.list_accounts(&self.session()?)
    }

    pub fn create_account(&self, payload: CreateAccount) -> CrmResult<Account> {
        self.crm.create_account(&self.session()?, payload)
    }

    pub fn update_account(&self, id: Uuid, payload: UpdateAccount) -> CrmResult<Account> {
        self.crm.update_account(&self.session()?, id, payload)
    }

    pub fn contacts(&self) -> CrmResult<Vec<Contact>> {
        self.crm.list_contacts(&self.session()?)
    }

    pub fn create_contact(&self, payload: CreateContact) -> CrmResult<Contact> {
        self.crm.create_contact(&self.session()?, payload)
    }

    pub fn update_contact(&self, id: Uuid, payload: UpdateContact) -> CrmResult<Contact> {
        self.crm.update_contact(&self.session()?, id, payload)
    }

    pub fn pipelines(&self) -> CrmResult<Vec<Pipeline>> {
        self.crm.list_pipelines(&self.session()?)
    }

    pub fn create_pipeline(&self, payload: CreatePipeline) -> CrmResult<Pipeline> {
        self.crm.create_pipeline(&self.session()?, payload)
    }

    pub fn deals(&self) -> CrmResult<Vec<Deal>> {
        self.crm.list_deals(&self.session()?)
    }

    pub fn get_deal(&self, id: Uuid) -> CrmResult<Deal> {
        self.crm.get_deal(&self.session()?, id)
    }

    pub fn create_deal(&self, payload: CreateDeal) -> CrmResult<Deal> {
        self.crm.create_deal(&self.session()?, payload)
    }

    pub fn update_deal(&self, id: Uuid, payload: UpdateDeal) -> CrmResult<Deal> {
        self.crm.update_deal(&self.session()?, id, payload)
    }

    pub fn move_deal_stage(&self, deal_id: Uuid, stage_id: Uuid) -> CrmResult<Deal> {
        self.crm.move_deal_stage(&self.session()?, deal_id, stage_id)
    }

    pub fn activities_list(&self) -> CrmResult<Vec<Activity>> {
        self.activities.list_activities(&self.session()?)
    }

    pub fn create_activity(&self, payload: CreateActivity) -> CrmResult<Activity> {
        self.activities.create_activity(&self.session()?, payload)
    }

    pub fn update_activity(&self, id: Uuid, payload: UpdateActivity) -> CrmResult<Activity> {
        self.activities.update_activity(&self.session()?, id, payload)
    }

    pub fn complete_activity(&self, id: Uuid) -> CrmResult<Activity> {
        self.activities.complete_activity(&self.session()?, id)
    }

    // =========================================================================
    //  DASHBOARD, CONFIGURAÇÕES E WORKFLOWS
    // =========================================================================

    pub fn dashboard_metrics(&self) -> CrmResult<DashboardMetrics> {
        self.dashboard.metrics(&self.session()?)
    }

    pub fn current_company(&self) -> CrmResult<Company> {
        self.settings.get_company(&self.session()?)
    }

    pub fn update_company(&self, payload: UpdateCompany) -> CrmResult<Company> {
        self.settings.update_company(&self.session()?, payload)
    }

    pub fn update_company_settings(&self, payload: UpdateCompanySettings) -> CrmResult<Company> {
        self.settings.update_company_settings(&self.session()?, payload)
    }

    pub fn users(&self) -> CrmResult<Vec<User>> {
        self.settings.list_users(&self.session()?)
    }

    pub fn create_user(&self, payload: CreateUser) -> CrmResult<User> {
        self.settings.create_user(&self.session()?, payload)
    }

    pub fn update_user(&self, id: Uuid, payload: UpdateUser) -> CrmResult<User> {
        self.settings.update_user(&self.session()?, id, payload)
    }

    pub fn custom_fields(&self, entity: Option<EntityKind>) -> CrmResult<Vec<CustomField>> {
        self.settings.list_custom_fields(&self.session()?, entity)
    }

    pub fn create_custom_field(&self, payload: CreateCustomField) -> CrmResult<CustomField> {
        self.settings.create_custom_field(&self.session()?, payload)
    }

    pub fn dashboards(&self) -> CrmResult<Vec<Dashboard>> {
        self.settings.list_dashboards(&self.session()?)
    }

    pub fn create_dashboard(&self, payload: CreateDashboard) -> CrmResult<Dashboard> {
        self.settings.create_dashboard(&self.session()?, payload)
    }

    pub fn workflow_templates(&self) -> CrmResult<Vec<WorkflowTemplate>> {
        self.workflows.list_templates(&self.session()?)
    }

    pub fn create_workflow_template(
        &self,
        payload: CreateWorkflowTemplate,
    ) -> CrmResult<WorkflowTemplate> {
        self.workflows.create_template(&self.session()?, payload)
    }

    pub fn update_workflow_template(
        &self,
        id: Uuid,
        payload: UpdateWorkflowTemplate,
    ) -> CrmResult<WorkflowTemplate> {
        self.workflows.update_template(&self.session()?, id, payload)
    }

    pub fn workflow_executions(&self) -> CrmResult<Vec<WorkflowExecution>> {
        self.workflows.list_executions(&self.session()?)
    }

    pub fn dispatch_workflows(&self, event: &CrmEvent) -> CrmResult<Vec<WorkflowExecution>> {
        self.workflows.dispatch(&self.session()?, event)
    }

    pub fn audit_logs(&self) -> CrmResult<Vec<AuditLog>> {
        self.audit.list(self.session()?.company.id)
    }
}
