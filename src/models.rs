// src/models.rs

pub mod activity;
pub mod auth;
pub mod base;
pub mod crm;
pub mod custom;
pub mod dashboard;
pub mod pipeline;
pub mod tenancy;
pub mod workflow;

pub use activity::{Activity, ActivityKind, CreateActivity, Priority, UpdateActivity};
pub use auth::{CreateUser, LoginOutcome, Session, UpdateUser, User, UserRole};
pub use base::{EntityKind, StoredEntity};
pub use crm::{
    Account, Contact, CreateAccount, CreateContact, CreateDeal, CreateLead, Deal, Lead,
    LeadStatus, UpdateAccount, UpdateContact, UpdateDeal, UpdateLead,
};
pub use custom::{
    AuditAction, AuditLog, CreateCustomField, CreateDashboard, CustomField, Dashboard, FieldType,
};
pub use dashboard::DashboardMetrics;
pub use pipeline::{CreatePipeline, CreatePipelineStage, Pipeline, PipelineStage};
pub use tenancy::{
    Company, CompanySettings, CreateCompany, SubscriptionTier, UpdateCompany,
    UpdateCompanySettings,
};
pub use workflow::{
    CreateWorkflowTemplate, ExecutionStatus, TriggerEvent, UpdateWorkflowTemplate, WorkflowAction,
    WorkflowExecution, WorkflowTemplate, WorkflowTrigger,
};
