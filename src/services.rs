// src/services.rs

pub mod activity_service;
pub mod auth;
pub mod crm_service;
pub mod dashboard_service;
pub mod settings_service;
pub mod tenancy_service;
pub mod workflow_service;

pub use activity_service::ActivityService;
pub use auth::AuthService;
pub use crm_service::CrmService;
pub use dashboard_service::DashboardService;
pub use settings_service::SettingsService;
pub use tenancy_service::TenancyService;
pub use workflow_service::WorkflowService;
