// src/db.rs

pub mod repository;
pub use repository::Repository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::CompanyRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod workflow_repo;
pub use workflow_repo::WorkflowRepository;
pub mod custom_repo;
pub use custom_repo::{AuditRepository, CustomRepository};
