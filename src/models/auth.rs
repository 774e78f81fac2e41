// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::base::{stored_entity, EntityKind};
use crate::models::tenancy::Company;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    CompanyAdmin,
    Manager,
    SalesRep,
    User,
}

// Um usuário pertence a exatamente uma Company. Nunca é removido
// fisicamente: desativação vira `is_active = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(User, "crm_users", EntityKind::User);

// A sessão é o par (usuário, empresa) que escopa todo acesso a dados.
// É um argumento explícito dos serviços, não um singleton ambiente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub company: Company,
}

// Resultado estruturado do login: e-mail desconhecido ou usuário inativo
// não são erros, são um desfecho de falha.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Success(Session),
    Failure { reason: String },
}

impl LoginOutcome {
    pub(crate) fn failure(reason: impl Into<String>) -> Self {
        LoginOutcome::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success(_))
    }

    pub fn into_session(self) -> Option<Session> {
        match self {
            LoginOutcome::Success(session) => Some(session),
            LoginOutcome::Failure { .. } => None,
        }
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub full_name: String,
    pub role: UserRole,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub permissions: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
