// src/models/crm.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::base::{stored_entity, EntityKind};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

// --- LEAD (O prospecto) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub company_id: Uuid,

    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,

    pub status: LeadStatus,
    // Pontuação 0..=100 atribuída pelo time de vendas.
    pub score: i32,
    pub estimated_value: Option<Decimal>,
    pub owner_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(Lead, "crm_leads", EntityKind::Lead);

// --- ACCOUNT (A organização) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub company_id: Uuid,

    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(Account, "crm_accounts", EntityKind::Account);

// --- CONTACT (A pessoa) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub company_id: Uuid,

    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,

    // Vínculo opcional com uma Account; `is_primary` marca o contato
    // principal daquela conta.
    pub account_id: Option<Uuid>,
    pub is_primary: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(Contact, "crm_contacts", EntityKind::Contact);

// --- DEAL (A oportunidade) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,
    pub company_id: Uuid,

    pub title: String,
    pub pipeline_id: Uuid,
    // Sempre um estágio do pipeline acima; validado na criação e na transição.
    pub stage_id: Uuid,

    pub value: Decimal,
    pub probability: i32,
    pub expected_close_date: Option<NaiveDate>,

    pub owner_id: Uuid,
    pub account_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(Deal, "crm_deals", EntityKind::Deal);

// =========================================================================
//  Payloads
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLead {
    #[validate(length(min = 1, message = "O nome do lead é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: Option<LeadStatus>,
    #[validate(range(min = 0, max = 100, message = "A pontuação deve estar entre 0 e 100."))]
    pub score: Option<i32>,
    pub estimated_value: Option<Decimal>,
    // Ausente: o dono é o usuário da sessão.
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLead {
    #[validate(length(min = 1, message = "O nome do lead é obrigatório."))]
    pub name: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: Option<LeadStatus>,
    #[validate(range(min = 0, max = 100, message = "A pontuação deve estar entre 0 e 100."))]
    pub score: Option<i32>,
    pub estimated_value: Option<Decimal>,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccount {
    #[validate(length(min = 1, message = "O nome da conta é obrigatório."))]
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccount {
    #[validate(length(min = 1, message = "O nome da conta é obrigatório."))]
    pub name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContact {
    #[validate(length(min = 1, message = "O primeiro nome é obrigatório."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "O sobrenome é obrigatório."))]
    pub last_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub account_id: Option<Uuid>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContact {
    #[validate(length(min = 1, message = "O primeiro nome é obrigatório."))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "O sobrenome é obrigatório."))]
    pub last_name: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub account_id: Option<Uuid>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeal {
    #[validate(length(min = 1, message = "O título do negócio é obrigatório."))]
    pub title: String,
    pub pipeline_id: Uuid,
    pub stage_id: Uuid,
    pub value: Decimal,
    // Ausente: herda a probabilidade do estágio.
    #[validate(range(min = 0, max = 100, message = "A probabilidade deve estar entre 0 e 100."))]
    pub probability: Option<i32>,
    pub expected_close_date: Option<NaiveDate>,
    pub owner_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeal {
    #[validate(length(min = 1, message = "O título do negócio é obrigatório."))]
    pub title: Option<String>,
    pub stage_id: Option<Uuid>,
    pub value: Option<Decimal>,
    #[validate(range(min = 0, max = 100, message = "A probabilidade deve estar entre 0 e 100."))]
    pub probability: Option<i32>,
    pub expected_close_date: Option<NaiveDate>,
    pub owner_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
}
