// src/models/pipeline.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::base::{stored_entity, EntityKind};

// Estágio nomeado e ordenado de um processo de vendas, com peso de
// probabilidade e flags de fechamento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub probability: i32,
    pub is_closed_won: bool,
    pub is_closed_lost: bool,
}

// Os estágios vivem embutidos no pipeline: são valores filhos, não uma
// coleção própria. Invariante (validado na criação): exatamente um estágio
// com `is_closed_won` e exatamente um com `is_closed_lost`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: Uuid,
    pub company_id: Uuid,

    pub name: String,
    pub is_default: bool,
    pub stages: Vec<PipelineStage>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(Pipeline, "crm_pipelines", EntityKind::Pipeline);

impl Pipeline {
    pub fn stage(&self, stage_id: Uuid) -> Option<&PipelineStage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePipelineStage {
    #[validate(length(min = 1, message = "O nome do estágio é obrigatório."))]
    pub name: String,
    #[validate(range(min = 0, max = 100, message = "A probabilidade deve estar entre 0 e 100."))]
    pub probability: i32,
    #[serde(default)]
    pub is_closed_won: bool,
    #[serde(default)]
    pub is_closed_lost: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePipeline {
    #[validate(length(min = 1, message = "O nome do pipeline é obrigatório."))]
    pub name: String,
    pub is_default: Option<bool>,
    #[validate(nested)]
    #[validate(length(min = 2, message = "Um pipeline precisa de ao menos dois estágios."))]
    pub stages: Vec<CreatePipelineStage>,
}
