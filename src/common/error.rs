// src/common/error.rs

use thiserror::Error;
use uuid::Uuid;

use crate::models::base::EntityKind;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Contrato único: toda operação falível do núcleo devolve `CrmResult<T>`.
// "Não encontrado" é sempre `NotFound`, nunca um sentinela nulo.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    ValidationMessage(String),

    // Getters com escopo de tenant exigem uma sessão ativa.
    #[error("Autenticação necessária")]
    AuthenticationRequired,

    #[error("{kind} não encontrado: {id}")]
    NotFound { kind: EntityKind, id: Uuid },

    // Chave estrangeira apontando para um registro inexistente (ou de outro tenant).
    #[error("Referência inválida em '{field}': {id}")]
    InvalidReference { field: &'static str, id: Uuid },

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Chave única violada: {0}")]
    UniqueConstraintViolation(String),

    #[error("Versão de esquema incompatível: encontrada {found}, esperada {expected}")]
    SchemaVersionMismatch { found: u32, expected: u32 },

    #[error("Erro de armazenamento: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado.
    #[error("Erro interno")]
    Internal(#[from] anyhow::Error),
}

pub type CrmResult<T> = Result<T, CrmError>;
