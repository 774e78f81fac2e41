//! Núcleo de CRM com um tenant por sessão: coleções de vendas (leads,
//! contas, contatos, pipelines, negócios), agenda, workflows e métricas
//! sobre um armazenamento chave-valor de documentos JSON.
//!
//! A porta de entrada é [`CrmStore`]: monta o gráfico de serviços sobre um
//! backend (disco ou memória), roda a carga de demonstração num
//! armazenamento vazio e expõe a superfície de uso diário. Toda operação de
//! dados exige uma sessão — explícita nos serviços, resolvida da sessão
//! persistida nos métodos de conveniência da fachada.

pub mod common;
pub mod config;
pub mod db;
pub mod events;
pub mod models;
mod seed;
pub mod services;
pub mod storage;
pub mod store;

pub use common::error::{CrmError, CrmResult};
pub use config::AppConfig;
pub use events::CrmEvent;
pub use models::auth::{LoginOutcome, Session};
pub use store::CrmStore;
