// src/services/auth.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::{CrmError, CrmResult};
use crate::db::{CompanyRepository, UserRepository};
use crate::events::{CrmEvent, EventBus};
use crate::models::auth::{LoginOutcome, Session};
use crate::storage::{StorageBackend, KEY_CURRENT_COMPANY, KEY_CURRENT_USER};

#[derive(Clone)]
pub struct AuthService {
    backend: Arc<dyn StorageBackend>,
    users: UserRepository,
    companies: CompanyRepository,
    events: Arc<EventBus>,
}

impl AuthService {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        users: UserRepository,
        companies: CompanyRepository,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            backend,
            users,
            companies,
            events,
        }
    }

    // Desfecho estruturado: e-mail desconhecido ou usuário inativo são
    // `Failure`, não erro. A senha não é verificada — paridade com o
    // comportamento original, que só checa `is_active`.
    pub fn login(&self, email: &str, _password: &str) -> CrmResult<LoginOutcome> {
        let Some(user) = self.users.find_by_email(email)? else {
            return Ok(LoginOutcome::failure("Credenciais inválidas."));
        };
        if !user.is_active {
            return Ok(LoginOutcome::failure("Usuário desativado."));
        }
        let Some(company) = self.companies.find_by_id(user.company_id)? else {
            return Ok(LoginOutcome::failure("Empresa do usuário não encontrada."));
        };

        // Persiste o par para continuidade entre aberturas do armazenamento.
        self.backend
            .put(KEY_CURRENT_USER, &serde_json::to_string(&user.id)?)?;
        self.backend
            .put(KEY_CURRENT_COMPANY, &serde_json::to_string(&company.id)?)?;

        self.events.publish(&CrmEvent::SessionStarted {
            user_id: user.id,
            company_id: company.id,
        });
        tracing::info!(user = %user.email, company = %company.name, "✅ Sessão iniciada");

        Ok(LoginOutcome::Success(Session { user, company }))
    }

    pub fn logout(&self) -> CrmResult<()> {
        let user_id = match self.backend.get(KEY_CURRENT_USER)? {
            Some(raw) => serde_json::from_str::<Uuid>(&raw).ok(),
            None => None,
        };

        self.backend.remove(KEY_CURRENT_USER)?;
        self.backend.remove(KEY_CURRENT_COMPANY)?;

        if let Some(user_id) = user_id {
            self.events.publish(&CrmEvent::SessionEnded { user_id });
            tracing::info!(%user_id, "Sessão encerrada");
        }
        Ok(())
    }

    // Reidrata a sessão persistida relendo os dois registros: um par que
    // aponta para registros removidos ou usuário desativado vale como
    // ausência de sessão.
    pub fn current_session(&self) -> CrmResult<Option<Session>> {
        let (Some(raw_user), Some(raw_company)) = (
            self.backend.get(KEY_CURRENT_USER)?,
            self.backend.get(KEY_CURRENT_COMPANY)?,
        ) else {
            return Ok(None);
        };

        let user_id: Uuid = serde_json::from_str(&raw_user)?;
        let company_id: Uuid = serde_json::from_str(&raw_company)?;

        let Some(company) = self.companies.find_by_id(company_id)? else {
            return Ok(None);
        };
        let Some(user) = self.users.find(company_id, user_id)? else {
            return Ok(None);
        };
        if !user.is_active {
            return Ok(None);
        }

        Ok(Some(Session { user, company }))
    }

    pub fn require_session(&self) -> CrmResult<Session> {
        self.current_session()?
            .ok_or(CrmError::AuthenticationRequired)
    }
}
