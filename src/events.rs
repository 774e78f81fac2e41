// src/events.rs

use std::sync::mpsc::{channel, Receiver, Sender};

use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::base::EntityKind;

// Notificação de mudança publicada pelo núcleo. Substitui o polling da
// versão original: quem quer reagir a mutações ou a trocas de sessão
// assina o barramento em vez de reler o estado num intervalo fixo.
#[derive(Debug, Clone, PartialEq)]
pub enum CrmEvent {
    SessionStarted { user_id: Uuid, company_id: Uuid },
    SessionEnded { user_id: Uuid },
    EntityCreated { kind: EntityKind, id: Uuid, company_id: Uuid },
    EntityUpdated { kind: EntityKind, id: Uuid, company_id: Uuid },
}

// Fan-out simples sobre canais síncronos. Assinantes desconectados são
// descartados na próxima publicação.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Sender<CrmEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<CrmEvent> {
        let (tx, rx) = channel();
        self.subscribers.write().push(tx);
        rx
    }

    pub fn publish(&self, event: &CrmEvent) {
        self.subscribers
            .write()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
