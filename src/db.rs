pub mod entity_store;
pub use entity_store::EntityStore;
pub mod partitioned_store;
pub use partitioned_store::ListingStore;
pub mod shared;
pub use shared::Shared;
pub mod seed;

use tokio::{sync::broadcast, task::JoinHandle};

use crate::{
    common::error::AppError,
    db::entity_store::StoreEvent,
    models::{call_center::Agent, nichos::Category, tecnicos::Technician},
};

/// As coleções do console, em memória, compartilhadas entre os serviços.
#[derive(Clone, Default)]
pub struct Stores {
    pub categories: Shared<EntityStore<Category>>,
    pub technicians: Shared<EntityStore<Technician>>,
    pub agents: Shared<EntityStore<Agent>>,
    pub listings: Shared<ListingStore>,
}

impl Stores {
    /// Os registros de exemplo do console.
    pub fn demo() -> Self {
        Self {
            categories: Shared::new(EntityStore::with_records(seed::categories())),
            technicians: Shared::new(EntityStore::with_records(seed::technicians())),
            agents: Shared::new(EntityStore::with_records(seed::agents())),
            listings: Shared::new(ListingStore::with_records(seed::locations(), seed::profiles())),
        }
    }

    /// Um ouvinte de log por canal de eventos.
    pub fn spawn_event_loggers(&self) -> Result<Vec<JoinHandle<()>>, AppError> {
        let mut channels = vec![self.categories.read()?.subscribe()];
        {
            let listings = self.listings.read()?;
            channels.push(listings.subscribe_parents());
            channels.push(listings.subscribe_children());
        }
        channels.push(self.technicians.read()?.subscribe());
        channels.push(self.agents.read()?.subscribe());
        Ok(channels.into_iter().map(spawn_event_logger).collect())
    }
}

pub fn spawn_event_logger(mut events: broadcast::Receiver<StoreEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match event.scope {
                    Some(scope) => tracing::debug!(
                        "{} #{} (partição #{}) {:?}",
                        event.kind,
                        event.id,
                        scope,
                        event.change
                    ),
                    None => tracing::debug!("{} #{} {:?}", event.kind, event.id, event.change),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Ouvinte de eventos perdeu {} evento(s)", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
