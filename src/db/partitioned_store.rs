// src/db/partitioned_store.rs

use std::collections::HashMap;

use tokio::sync::broadcast;

use crate::{
    common::error::AppError,
    db::entity_store::{Collection, EntityStore, Record, RecordId, StoreEvent},
    models::perfiles::{Location, LocationDraft, Profile},
};

const EVENT_CAPACITY: usize = 64;

/// Coleção de coleções: uma `EntityStore` de filhos para cada registro pai.
/// Os ids dos filhos são únicos apenas dentro da sua partição.
pub struct PartitionedStore<P: Record, T: Record> {
    parents: EntityStore<P>,
    partitions: HashMap<RecordId, EntityStore<T>>,
    child_events: broadcast::Sender<StoreEvent>,
}

/// Localidades e os perfis GMB de cada uma.
pub type ListingStore = PartitionedStore<Location, Profile>;

impl<P: Record, T: Record> PartitionedStore<P, T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new(), Vec::new())
    }

    /// Cada pai recebe uma partição (vazia se não houver filhos em `children`).
    /// Filhos de um pai inexistente são descartados.
    pub fn with_records(parents: Vec<P>, children: Vec<(RecordId, Vec<T>)>) -> Self {
        let (child_events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut by_parent: HashMap<RecordId, Vec<T>> = children.into_iter().collect();

        let partitions = parents
            .iter()
            .map(|parent| {
                let records = by_parent.remove(&parent.id()).unwrap_or_default();
                let store = EntityStore::scoped(parent.id(), records, child_events.clone());
                (parent.id(), store)
            })
            .collect();

        Self {
            parents: EntityStore::with_records(parents),
            partitions,
            child_events,
        }
    }

    pub fn parents(&self) -> &EntityStore<P> {
        &self.parents
    }

    pub fn add_partition(&mut self, draft: P::Draft) -> Result<P, AppError> {
        let parent = self.parents.add(draft)?;
        // Um id reutilizado sempre começa com partição nova: nada de filhos antigos.
        self.partitions.insert(
            parent.id(),
            EntityStore::scoped(parent.id(), Vec::new(), self.child_events.clone()),
        );
        Ok(parent)
    }

    pub fn update_partition(&mut self, id: RecordId, draft: P::Draft) -> Result<P, AppError> {
        self.parents.update(id, draft)
    }

    /// Remove o pai e descarta a partição inteira (sem migrar filhos).
    /// Devolve o pai e os filhos descartados; `None` se o pai não existia.
    pub fn remove_partition(&mut self, id: RecordId) -> Option<(P, Vec<T>)> {
        let parent = self.parents.remove(id)?;
        let children = self
            .partitions
            .remove(&id)
            .map(|store| store.list().to_vec())
            .unwrap_or_default();
        Some((parent, children))
    }

    pub fn partition(&self, parent: RecordId) -> Result<&EntityStore<T>, AppError> {
        self.partitions
            .get(&parent)
            .ok_or(AppError::NotFound { resource: P::KIND, id: parent })
    }

    pub fn partition_mut(&mut self, parent: RecordId) -> Result<&mut EntityStore<T>, AppError> {
        self.partitions
            .get_mut(&parent)
            .ok_or(AppError::NotFound { resource: P::KIND, id: parent })
    }

    pub fn list(&self, parent: RecordId) -> Result<&[T], AppError> {
        Ok(self.partition(parent)?.list())
    }

    pub fn add(&mut self, parent: RecordId, draft: T::Draft) -> Result<T, AppError> {
        self.partition_mut(parent)?.add(draft)
    }

    pub fn update(&mut self, parent: RecordId, id: RecordId, draft: T::Draft) -> Result<T, AppError> {
        self.partition_mut(parent)?.update(id, draft)
    }

    /// Partição inexistente é erro; filho inexistente é no-op.
    pub fn remove(&mut self, parent: RecordId, id: RecordId) -> Result<Option<T>, AppError> {
        Ok(self.partition_mut(parent)?.remove(id))
    }

    pub fn contains(&self, parent: RecordId, id: RecordId) -> bool {
        self.partitions
            .get(&parent)
            .is_some_and(|store| store.contains(id))
    }

    /// Total de filhos em todas as partições.
    pub fn child_count(&self) -> usize {
        self.partitions.values().map(EntityStore::len).sum()
    }

    pub fn subscribe_parents(&self) -> broadcast::Receiver<StoreEvent> {
        self.parents.subscribe()
    }

    pub fn subscribe_children(&self) -> broadcast::Receiver<StoreEvent> {
        self.child_events.subscribe()
    }
}

impl<P: Record, T: Record> Default for PartitionedStore<P, T> {
    fn default() -> Self {
        Self::new()
    }
}

// O lado "pai" também é uma coleção: a mesma CrudView serve para ele.
impl<P: Record, T: Record> Collection<P> for PartitionedStore<P, T> {
    fn get(&self, id: RecordId) -> Option<&P> {
        self.parents.get(id)
    }

    fn add(&mut self, draft: P::Draft) -> Result<P, AppError> {
        self.add_partition(draft)
    }

    fn update(&mut self, id: RecordId, draft: P::Draft) -> Result<P, AppError> {
        self.update_partition(id, draft)
    }
}

impl ListingStore {
    pub fn locations(&self) -> &[Location] {
        self.parents.list()
    }

    pub fn add_location(&mut self, name: &str) -> Result<Location, AppError> {
        self.add_partition(LocationDraft { name: Some(name.to_string()) })
    }

    pub fn remove_location(&mut self, id: RecordId) -> Option<(Location, Vec<Profile>)> {
        self.remove_partition(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::perfiles::ProfileDraft;
    use rust_decimal::Decimal;

    fn profile(name: &str) -> ProfileDraft {
        ProfileDraft {
            name: Some(name.to_string()),
            url: Some("https://g.page/example1".to_string()),
            phone: Some("+34 911234567".to_string()),
            technician: Some("Juan Pérez".to_string()),
            price_per_call: Some(Decimal::from(25)),
        }
    }

    #[test]
    fn add_location_creates_empty_partition() {
        let mut store = ListingStore::new();
        let madrid = store.add_location("Madrid").unwrap();
        assert_eq!(madrid.id, 1);
        assert!(store.list(madrid.id).unwrap().is_empty());
    }

    #[test]
    fn profile_ids_are_scoped_per_location() {
        let mut store = ListingStore::new();
        let madrid = store.add_location("Madrid").unwrap();
        let barcelona = store.add_location("Barcelona").unwrap();

        store.add(madrid.id, profile("Taller Centro")).unwrap();
        store.add(madrid.id, profile("Taller Norte")).unwrap();
        let eixample = store.add(barcelona.id, profile("Taller Eixample")).unwrap();

        assert_eq!(eixample.id, 1);
        assert_eq!(store.list(madrid.id).unwrap().len(), 2);
        assert_eq!(store.child_count(), 3);
    }

    #[test]
    fn removing_location_discards_its_profiles() {
        let mut store = ListingStore::new();
        let madrid = store.add_location("Madrid").unwrap();
        store.add(madrid.id, profile("Taller Centro")).unwrap();

        let (removed, profiles) = store.remove_location(madrid.id).unwrap();
        assert_eq!(removed.name, "Madrid");
        assert_eq!(profiles.len(), 1);

        assert!(matches!(
            store.list(madrid.id),
            Err(AppError::NotFound { resource: "location", .. })
        ));
    }

    #[test]
    fn reused_location_id_starts_with_empty_partition() {
        let mut store = ListingStore::new();
        let madrid = store.add_location("Madrid").unwrap();
        store.add(madrid.id, profile("Taller Centro")).unwrap();
        store.remove_location(madrid.id);

        let valencia = store.add_location("Valencia").unwrap();
        assert_eq!(valencia.id, madrid.id);
        assert!(store.list(valencia.id).unwrap().is_empty());
    }

    #[test]
    fn operations_on_missing_partition_fail() {
        let mut store = ListingStore::new();
        assert!(store.add(7, profile("X")).is_err());
        assert!(store.remove(7, 1).is_err());
        assert!(store.remove_location(7).is_none());
    }

    #[test]
    fn removing_missing_profile_is_a_noop() {
        let mut store = ListingStore::new();
        let madrid = store.add_location("Madrid").unwrap();
        assert!(store.remove(madrid.id, 5).unwrap().is_none());
    }

    #[test]
    fn child_events_carry_the_location() {
        let mut store = ListingStore::new();
        let madrid = store.add_location("Madrid").unwrap();
        let mut rx = store.subscribe_children();

        store.add(madrid.id, profile("Taller Centro")).unwrap();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.scope, Some(madrid.id));
        assert_eq!(event.kind, "profile");
    }
}
