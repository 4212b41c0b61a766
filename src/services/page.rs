// src/services/page.rs

use serde::Serialize;

use crate::{
    common::error::AppError,
    db::{
        entity_store::{EntityStore, Record, RecordId},
        shared::Shared,
    },
    models::page::{EditState, PageSnapshot},
    services::crud_view::CrudView,
};

pub type DraftOf<P> = <<P as CrudPage>::Record as Record>::Draft;
pub type SnapshotOf<P> = PageSnapshot<<P as CrudPage>::Entry, DraftOf<P>>;

/// O contrato de uma página CRUD, servido pelos handlers genéricos de `handlers::crud`.
pub trait CrudPage: Clone + Send + Sync + 'static {
    type Record: Record;
    type Entry: Serialize + Send;

    fn page(&self) -> Result<SnapshotOf<Self>, AppError>;

    fn stage_create(&self, patch: DraftOf<Self>) -> Result<DraftOf<Self>, AppError>;
    fn submit_create(&self) -> Result<Self::Record, AppError>;

    /// Atualização direta (sem passar pelo rascunho de edição).
    fn update(&self, id: RecordId, draft: DraftOf<Self>) -> Result<Self::Record, AppError>;

    /// Id ausente não é erro: devolve `None`.
    fn remove(&self, id: RecordId) -> Result<Option<Self::Record>, AppError>;

    fn begin_edit(&self, id: RecordId) -> Result<EditState<DraftOf<Self>>, AppError>;
    fn stage_edit(&self, patch: DraftOf<Self>) -> Result<EditState<DraftOf<Self>>, AppError>;
    fn save_edit(&self) -> Result<Self::Record, AppError>;
    fn cancel_edit(&self) -> Result<bool, AppError>;
}

/// Referências de um tipo de registro para outras coleções:
/// conferidas na escrita, resolvidas na leitura e limpas em cascata na remoção.
pub trait Links<T: Record>: Clone + Send + Sync + 'static {
    type Entry: Serialize + Send;

    fn check(&self, draft: &T::Draft) -> Result<(), AppError>;

    fn resolve(&self, records: Vec<T>) -> Result<Vec<Self::Entry>, AppError>;

    /// Chamado depois da remoção, sem nenhum lock da própria store.
    fn on_removed(&self, record: &T) -> Result<(), AppError>;
}

/// Página CRUD sobre uma lista simples.
pub struct CrudService<T: Record, L> {
    store: Shared<EntityStore<T>>,
    view: Shared<CrudView<T>>,
    links: L,
}

impl<T: Record, L: Clone> Clone for CrudService<T, L> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            view: self.view.clone(),
            links: self.links.clone(),
        }
    }
}

impl<T: Record, L: Links<T>> CrudService<T, L> {
    pub fn new(store: Shared<EntityStore<T>>, links: L) -> Self {
        Self {
            store,
            view: Shared::default(),
            links,
        }
    }

    pub fn store(&self) -> &Shared<EntityStore<T>> {
        &self.store
    }

    /// Ver `CrudView::retain_draft_links`.
    pub fn retain_draft_links<F>(&self, f: F) -> Result<usize, AppError>
    where
        F: FnMut(&mut T::Draft) -> bool,
    {
        Ok(self.view.write()?.retain_draft_links(f))
    }

    pub fn find(&self, id: RecordId) -> Result<T, AppError> {
        self.store
            .read()?
            .get(id)
            .cloned()
            .ok_or(AppError::NotFound { resource: T::KIND, id })
    }
}

impl<T: Record, L: Links<T>> CrudPage for CrudService<T, L> {
    type Record = T;
    type Entry = L::Entry;

    fn page(&self) -> Result<SnapshotOf<Self>, AppError> {
        let view = self.view.read()?;
        // Copia e solta o lock antes de resolver as referências (ordem dos locks).
        let records = self.store.read()?.list().to_vec();

        Ok(PageSnapshot {
            records: self.links.resolve(records)?,
            create_draft: view.create_draft().clone(),
            editing: view.editing().cloned(),
            partition: None,
        })
    }

    fn stage_create(&self, patch: T::Draft) -> Result<T::Draft, AppError> {
        let mut view = self.view.write()?;
        view.stage_create(patch);
        Ok(view.create_draft().clone())
    }

    fn submit_create(&self) -> Result<T, AppError> {
        let mut view = self.view.write()?;
        self.links.check(view.create_draft())?;

        let record = view.submit_create(&mut *self.store.write()?)?;
        tracing::info!("➕ {} #{} criado", T::KIND, record.id());
        Ok(record)
    }

    fn update(&self, id: RecordId, draft: T::Draft) -> Result<T, AppError> {
        self.links.check(&draft)?;
        let record = self.store.write()?.update(id, draft)?;
        tracing::info!("✏️ {} #{} atualizado", T::KIND, id);
        Ok(record)
    }

    fn remove(&self, id: RecordId) -> Result<Option<T>, AppError> {
        let mut view = self.view.write()?;
        let removed = self.store.write()?.remove(id);
        view.forget(id);
        drop(view);

        if let Some(record) = &removed {
            self.links.on_removed(record)?;
            tracing::info!("🗑️ {} #{} removido", T::KIND, id);
        }
        Ok(removed)
    }

    fn begin_edit(&self, id: RecordId) -> Result<EditState<T::Draft>, AppError> {
        let mut view = self.view.write()?;
        let store = self.store.read()?;
        Ok(view.begin_edit(&*store, id)?.clone())
    }

    fn stage_edit(&self, patch: T::Draft) -> Result<EditState<T::Draft>, AppError> {
        Ok(self.view.write()?.stage_edit(patch)?.clone())
    }

    fn save_edit(&self) -> Result<T, AppError> {
        let mut view = self.view.write()?;
        if let Some(editing) = view.editing() {
            self.links.check(&editing.draft)?;
        }

        let record = view.save(&mut *self.store.write()?)?;
        tracing::info!("💾 {} #{} salvo", T::KIND, record.id());
        Ok(record)
    }

    fn cancel_edit(&self) -> Result<bool, AppError> {
        Ok(self.view.write()?.cancel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::nichos::{Category, CategoryDraft};

    /// Sem referências: a linha é o próprio registro.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NoLinks;

    impl<T: Record> Links<T> for NoLinks {
        type Entry = T;

        fn check(&self, _draft: &T::Draft) -> Result<(), AppError> {
            Ok(())
        }

        fn resolve(&self, records: Vec<T>) -> Result<Vec<T>, AppError> {
            Ok(records)
        }

        fn on_removed(&self, _record: &T) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn service() -> CrudService<Category, NoLinks> {
        let store = Shared::new(EntityStore::with_records(vec![
            Category { id: 1, name: "Restaurantes".into() },
            Category { id: 2, name: "Hoteles".into() },
        ]));
        CrudService::new(store, NoLinks)
    }

    fn named(name: &str) -> CategoryDraft {
        CategoryDraft { name: Some(name.to_string()) }
    }

    #[test]
    fn page_shows_records_and_interaction_state() {
        let service = service();
        service.stage_create(named("Gimnasios")).unwrap();
        service.begin_edit(2).unwrap();

        let page = service.page().unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.create_draft, named("Gimnasios"));
        assert_eq!(page.editing.map(|e| e.id), Some(2));
    }

    #[test]
    fn removing_the_record_under_edit_drops_the_draft() {
        let service = service();
        service.begin_edit(1).unwrap();

        let removed = service.remove(1).unwrap();
        assert_eq!(removed.map(|c| c.name), Some("Restaurantes".to_string()));
        assert!(service.page().unwrap().editing.is_none());
        assert!(matches!(service.save_edit(), Err(AppError::NoEditInProgress)));
    }

    #[test]
    fn removing_a_missing_id_is_a_noop() {
        let service = service();
        assert!(service.remove(42).unwrap().is_none());
        assert_eq!(service.page().unwrap().records.len(), 2);
    }

    #[test]
    fn clones_share_the_same_state() {
        let service = service();
        let other = service.clone();
        service.stage_create(named("Bares")).unwrap();
        other.submit_create().unwrap();

        assert_eq!(service.find(3).unwrap().name, "Bares");
        assert_eq!(service.page().unwrap().create_draft, CategoryDraft::default());
    }

    #[test]
    fn direct_update_bypasses_the_edit_draft() {
        let service = service();
        service.begin_edit(1).unwrap();
        service.update(1, named("Bares")).unwrap();

        let page = service.page().unwrap();
        assert_eq!(page.records[0].name, "Bares");
        // O rascunho continua com o valor carregado antes
        assert_eq!(page.editing.unwrap().draft, named("Restaurantes"));
    }
}
