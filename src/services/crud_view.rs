// src/services/crud_view.rs

use crate::{
    common::error::AppError,
    db::entity_store::{Collection, Draft, Record, RecordId},
    models::page::EditState,
};

/// Estado de interação de uma página CRUD: a linha de criação (sempre visível)
/// e no máximo um registro em edição.
pub struct CrudView<T: Record> {
    create_draft: T::Draft,
    editing: Option<EditState<T::Draft>>,
}

impl<T: Record> CrudView<T> {
    pub fn new() -> Self {
        Self {
            create_draft: T::Draft::default(),
            editing: None,
        }
    }

    pub fn create_draft(&self) -> &T::Draft {
        &self.create_draft
    }

    pub fn stage_create(&mut self, patch: T::Draft) {
        self.create_draft.overlay(patch);
    }

    /// A linha só é limpa quando o `add` dá certo; senão o usuário corrige e reenvia.
    pub fn submit_create<C: Collection<T>>(&mut self, collection: &mut C) -> Result<T, AppError> {
        let record = collection.add(self.create_draft.clone())?;
        self.create_draft = T::Draft::default();
        Ok(record)
    }

    pub fn editing(&self) -> Option<&EditState<T::Draft>> {
        self.editing.as_ref()
    }

    pub fn editing_id(&self) -> Option<RecordId> {
        self.editing.as_ref().map(|e| e.id)
    }

    /// Carrega o registro inteiro no rascunho. Um rascunho anterior é descartado sem aviso.
    pub fn begin_edit<C: Collection<T>>(
        &mut self,
        collection: &C,
        id: RecordId,
    ) -> Result<&EditState<T::Draft>, AppError> {
        let record = collection
            .get(id)
            .ok_or(AppError::NotFound { resource: T::KIND, id })?;

        Ok(&*self.editing.insert(EditState { id, draft: record.to_draft() }))
    }

    pub fn stage_edit(&mut self, patch: T::Draft) -> Result<&EditState<T::Draft>, AppError> {
        let editing = self.editing.as_mut().ok_or(AppError::NoEditInProgress)?;
        editing.draft.overlay(patch);
        Ok(&*editing)
    }

    /// Grava o rascunho via `update`. Em caso de erro o rascunho continua aberto.
    pub fn save<C: Collection<T>>(&mut self, collection: &mut C) -> Result<T, AppError> {
        let editing = self.editing.as_ref().ok_or(AppError::NoEditInProgress)?;
        let record = collection.update(editing.id, editing.draft.clone())?;
        self.editing = None;
        Ok(record)
    }

    /// Sai do modo edição sem chamar `update`. Devolve se havia algo em edição.
    pub fn cancel(&mut self) -> bool {
        self.editing.take().is_some()
    }

    /// Aplica `f` aos rascunhos abertos (criação e edição); `f` devolve `true`
    /// quando alterou algo. Cascata de referências para registros removidos.
    pub fn retain_draft_links<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&mut T::Draft) -> bool,
    {
        let mut changed = usize::from(f(&mut self.create_draft));
        if let Some(editing) = self.editing.as_mut() {
            changed += usize::from(f(&mut editing.draft));
        }
        changed
    }

    /// O registro em edição foi apagado: o rascunho perde o sentido.
    pub fn forget(&mut self, id: RecordId) {
        if self.editing_id() == Some(id) {
            self.editing = None;
        }
    }
}

impl<T: Record> Default for CrudView<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::entity_store::EntityStore,
        models::nichos::{Category, CategoryDraft},
    };

    fn named(name: &str) -> CategoryDraft {
        CategoryDraft { name: Some(name.to_string()) }
    }

    fn store() -> EntityStore<Category> {
        EntityStore::with_records(vec![
            Category { id: 1, name: "Restaurantes".into() },
            Category { id: 2, name: "Hoteles".into() },
        ])
    }

    #[test]
    fn successful_submit_resets_the_create_row() {
        let mut store = store();
        let mut view = CrudView::<Category>::new();

        view.stage_create(named("Gimnasios"));
        let added = view.submit_create(&mut store).unwrap();

        assert_eq!(added.id, 3);
        assert_eq!(view.create_draft(), &CategoryDraft::default());
    }

    #[test]
    fn failed_submit_keeps_the_create_row() {
        let mut store = store();
        let mut view = CrudView::<Category>::new();

        view.stage_create(named("  "));
        assert!(matches!(view.submit_create(&mut store), Err(AppError::ValidationError(_))));
        assert_eq!(view.create_draft(), &named("  "));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn cancel_discards_without_updating() {
        let mut store = store();
        let mut view = CrudView::<Category>::new();

        view.begin_edit(&store, 1).unwrap();
        view.stage_edit(named("Bares")).unwrap();
        assert!(view.cancel());

        assert_eq!(store.get(1).unwrap().name, "Restaurantes");
        assert!(matches!(view.save(&mut store), Err(AppError::NoEditInProgress)));
    }

    #[test]
    fn save_applies_the_draft_and_leaves_edit_mode() {
        let mut store = store();
        let mut view = CrudView::<Category>::new();

        view.begin_edit(&store, 2).unwrap();
        view.stage_edit(named("Hoteles y Hostales")).unwrap();
        let saved = view.save(&mut store).unwrap();

        assert_eq!(saved.name, "Hoteles y Hostales");
        assert_eq!(store.list()[1].name, "Hoteles y Hostales");
        assert!(view.editing().is_none());
    }

    #[test]
    fn begin_edit_replaces_a_previous_draft() {
        let store = store();
        let mut view = CrudView::<Category>::new();

        view.begin_edit(&store, 1).unwrap();
        view.stage_edit(named("Cambio perdido")).unwrap();
        let editing = view.begin_edit(&store, 2).unwrap();

        assert_eq!(editing.id, 2);
        assert_eq!(editing.draft, named("Hoteles"));
    }

    #[test]
    fn invalid_save_keeps_the_draft_open() {
        let mut store = store();
        let mut view = CrudView::<Category>::new();

        view.begin_edit(&store, 1).unwrap();
        view.stage_edit(named("")).unwrap();
        assert!(view.save(&mut store).is_err());
        assert_eq!(view.editing_id(), Some(1));
    }

    #[test]
    fn edit_of_missing_record_is_not_found() {
        let store = store();
        let mut view = CrudView::<Category>::new();
        assert!(matches!(
            view.begin_edit(&store, 9),
            Err(AppError::NotFound { resource: "category", id: 9 })
        ));
        assert!(matches!(view.stage_edit(named("x")), Err(AppError::NoEditInProgress)));
    }

    #[test]
    fn forget_only_drops_the_matching_draft() {
        let store = store();
        let mut view = CrudView::<Category>::new();
        view.begin_edit(&store, 1).unwrap();

        view.forget(2);
        assert_eq!(view.editing_id(), Some(1));
        view.forget(1);
        assert!(view.editing().is_none());
    }
}
