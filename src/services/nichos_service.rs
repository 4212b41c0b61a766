// src/services/nichos_service.rs

use crate::{
    common::{error::AppError, validation::field_error},
    db::{
        entity_store::{EntityStore, RecordId},
        shared::Shared,
    },
    models::nichos::{Category, CategoryDraft, CategoryRef},
    services::{
        call_center_service::AgentService,
        page::{CrudService, Links},
        tecnicos_service::TechnicianService,
    },
};

pub type CategoryService = CrudService<Category, CategoryLinks>;

/// Quem aponta para os nichos: técnicos e agentes.
#[derive(Clone)]
pub struct CategoryLinks {
    pub technicians: TechnicianService,
    pub agents: AgentService,
}

impl Links<Category> for CategoryLinks {
    type Entry = Category;

    fn check(&self, _draft: &CategoryDraft) -> Result<(), AppError> {
        Ok(())
    }

    fn resolve(&self, records: Vec<Category>) -> Result<Vec<Category>, AppError> {
        Ok(records)
    }

    // Cascata: o id some das listas `nichos` de técnicos e agentes,
    // gravados ou ainda em rascunho (o id pode ser reaproveitado por outro nicho).
    fn on_removed(&self, category: &Category) -> Result<(), AppError> {
        let id = category.id;

        let technicians = self
            .technicians
            .store()
            .write()?
            .retain_links(|t| strip_id(&mut t.nichos, id));
        let agents = self
            .agents
            .store()
            .write()?
            .retain_links(|a| strip_id(&mut a.nichos, id));

        let drafts = self
            .technicians
            .retain_draft_links(|d| strip_draft_id(&mut d.nichos, id))?
            + self
                .agents
                .retain_draft_links(|d| strip_draft_id(&mut d.nichos, id))?;

        if technicians + agents + drafts > 0 {
            tracing::info!(
                "🔗 Nicho #{} removido de {} técnico(s), {} agente(s) e {} rascunho(s)",
                id,
                technicians,
                agents,
                drafts
            );
        }
        Ok(())
    }
}

fn strip_id(ids: &mut Vec<RecordId>, id: RecordId) -> bool {
    let before = ids.len();
    ids.retain(|&n| n != id);
    ids.len() != before
}

fn strip_draft_id(ids: &mut Option<Vec<RecordId>>, id: RecordId) -> bool {
    ids.as_mut().is_some_and(|ids| strip_id(ids, id))
}

// ---
// Helpers para quem referencia nichos (técnicos, agentes)
// ---

/// Todos os ids informados precisam existir.
pub fn check_categories(
    categories: &Shared<EntityStore<Category>>,
    ids: Option<&[RecordId]>,
) -> Result<(), AppError> {
    let Some(ids) = ids else {
        return Ok(());
    };

    let categories = categories.read()?;
    match ids.iter().find(|&&id| !categories.contains(id)) {
        Some(missing) => Err(field_error(
            "nichos",
            "unknown_reference",
            format!("El nicho {} no existe.", missing),
        )
        .into()),
        None => Ok(()),
    }
}

/// Ids -> `{id, name}` com o nome atual. Ids desconhecidos são ignorados.
pub fn resolve_categories(categories: &EntityStore<Category>, ids: &[RecordId]) -> Vec<CategoryRef> {
    ids.iter()
        .filter_map(|&id| categories.get(id))
        .map(CategoryRef::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{partitioned_store::ListingStore, seed},
        models::{call_center::AgentDraft, tecnicos::TechnicianDraft},
        services::{
            call_center_service::AgentLinks, page::CrudPage, tecnicos_service::TechnicianLinks,
        },
    };

    fn service() -> (CategoryService, CategoryLinks) {
        let store = Shared::new(EntityStore::with_records(seed::categories()));
        let links = CategoryLinks {
            technicians: CrudService::new(
                Shared::new(EntityStore::with_records(seed::technicians())),
                TechnicianLinks { categories: store.clone() },
            ),
            agents: CrudService::new(
                Shared::new(EntityStore::with_records(seed::agents())),
                AgentLinks {
                    categories: store.clone(),
                    listings: Shared::new(ListingStore::with_records(
                        seed::locations(),
                        seed::profiles(),
                    )),
                },
            ),
        };
        (CrudService::new(store, links.clone()), links)
    }

    #[test]
    fn removing_a_category_cascades_to_technicians_and_agents() {
        let (service, links) = service();

        service.remove(1).unwrap();

        let technicians = links.technicians.store().read().unwrap();
        assert_eq!(technicians.get(1).unwrap().nichos, vec![2]);
        let agents = links.agents.store().read().unwrap();
        assert!(!agents.get(1).unwrap().nichos.contains(&1));
    }

    #[test]
    fn open_drafts_lose_a_removed_category_before_its_id_is_reused() {
        let (service, links) = service();
        links
            .technicians
            .stage_create(TechnicianDraft { nichos: Some(vec![2, 7]), ..Default::default() })
            .unwrap();
        links.agents.begin_edit(1).unwrap();
        links
            .agents
            .stage_edit(AgentDraft { nichos: Some(vec![1, 7]), ..Default::default() })
            .unwrap();

        service.remove(7).unwrap();
        // O próximo nicho recebe o id 7 de novo
        service.stage_create(CategoryDraft { name: Some("Fontaneros".into()) }).unwrap();
        assert_eq!(service.submit_create().unwrap().id, 7);

        let technician_page = links.technicians.page().unwrap();
        assert_eq!(technician_page.create_draft.nichos, Some(vec![2]));
        let agent_page = links.agents.page().unwrap();
        assert_eq!(agent_page.editing.unwrap().draft.nichos, Some(vec![1]));
    }

    #[test]
    fn removing_an_unreferenced_category_touches_nobody() {
        let (service, links) = service();
        let mut rx = links.technicians.store().read().unwrap().subscribe();

        service.remove(7).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn check_rejects_unknown_ids() {
        let categories = Shared::new(EntityStore::with_records(seed::categories()));
        assert!(check_categories(&categories, Some(&[1, 2][..])).is_ok());
        assert!(check_categories(&categories, None).is_ok());
        assert!(matches!(
            check_categories(&categories, Some(&[1, 99][..])),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn resolution_uses_current_names() {
        let (service, _) = service();
        service.update(2, CategoryDraft { name: Some("Hostales".into()) }).unwrap();

        let store = service.store().read().unwrap();
        let refs = resolve_categories(&store, &[2, 42]);
        assert_eq!(refs, vec![CategoryRef { id: 2, name: "Hostales".into() }]);
    }
}
