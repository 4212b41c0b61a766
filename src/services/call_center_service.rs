// src/services/call_center_service.rs

use crate::{
    common::{error::AppError, validation::field_error},
    db::{
        entity_store::EntityStore,
        partitioned_store::ListingStore,
        shared::Shared,
    },
    models::{
        call_center::{Agent, AgentDraft, AgentEntry, ProfileLink, ProfileRef},
        nichos::Category,
    },
    services::{
        nichos_service::{check_categories, resolve_categories},
        page::{CrudService, Links},
    },
};

pub type AgentService = CrudService<Agent, AgentLinks>;

#[derive(Clone)]
pub struct AgentLinks {
    pub categories: Shared<EntityStore<Category>>,
    pub listings: Shared<ListingStore>,
}

impl Links<Agent> for AgentLinks {
    type Entry = AgentEntry;

    fn check(&self, draft: &AgentDraft) -> Result<(), AppError> {
        check_categories(&self.categories, draft.nichos.as_deref())?;

        let Some(profiles) = &draft.gmb_profiles else {
            return Ok(());
        };
        let listings = self.listings.read()?;
        match profiles
            .iter()
            .find(|r| !listings.contains(r.location_id, r.profile_id))
        {
            Some(missing) => Err(field_error(
                "gmbProfiles",
                "unknown_reference",
                format!(
                    "El perfil {} no existe en la localidad {}.",
                    missing.profile_id, missing.location_id
                ),
            )
            .into()),
            None => Ok(()),
        }
    }

    fn resolve(&self, records: Vec<Agent>) -> Result<Vec<AgentEntry>, AppError> {
        // Ordem dos locks: categorias antes das localidades.
        let categories = self.categories.read()?;
        let listings = self.listings.read()?;

        Ok(records
            .into_iter()
            .map(|a| AgentEntry {
                nichos: resolve_categories(&categories, &a.nichos),
                gmb_profiles: a
                    .gmb_profiles
                    .iter()
                    .filter_map(|r| resolve_profile(&listings, r))
                    .collect(),
                id: a.id,
                name: a.name,
                phone: a.phone,
                email: a.email,
                commission: a.commission,
            })
            .collect())
    }

    fn on_removed(&self, _agent: &Agent) -> Result<(), AppError> {
        Ok(())
    }
}

fn resolve_profile(listings: &ListingStore, reference: &ProfileRef) -> Option<ProfileLink> {
    let location = listings.parents().get(reference.location_id)?;
    let profile = listings
        .partition(reference.location_id)
        .ok()?
        .get(reference.profile_id)?;

    Some(ProfileLink {
        location_id: location.id,
        profile_id: profile.id,
        location: location.name.clone(),
        name: profile.name.clone(),
    })
}

/// Cascata vinda dos perfis GMB: tira dos agentes (gravados e rascunhos abertos)
/// as referências que casam com `matches`. Devolve quantos agentes gravados mudaram.
pub fn unlink_profiles<F>(agents: &AgentService, matches: F) -> Result<usize, AppError>
where
    F: Fn(&ProfileRef) -> bool,
{
    let strip = |refs: &mut Vec<ProfileRef>| {
        let before = refs.len();
        refs.retain(|r| !matches(r));
        refs.len() != before
    };

    let changed = agents
        .store()
        .write()?
        .retain_links(|agent| strip(&mut agent.gmb_profiles));
    let drafts = agents
        .retain_draft_links(|draft| draft.gmb_profiles.as_mut().is_some_and(|refs| strip(refs)))?;

    if changed + drafts > 0 {
        tracing::info!(
            "🔗 Perfis GMB desvinculados de {} agente(s) e {} rascunho(s)",
            changed,
            drafts
        );
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::seed, services::page::CrudPage};
    use rust_decimal::Decimal;

    fn links() -> AgentLinks {
        AgentLinks {
            categories: Shared::new(EntityStore::with_records(seed::categories())),
            listings: Shared::new(ListingStore::with_records(seed::locations(), seed::profiles())),
        }
    }

    fn service() -> AgentService {
        CrudService::new(Shared::new(EntityStore::with_records(seed::agents())), links())
    }

    #[test]
    fn page_resolves_profiles_with_location_names() {
        let page = service().page().unwrap();
        let agent = &page.records[0];

        assert_eq!(agent.gmb_profiles.len(), 2);
        assert_eq!(agent.gmb_profiles[0].location, "Madrid");
        assert_eq!(agent.gmb_profiles[0].name, "Taller Centro");
        assert_eq!(agent.gmb_profiles[1].name, "Taller Norte");
    }

    #[test]
    fn unknown_profile_reference_is_rejected() {
        let service = service();
        let patch = AgentDraft {
            gmb_profiles: Some(vec![ProfileRef { location_id: 3, profile_id: 1 }]),
            ..Default::default()
        };
        assert!(matches!(service.update(1, patch), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn valid_agent_is_created_with_both_kinds_of_links() {
        let service = service();
        service
            .stage_create(AgentDraft {
                name: Some("Lucía Martín".into()),
                phone: Some("+34 633445566".into()),
                email: Some("lucia@example.com".into()),
                nichos: Some(vec![4]),
                commission: Some(Decimal::from(15)),
                gmb_profiles: Some(vec![ProfileRef { location_id: 2, profile_id: 1 }]),
            })
            .unwrap();

        let created = service.submit_create().unwrap();
        assert_eq!(created.id, 2);

        let page = service.page().unwrap();
        assert_eq!(page.records[1].gmb_profiles[0].name, "Taller Eixample");
        assert_eq!(page.records[1].nichos[0].name, "Gimnasios");
    }

    #[test]
    fn whitespace_only_name_does_not_pass_as_filled() {
        let service = service();
        let patch = AgentDraft { name: Some("    ".into()), ..Default::default() };
        assert!(matches!(service.update(1, patch), Err(AppError::ValidationError(_))));
        assert!(!service.store().read().unwrap().get(1).unwrap().name.is_empty());
    }

    #[test]
    fn unlink_profiles_only_touches_matching_references() {
        let agents = service();

        let changed = unlink_profiles(&agents, |r| r.location_id == 1 && r.profile_id == 2).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(
            agents.store().read().unwrap().get(1).unwrap().gmb_profiles,
            vec![ProfileRef { location_id: 1, profile_id: 1 }]
        );

        assert_eq!(unlink_profiles(&agents, |r| r.location_id == 3).unwrap(), 0);
    }

    #[test]
    fn unlink_profiles_also_cleans_open_drafts() {
        let agents = service();
        agents
            .stage_create(AgentDraft {
                gmb_profiles: Some(vec![
                    ProfileRef { location_id: 1, profile_id: 2 },
                    ProfileRef { location_id: 2, profile_id: 1 },
                ]),
                ..Default::default()
            })
            .unwrap();
        agents.begin_edit(1).unwrap();

        unlink_profiles(&agents, |r| r.location_id == 1 && r.profile_id == 2).unwrap();

        let page = agents.page().unwrap();
        assert_eq!(
            page.create_draft.gmb_profiles,
            Some(vec![ProfileRef { location_id: 2, profile_id: 1 }])
        );
        assert_eq!(
            page.editing.unwrap().draft.gmb_profiles,
            Some(vec![ProfileRef { location_id: 1, profile_id: 1 }])
        );
    }
}
