// src/services/perfiles_service.rs

use crate::{
    common::error::AppError,
    db::{
        entity_store::{Record, RecordId},
        partitioned_store::ListingStore,
        shared::Shared,
    },
    models::{
        page::{EditState, PageSnapshot},
        perfiles::{Location, LocationDraft, Profile, ProfileDraft},
    },
    services::{
        call_center_service::{unlink_profiles, AgentService},
        crud_view::CrudView,
        page::{CrudPage, SnapshotOf},
    },
};

/// Estado de interação da página de perfis GMB: a localidade ativa e um
/// `CrudView` para cada nível.
#[derive(Default)]
pub struct ListingsView {
    active_location: Option<RecordId>,
    locations: CrudView<Location>,
    profiles: CrudView<Profile>,
}

#[derive(Clone)]
pub struct ListingService {
    listings: Shared<ListingStore>,
    agents: AgentService,
    view: Shared<ListingsView>,
}

impl ListingService {
    /// A primeira localidade (se houver) começa ativa.
    pub fn new(listings: Shared<ListingStore>, agents: AgentService) -> Result<Self, AppError> {
        let active_location = listings.read()?.locations().first().map(Location::id);
        let view = ListingsView { active_location, ..Default::default() };

        Ok(Self {
            listings,
            agents,
            view: Shared::new(view),
        })
    }

    #[cfg(test)]
    pub fn listings(&self) -> &Shared<ListingStore> {
        &self.listings
    }

    pub fn locations(&self) -> LocationsPage {
        LocationsPage(self.clone())
    }

    pub fn profiles(&self) -> ProfilesPage {
        ProfilesPage(self.clone())
    }

    pub fn active_location(&self) -> Result<Option<Location>, AppError> {
        let view = self.view.read()?;
        let listings = self.listings.read()?;
        Ok(view
            .active_location
            .and_then(|id| listings.parents().get(id))
            .cloned())
    }

    /// Trocar de localidade descarta o rascunho de edição de perfil.
    pub fn set_active_location(&self, id: RecordId) -> Result<Location, AppError> {
        let mut view = self.view.write()?;
        let location = self
            .listings
            .read()?
            .parents()
            .get(id)
            .cloned()
            .ok_or(AppError::NotFound { resource: Location::KIND, id })?;

        if view.active_location != Some(id) {
            view.profiles.cancel();
            view.active_location = Some(id);
            tracing::info!("📍 Localidade ativa: {} (#{})", location.name, id);
        }
        Ok(location)
    }

    fn require_active(view: &ListingsView) -> Result<RecordId, AppError> {
        view.active_location.ok_or(AppError::NoActiveLocation)
    }
}

// ---
// 1. Página das localidades
// ---
#[derive(Clone)]
pub struct LocationsPage(ListingService);

impl CrudPage for LocationsPage {
    type Record = Location;
    type Entry = Location;

    fn page(&self) -> Result<SnapshotOf<Self>, AppError> {
        let view = self.0.view.read()?;
        let listings = self.0.listings.read()?;

        Ok(PageSnapshot {
            records: listings.locations().to_vec(),
            create_draft: view.locations.create_draft().clone(),
            editing: view.locations.editing().cloned(),
            partition: None,
        })
    }

    fn stage_create(&self, patch: LocationDraft) -> Result<LocationDraft, AppError> {
        let mut view = self.0.view.write()?;
        view.locations.stage_create(patch);
        Ok(view.locations.create_draft().clone())
    }

    fn submit_create(&self) -> Result<Location, AppError> {
        let mut view = self.0.view.write()?;
        let location = view.locations.submit_create(&mut *self.0.listings.write()?)?;

        if view.active_location.is_none() {
            view.active_location = Some(location.id);
        }
        tracing::info!("➕ Localidade #{} criada: {}", location.id, location.name);
        Ok(location)
    }

    fn update(&self, id: RecordId, draft: LocationDraft) -> Result<Location, AppError> {
        let location = self.0.listings.write()?.update_partition(id, draft)?;
        tracing::info!("✏️ Localidade #{} atualizada", id);
        Ok(location)
    }

    /// Leva junto os perfis da localidade. Se era a ativa, a primeira restante assume.
    fn remove(&self, id: RecordId) -> Result<Option<Location>, AppError> {
        let mut view = self.0.view.write()?;
        let (removed, first_remaining) = {
            let mut listings = self.0.listings.write()?;
            let removed = listings.remove_location(id);
            (removed, listings.locations().first().map(Location::id))
        };

        let Some((location, profiles)) = removed else {
            return Ok(None);
        };

        view.locations.forget(id);
        if view.active_location == Some(id) {
            view.profiles.cancel();
            view.active_location = first_remaining;
        }
        drop(view);

        unlink_profiles(&self.0.agents, |r| r.location_id == id)?;
        tracing::info!(
            "🗑️ Localidade #{} removida com {} perfil(is)",
            id,
            profiles.len()
        );
        Ok(Some(location))
    }

    fn begin_edit(&self, id: RecordId) -> Result<EditState<LocationDraft>, AppError> {
        let mut view = self.0.view.write()?;
        let listings = self.0.listings.read()?;
        Ok(view.locations.begin_edit(&*listings, id)?.clone())
    }

    fn stage_edit(&self, patch: LocationDraft) -> Result<EditState<LocationDraft>, AppError> {
        Ok(self.0.view.write()?.locations.stage_edit(patch)?.clone())
    }

    fn save_edit(&self) -> Result<Location, AppError> {
        let mut view = self.0.view.write()?;
        let location = view.locations.save(&mut *self.0.listings.write()?)?;
        tracing::info!("💾 Localidade #{} salva", location.id);
        Ok(location)
    }

    fn cancel_edit(&self) -> Result<bool, AppError> {
        Ok(self.0.view.write()?.locations.cancel())
    }
}

// ---
// 2. Página dos perfis (sempre dentro da localidade ativa)
// ---
#[derive(Clone)]
pub struct ProfilesPage(ListingService);

impl CrudPage for ProfilesPage {
    type Record = Profile;
    type Entry = Profile;

    /// Sem localidade ativa a lista vem vazia.
    fn page(&self) -> Result<SnapshotOf<Self>, AppError> {
        let view = self.0.view.read()?;
        let listings = self.0.listings.read()?;

        let records = match view.active_location {
            Some(active) => listings.list(active)?.to_vec(),
            None => Vec::new(),
        };

        Ok(PageSnapshot {
            records,
            create_draft: view.profiles.create_draft().clone(),
            editing: view.profiles.editing().cloned(),
            partition: view.active_location,
        })
    }

    fn stage_create(&self, patch: ProfileDraft) -> Result<ProfileDraft, AppError> {
        let mut view = self.0.view.write()?;
        view.profiles.stage_create(patch);
        Ok(view.profiles.create_draft().clone())
    }

    fn submit_create(&self) -> Result<Profile, AppError> {
        let mut view = self.0.view.write()?;
        let active = ListingService::require_active(&view)?;

        let mut listings = self.0.listings.write()?;
        let profile = view.profiles.submit_create(listings.partition_mut(active)?)?;
        tracing::info!("➕ Perfil #{} criado na localidade #{}", profile.id, active);
        Ok(profile)
    }

    fn update(&self, id: RecordId, draft: ProfileDraft) -> Result<Profile, AppError> {
        let active = ListingService::require_active(&*self.0.view.read()?)?;
        let profile = self.0.listings.write()?.update(active, id, draft)?;
        tracing::info!("✏️ Perfil #{} atualizado na localidade #{}", id, active);
        Ok(profile)
    }

    fn remove(&self, id: RecordId) -> Result<Option<Profile>, AppError> {
        let mut view = self.0.view.write()?;
        let active = ListingService::require_active(&view)?;

        let removed = self.0.listings.write()?.remove(active, id)?;
        view.profiles.forget(id);
        drop(view);

        if removed.is_some() {
            unlink_profiles(&self.0.agents, |r| r.location_id == active && r.profile_id == id)?;
            tracing::info!("🗑️ Perfil #{} removido da localidade #{}", id, active);
        }
        Ok(removed)
    }

    fn begin_edit(&self, id: RecordId) -> Result<EditState<ProfileDraft>, AppError> {
        let mut view = self.0.view.write()?;
        let active = ListingService::require_active(&view)?;

        let listings = self.0.listings.read()?;
        Ok(view.profiles.begin_edit(listings.partition(active)?, id)?.clone())
    }

    fn stage_edit(&self, patch: ProfileDraft) -> Result<EditState<ProfileDraft>, AppError> {
        Ok(self.0.view.write()?.profiles.stage_edit(patch)?.clone())
    }

    fn save_edit(&self) -> Result<Profile, AppError> {
        let mut view = self.0.view.write()?;
        let active = ListingService::require_active(&view)?;

        let mut listings = self.0.listings.write()?;
        let profile = view.profiles.save(listings.partition_mut(active)?)?;
        tracing::info!("💾 Perfil #{} salvo na localidade #{}", profile.id, active);
        Ok(profile)
    }

    fn cancel_edit(&self) -> Result<bool, AppError> {
        Ok(self.0.view.write()?.profiles.cancel())
    }
}
