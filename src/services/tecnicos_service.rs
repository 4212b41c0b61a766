// src/services/tecnicos_service.rs

use crate::{
    common::error::AppError,
    db::{
        entity_store::{EntityStore, RecordId},
        shared::Shared,
    },
    models::{
        auth::{Identity, Role},
        nichos::Category,
        tecnicos::{PasswordResetResponse, Technician, TechnicianDraft, TechnicianEntry},
    },
    services::{
        identity::IdentityProvider,
        nichos_service::{check_categories, resolve_categories},
        page::{CrudService, Links},
    },
};

pub type TechnicianService = CrudService<Technician, TechnicianLinks>;

#[derive(Clone)]
pub struct TechnicianLinks {
    pub categories: Shared<EntityStore<Category>>,
}

impl Links<Technician> for TechnicianLinks {
    type Entry = TechnicianEntry;

    fn check(&self, draft: &TechnicianDraft) -> Result<(), AppError> {
        check_categories(&self.categories, draft.nichos.as_deref())
    }

    fn resolve(&self, records: Vec<Technician>) -> Result<Vec<TechnicianEntry>, AppError> {
        let categories = self.categories.read()?;
        Ok(records
            .into_iter()
            .map(|t| TechnicianEntry {
                nichos: resolve_categories(&categories, &t.nichos),
                id: t.id,
                name: t.name,
                phone: t.phone,
                email: t.email,
                commission: t.commission,
            })
            .collect())
    }

    fn on_removed(&self, _technician: &Technician) -> Result<(), AppError> {
        Ok(())
    }
}

// ---
// Conta do técnico no provedor de identidade (chave: o e-mail do técnico)
// ---
impl TechnicianService {
    pub async fn set_password(
        &self,
        identity: &dyn IdentityProvider,
        id: RecordId,
        password: &str,
    ) -> Result<Identity, AppError> {
        // Nenhum lock atravessa o `.await`: `find` devolve uma cópia.
        let technician = self.find(id)?;
        let account = identity
            .set_password(&technician.email, password, Role::Technician)
            .await?;
        Ok(account)
    }

    pub async fn reset_password(
        &self,
        identity: &dyn IdentityProvider,
        id: RecordId,
    ) -> Result<PasswordResetResponse, AppError> {
        let technician = self.find(id)?;
        let temporary_password = identity
            .reset_password(&technician.email, Role::Technician)
            .await?;
        Ok(PasswordResetResponse {
            email: technician.email,
            temporary_password,
        })
    }
}
