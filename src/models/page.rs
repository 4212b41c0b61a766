// src/models/page.rs

use serde::Serialize;

use crate::db::entity_store::RecordId;

/// O rascunho em edição (um registro por vez).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditState<D> {
    pub id: RecordId,
    pub draft: D,
}

/// Tudo que uma página CRUD mostra: a lista, a linha de criação e a edição em curso.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot<E, D> {
    pub records: Vec<E>,
    pub create_draft: D,
    pub editing: Option<EditState<D>>,
    /// Partição exibida (localidade ativa), só nas páginas particionadas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<RecordId>,
}
