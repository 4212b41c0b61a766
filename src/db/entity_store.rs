// src/db/entity_store.rs

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use validator::Validate;

use crate::common::error::AppError;

/// Identidade inteira atribuída pela store (positiva, única na coleção).
pub type RecordId = u32;

// Capacidade do canal de eventos. Ouvintes lentos perdem eventos antigos (Lagged).
const EVENT_CAPACITY: usize = 64;

// ---
// 1. Contratos dos registros
// ---

/// Rascunho de um registro: os campos ausentes (`None`) não foram informados.
pub trait Draft:
    Default + Clone + Validate + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Copia por cima de `self` os campos presentes em `other`.
    fn overlay(&mut self, other: Self);
}

/// Um registro com identidade inteira, guardado numa `EntityStore`.
pub trait Record: Clone + Validate + Serialize + Send + Sync + 'static {
    type Draft: Draft;

    /// Nome do recurso usado em logs e em erros de "não encontrado".
    const KIND: &'static str;

    fn id(&self) -> RecordId;

    /// Constrói o registro a partir de um rascunho já validado (`required`).
    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    /// Merge raso: os campos presentes no rascunho substituem os atuais.
    fn merge(&self, draft: Self::Draft) -> Self;

    /// Carrega o registro inteiro num rascunho (modo edição).
    fn to_draft(&self) -> Self::Draft;
}

// ---
// 2. Eventos para os ouvintes
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEvent {
    pub kind: &'static str,
    /// Partição (ex: localidade) quando a store pertence a uma coleção de coleções.
    pub scope: Option<RecordId>,
    pub id: RecordId,
    pub change: ChangeKind,
}

// ---
// 3. A superfície comum de escrita (lista simples ou lado "pai" de uma partição)
// ---
pub trait Collection<T: Record> {
    fn get(&self, id: RecordId) -> Option<&T>;
    fn add(&mut self, draft: T::Draft) -> Result<T, AppError>;
    fn update(&mut self, id: RecordId, draft: T::Draft) -> Result<T, AppError>;
}

// ---
// 4. A store em si
// ---

/// Sequência ordenada de registros de um tipo. A ordem de inserção é a ordem de exibição.
pub struct EntityStore<T: Record> {
    records: Vec<T>,
    scope: Option<RecordId>,
    events: broadcast::Sender<StoreEvent>,
}

impl<T: Record> EntityStore<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Store pré-carregada (dados de exemplo, testes).
    pub fn with_records(records: Vec<T>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { records, scope: None, events }
    }

    /// Store de uma partição: publica no canal do dono com o `scope` preenchido.
    pub(crate) fn scoped(
        scope: RecordId,
        records: Vec<T>,
        events: broadcast::Sender<StoreEvent>,
    ) -> Self {
        Self { records, scope: Some(scope), events }
    }

    pub fn list(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    /// max(ids ∪ {0}) + 1. Não é um contador: apagar o maior id e inserir de novo o reutiliza.
    pub fn next_id(&self) -> RecordId {
        self.records.iter().map(Record::id).max().unwrap_or(0) + 1
    }

    pub fn add(&mut self, draft: T::Draft) -> Result<T, AppError> {
        // Campos obrigatórios primeiro, depois as regras do registro montado.
        draft.validate()?;
        let record = T::from_draft(self.next_id(), draft);
        record.validate()?;

        self.records.push(record.clone());
        self.notify(record.id(), ChangeKind::Added);
        Ok(record)
    }

    pub fn update(&mut self, id: RecordId, draft: T::Draft) -> Result<T, AppError> {
        let position = self
            .position(id)
            .ok_or(AppError::NotFound { resource: T::KIND, id })?;

        let merged = self.records[position].merge(draft);
        merged.validate()?;

        self.records[position] = merged.clone();
        self.notify(id, ChangeKind::Updated);
        Ok(merged)
    }

    /// Remove o registro; id ausente não é erro.
    pub fn remove(&mut self, id: RecordId) -> Option<T> {
        let position = self.position(id)?;
        let removed = self.records.remove(position);
        self.notify(id, ChangeKind::Removed);
        Some(removed)
    }

    /// Aplica `f` a cada registro; `f` devolve `true` quando alterou algo.
    /// Usado para limpar referências em cascata. Devolve quantos mudaram.
    pub fn retain_links<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&mut T) -> bool,
    {
        let mut changed = Vec::new();
        for record in self.records.iter_mut() {
            if f(record) {
                changed.push(record.id());
            }
        }
        for id in &changed {
            self.notify(*id, ChangeKind::Updated);
        }
        changed.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    fn notify(&self, id: RecordId, change: ChangeKind) {
        // Sem ouvintes o envio falha, o que é normal.
        let _ = self.events.send(StoreEvent {
            kind: T::KIND,
            scope: self.scope,
            id,
            change,
        });
    }
}

impl<T: Record> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Collection<T> for EntityStore<T> {
    fn get(&self, id: RecordId) -> Option<&T> {
        EntityStore::get(self, id)
    }

    fn add(&mut self, draft: T::Draft) -> Result<T, AppError> {
        EntityStore::add(self, draft)
    }

    fn update(&mut self, id: RecordId, draft: T::Draft) -> Result<T, AppError> {
        EntityStore::update(self, id, draft)
    }
}

/// Remove ids repetidos mantendo a primeira ocorrência (listas com semântica de conjunto).
/// Texto sem espaços nas pontas; campos só com espaços ficam vazios.
pub fn trimmed(value: String) -> String {
    value.trim().to_string()
}

pub fn dedup_ids<I>(ids: I) -> Vec<I::Item>
where
    I: IntoIterator,
    I::Item: PartialEq,
{
    let mut unique = Vec::new();
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}
