// src/db/shared.rs

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::error::AppError;

/// Handle clonável para um container de estado (store ou view) injetado nos serviços.
///
/// Ordem de aquisição dos locks, para nunca haver deadlock:
/// view da página < categorias < localidades/perfis < técnicos < agentes.
/// Nenhum guard atravessa um `.await`.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, T>, AppError> {
        self.0
            .read()
            .map_err(|_| anyhow::anyhow!("Lock envenenado (leitura)").into())
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, T>, AppError> {
        self.0
            .write()
            .map_err(|_| anyhow::anyhow!("Lock envenenado (escrita)").into())
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
