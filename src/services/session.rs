// src/services/session.rs

use std::sync::{Arc, Mutex, Weak};

use chrono::Utc;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};

use crate::{
    common::error::AppError,
    db::shared::Shared,
    models::auth::{ProviderSession, Role, SessionChange, SessionSnapshot},
    services::identity::IdentityProvider,
};

#[derive(Debug)]
struct SessionState {
    session: Option<ProviderSession>,
    loading: bool,
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    state: Shared<SessionState>,
    subscription: Mutex<Option<SessionSubscription>>,
}

/// Inscrição nas notificações do provedor. Soltar o valor cancela a task.
pub struct SessionSubscription {
    task: JoinHandle<()>,
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A sessão do console: uma instância por processo, criada no `AppState`.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                state: Shared::new(SessionState { session: None, loading: true }),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Consulta a sessão persistida e passa a ouvir as transições do provedor.
    /// Se o provedor falhar, o carregamento termina sem sessão e o erro é devolvido.
    pub async fn initialize(&self) -> Result<(), AppError> {
        // Inscreve antes de consultar: nenhuma transição se perde no meio.
        let mut changes = self.inner.provider.on_session_change();
        let result = self.inner.provider.get_session().await;

        {
            let mut state = self.inner.state.write()?;
            state.session = result.as_ref().ok().cloned().flatten();
            state.loading = false;
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        let Some(inner) = weak.upgrade() else { break };
                        apply_change(&inner, change);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Ouvinte de sessão perdeu {} notificação(ões)", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let previous = self
            .inner
            .subscription
            .lock()
            .map_err(|_| anyhow::anyhow!("Lock da inscrição envenenado"))?
            .replace(SessionSubscription { task });
        drop(previous);

        match result {
            Ok(Some(session)) => {
                tracing::info!("✅ Sessão carregada: {}", session.user.email);
                Ok(())
            }
            Ok(None) => {
                tracing::info!("Nenhuma sessão persistida");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, AppError> {
        // Falha do provedor: o estado local não muda.
        let session = self
            .inner
            .provider
            .sign_in_with_password(email, password)
            .await?;

        let mut state = self.inner.state.write()?;
        state.session = Some(session.clone());
        state.loading = false;
        tracing::info!("🔓 Login: {}", session.user.email);
        Ok(session)
    }

    /// O estado local só é limpo depois que o provedor confirma.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.inner.provider.sign_out().await?;

        let mut state = self.inner.state.write()?;
        if let Some(session) = state.session.take() {
            tracing::info!("🔒 Logout: {}", session.user.email);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, AppError> {
        let state = self.inner.state.read()?;
        let now = Utc::now();
        let session = state.session.as_ref().filter(|s| !s.is_expired(now));

        Ok(SessionSnapshot {
            user: session.map(|s| s.user.clone()),
            role: session.and_then(|s| Role::from_provider(&s.user.role)),
            loading: state.loading,
            access_token: session.map(|s| s.access_token.clone()),
            expires_at: session.map(|s| s.expires_at),
        })
    }

    /// Cancela a inscrição no provedor. Chamar de novo não faz nada.
    pub fn teardown(&self) -> Result<(), AppError> {
        let subscription = self
            .inner
            .subscription
            .lock()
            .map_err(|_| anyhow::anyhow!("Lock da inscrição envenenado"))?
            .take();

        if subscription.is_some() {
            tracing::info!("Inscrição de sessão encerrada");
        }
        Ok(())
    }
}

fn apply_change(inner: &Inner, change: SessionChange) {
    match inner.state.write() {
        Ok(mut state) => {
            tracing::debug!("Transição de sessão: {:?}", change.event);
            state.session = change.session;
            state.loading = false;
        }
        Err(e) => tracing::error!("Falha ao aplicar transição de sessão: {}", e),
    }
}
