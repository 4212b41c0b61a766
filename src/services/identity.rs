// src/services/identity.rs

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::RwLock,
};

use async_trait::async_trait;
use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    common::error::AuthError,
    models::auth::{
        Claims, Identity, PersistedSession, ProviderSession, Role, SessionChange, SessionEvent,
    },
};

const CHANGE_CAPACITY: usize = 16;

/// A fronteira com o provedor de identidade externo.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sessão persistida atual, se houver (e ainda válida).
    async fn get_session(&self) -> Result<Option<ProviderSession>, AuthError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Canal de notificações de transição de sessão.
    /// Soltar o `Receiver` cancela a inscrição.
    fn on_session_change(&self) -> broadcast::Receiver<SessionChange>;

    /// Cria a conta (ou troca a senha, se já existir com o mesmo papel).
    /// Uma conta existente com outro papel é recusada.
    async fn set_password(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Identity, AuthError>;

    /// Troca a senha por uma temporária e a devolve.
    /// Só vale para uma conta com o papel informado.
    async fn reset_password(&self, email: &str, role: Role) -> Result<String, AuthError>;
}

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    password_hash: String,
}

#[derive(Debug, Clone)]
pub struct LocalProviderSettings {
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
    pub hash_cost: u32,
    pub session_file: Option<PathBuf>,
}

/// Provedor local: contas em memória (bcrypt), sessões em JWT,
/// sessão atual opcionalmente persistida num arquivo JSON.
pub struct LocalIdentityProvider {
    settings: LocalProviderSettings,
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<ProviderSession>>,
    changes: broadcast::Sender<SessionChange>,
}

impl LocalIdentityProvider {
    pub fn new(settings: LocalProviderSettings) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            settings,
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            changes,
        }
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn find_account(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| AuthError::Unavailable("lock de contas envenenado".into()))?;
        Ok(accounts.get(&Self::normalize(email)).cloned())
    }

    fn current_session(&self) -> Result<Option<ProviderSession>, AuthError> {
        let current = self
            .current
            .read()
            .map_err(|_| AuthError::Unavailable("lock de sessão envenenado".into()))?;
        Ok(current.clone())
    }

    fn replace_session(&self, session: Option<ProviderSession>) -> Result<(), AuthError> {
        let mut current = self
            .current
            .write()
            .map_err(|_| AuthError::Unavailable("lock de sessão envenenado".into()))?;
        *current = session;
        Ok(())
    }

    fn ensure_role(account: &Account, role: Role) -> Result<(), AuthError> {
        if Role::from_provider(&account.identity.role) == Some(role) {
            return Ok(());
        }
        tracing::warn!(
            "Conta {} tem papel '{}', esperado '{}'",
            account.identity.email,
            account.identity.role,
            role.as_str()
        );
        Err(AuthError::RoleMismatch(account.identity.email.clone()))
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password_clone = password.to_owned();
        let cost = self.settings.hash_cost;
        tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| AuthError::Unavailable(format!("Falha na task de hashing: {}", e)))?
            .map_err(AuthError::from)
    }

    fn create_session(&self, identity: Identity) -> Result<ProviderSession, AuthError> {
        let now = Utc::now();
        let expires_at = now + self.settings.session_ttl;

        let claims = Claims {
            sub: identity.id,
            email: identity.email.clone(),
            role: identity.role.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.jwt_secret.as_ref()),
        )?;

        Ok(ProviderSession { access_token, user: identity, expires_at })
    }

    /// Reconstrói a sessão a partir de um token (assinatura + expiração + conta ainda existente).
    fn session_from_token(&self, token: &str) -> Result<Option<ProviderSession>, AuthError> {
        let token_data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.jwt_secret.as_ref()),
            &Validation::default(),
        ) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Sessão persistida descartada: {}", e);
                return Ok(None);
            }
        };

        let Some(account) = self.find_account(&token_data.claims.email)? else {
            return Ok(None);
        };
        let Some(expires_at) = DateTime::from_timestamp(token_data.claims.exp as i64, 0) else {
            return Ok(None);
        };

        Ok(Some(ProviderSession {
            access_token: token.to_string(),
            user: account.identity,
            expires_at,
        }))
    }

    async fn load_persisted(&self) -> Result<Option<ProviderSession>, AuthError> {
        let Some(path) = &self.settings.session_file else {
            return Ok(None);
        };

        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(persisted) => self.session_from_token(&persisted.access_token),
            Err(e) => {
                tracing::warn!("Arquivo de sessão ilegível em {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    async fn persist(&self, session: &ProviderSession) -> Result<(), AuthError> {
        if let Some(path) = &self.settings.session_file {
            let body = serde_json::to_string(&PersistedSession {
                access_token: session.access_token.clone(),
            })?;
            tokio::fs::write(path, body).await?;
        }
        Ok(())
    }

    async fn forget_persisted(&self) -> Result<(), AuthError> {
        if let Some(path) = &self.settings.session_file {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn publish(&self, event: SessionEvent, session: Option<ProviderSession>) {
        // Ninguém inscrito ainda não é erro.
        let _ = self.changes.send(SessionChange { event, session });
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn get_session(&self) -> Result<Option<ProviderSession>, AuthError> {
        if let Some(session) = self.current_session()? {
            if !session.is_expired(Utc::now()) {
                return Ok(Some(session));
            }
            self.replace_session(None)?;
        }

        let restored = self.load_persisted().await?;
        if let Some(session) = &restored {
            tracing::info!("🔁 Sessão restaurada para {}", session.user.email);
            self.replace_session(Some(session.clone()))?;
        }
        Ok(restored)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, AuthError> {
        let account = self
            .find_account(email)?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = account.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| AuthError::Unavailable(format!("Falha na task de verificação de senha: {}", e)))??;

        if !is_password_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.create_session(account.identity)?;
        self.persist(&session).await?;
        self.replace_session(Some(session.clone()))?;
        self.publish(SessionEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Primeiro o arquivo: se falhar, a sessão continua válida dos dois lados.
        self.forget_persisted().await?;
        self.replace_session(None)?;
        self.publish(SessionEvent::SignedOut, None);
        Ok(())
    }

    fn on_session_change(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    async fn set_password(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Identity, AuthError> {
        let key = Self::normalize(email);
        if let Some(existing) = self.find_account(&key)? {
            Self::ensure_role(&existing, role)?;
        }

        let password_hash = self.hash_password(password).await?;

        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| AuthError::Unavailable("lock de contas envenenado".into()))?;

        // Confere de novo com o lock de escrita: a conta pode ter surgido no meio do hashing.
        let identity = match accounts.get(&key) {
            Some(existing) => {
                Self::ensure_role(existing, role)?;
                existing.identity.clone()
            }
            None => Identity {
                id: Uuid::new_v4(),
                email: key.clone(),
                role: role.as_str().to_string(),
                created_at: Utc::now(),
            },
        };
        accounts.insert(key, Account { identity: identity.clone(), password_hash });

        tracing::info!("🔑 Senha definida para {}", identity.email);
        Ok(identity)
    }

    async fn reset_password(&self, email: &str, role: Role) -> Result<String, AuthError> {
        let key = Self::normalize(email);
        match self.find_account(&key)? {
            Some(account) => Self::ensure_role(&account, role)?,
            None => return Err(AuthError::UnknownAccount(key)),
        }

        let temporary: String = Uuid::new_v4().simple().to_string().chars().take(12).collect();
        let password_hash = self.hash_password(&temporary).await?;

        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| AuthError::Unavailable("lock de contas envenenado".into()))?;
        let account = accounts
            .get_mut(&key)
            .ok_or_else(|| AuthError::UnknownAccount(key.clone()))?;
        Self::ensure_role(account, role)?;
        account.password_hash = password_hash;

        tracing::info!("🔑 Senha temporária gerada para {}", key);
        Ok(temporary)
    }
}
