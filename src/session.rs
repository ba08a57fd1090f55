use log::{debug, info, warn};

use crate::{
    error::{SessionError, Write},
    model::{Avatar, User, SESSION_KEY},
    storage::{Scope, Storage},
};

/// Holds the signed-in user of this client and keeps it in private storage
#[derive(Debug)]
pub struct SessionManager<S> {
    storage: S,
    current_user: Option<User>,
}

impl<S: Storage> SessionManager<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            current_user: None,
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Reads the saved session. A missing, unreadable or malformed value
    /// all leave the manager signed out.
    pub async fn restore(&mut self) -> Option<&User> {
        self.current_user = match self.storage.get(SESSION_KEY, Scope::Private).await {
            Ok(Some(value)) => match serde_json::from_str::<User>(&value) {
                Ok(user) => {
                    debug!("Restored session for {}", user.name);
                    Some(user)
                }
                Err(e) => {
                    warn!("Ignoring malformed session: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read session: {}", e);
                None
            }
        };
        self.current_user.as_ref()
    }

    /// Signs in even when the session cannot be saved; the returned
    /// `Write` tells whether it will survive a restart.
    pub async fn login(&mut self, name: &str, avatar: Avatar) -> Result<Write, SessionError> {
        let user = User::new(name, avatar).ok_or(SessionError::EmptyName)?;
        info!("Logged in as {} {}", user.avatar, user.name);

        let value = serde_json::to_string(&user);
        self.current_user = Some(user);

        let write: Write = match value {
            Ok(value) => self.storage.set(SESSION_KEY, &value, Scope::Private).await,
            Err(e) => Err(e.into()),
        }
        .into();
        if let Write::Unsaved(e) = &write {
            warn!("Session was not saved: {}", e);
        }
        Ok(write)
    }

    pub async fn logout(&mut self) -> Write {
        if let Some(user) = self.current_user.take() {
            info!("Logged out {}", user.name);
        }

        let write: Write = self.storage.delete(SESSION_KEY, Scope::Private).await.into();
        if let Write::Unsaved(e) = &write {
            warn!("Session was not removed: {}", e);
        }
        write
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn login_survives_restore() {
        let storage = MemoryStorage::new();
        let mut session = SessionManager::new(storage.clone());
        let avatar = Avatar::new("🐯").unwrap();
        assert!(session.login(" Dilan ", avatar.clone()).await.unwrap().is_saved());

        let mut fresh = SessionManager::new(storage);
        let user = fresh.restore().await.cloned();
        assert_eq!(user, Some(User { name: "Dilan".into(), avatar }));
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let mut session = SessionManager::new(MemoryStorage::new());
        assert_eq!(
            session.login("   ", Avatar::default()).await.unwrap_err(),
            SessionError::EmptyName
        );
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn restore_without_session_is_signed_out() {
        let storage = MemoryStorage::new();
        let mut session = SessionManager::new(storage.clone());
        assert!(session.restore().await.is_none());

        storage.set(SESSION_KEY, "{not json", Scope::Private).await.unwrap();
        assert!(session.restore().await.is_none());

        let blank = r#"{"username":"   ","emoji":""}"#;
        storage.set(SESSION_KEY, blank, Scope::Private).await.unwrap();
        assert!(session.restore().await.is_none());

        let blank_glyph = r#"{"username":"Dilan","emoji":" "}"#;
        storage.set(SESSION_KEY, blank_glyph, Scope::Private).await.unwrap();
        assert!(session.restore().await.is_none());

        storage.set_offline(true);
        assert!(session.restore().await.is_none());
    }

    #[tokio::test]
    async fn failed_persistence_keeps_memory_state() {
        let storage = MemoryStorage::new();
        let mut session = SessionManager::new(storage.clone());
        storage.set_offline(true);

        let write = session.login("Dilan", Avatar::default()).await.unwrap();
        assert!(matches!(write, Write::Unsaved(_)));
        assert_eq!(session.current_user().map(|u| u.name.as_str()), Some("Dilan"));

        // a reload would show the signed-out state
        storage.set_offline(false);
        assert!(SessionManager::new(storage.clone()).restore().await.is_none());

        assert!(session.login("Dilan", Avatar::default()).await.unwrap().is_saved());
        storage.set_offline(true);
        assert!(matches!(session.logout().await, Write::Unsaved(_)));
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn logout_forgets_saved_session() {
        let storage = MemoryStorage::new();
        let mut session = SessionManager::new(storage.clone());
        assert!(session.login("Dilan", Avatar::default()).await.unwrap().is_saved());
        assert!(session.logout().await.is_saved());

        assert!(SessionManager::new(storage).restore().await.is_none());
    }
}
