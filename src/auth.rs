//! Login session.
//!
//! The session is read once at startup and passed to whoever needs it. It is
//! stored as `session.json` in the data directory and has no expiry.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{Error, Result};

const SESSION_FILE: &str = "session.json";

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub username: String,
}

/// Loads, creates and clears the persisted session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// A store keeping its file in `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted session. A missing or unreadable file means
    /// nobody is logged in.
    pub fn load(&self) -> Option<AuthSession> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<AuthSession>(&content) {
            Ok(session) if !session.username.trim().is_empty() => Some(session),
            Ok(_) => None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Ignoring corrupt session file");
                None
            }
        }
    }

    pub fn save(&self, session: &AuthSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(session)?)?;
        Ok(())
    }

    /// Authenticate against the backend and persist the session.
    pub async fn login(
        &self,
        client: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<AuthSession> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(Error::invalid_input("username and password are required"));
        }
        let confirmed = client.login(username.trim(), password).await?;
        let session = AuthSession {
            username: confirmed,
        };
        self.save(&session)?;
        info!(username = %session.username, "Logged in");
        Ok(session)
    }

    /// Remove the persisted session.
    pub fn logout(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Logged out");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::serve_once;
    use crate::config::ApiConfig;
    use pretty_assertions::assert_eq;

    fn temp_store() -> SessionStore {
        let dir = std::env::temp_dir().join(format!("marketdeck-auth-{}", uuid::Uuid::new_v4()));
        SessionStore::new(dir)
    }

    fn client(base_url: String) -> ApiClient {
        ApiClient::new(ApiConfig {
            base_url,
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_missing_file_means_logged_out() {
        assert_eq!(temp_store().load(), None);
    }

    #[test]
    fn test_save_load_logout() {
        let store = temp_store();
        let session = AuthSession {
            username: "ivy".to_string(),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));

        store.logout().unwrap();
        assert_eq!(store.load(), None);
        // Logging out twice is fine.
        store.logout().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let store = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();
        assert_eq!(store.load(), None);
    }

    #[tokio::test]
    async fn test_login_persists_confirmed_username() {
        let (url, server) = serve_once(200, r#"{"username": "ivy", "token": "x"}"#).await;
        let store = temp_store();

        let session = store.login(&client(url), "ivy", "secret").await.unwrap();
        assert_eq!(session.username, "ivy");
        assert_eq!(store.load(), Some(session));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/login"));
    }

    #[tokio::test]
    async fn test_failed_login_leaves_no_session() {
        let (url, _server) = serve_once(401, r#"{"detail": "Invalid credentials"}"#).await;
        let store = temp_store();

        let err = store.login(&client(url), "ivy", "wrong").await.unwrap_err();
        assert_eq!(err.detail(), Some("Invalid credentials"));
        assert_eq!(store.load(), None);
    }

    #[tokio::test]
    async fn test_empty_credentials_are_rejected_locally() {
        let store = temp_store();
        let err = store
            .login(&client("http://127.0.0.1:9".to_string()), " ", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
