use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use opj_capture_application::{AuthenticatedSession, SessionStore};
use opj_capture_core::{AppError, AppResult};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Owner read/write only; the file carries a bearer token.
#[cfg(unix)]
const SESSION_FILE_MODE: u32 = 0o600;

/// Session store persisting the token and user as one JSON document.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store backed by `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> AppResult<Option<AuthenticatedSession>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to read session file '{}': {error}",
                    self.path.display()
                )));
            }
        };

        match serde_json::from_str::<AuthenticatedSession>(contents.as_str()) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    error = %error,
                    "ignoring unreadable session file"
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &AuthenticatedSession) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to create session directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let contents = serde_json::to_string_pretty(session)
            .map_err(|error| AppError::Internal(format!("failed to encode session: {error}")))?;
        let write_error = |error: std::io::Error| {
            AppError::Internal(format!(
                "failed to write session file '{}': {error}",
                self.path.display()
            ))
        };

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(SESSION_FILE_MODE);

        let mut file = options.open(&self.path).await.map_err(write_error)?;
        // `mode` only applies on creation; tighten files left by older runs.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(SESSION_FILE_MODE))
                .await
                .map_err(write_error)?;
        }
        file.write_all(contents.as_bytes())
            .await
            .map_err(write_error)?;
        file.flush().await.map_err(write_error)?;

        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AppError::Internal(format!(
                "failed to remove session file '{}': {error}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use opj_capture_application::{AuthenticatedSession, SessionStore};
    use opj_capture_core::{ActorId, SessionToken};
    use opj_capture_domain::{Actor, Role};

    use super::FileSessionStore;

    fn scratch_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir()
            .join(format!("opj-capture-{name}-{}-{nanos}", std::process::id()))
            .join("session.json")
    }

    fn session() -> AuthenticatedSession {
        AuthenticatedSession {
            token: SessionToken::new("jwt-42").unwrap_or_else(|_| unreachable!()),
            actor: Actor::new(ActorId::new(42), Role::Superviseur),
        }
    }

    #[tokio::test]
    async fn missing_file_means_no_session() {
        let store = FileSessionStore::new(scratch_path("missing"));
        let loaded = store.load().await;
        assert!(loaded.is_ok());
        assert!(loaded.unwrap_or_else(|_| unreachable!()).is_none());
    }

    #[tokio::test]
    async fn session_round_trips_and_clears() {
        let store = FileSessionStore::new(scratch_path("round-trip"));

        assert!(store.save(&session()).await.is_ok());
        let loaded = store.load().await.unwrap_or_else(|_| unreachable!());
        assert_eq!(loaded, Some(session()));

        assert!(store.clear().await.is_ok());
        assert!(
            store
                .load()
                .await
                .unwrap_or_else(|_| unreachable!())
                .is_none()
        );
        assert!(store.clear().await.is_ok());
    }

    #[tokio::test]
    async fn stored_document_uses_token_and_user_keys() {
        let store = FileSessionStore::new(scratch_path("layout"));
        assert!(store.save(&session()).await.is_ok());

        let raw = tokio::fs::read_to_string(store.path())
            .await
            .unwrap_or_else(|_| unreachable!());
        let document: serde_json::Value =
            serde_json::from_str(raw.as_str()).unwrap_or_else(|_| unreachable!());
        assert_eq!(document["token"], serde_json::json!("jwt-42"));
        assert_eq!(document["user"]["role"], serde_json::json!("ROLE_SUPERVISEUR"));

        assert!(store.clear().await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn session_file_is_private_to_its_owner() {
        use std::os::unix::fs::PermissionsExt;

        let store = FileSessionStore::new(scratch_path("private"));
        assert!(store.save(&session()).await.is_ok());

        let metadata = tokio::fs::metadata(store.path())
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600);

        assert!(store.clear().await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn existing_readable_file_is_tightened_on_save() {
        use std::os::unix::fs::PermissionsExt;

        let store = FileSessionStore::new(scratch_path("tighten"));
        if let Some(parent) = store.path().parent() {
            assert!(tokio::fs::create_dir_all(parent).await.is_ok());
        }
        assert!(tokio::fs::write(store.path(), "{}").await.is_ok());
        assert!(
            tokio::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644))
                .await
                .is_ok()
        );

        assert!(store.save(&session()).await.is_ok());
        let metadata = tokio::fs::metadata(store.path())
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
        assert_eq!(
            store.load().await.unwrap_or_else(|_| unreachable!()),
            Some(session())
        );

        assert!(store.clear().await.is_ok());
    }

    #[tokio::test]
    async fn corrupt_file_is_treated_as_logged_out() {
        let store = FileSessionStore::new(scratch_path("corrupt"));
        if let Some(parent) = store.path().parent() {
            assert!(tokio::fs::create_dir_all(parent).await.is_ok());
        }
        assert!(tokio::fs::write(store.path(), "{not json").await.is_ok());

        let loaded = store.load().await.unwrap_or_else(|_| unreachable!());
        assert!(loaded.is_none());
        assert!(store.clear().await.is_ok());
    }
}
