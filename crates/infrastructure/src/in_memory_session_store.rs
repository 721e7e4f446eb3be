use async_trait::async_trait;
use opj_capture_application::{AuthenticatedSession, SessionStore};
use opj_capture_core::AppResult;
use tokio::sync::RwLock;

/// Process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: RwLock<Option<AuthenticatedSession>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: RwLock::new(None),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> AppResult<Option<AuthenticatedSession>> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &AuthenticatedSession) -> AppResult<()> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.session.write().await.take();
        Ok(())
    }
}
