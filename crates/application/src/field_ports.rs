use async_trait::async_trait;
use opj_capture_core::{AppResult, SessionToken};
use opj_capture_domain::{
    Actor, Bandit, BanditDraft, BanditId, Capture, CaptureDraft, CaptureId, Infraction,
    InfractionDraft, InfractionId, PasswordChange,
};
use serde::{Deserialize, Serialize};

/// Token and user profile cached after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedSession {
    /// Bearer token for API calls.
    pub token: SessionToken,
    /// Authenticated user.
    #[serde(rename = "user")]
    pub actor: Actor,
}

/// One list response: the decoded records plus the collection size the
/// server reported, which exceeds `records.len()` on paginated responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPage<T> {
    /// Records present in this response.
    pub records: Vec<T>,
    /// `hydra:totalItems` when the server sent it.
    pub total_items: Option<usize>,
}

impl<T> RecordPage<T> {
    /// Wraps records from an unpaginated response.
    #[must_use]
    pub fn unpaginated(records: Vec<T>) -> Self {
        Self {
            records,
            total_items: None,
        }
    }

    /// Returns the server-side collection size, falling back to the number
    /// of records received.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total_items.unwrap_or(self.records.len())
    }
}

/// Partial update applied to a capture during review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureUpdate {
    /// Marks the capture as rejected.
    Reject,
    /// Attaches a reviewer comment.
    Comment(String),
}

/// Supervisor decision on an infraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfractionDecision {
    /// Approve the infraction.
    Approve,
    /// Reject the infraction.
    Reject,
}

impl InfractionDecision {
    /// Returns the endpoint verb for this decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// Port for the remote field-operations REST API.
///
/// The server remains the authority on every rule; implementations only
/// transport requests and convert payloads into domain records.
#[async_trait]
pub trait FieldApiRepository: Send + Sync {
    /// Exchanges credentials for a session.
    async fn login(&self, email: &str, password: &str) -> AppResult<AuthenticatedSession>;

    /// Changes the current user's password.
    async fn change_password(&self, token: &SessionToken, change: &PasswordChange)
    -> AppResult<()>;

    /// Lists the bandits the server returns.
    async fn list_bandits(&self, token: &SessionToken) -> AppResult<RecordPage<Bandit>>;

    /// Creates a bandit, or replaces it when `bandit_id` is set.
    async fn save_bandit(
        &self,
        token: &SessionToken,
        bandit_id: Option<BanditId>,
        draft: &BanditDraft,
    ) -> AppResult<()>;

    /// Deletes a bandit.
    async fn delete_bandit(&self, token: &SessionToken, bandit_id: BanditId) -> AppResult<()>;

    /// Lists the captures the server returns.
    async fn list_captures(&self, token: &SessionToken) -> AppResult<RecordPage<Capture>>;

    /// Records a new capture.
    async fn create_capture(&self, token: &SessionToken, draft: &CaptureDraft) -> AppResult<()>;

    /// Deletes a capture.
    async fn delete_capture(&self, token: &SessionToken, capture_id: CaptureId) -> AppResult<()>;

    /// Applies a review update to a capture.
    async fn update_capture(
        &self,
        token: &SessionToken,
        capture_id: CaptureId,
        update: &CaptureUpdate,
    ) -> AppResult<()>;

    /// Lists the infraction catalogue.
    async fn list_infractions(&self, token: &SessionToken) -> AppResult<RecordPage<Infraction>>;

    /// Creates an infraction, or replaces it when `infraction_id` is set.
    async fn save_infraction(
        &self,
        token: &SessionToken,
        infraction_id: Option<InfractionId>,
        draft: &InfractionDraft,
    ) -> AppResult<()>;

    /// Deletes an infraction.
    async fn delete_infraction(
        &self,
        token: &SessionToken,
        infraction_id: InfractionId,
    ) -> AppResult<()>;

    /// Records a supervisor decision on an infraction.
    async fn review_infraction(
        &self,
        token: &SessionToken,
        infraction_id: InfractionId,
        decision: InfractionDecision,
    ) -> AppResult<()>;
}

/// Port for device-local session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the cached session, if any.
    async fn load(&self) -> AppResult<Option<AuthenticatedSession>>;

    /// Replaces the cached session.
    async fn save(&self, session: &AuthenticatedSession) -> AppResult<()>;

    /// Removes the cached token and user.
    async fn clear(&self) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::RecordPage;

    #[test]
    fn page_total_prefers_reported_size() {
        let page = RecordPage {
            records: vec![1, 2],
            total_items: Some(40),
        };
        assert_eq!(page.total(), 40);
        assert_eq!(RecordPage::unpaginated(vec![1, 2, 3]).total(), 3);
    }
}
