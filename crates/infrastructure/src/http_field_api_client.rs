use async_trait::async_trait;
use opj_capture_application::{
    AuthenticatedSession, CaptureUpdate, FieldApiRepository, InfractionDecision, RecordPage,
};
use opj_capture_core::{AppError, AppResult, SessionToken};
use opj_capture_domain::{
    Actor, Bandit, BanditDraft, BanditId, Capture, CaptureDraft, CaptureId, Infraction,
    InfractionDraft, InfractionId, PasswordChange,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

mod wire;


use wire::{
    BanditPayload, BanditRequest, CapturePayload, CaptureRequest, InfractionPayload,
    InfractionRequest, PasswordChangeRequest, extract_collection, extract_login, response_message,
};

/// Field-operations REST API adapter built on `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFieldApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpFieldApiClient {
    /// Creates a client for the server rooted at `base_url`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http_client,
            base_url,
        }
    }

    /// Returns the base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute(&self, builder: reqwest::RequestBuilder, action: &str) -> AppResult<String> {
        let response = builder.send().await.map_err(|error| {
            AppError::Internal(format!("{action} failed to reach the server: {error}"))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());

        if status.is_success() {
            debug!(action, status = status.as_u16(), "field api call succeeded");
            return Ok(body);
        }

        Err(error_for_status(status, action, body.as_str()))
    }

    async fn list<P, T>(
        &self,
        token: &SessionToken,
        path: &str,
        collection_key: &str,
        convert: fn(P) -> T,
    ) -> AppResult<RecordPage<T>>
    where
        P: DeserializeOwned,
    {
        let body = self
            .execute(
                self.http_client
                    .get(self.endpoint(path))
                    .bearer_auth(token.as_str()),
                path,
            )
            .await?;

        let document: Value = serde_json::from_str(body.as_str()).map_err(|error| {
            AppError::Internal(format!("{path} returned invalid json: {error}"))
        })?;

        let (items, total_items) = extract_collection(document, collection_key);
        Ok(RecordPage {
            records: decode_records(items, path, convert),
            total_items,
        })
    }

    async fn send_json(
        &self,
        method: reqwest::Method,
        token: &SessionToken,
        path: &str,
        payload: Option<Value>,
    ) -> AppResult<()> {
        let mut builder = self
            .http_client
            .request(method, self.endpoint(path))
            .bearer_auth(token.as_str());
        if let Some(payload) = payload {
            builder = builder.json(&payload);
        }

        self.execute(builder, path).await.map(|_| ())
    }
}

/// Maps a non-success status to the shared error categories.
fn error_for_status(status: reqwest::StatusCode, action: &str, body: &str) -> AppError {
    let message = response_message(body).unwrap_or_else(|| format!("HTTP {status}"));
    let message = format!("{action}: {message}");

    match status {
        reqwest::StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        reqwest::StatusCode::FORBIDDEN => AppError::Forbidden(message),
        reqwest::StatusCode::NOT_FOUND => AppError::NotFound(message),
        reqwest::StatusCode::CONFLICT => AppError::Conflict(message),
        status if status.is_client_error() => AppError::Validation(message),
        _ => AppError::Internal(format!("{message} (status {status})")),
    }
}

/// Decodes each list item, skipping records the domain cannot represent.
fn decode_records<P, T>(items: Vec<Value>, source: &str, convert: fn(P) -> T) -> Vec<T>
where
    P: DeserializeOwned,
{
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<P>(item) {
            Ok(payload) => Some(convert(payload)),
            Err(error) => {
                warn!(source, index, error = %error, "skipping malformed record");
                None
            }
        })
        .collect()
}

#[async_trait]
impl FieldApiRepository for HttpFieldApiClient {
    async fn login(&self, email: &str, password: &str) -> AppResult<AuthenticatedSession> {
        let body = self
            .execute(
                self.http_client
                    .post(self.endpoint("/api/login"))
                    .json(&json!({ "email": email, "password": password })),
                "/api/login",
            )
            .await?;

        let document: Value = serde_json::from_str(body.as_str()).map_err(|error| {
            AppError::Internal(format!("/api/login returned invalid json: {error}"))
        })?;
        let (user, token) = extract_login(document)?;

        let actor: Actor = serde_json::from_value(user).map_err(|error| {
            AppError::Internal(format!("/api/login returned an invalid user: {error}"))
        })?;
        let token = SessionToken::new(token)
            .map_err(|_| AppError::Internal("/api/login returned an empty token".to_owned()))?;

        Ok(AuthenticatedSession { token, actor })
    }

    async fn change_password(
        &self,
        token: &SessionToken,
        change: &PasswordChange,
    ) -> AppResult<()> {
        let payload = serde_json::to_value(PasswordChangeRequest::from(change))
            .map_err(|error| AppError::Internal(format!("failed to encode password: {error}")))?;

        self.send_json(
            reqwest::Method::POST,
            token,
            "/api/user/change-password",
            Some(payload),
        )
        .await
    }

    async fn list_bandits(&self, token: &SessionToken) -> AppResult<RecordPage<Bandit>> {
        self.list(token, "/api/bandits", "bandits", BanditPayload::into_bandit)
            .await
    }

    async fn save_bandit(
        &self,
        token: &SessionToken,
        bandit_id: Option<BanditId>,
        draft: &BanditDraft,
    ) -> AppResult<()> {
        let payload = serde_json::to_value(BanditRequest::from(draft))
            .map_err(|error| AppError::Internal(format!("failed to encode bandit: {error}")))?;

        match bandit_id {
            Some(bandit_id) => {
                self.send_json(
                    reqwest::Method::PUT,
                    token,
                    format!("/api/bandits/{bandit_id}").as_str(),
                    Some(payload),
                )
                .await
            }
            None => {
                self.send_json(reqwest::Method::POST, token, "/api/bandits", Some(payload))
                    .await
            }
        }
    }

    async fn delete_bandit(&self, token: &SessionToken, bandit_id: BanditId) -> AppResult<()> {
        self.send_json(
            reqwest::Method::DELETE,
            token,
            format!("/api/bandits/{bandit_id}").as_str(),
            None,
        )
        .await
    }

    async fn list_captures(&self, token: &SessionToken) -> AppResult<RecordPage<Capture>> {
        self.list(token, "/api/captures", "captures", CapturePayload::into_capture)
            .await
    }

    async fn create_capture(&self, token: &SessionToken, draft: &CaptureDraft) -> AppResult<()> {
        let payload = serde_json::to_value(CaptureRequest::from(draft))
            .map_err(|error| AppError::Internal(format!("failed to encode capture: {error}")))?;

        self.send_json(reqwest::Method::POST, token, "/api/captures", Some(payload))
            .await
    }

    async fn delete_capture(&self, token: &SessionToken, capture_id: CaptureId) -> AppResult<()> {
        self.send_json(
            reqwest::Method::DELETE,
            token,
            format!("/api/captures/{capture_id}").as_str(),
            None,
        )
        .await
    }

    async fn update_capture(
        &self,
        token: &SessionToken,
        capture_id: CaptureId,
        update: &CaptureUpdate,
    ) -> AppResult<()> {
        let payload = match update {
            CaptureUpdate::Reject => json!({ "validation": "rejeté" }),
            CaptureUpdate::Comment(comment) => json!({ "commentaire": comment }),
        };

        self.send_json(
            reqwest::Method::PATCH,
            token,
            format!("/api/captures/{capture_id}").as_str(),
            Some(payload),
        )
        .await
    }

    async fn list_infractions(&self, token: &SessionToken) -> AppResult<RecordPage<Infraction>> {
        self.list(
            token,
            "/api/infractions",
            "infractions",
            InfractionPayload::into_infraction,
        )
        .await
    }

    async fn save_infraction(
        &self,
        token: &SessionToken,
        infraction_id: Option<InfractionId>,
        draft: &InfractionDraft,
    ) -> AppResult<()> {
        let payload = serde_json::to_value(InfractionRequest::from(draft)).map_err(|error| {
            AppError::Internal(format!("failed to encode infraction: {error}"))
        })?;

        match infraction_id {
            Some(infraction_id) => {
                self.send_json(
                    reqwest::Method::PUT,
                    token,
                    format!("/api/infractions/{infraction_id}").as_str(),
                    Some(payload),
                )
                .await
            }
            None => {
                self.send_json(
                    reqwest::Method::POST,
                    token,
                    "/api/infractions",
                    Some(payload),
                )
                .await
            }
        }
    }

    async fn delete_infraction(
        &self,
        token: &SessionToken,
        infraction_id: InfractionId,
    ) -> AppResult<()> {
        self.send_json(
            reqwest::Method::DELETE,
            token,
            format!("/api/infractions/{infraction_id}").as_str(),
            None,
        )
        .await
    }

    async fn review_infraction(
        &self,
        token: &SessionToken,
        infraction_id: InfractionId,
        decision: InfractionDecision,
    ) -> AppResult<()> {
        self.send_json(
            reqwest::Method::POST,
            token,
            format!("/api/infractions/{infraction_id}/{}", decision.as_str()).as_str(),
            None,
        )
        .await
    }
}
