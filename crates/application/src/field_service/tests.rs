use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use opj_capture_core::{ActorId, AppError, AppResult, SessionToken};
use opj_capture_domain::{
    Actor, Bandit, BanditDraft, BanditId, BanditInput, Capture, CaptureDraft, CaptureId,
    CaptureInput, Infraction, InfractionDraft, InfractionId, InfractionInput, Ownership,
    PasswordChange, Role, ValidationStatus,
};

use crate::{
    AuthenticatedSession, CaptureUpdate, FieldApiRepository, InfractionDecision, RecordPage,
    SessionStore,
};

use super::FieldService;

#[derive(Default)]
struct FakeFieldApi {
    bandits: Vec<Bandit>,
    captures: Vec<Capture>,
    infractions: Vec<Infraction>,
    bandit_total: Option<usize>,
    capture_total: Option<usize>,
    login_role: Option<Role>,
    calls: Mutex<Vec<String>>,
}

impl FakeFieldApi {
    async fn record(&self, call: impl Into<String>) {
        self.calls.lock().await.push(call.into());
    }

    async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl FieldApiRepository for FakeFieldApi {
    async fn login(&self, email: &str, password: &str) -> AppResult<AuthenticatedSession> {
        self.record(format!("login {email}")).await;
        if password != "secret" {
            return Err(AppError::Unauthorized("invalid credentials".to_owned()));
        }

        Ok(AuthenticatedSession {
            token: SessionToken::new("issued-token")?,
            actor: Actor::new(ActorId::new(7), self.login_role.unwrap_or_default()),
        })
    }

    async fn change_password(
        &self,
        _token: &SessionToken,
        _change: &PasswordChange,
    ) -> AppResult<()> {
        self.record("change_password").await;
        Ok(())
    }

    async fn list_bandits(&self, _token: &SessionToken) -> AppResult<RecordPage<Bandit>> {
        self.record("list_bandits").await;
        Ok(RecordPage {
            records: self.bandits.clone(),
            total_items: self.bandit_total,
        })
    }

    async fn save_bandit(
        &self,
        _token: &SessionToken,
        bandit_id: Option<BanditId>,
        draft: &BanditDraft,
    ) -> AppResult<()> {
        self.record(format!("save_bandit {bandit_id:?} {}", draft.nom()))
            .await;
        Ok(())
    }

    async fn delete_bandit(&self, _token: &SessionToken, bandit_id: BanditId) -> AppResult<()> {
        self.record(format!("delete_bandit {bandit_id}")).await;
        Ok(())
    }

    async fn list_captures(&self, _token: &SessionToken) -> AppResult<RecordPage<Capture>> {
        self.record("list_captures").await;
        Ok(RecordPage {
            records: self.captures.clone(),
            total_items: self.capture_total,
        })
    }

    async fn create_capture(&self, _token: &SessionToken, draft: &CaptureDraft) -> AppResult<()> {
        self.record(format!(
            "create_capture {} {} {}",
            draft.bandit_id(),
            draft.infraction_id(),
            draft.description()
        ))
        .await;
        Ok(())
    }

    async fn delete_capture(&self, _token: &SessionToken, capture_id: CaptureId) -> AppResult<()> {
        self.record(format!("delete_capture {capture_id}")).await;
        Ok(())
    }

    async fn update_capture(
        &self,
        _token: &SessionToken,
        capture_id: CaptureId,
        update: &CaptureUpdate,
    ) -> AppResult<()> {
        self.record(format!("update_capture {capture_id} {update:?}"))
            .await;
        Ok(())
    }

    async fn list_infractions(&self, _token: &SessionToken) -> AppResult<RecordPage<Infraction>> {
        self.record("list_infractions").await;
        Ok(RecordPage::unpaginated(self.infractions.clone()))
    }

    async fn save_infraction(
        &self,
        _token: &SessionToken,
        infraction_id: Option<InfractionId>,
        draft: &InfractionDraft,
    ) -> AppResult<()> {
        self.record(format!("save_infraction {infraction_id:?} {}", draft.libelle()))
            .await;
        Ok(())
    }

    async fn delete_infraction(
        &self,
        _token: &SessionToken,
        infraction_id: InfractionId,
    ) -> AppResult<()> {
        self.record(format!("delete_infraction {infraction_id}"))
            .await;
        Ok(())
    }

    async fn review_infraction(
        &self,
        _token: &SessionToken,
        infraction_id: InfractionId,
        decision: InfractionDecision,
    ) -> AppResult<()> {
        self.record(format!("{} {infraction_id}", decision.as_str()))
            .await;
        Ok(())
    }
}

#[derive(Default)]
struct FakeSessionStore {
    session: Mutex<Option<AuthenticatedSession>>,
}

impl FakeSessionStore {
    fn with_role(role: Role) -> Self {
        let token = SessionToken::new("stored-token").unwrap_or_else(|_| unreachable!());
        Self {
            session: Mutex::new(Some(AuthenticatedSession {
                token,
                actor: Actor::new(ActorId::new(1), role),
            })),
        }
    }
}

#[async_trait]
impl SessionStore for FakeSessionStore {
    async fn load(&self) -> AppResult<Option<AuthenticatedSession>> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: &AuthenticatedSession) -> AppResult<()> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.session.lock().await = None;
        Ok(())
    }
}

fn bandit(id: i64, owner: Option<i64>, capture_ids: &[i64]) -> Bandit {
    Bandit::new(BanditInput {
        id: BanditId::new(id),
        nom: format!("bandit-{id}"),
        ownership: Ownership::from_candidates([owner.map(ActorId::new)]),
        capture_ids: capture_ids.iter().copied().map(CaptureId::new).collect(),
        ..BanditInput::default()
    })
}

fn capture(id: i64, owner: i64, status: ValidationStatus) -> Capture {
    Capture::new(CaptureInput {
        id: CaptureId::new(id),
        ownership: Ownership::single(ActorId::new(owner)),
        involved_officers: Ownership::single(ActorId::new(owner)),
        status,
        ..CaptureInput::default()
    })
}

fn infraction(id: i64) -> Infraction {
    Infraction::new(InfractionInput {
        id: InfractionId::new(id),
        libelle: format!("infraction-{id}"),
        ..InfractionInput::default()
    })
}

fn sample_api() -> FakeFieldApi {
    FakeFieldApi {
        bandits: vec![bandit(1, Some(1), &[]), bandit(2, None, &[20]), bandit(3, Some(9), &[30])],
        captures: vec![
            capture(20, 1, ValidationStatus::Validated),
            capture(30, 9, ValidationStatus::Pending),
            capture(40, 9, ValidationStatus::Validated),
        ],
        infractions: vec![infraction(5)],
        ..FakeFieldApi::default()
    }
}

fn build_service(api: FakeFieldApi, store: FakeSessionStore) -> (FieldService, Arc<FakeFieldApi>) {
    let api = Arc::new(api);
    let service = FieldService::new(api.clone(), Arc::new(store));
    (service, api)
}

#[tokio::test]
async fn login_caches_session_for_later_calls() {
    let (service, api) = build_service(
        FakeFieldApi {
            login_role: Some(Role::Superviseur),
            ..FakeFieldApi::default()
        },
        FakeSessionStore::default(),
    );

    let actor = service.login(" agent@opj.test ", "secret").await;
    assert!(actor.is_ok());
    let actor = actor.unwrap_or_else(|_| unreachable!());
    assert_eq!(actor.role(), Role::Superviseur);

    let current = service.current_actor().await;
    assert!(current.is_ok());
    assert_eq!(current.unwrap_or_else(|_| unreachable!()).id(), ActorId::new(7));
    assert_eq!(api.calls().await, vec!["login agent@opj.test".to_owned()]);
}

#[tokio::test]
async fn login_requires_both_credentials_before_calling_server() {
    let (service, api) = build_service(FakeFieldApi::default(), FakeSessionStore::default());

    let result = service.login("   ", "secret").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    let result = service.login("agent@opj.test", "").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn failed_login_leaves_no_session() {
    let (service, _) = build_service(FakeFieldApi::default(), FakeSessionStore::default());

    let result = service.login("agent@opj.test", "wrong").await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
    assert!(matches!(
        service.current_session().await,
        Err(AppError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn logout_clears_session() {
    let (service, _) = build_service(FakeFieldApi::default(), FakeSessionStore::with_role(Role::Admin));

    assert!(service.logout().await.is_ok());
    assert!(matches!(
        service.current_actor().await,
        Err(AppError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn listing_without_session_is_unauthorized() {
    let (service, api) = build_service(sample_api(), FakeSessionStore::default());

    assert!(matches!(
        service.bandit_listing().await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn opj_bandit_listing_keeps_owned_and_captured_bandits() {
    let (service, _) = build_service(sample_api(), FakeSessionStore::with_role(Role::Opj));

    let listing = service.bandit_listing().await;
    assert!(listing.is_ok());
    let listing = listing.unwrap_or_else(|_| unreachable!());

    let ids: Vec<i64> = listing.bandits.iter().map(|b| b.id().get()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(listing.infractions.len(), 1);
}

#[tokio::test]
async fn supervisor_bandit_listing_keeps_everything() {
    let (service, _) = build_service(sample_api(), FakeSessionStore::with_role(Role::Superviseur));

    let listing = service
        .bandit_listing()
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(listing.bandits.len(), 3);
}

#[tokio::test]
async fn capture_screens_apply_visibility_and_validation_filters() {
    let (service, _) = build_service(sample_api(), FakeSessionStore::with_role(Role::Opj));

    let visible = service
        .visible_captures()
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(
        visible.iter().map(|c| c.id().get()).collect::<Vec<_>>(),
        vec![20]
    );

    let validated = service
        .validated_captures()
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(
        validated.iter().map(|c| c.id().get()).collect::<Vec<_>>(),
        vec![20, 40]
    );
}

#[tokio::test]
async fn dashboard_reports_raw_server_totals() {
    let (service, _) = build_service(sample_api(), FakeSessionStore::with_role(Role::Opj));

    let summary = service.dashboard().await.unwrap_or_else(|_| unreachable!());
    assert_eq!(summary.capture_count, 3);
    assert_eq!(summary.validated_capture_count, 2);
    assert_eq!(summary.bandit_count, 3);
}

#[tokio::test]
async fn dashboard_prefers_reported_collection_totals() {
    let (service, _) = build_service(
        FakeFieldApi {
            capture_total: Some(120),
            bandit_total: Some(45),
            ..sample_api()
        },
        FakeSessionStore::with_role(Role::Superviseur),
    );

    let summary = service.dashboard().await.unwrap_or_else(|_| unreachable!());
    assert_eq!(summary.capture_count, 120);
    assert_eq!(summary.bandit_count, 45);
    assert_eq!(summary.validated_capture_count, 2);
}

#[tokio::test]
async fn every_role_records_captures() {
    let draft = CaptureDraft::new(BanditId::new(3), InfractionId::new(5), "Arrêté au marché")
        .unwrap_or_else(|_| unreachable!());

    for role in Role::all() {
        let (service, api) = build_service(sample_api(), FakeSessionStore::with_role(*role));
        assert!(service.create_capture(&draft).await.is_ok());
        assert_eq!(
            api.calls().await,
            vec!["create_capture 3 5 Arrêté au marché".to_owned()]
        );
    }
}

#[tokio::test]
async fn capture_creation_requires_a_session() {
    let (service, api) = build_service(sample_api(), FakeSessionStore::default());
    let draft = CaptureDraft::new(BanditId::new(3), InfractionId::new(5), "vol")
        .unwrap_or_else(|_| unreachable!());

    assert!(matches!(
        service.create_capture(&draft).await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn opj_cannot_delete_own_bandit_and_server_is_not_called() {
    let (service, api) = build_service(sample_api(), FakeSessionStore::with_role(Role::Opj));
    let owned = bandit(1, Some(1), &[]);

    let result = service.delete_bandit(&owned).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn supervisor_deletes_any_record() {
    let (service, api) = build_service(sample_api(), FakeSessionStore::with_role(Role::Superviseur));

    assert!(service.delete_bandit(&bandit(3, Some(9), &[])).await.is_ok());
    assert!(
        service
            .delete_capture(&capture(30, 9, ValidationStatus::Pending))
            .await
            .is_ok()
    );
    assert!(service.delete_infraction(&infraction(5)).await.is_ok());
    assert_eq!(
        api.calls().await,
        vec![
            "delete_bandit 3".to_owned(),
            "delete_capture 30".to_owned(),
            "delete_infraction 5".to_owned(),
        ]
    );
}

#[tokio::test]
async fn opj_creates_and_edits_bandits() {
    let (service, api) = build_service(sample_api(), FakeSessionStore::with_role(Role::Opj));
    let draft = BanditDraft::new("Kabila").unwrap_or_else(|_| unreachable!());

    assert!(service.save_bandit(None, &draft).await.is_ok());
    let existing = bandit(1, Some(1), &[]);
    assert!(service.save_bandit(Some(&existing), &draft).await.is_ok());
    assert_eq!(
        api.calls().await,
        vec![
            "save_bandit None Kabila".to_owned(),
            "save_bandit Some(BanditId(1)) Kabila".to_owned(),
        ]
    );
}

#[tokio::test]
async fn capture_review_is_limited_to_supervising_roles() {
    let (service, api) = build_service(sample_api(), FakeSessionStore::with_role(Role::Opj));
    assert!(matches!(
        service.reject_capture(CaptureId::new(30)).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(api.calls().await.is_empty());

    let (service, api) = build_service(sample_api(), FakeSessionStore::with_role(Role::Admin));
    assert!(service.reject_capture(CaptureId::new(30)).await.is_ok());
    assert!(
        service
            .comment_capture(CaptureId::new(30), "photo floue")
            .await
            .is_ok()
    );
    assert_eq!(
        api.calls().await,
        vec![
            "update_capture 30 Reject".to_owned(),
            "update_capture 30 Comment(\"photo floue\")".to_owned(),
        ]
    );
}

#[tokio::test]
async fn blank_comment_is_rejected_locally() {
    let (service, api) = build_service(sample_api(), FakeSessionStore::with_role(Role::Admin));

    let result = service.comment_capture(CaptureId::new(30), "   ").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn infraction_management_requires_supervising_role() {
    let (service, api) = build_service(sample_api(), FakeSessionStore::with_role(Role::Opj));
    let draft = InfractionDraft::new("Vol", "Vol simple").unwrap_or_else(|_| unreachable!());

    assert!(matches!(
        service.save_infraction(None, &draft).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        service.approve_infraction(InfractionId::new(5)).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(api.calls().await.is_empty());

    let (service, api) = build_service(sample_api(), FakeSessionStore::with_role(Role::Superviseur));
    assert!(service.save_infraction(None, &draft).await.is_ok());
    assert!(service.approve_infraction(InfractionId::new(5)).await.is_ok());
    assert!(service.reject_infraction(InfractionId::new(5)).await.is_ok());
    assert_eq!(
        api.calls().await,
        vec![
            "save_infraction None Vol".to_owned(),
            "approve 5".to_owned(),
            "reject 5".to_owned(),
        ]
    );
}

#[tokio::test]
async fn change_password_uses_cached_session() {
    let (service, api) = build_service(sample_api(), FakeSessionStore::with_role(Role::Opj));
    let change =
        PasswordChange::new("old-secret", "new-secret", "new-secret").unwrap_or_else(|_| unreachable!());

    assert!(service.change_password(&change).await.is_ok());
    assert_eq!(api.calls().await, vec!["change_password".to_owned()]);
}
