use opj_capture_core::{AppError, AppResult, NonEmptyString};
use opj_capture_domain::{
    Actor, Bandit, BanditDraft, Capture, CaptureDraft, CaptureId, Infraction, InfractionDraft,
    InfractionId, OwnedRecord,
};
use tracing::info;

use super::{FieldService, denied};
use crate::action_gates::{can_delete_entity, can_manage_infractions, can_validate};
use crate::{CaptureUpdate, InfractionDecision};

impl FieldService {
    /// Creates a bandit, or edits `existing`.
    pub async fn save_bandit(&self, existing: Option<&Bandit>, draft: &BanditDraft) -> AppResult<()> {
        let session = self.current_session().await?;
        let permissions = session.actor.permissions();

        let allowed = if existing.is_some() {
            permissions.can_edit_bandit
        } else {
            permissions.can_create_bandit
        };
        if !allowed {
            return Err(denied(&session.actor, "save bandits"));
        }

        let bandit_id = existing.map(Bandit::id);
        self.api
            .save_bandit(&session.token, bandit_id, draft)
            .await?;

        info!(
            actor_id = %session.actor.id(),
            bandit_id = ?bandit_id,
            "bandit saved"
        );
        Ok(())
    }

    /// Deletes a bandit when the role policy allows it.
    pub async fn delete_bandit(&self, bandit: &Bandit) -> AppResult<()> {
        let session = self.current_session().await?;
        require_delete(&session.actor, bandit)?;

        self.api.delete_bandit(&session.token, bandit.id()).await?;
        info!(actor_id = %session.actor.id(), bandit_id = %bandit.id(), "bandit deleted");
        Ok(())
    }

    /// Records a new capture for the current officer.
    pub async fn create_capture(&self, draft: &CaptureDraft) -> AppResult<()> {
        let session = self.current_session().await?;
        if !session.actor.permissions().can_create_capture {
            return Err(denied(&session.actor, "create captures"));
        }

        self.api.create_capture(&session.token, draft).await?;
        info!(
            actor_id = %session.actor.id(),
            bandit_id = %draft.bandit_id(),
            infraction_id = %draft.infraction_id(),
            has_photo = draft.photo().is_some(),
            "capture recorded"
        );
        Ok(())
    }

    /// Deletes a capture when the role policy allows it.
    pub async fn delete_capture(&self, capture: &Capture) -> AppResult<()> {
        let session = self.current_session().await?;
        require_delete(&session.actor, capture)?;

        self.api.delete_capture(&session.token, capture.id()).await?;
        info!(actor_id = %session.actor.id(), capture_id = %capture.id(), "capture deleted");
        Ok(())
    }

    /// Rejects a capture under review.
    pub async fn reject_capture(&self, capture_id: CaptureId) -> AppResult<()> {
        self.review_capture(capture_id, CaptureUpdate::Reject).await
    }

    /// Attaches a reviewer comment to a capture.
    pub async fn comment_capture(&self, capture_id: CaptureId, comment: &str) -> AppResult<()> {
        let comment = NonEmptyString::new(comment.trim())
            .map_err(|_| AppError::Validation("comment must not be empty".to_owned()))?;
        self.review_capture(capture_id, CaptureUpdate::Comment(comment.into()))
            .await
    }

    /// Creates an infraction, or edits `existing`.
    pub async fn save_infraction(
        &self,
        existing: Option<InfractionId>,
        draft: &InfractionDraft,
    ) -> AppResult<()> {
        let session = self.current_session().await?;
        if !can_manage_infractions(Some(session.actor.role())) {
            return Err(denied(&session.actor, "manage infractions"));
        }

        self.api
            .save_infraction(&session.token, existing, draft)
            .await?;
        info!(
            actor_id = %session.actor.id(),
            infraction_id = ?existing,
            "infraction saved"
        );
        Ok(())
    }

    /// Deletes an infraction when the role policy allows it.
    pub async fn delete_infraction(&self, infraction: &Infraction) -> AppResult<()> {
        let session = self.current_session().await?;
        require_delete(&session.actor, infraction)?;

        self.api
            .delete_infraction(&session.token, infraction.id())
            .await?;
        info!(
            actor_id = %session.actor.id(),
            infraction_id = %infraction.id(),
            "infraction deleted"
        );
        Ok(())
    }

    /// Approves an infraction.
    pub async fn approve_infraction(&self, infraction_id: InfractionId) -> AppResult<()> {
        self.review_infraction(infraction_id, InfractionDecision::Approve)
            .await
    }

    /// Rejects an infraction.
    pub async fn reject_infraction(&self, infraction_id: InfractionId) -> AppResult<()> {
        self.review_infraction(infraction_id, InfractionDecision::Reject)
            .await
    }

    async fn review_capture(&self, capture_id: CaptureId, update: CaptureUpdate) -> AppResult<()> {
        let session = self.current_session().await?;
        if !can_validate(Some(session.actor.role())) {
            return Err(denied(&session.actor, "review captures"));
        }

        self.api
            .update_capture(&session.token, capture_id, &update)
            .await?;
        info!(
            actor_id = %session.actor.id(),
            capture_id = %capture_id,
            update = ?update,
            "capture reviewed"
        );
        Ok(())
    }

    async fn review_infraction(
        &self,
        infraction_id: InfractionId,
        decision: InfractionDecision,
    ) -> AppResult<()> {
        let session = self.current_session().await?;
        if !can_manage_infractions(Some(session.actor.role())) {
            return Err(denied(&session.actor, "review infractions"));
        }

        self.api
            .review_infraction(&session.token, infraction_id, decision)
            .await?;
        info!(
            actor_id = %session.actor.id(),
            infraction_id = %infraction_id,
            decision = decision.as_str(),
            "infraction reviewed"
        );
        Ok(())
    }
}

fn require_delete<R>(actor: &Actor, record: &R) -> AppResult<()>
where
    R: OwnedRecord,
{
    if can_delete_entity(record, Some(actor.role()), Some(actor.id())) {
        return Ok(());
    }

    Err(denied(
        actor,
        format!("delete {} #{}", record.kind().as_str(), record.record_id()).as_str(),
    ))
}
