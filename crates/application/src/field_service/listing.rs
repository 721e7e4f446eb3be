use opj_capture_core::AppResult;
use opj_capture_domain::{Capture, Infraction};
use tracing::info;

use super::{BanditListing, DashboardSummary, FieldService};
use crate::visibility::{filter_bandits, filter_captures, owned_capture_ids, validated_captures};

impl FieldService {
    /// Loads bandits, infractions and captures concurrently and keeps the
    /// bandits visible to the actor.
    pub async fn bandit_listing(&self) -> AppResult<BanditListing> {
        let session = self.current_session().await?;
        let token = &session.token;
        let actor = &session.actor;

        let (bandits, infractions, captures) = tokio::try_join!(
            self.api.list_bandits(token),
            self.api.list_infractions(token),
            self.api.list_captures(token),
        )?;

        let owned_capture_ids = owned_capture_ids(&captures.records, Some(actor.id()));
        let visible = filter_bandits(
            &bandits.records,
            Some(actor.role()),
            Some(actor.id()),
            &owned_capture_ids,
        );

        info!(
            actor_id = %actor.id(),
            total = bandits.records.len(),
            visible = visible.len(),
            "bandit listing loaded"
        );

        Ok(BanditListing {
            bandits: visible,
            infractions: infractions.records,
        })
    }

    /// Returns the captures visible to the actor.
    pub async fn visible_captures(&self) -> AppResult<Vec<Capture>> {
        let session = self.current_session().await?;
        let captures = self.api.list_captures(&session.token).await?;

        Ok(filter_captures(
            &captures.records,
            Some(session.actor.role()),
            Some(session.actor.id()),
        ))
    }

    /// Returns the captures a supervisor has validated.
    pub async fn validated_captures(&self) -> AppResult<Vec<Capture>> {
        let session = self.current_session().await?;
        let captures = self.api.list_captures(&session.token).await?;
        Ok(validated_captures(&captures.records))
    }

    /// Returns the infraction catalogue.
    pub async fn infractions(&self) -> AppResult<Vec<Infraction>> {
        let session = self.current_session().await?;
        Ok(self.api.list_infractions(&session.token).await?.records)
    }

    /// Returns server-wide counters for the home screen.
    ///
    /// Collection sizes come from the server's reported totals. The validated
    /// count can only cover the captures actually received.
    pub async fn dashboard(&self) -> AppResult<DashboardSummary> {
        let session = self.current_session().await?;
        let (captures, bandits) = tokio::try_join!(
            self.api.list_captures(&session.token),
            self.api.list_bandits(&session.token),
        )?;

        Ok(DashboardSummary {
            capture_count: captures.total(),
            validated_capture_count: captures
                .records
                .iter()
                .filter(|capture| capture.is_validated())
                .count(),
            bandit_count: bandits.total(),
        })
    }
}
