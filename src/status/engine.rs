//! Status engine: applies one [`StatusIntent`] to the matching workspaces.
//!
//! Workspaces are handled one at a time in store order. The first failing call stops
//! the run; remote changes already made are not rolled back.

use super::{Clock, StatusIntent};
use crate::error::{ApiError, ApplyError, ApplyStep, WorkspaceError};
use crate::provider::StatusApi;
use crate::store::WorkspaceCredential;
use tracing::{info, instrument};

pub struct StatusEngine<'a> {
    api: &'a dyn StatusApi,
    clock: &'a dyn Clock,
}

impl<'a> StatusEngine<'a> {
    pub fn new(api: &'a dyn StatusApi, clock: &'a dyn Clock) -> Self {
        Self { api, clock }
    }

    /// Apply the intent to every matching workspace and return how many were fully applied.
    ///
    /// On failure the error carries the workspace that failed and the number of
    /// workspaces completed before it; later workspaces are not contacted.
    pub async fn apply(
        &self,
        intent: &StatusIntent,
        workspaces: &[WorkspaceCredential],
    ) -> Result<usize, ApplyError> {
        let mut applied = 0;
        for workspace in workspaces.iter().filter(|w| intent.matches(w)) {
            if let Err(failure) = self.set_one(intent, workspace).await {
                return Err(ApplyError { applied, failure });
            }
            applied += 1;
        }
        Ok(applied)
    }

    /// Run the ordered call sequence for one workspace, stopping at the first failure.
    #[instrument(skip_all, fields(workspace = %workspace.name))]
    pub async fn set_one(
        &self,
        intent: &StatusIntent,
        workspace: &WorkspaceCredential,
    ) -> Result<(), WorkspaceError> {
        let token = workspace.access_token.as_str();
        let fail = move |step: ApplyStep| {
            move |source: ApiError| WorkspaceError {
                workspace: workspace.name.clone(),
                step,
                source: Box::new(source),
            }
        };

        let presence = intent.presence();
        info!(presence = presence.as_str(), "setting presence");
        self.api
            .set_presence(token, presence)
            .await
            .map_err(fail(ApplyStep::SetPresence))?;

        if intent.is_clearing() {
            info!("clearing status message");
        } else if intent.duration_minutes == 0 {
            info!(message = %intent.message, "setting status message");
        } else {
            info!(
                message = %intent.message,
                minutes = intent.duration_minutes,
                "setting status message with expiry"
            );
        }
        let status = intent.custom_status(self.clock.now());
        self.api
            .set_custom_status(token, &status)
            .await
            .map_err(fail(ApplyStep::SetCustomStatus))?;

        // Snooze is always written so a previous run's do-not-disturb does not linger.
        if intent.do_not_disturb {
            info!(minutes = intent.duration_minutes, "setting do not disturb");
            self.api
                .set_snooze(token, intent.duration_minutes)
                .await
                .map_err(fail(ApplyStep::SetSnooze))?;
        } else {
            info!("resetting do not disturb");
            self.api
                .set_snooze(token, 0)
                .await
                .map_err(fail(ApplyStep::ResetSnooze))?;
        }

        if let Some(picture) = &intent.profile_picture {
            info!(path = %picture.display(), "setting profile picture");
            self.api
                .set_photo(token, picture)
                .await
                .map_err(fail(ApplyStep::SetProfilePicture))?;
        }

        Ok(())
    }
}
