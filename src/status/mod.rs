//! Status intents and the multi-workspace status engine.

pub mod duration;
pub mod engine;
pub mod picture;

pub use duration::parse_duration_minutes;
pub use engine::StatusEngine;
pub use picture::{is_supported_image, validate_profile_picture};

use crate::error::ApiError;
use crate::provider::{CustomStatus, Presence};
use crate::store::WorkspaceCredential;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::path::PathBuf;

/// Emoji used when `--emoji` is not given
pub const DEFAULT_EMOJI: &str = ":male-technologist:";

/// Everything one `set` invocation asks for. Built once from CLI input, then read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusIntent {
    pub message: String,
    pub emoji: String,
    /// Minutes until the status expires; 0 never expires
    pub duration_minutes: u32,
    pub away: bool,
    pub do_not_disturb: bool,
    /// Only workspaces carrying this group label; `None` targets all
    pub group: Option<String>,
    /// Only the workspace with this name; `None` targets all
    pub workspace: Option<String>,
    pub profile_picture: Option<PathBuf>,
}

impl Default for StatusIntent {
    fn default() -> Self {
        Self {
            message: String::new(),
            emoji: DEFAULT_EMOJI.to_string(),
            duration_minutes: 0,
            away: false,
            do_not_disturb: false,
            group: None,
            workspace: None,
            profile_picture: None,
        }
    }
}

impl StatusIntent {
    /// Input checks that must pass before anything is sent to Slack.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.do_not_disturb && self.duration_minutes == 0 {
            return Err(ApiError::InvalidInput(
                "do not disturb requires a duration".to_string(),
            ));
        }
        if let Some(path) = &self.profile_picture {
            validate_profile_picture(path)?;
        }
        Ok(())
    }

    /// Whether a workspace passes the group and name filters.
    pub fn matches(&self, workspace: &WorkspaceCredential) -> bool {
        if let Some(group) = self.group.as_deref().filter(|g| !g.is_empty()) {
            if !workspace.is_in_group(group) {
                return false;
            }
        }
        if let Some(name) = self.workspace.as_deref().filter(|n| !n.is_empty()) {
            if workspace.name != name {
                return false;
            }
        }
        true
    }

    pub fn presence(&self) -> Presence {
        Presence::from_away(self.away)
    }

    /// An empty message clears the status, so the emoji is cleared with it.
    pub fn effective_emoji(&self) -> &str {
        if self.message.is_empty() {
            ""
        } else {
            &self.emoji
        }
    }

    pub fn is_clearing(&self) -> bool {
        self.message.is_empty()
    }

    /// Status payload for a status set at `now`.
    pub fn custom_status(&self, now: DateTime<Utc>) -> CustomStatus {
        CustomStatus {
            status_text: self.message.clone(),
            status_emoji: self.effective_emoji().to_string(),
            status_expiration: expiry_epoch(self.duration_minutes, now),
        }
    }
}

/// Absolute expiry in unix seconds; 0 when there is no duration.
pub fn expiry_epoch(duration_minutes: u32, now: DateTime<Utc>) -> i64 {
    if duration_minutes == 0 {
        return 0;
    }
    (now + ChronoDuration::minutes(i64::from(duration_minutes))).timestamp()
}

/// Time source for expiry computation
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
