use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;
use utoipa::ToSchema;

/// Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReelStage {
    Created,
    DescriptionSaved,
    ManifestWritten,
    NarrationAttempted,
    Composed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NarrationOutcome {
    Generated { bytes: usize },
    Reused,
    Skipped,
    Failed { reason: String },
}

impl NarrationOutcome {
    pub fn has_audio(&self) -> bool {
        matches!(self, NarrationOutcome::Generated { .. } | NarrationOutcome::Reused)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompositionOutcome {
    Ok {
        with_audio: bool,
        exit_code: Option<i32>,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReelReport {
    pub token: String,
    pub stage: ReelStage,
    pub images: Vec<String>,
    pub skipped_files: Vec<String>,
    pub narration: Option<NarrationOutcome>,
    pub composition: Option<CompositionOutcome>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option", default)]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub finished_at: Option<OffsetDateTime>,
}

impl ReelReport {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            stage: ReelStage::Created,
            images: Vec::new(),
            skipped_files: Vec::new(),
            narration: None,
            composition: None,
            started_at: OffsetDateTime::now_utc(),
            finished_at: None,
        }
    }

    pub fn advance(&mut self, stage: ReelStage) {
        debug_assert!(stage >= self.stage, "reel stages only move forward");
        info!("Reel {}: {:?} -> {:?}", self.token, self.stage, stage);
        self.stage = stage;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(OffsetDateTime::now_utc());
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.composition, Some(CompositionOutcome::Ok { .. }))
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.composition {
            Some(CompositionOutcome::Failed { reason }) => Some(reason),
            _ => None,
        }
    }
}
