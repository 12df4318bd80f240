//! Stage event types

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Parse,
    Research,
    Curate,
    Assemble,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Research => "research",
            Self::Curate => "curate",
            Self::Assemble => "assemble",
        }
    }

    /// 1-based position in the pipeline
    pub fn number(&self) -> u8 {
        match self {
            Self::Parse => 1,
            Self::Research => 2,
            Self::Curate => 3,
            Self::Assemble => 4,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Started,
    Completed,
    /// A capability failed and a deterministic fallback was used
    Fallback { reason: String },
    /// The run stopped to ask the user
    NeedsMoreInfo,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str("started"),
            Self::Completed => f.write_str("completed"),
            Self::Fallback { reason } => write!(f, "fallback ({})", reason),
            Self::NeedsMoreInfo => f.write_str("needs more info"),
        }
    }
}

/// One progress notification from a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    pub run_id: String,
    pub stage: Stage,
    #[serde(flatten)]
    pub status: StageStatus,
}

impl StageEvent {
    pub fn is_fallback(&self) -> bool {
        matches!(self.status, StageStatus::Fallback { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_flat() {
        let event = StageEvent {
            run_id: "run-1".to_string(),
            stage: Stage::Research,
            status: StageStatus::Fallback {
                reason: "timeout".to_string(),
            },
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["stage"], "research");
        assert_eq!(value["status"], "fallback");
        assert_eq!(value["reason"], "timeout");

        let back: StageEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
        assert!(back.is_fallback());
    }

    #[test]
    fn test_stage_order() {
        let numbers: Vec<u8> = [Stage::Parse, Stage::Research, Stage::Curate, Stage::Assemble]
            .iter()
            .map(Stage::number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(StageStatus::NeedsMoreInfo.to_string(), "needs more info");
    }
}
