use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Credits a fresh session starts with when the store holds no prior balance.
pub const STARTING_BALANCE: u64 = 200;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown action kind: {0}")]
pub struct ParseActionError(pub String);

/// Priced assistant actions. The set is closed: every chargeable operation of
/// the application maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "briefing.basic")]
    BriefingBasic,
    #[serde(rename = "analysis.deep")]
    AnalysisDeep,
    #[serde(rename = "google_ads.briefing")]
    GoogleAdsBriefing,
    #[serde(rename = "file.upload.parse")]
    FileUploadParse,
    #[serde(rename = "chat.message")]
    ChatMessage,
}

impl ActionKind {
    pub fn all() -> &'static [ActionKind] {
        &[
            ActionKind::BriefingBasic,
            ActionKind::AnalysisDeep,
            ActionKind::GoogleAdsBriefing,
            ActionKind::FileUploadParse,
            ActionKind::ChatMessage,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::BriefingBasic => "briefing.basic",
            ActionKind::AnalysisDeep => "analysis.deep",
            ActionKind::GoogleAdsBriefing => "google_ads.briefing",
            ActionKind::FileUploadParse => "file.upload.parse",
            ActionKind::ChatMessage => "chat.message",
        }
    }

    /// Price in credits. Fixed at build time, never configurable at runtime.
    pub fn price(&self) -> u64 {
        match self {
            ActionKind::BriefingBasic => 5,
            ActionKind::AnalysisDeep => 50,
            ActionKind::GoogleAdsBriefing => 15,
            ActionKind::FileUploadParse => 10,
            ActionKind::ChatMessage => 1,
        }
    }
}

impl FromStr for ActionKind {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}
