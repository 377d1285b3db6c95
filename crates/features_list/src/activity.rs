use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Behavior bound to a list interaction (primary selection or the per-row action).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityKind {
    #[default]
    None,
    /// Navigate the host view to the feature.
    Goto,
    /// Ask the host view to present the feature's detail.
    Popup,
    /// Emit an outward event carrying the feature.
    Event,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 4] = [
        ActivityKind::None,
        ActivityKind::Goto,
        ActivityKind::Popup,
        ActivityKind::Event,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ActivityKind::None => "NONE",
            ActivityKind::Goto => "GOTO",
            ActivityKind::Popup => "POPUP",
            ActivityKind::Event => "EVENT",
        }
    }

    /// Icon shown on a row's action control.
    pub const fn icon(self) -> &'static str {
        match self {
            ActivityKind::None => "blank",
            ActivityKind::Goto => "zoom-to-object",
            ActivityKind::Popup => "popup",
            ActivityKind::Event => "check-circle",
        }
    }

    pub fn is_none(self) -> bool {
        self == ActivityKind::None
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unknown activity {0:?} (expected NONE, GOTO, POPUP or EVENT)")]
pub struct UnknownActivity(pub String);

impl std::str::FromStr for ActivityKind {
    type Err = UnknownActivity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityKind::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownActivity(s.to_string()))
    }
}
