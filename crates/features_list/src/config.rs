use serde::{Deserialize, Serialize};

use crate::activity::ActivityKind;
use crate::error::Error;

/// Construction-time options for a [`crate::FeaturesList`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListOptions {
    /// Host element or region the list attaches to.
    pub container: Option<String>,
    pub select_activity: ActivityKind,
    pub action_activity: ActivityKind,
}

impl ListOptions {
    pub fn new(select_activity: ActivityKind, action_activity: ActivityKind) -> Self {
        Self {
            container: None,
            select_activity,
            action_activity,
        }
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::Options(e.to_string()))
    }
}
