use layers::geometry::Geometry;
use layers::record::FeatureRecord;
use runtime::event_bus::EventKind;
use serde::Serialize;

/// Outward notifications, emitted only for activities configured as `EVENT`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ListEvent {
    ItemSelected {
        feature: FeatureRecord,
    },
    ItemAction {
        feature: FeatureRecord,
        /// Absent until the row's geometry has been fetched.
        geometry: Option<Geometry>,
    },
}

impl ListEvent {
    pub fn feature(&self) -> &FeatureRecord {
        match self {
            ListEvent::ItemSelected { feature } | ListEvent::ItemAction { feature, .. } => feature,
        }
    }
}

impl EventKind for ListEvent {
    fn kind(&self) -> &'static str {
        match self {
            ListEvent::ItemSelected { .. } => "item-selected",
            ListEvent::ItemAction { .. } => "item-action",
        }
    }
}
