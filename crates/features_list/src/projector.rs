use std::collections::BTreeMap;
use std::rc::Rc;

use cache::FeatureCache;
use foundation::ids::FeatureId;
use layers::record::FeatureRecord;
use serde::Serialize;
use tracing::warn;

use crate::activity::ActivityKind;
use crate::error::Error;

/// What a formatter reports for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub label: String,
    pub description: String,
    /// Must equal the record identity's string form.
    pub value: String,
}

/// Caller-supplied record formatter.
///
/// Runs while the list updates its internal state, so it must not call back
/// into the list.
pub type Formatter = Rc<dyn Fn(&FeatureRecord) -> ItemInfo>;

/// One row of the displayed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayItem {
    pub label: String,
    pub description: String,
    pub value: String,
    pub action_icon: &'static str,
}

/// Receives every record that ends up in a list.
pub trait RecordSink {
    fn accept(&mut self, record: FeatureRecord);
}

impl RecordSink for FeatureCache {
    fn accept(&mut self, record: FeatureRecord) {
        self.put(record);
    }
}

/// Turns listing results into display items and remembers which identity each
/// item value stands for.
#[derive(Debug, Default)]
pub struct ListProjector {
    identities: BTreeMap<String, FeatureId>,
}

impl ListProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn clear(&mut self) {
        self.identities.clear();
    }

    pub fn identity_for(&self, value: &str) -> Option<&FeatureId> {
        self.identities.get(value)
    }

    /// Builds items in `records` order.
    ///
    /// Records are handed to `sink` only once the whole result formatted
    /// cleanly, so a failed build leaves the sink untouched. Repeated
    /// identities keep their first occurrence.
    pub fn build(
        &mut self,
        records: Vec<FeatureRecord>,
        formatter: &dyn Fn(&FeatureRecord) -> ItemInfo,
        action_activity: ActivityKind,
        sink: &mut dyn RecordSink,
    ) -> Result<Vec<DisplayItem>, Error> {
        self.identities.clear();

        let mut identities: BTreeMap<String, FeatureId> = BTreeMap::new();
        let mut items: Vec<DisplayItem> = Vec::with_capacity(records.len());
        let mut accepted: Vec<FeatureRecord> = Vec::with_capacity(records.len());

        for record in records {
            let value = record.identity.to_string();
            if identities.contains_key(&value) {
                warn!(identity = %record.identity, "duplicate identity in listing, keeping first");
                continue;
            }

            let info = formatter(&record);
            if info.value != value {
                return Err(Error::Configuration(format!(
                    "formatter returned value {:?} for feature {}",
                    info.value, record.identity
                )));
            }

            identities.insert(value.clone(), record.identity.clone());
            items.push(DisplayItem {
                label: info.label,
                description: info.description,
                value,
                action_icon: action_activity.icon(),
            });
            accepted.push(record);
        }

        for record in accepted {
            sink.accept(record);
        }
        self.identities = identities;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplayItem, ItemInfo, ListProjector, RecordSink};
    use crate::activity::ActivityKind;
    use crate::error::Error;
    use cache::FeatureCache;
    use foundation::ids::FeatureId;
    use layers::record::FeatureRecord;
    use pretty_assertions::assert_eq;

    impl RecordSink for Vec<FeatureRecord> {
        fn accept(&mut self, record: FeatureRecord) {
            self.push(record);
        }
    }

    fn format(r: &FeatureRecord) -> ItemInfo {
        ItemInfo {
            label: r.attribute_text("name"),
            description: format!("#{}", r.identity),
            value: r.identity.to_string(),
        }
    }

    fn records() -> Vec<FeatureRecord> {
        vec![
            FeatureRecord::new(30).with_attribute("name", "Wharf"),
            FeatureRecord::new(10).with_attribute("name", "Depot"),
            FeatureRecord::new("x-2").with_attribute("name", "Kiosk"),
        ]
    }

    #[test]
    fn keeps_store_order_and_sets_icon() {
        let mut p = ListProjector::new();
        let mut sink: Vec<FeatureRecord> = Vec::new();
        let items = p.build(records(), &format, ActivityKind::Goto, &mut sink).unwrap();

        assert_eq!(
            items[0],
            DisplayItem {
                label: "Wharf".into(),
                description: "#30".into(),
                value: "30".into(),
                action_icon: "zoom-to-object",
            }
        );
        let values: Vec<&str> = items.iter().map(|i| i.value.as_str()).collect();
        assert_eq!(values, vec!["30", "10", "x-2"]);
        assert_eq!(sink.len(), 3);
        assert_eq!(p.identity_for("x-2"), Some(&FeatureId::from("x-2")));
        assert_eq!(p.identity_for("10"), Some(&FeatureId::Int(10)));
    }

    #[test]
    fn every_item_is_cached() {
        let mut p = ListProjector::new();
        let mut cache = FeatureCache::new();
        cache.begin_generation();
        let items = p.build(records(), &format, ActivityKind::None, &mut cache).unwrap();
        for item in &items {
            let identity = p.identity_for(&item.value).unwrap();
            assert!(cache.get(identity).is_some(), "{} missing", item.value);
        }
    }

    #[test]
    fn duplicate_identities_keep_first() {
        let mut p = ListProjector::new();
        let mut sink: Vec<FeatureRecord> = Vec::new();
        let recs = vec![
            FeatureRecord::new(1).with_attribute("name", "first"),
            FeatureRecord::new(1).with_attribute("name", "second"),
        ];
        let items = p.build(recs, &format, ActivityKind::None, &mut sink).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "first");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn mismatched_value_fails_without_touching_sink() {
        let mut p = ListProjector::new();
        let mut sink: Vec<FeatureRecord> = Vec::new();
        let bad = |r: &FeatureRecord| ItemInfo {
            value: r.attribute_text("name"),
            ..format(r)
        };
        let err = p.build(records(), &bad, ActivityKind::None, &mut sink).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(sink.is_empty());
        assert!(p.is_empty());
    }
}
