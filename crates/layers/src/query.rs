use serde::{Deserialize, Serialize};

use crate::record::FeatureRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeOp {
    Eq,
    Contains,
}

/// Single attribute predicate. Attributes are compared through their text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilter {
    pub field: String,
    pub op: AttributeOp,
    pub value: String,
}

impl AttributeFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: AttributeOp::Eq,
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: AttributeOp::Contains,
            value: value.into(),
        }
    }

    /// Parses `field=value` (equality) or `field~value` (substring).
    pub fn parse(expr: &str) -> Option<Self> {
        if let Some((field, value)) = expr.split_once('=') {
            return Some(Self::eq(field.trim(), value.trim()));
        }
        let (field, value) = expr.split_once('~')?;
        Some(Self::contains(field.trim(), value.trim()))
    }

    pub fn matches(&self, record: &FeatureRecord) -> bool {
        let Some(v) = record.attribute(&self.field) else {
            return false;
        };
        let text = v.to_string();
        match self.op {
            AttributeOp::Eq => text == self.value,
            AttributeOp::Contains => text.contains(&self.value),
        }
    }
}

/// Row filter for a listing query. `Where` is a conjunction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Where(Vec<AttributeFilter>),
}

impl Filter {
    pub fn matches(&self, record: &FeatureRecord) -> bool {
        match self {
            Filter::All => true,
            Filter::Where(filters) => filters.iter().all(|f| f.matches(record)),
        }
    }
}

pub const DEFAULT_RECORD_COUNT_MULTIPLIER: u32 = 5;

/// Parameters of the listing query behind a feature list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    pub filter: Filter,
    pub return_geometry: bool,
    /// Multiplies the store's own per-request record limit.
    pub record_count_multiplier: u32,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            filter: Filter::All,
            return_geometry: false,
            record_count_multiplier: DEFAULT_RECORD_COUNT_MULTIPLIER,
        }
    }
}

impl QueryParameters {
    /// Defaults with `overrides` applied on top.
    pub fn merged(overrides: QueryOverrides) -> Self {
        Self::default().with_overrides(overrides)
    }

    pub fn with_overrides(mut self, overrides: QueryOverrides) -> Self {
        if let Some(filter) = overrides.filter {
            self.filter = filter;
        }
        if let Some(return_geometry) = overrides.return_geometry {
            self.return_geometry = return_geometry;
        }
        if let Some(multiplier) = overrides.record_count_multiplier {
            self.record_count_multiplier = multiplier;
        }
        self
    }

    /// Effective record limit for a store whose per-request maximum is `max_record_count`.
    pub fn record_limit(&self, max_record_count: usize) -> usize {
        max_record_count.saturating_mul(self.record_count_multiplier.max(1) as usize)
    }
}

/// Caller-supplied partial [`QueryParameters`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOverrides {
    pub filter: Option<Filter>,
    pub return_geometry: Option<bool>,
    pub record_count_multiplier: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::{AttributeFilter, Filter, QueryOverrides, QueryParameters};
    use crate::record::FeatureRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn overrides_merge_onto_defaults() {
        let params = QueryParameters::merged(QueryOverrides {
            return_geometry: Some(true),
            ..Default::default()
        });
        assert_eq!(
            params,
            QueryParameters {
                filter: Filter::All,
                return_geometry: true,
                record_count_multiplier: 5,
            }
        );
    }

    #[test]
    fn overrides_parse_from_camel_case_json() {
        let o: QueryOverrides = serde_json::from_str(
            r#"{"filter": {"where": [{"field": "kind", "op": "eq", "value": "shop"}]},
                "recordCountMultiplier": 2}"#,
        )
        .unwrap();
        let params = QueryParameters::merged(o);
        assert_eq!(params.filter, Filter::Where(vec![AttributeFilter::eq("kind", "shop")]));
        assert_eq!(params.record_count_multiplier, 2);
        assert!(!params.return_geometry);
        assert_eq!(params.record_limit(1000), 2000);
    }

    #[test]
    fn default_filter_serializes_as_all() {
        let json = serde_json::to_string(&QueryParameters::default()).unwrap();
        assert_eq!(
            json,
            r#"{"filter":"all","returnGeometry":false,"recordCountMultiplier":5}"#
        );
    }

    #[test]
    fn where_filter_is_a_conjunction() {
        let rec = FeatureRecord::new(1)
            .with_attribute("kind", "shop")
            .with_attribute("name", "Corner Bakery");
        let both = Filter::Where(vec![
            AttributeFilter::eq("kind", "shop"),
            AttributeFilter::contains("name", "Bakery"),
        ]);
        assert!(both.matches(&rec));

        let miss = Filter::Where(vec![
            AttributeFilter::eq("kind", "shop"),
            AttributeFilter::eq("name", "Bakery"),
        ]);
        assert!(!miss.matches(&rec));
        assert!(!Filter::Where(vec![AttributeFilter::eq("absent", "")]).matches(&rec));
    }

    #[test]
    fn parses_cli_filter_expressions() {
        assert_eq!(
            AttributeFilter::parse("kind = shop"),
            Some(AttributeFilter::eq("kind", "shop"))
        );
        assert_eq!(
            AttributeFilter::parse("name~Bak"),
            Some(AttributeFilter::contains("name", "Bak"))
        );
        assert_eq!(AttributeFilter::parse("nonsense"), None);
    }
}
