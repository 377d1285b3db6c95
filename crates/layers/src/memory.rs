use foundation::ids::FeatureId;
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gateway::{GatewayError, QueryGateway};
use crate::geometry::Geometry;
use crate::layer::StoreId;
use crate::query::QueryParameters;
use crate::record::FeatureRecord;

pub const DEFAULT_MAX_RECORD_COUNT: usize = 1000;

fn default_max_record_count() -> usize {
    DEFAULT_MAX_RECORD_COUNT
}

/// In-process feature store.
///
/// Serves listings and geometry lookups from a fixed record set, applying the
/// same filter/limit/geometry rules a remote store would.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStore {
    pub id: StoreId,
    pub title: String,
    #[serde(default = "default_max_record_count")]
    pub max_record_count: usize,
    #[serde(default)]
    pub features: Vec<FeatureRecord>,
}

impl MemoryStore {
    pub fn new(id: StoreId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            max_record_count: DEFAULT_MAX_RECORD_COUNT,
            features: Vec::new(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_features(mut self, features: Vec<FeatureRecord>) -> Self {
        self.features = features;
        self
    }

    pub fn with_max_record_count(mut self, max_record_count: usize) -> Self {
        self.max_record_count = max_record_count;
        self
    }

    pub fn query(&self, params: &QueryParameters) -> Vec<FeatureRecord> {
        let limit = params.record_limit(self.max_record_count);
        self.features
            .iter()
            .filter(|f| params.filter.matches(f))
            .take(limit)
            .map(|f| {
                if params.return_geometry {
                    f.clone()
                } else {
                    f.clone().without_geometry()
                }
            })
            .collect()
    }

    pub fn geometry(&self, identity: &FeatureId) -> Result<Geometry, GatewayError> {
        self.features
            .iter()
            .find(|f| &f.identity == identity)
            .and_then(|f| f.geometry.clone())
            .ok_or_else(|| GatewayError::NotFound(identity.clone()))
    }
}

impl QueryGateway for MemoryStore {
    fn store_id(&self) -> StoreId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn list_features(
        &self,
        params: &QueryParameters,
    ) -> LocalBoxFuture<'_, Result<Vec<FeatureRecord>, GatewayError>> {
        let records = self.query(params);
        debug!(store = %self.id, count = records.len(), "memory store listing");
        async move { Ok(records) }.boxed_local()
    }

    fn fetch_geometry(
        &self,
        identity: &FeatureId,
    ) -> LocalBoxFuture<'_, Result<Geometry, GatewayError>> {
        let result = self.geometry(identity);
        async move { result }.boxed_local()
    }
}
