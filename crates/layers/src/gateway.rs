//! Boundary to a remote feature store.
//!
//! The list component consumes stores only through [`QueryGateway`]. Futures
//! are single-threaded ([`LocalBoxFuture`]) because the component runs on one
//! cooperative event loop; timeouts belong to the implementation.

use foundation::ids::FeatureId;
use futures_util::future::LocalBoxFuture;
use thiserror::Error as ThisError;

use crate::geometry::Geometry;
use crate::layer::StoreId;
use crate::query::QueryParameters;
use crate::record::FeatureRecord;

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum GatewayError {
    /// Transport or store failure.
    #[error("query failed: {0}")]
    Query(String),

    #[error("feature {0} not found")]
    NotFound(FeatureId),
}

pub trait QueryGateway {
    fn store_id(&self) -> StoreId;

    /// Human readable store name.
    fn title(&self) -> &str;

    /// Lists records matching `params`, in store order.
    ///
    /// Records carry geometry only when `params.return_geometry` is set.
    fn list_features(
        &self,
        params: &QueryParameters,
    ) -> LocalBoxFuture<'_, Result<Vec<FeatureRecord>, GatewayError>>;

    /// Fetches the geometry of one record.
    fn fetch_geometry(
        &self,
        identity: &FeatureId,
    ) -> LocalBoxFuture<'_, Result<Geometry, GatewayError>>;
}
