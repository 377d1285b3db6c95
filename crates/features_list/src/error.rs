use cache::CacheError;
use foundation::handles::Generation;
use foundation::ids::FeatureId;
use layers::gateway::GatewayError;
use thiserror::Error as ThisError;

use crate::host::ViewError;

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    View(#[from] ViewError),

    /// Missing or inconsistent setup; nothing is rendered.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid list options: {0}")]
    Options(String),

    #[error("feature {0} is not in the list")]
    NotListed(FeatureId),

    #[error("no list item has value {0:?}")]
    UnknownValue(String),

    #[error("feature {0} has no geometry to navigate to")]
    EmptyGeometry(FeatureId),

    #[error("geometry for feature {0} arrived after the list was rebuilt")]
    StaleGeneration(FeatureId),

    #[error("listing for {0} was superseded by a newer rebuild")]
    Superseded(Generation),
}

impl From<CacheError> for Error {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::StaleGeneration { identity, .. } => Error::StaleGeneration(identity),
            CacheError::UnknownIdentity(identity) => Error::NotListed(identity),
        }
    }
}
