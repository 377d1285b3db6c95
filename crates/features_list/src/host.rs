//! Narrow capability interface onto the host map/scene view.

use foundation::ids::FeatureId;
use futures_util::future::LocalBoxFuture;
use layers::layer::StoreId;
use layers::record::FeatureRecord;
use thiserror::Error as ThisError;

use crate::navigation::NavigationTarget;

/// The view's single active selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSelection {
    /// Store that owns the selected feature.
    pub store: StoreId,
    pub identity: FeatureId,
}

impl ViewSelection {
    pub fn new(store: StoreId, identity: impl Into<FeatureId>) -> Self {
        Self {
            store,
            identity: identity.into(),
        }
    }
}

/// Called by the view whenever its selection changes; `None` means nothing is selected.
pub type SelectionListener = Box<dyn Fn(Option<&ViewSelection>)>;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("view movement failed: {0}")]
pub struct ViewError(pub String);

/// Implementations may invoke selection listeners synchronously from
/// `open_detail`/`close_detail`; the list never holds internal borrows across
/// these calls.
pub trait HostView {
    fn watch_selection(&self, listener: SelectionListener);

    /// Moves the view to `target`; resolves when the movement completes.
    fn move_to(&self, target: NavigationTarget) -> LocalBoxFuture<'_, Result<(), ViewError>>;

    fn open_detail(&self, records: Vec<FeatureRecord>);

    fn close_detail(&self);
}
