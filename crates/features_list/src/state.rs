use std::rc::Rc;

use cache::FeatureCache;
use layers::gateway::QueryGateway;
use layers::query::QueryParameters;
use runtime::event_bus::EventBus;

use crate::events::ListEvent;
use crate::model::ListModel;
use crate::projector::{Formatter, ListProjector};
use crate::selection::SelectionSyncController;

/// Store and formatter supplied at initialization.
pub(crate) struct Binding {
    pub store: Rc<dyn QueryGateway>,
    pub formatter: Formatter,
}

/// Everything a list mutates, behind one `RefCell`.
///
/// Borrows are short and never held across an `.await` or a host view call.
pub(crate) struct ListState {
    pub cache: FeatureCache,
    pub projector: ListProjector,
    pub model: ListModel,
    pub sync: SelectionSyncController,
    pub events: EventBus<ListEvent>,
    pub params: QueryParameters,
    pub binding: Option<Binding>,
}

impl ListState {
    pub fn new(sync: SelectionSyncController) -> Self {
        Self {
            cache: FeatureCache::new(),
            projector: ListProjector::new(),
            model: ListModel::new(),
            sync,
            events: EventBus::new(),
            params: QueryParameters::default(),
            binding: None,
        }
    }
}
