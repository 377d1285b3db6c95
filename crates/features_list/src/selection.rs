use cache::FeatureCache;
use foundation::ids::FeatureId;
use layers::layer::StoreId;
use layers::record::FeatureRecord;
use tracing::{debug, warn};

use crate::activity::ActivityKind;
use crate::events::ListEvent;
use crate::host::ViewSelection;
use crate::model::ListModel;
use crate::projector::ListProjector;

/// Where the current list selection came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    /// Chosen by the user in the list.
    SelectedInternally(FeatureId),
    /// Mirrored from the host view or set programmatically.
    SelectedExternally(FeatureId),
}

impl SelectionState {
    pub fn identity(&self) -> Option<&FeatureId> {
        match self {
            SelectionState::Idle => None,
            SelectionState::SelectedInternally(id) | SelectionState::SelectedExternally(id) => {
                Some(id)
            }
        }
    }
}

/// Effect requested by a selection or action, executed by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Nothing,
    Navigate(FeatureId),
    ShowDetail(FeatureRecord),
    Emit(ListEvent),
}

/// Outcome of mirroring a host view selection into the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSync {
    Selected(FeatureId),
    Cleared,
    /// The identity is not listed; the list keeps its selection.
    Unchanged,
}

/// Keeps the list selection and the host view selection in agreement.
///
/// Two entry points mutate selection:
/// - [`SelectionSyncController::on_list_selection`]: a user picked a row. This
///   is the only path that dispatches the select activity.
/// - [`SelectionSyncController::select_externally`] / [`SelectionSyncController::on_view_selection`]:
///   programmatic updates. They touch the model only and never dispatch, so a
///   view-driven selection cannot loop back into the view.
#[derive(Debug, Clone, Default)]
pub struct SelectionSyncController {
    select_activity: ActivityKind,
    action_activity: ActivityKind,
    state: SelectionState,
}

impl SelectionSyncController {
    pub fn new(select_activity: ActivityKind, action_activity: ActivityKind) -> Self {
        Self {
            select_activity,
            action_activity,
            state: SelectionState::Idle,
        }
    }

    pub fn action_activity(&self) -> ActivityKind {
        self.action_activity
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
    }

    /// User selection reported by the list widget.
    ///
    /// Only the first entry counts; an empty report deselects without any
    /// other effect.
    pub fn on_list_selection(
        &mut self,
        values: &[String],
        projector: &ListProjector,
        cache: &FeatureCache,
        model: &mut ListModel,
    ) -> Dispatch {
        let Some(value) = values.first() else {
            model.deselect_all();
            self.state = SelectionState::Idle;
            return Dispatch::Nothing;
        };
        if values.len() > 1 {
            debug!(count = values.len(), "list reported several selected rows, using the first");
        }

        let Some(record) = projector.identity_for(value).and_then(|id| cache.get(id)) else {
            warn!(value = %value, "selection for a row that is not listed");
            return Dispatch::Nothing;
        };

        model.select_value(value);
        self.state = SelectionState::SelectedInternally(record.identity.clone());
        plan(self.select_activity, record, |feature| ListEvent::ItemSelected {
            feature,
        })
    }

    /// Click on a row's secondary action control. Independent of selection.
    pub fn on_action(
        &self,
        value: &str,
        projector: &ListProjector,
        cache: &FeatureCache,
    ) -> Dispatch {
        if self.action_activity.is_none() {
            return Dispatch::Nothing;
        }
        let Some(identity) = projector.identity_for(value) else {
            warn!(value, "action for a row that is not listed");
            return Dispatch::Nothing;
        };
        let Some(record) = cache.get(identity) else {
            return Dispatch::Nothing;
        };
        let geometry = cache.geometry(identity).cloned();
        plan(self.action_activity, record, |feature| ListEvent::ItemAction {
            feature,
            geometry,
        })
    }

    /// Mirrors the host view's selection. Selections owned by another store,
    /// or no selection at all, clear the list.
    pub fn on_view_selection(
        &mut self,
        selection: Option<&ViewSelection>,
        bound_store: StoreId,
        projector: &ListProjector,
        model: &mut ListModel,
    ) -> ViewSync {
        match selection {
            Some(sel) if sel.store == bound_store => {
                self.select_externally(&sel.identity, projector, model)
            }
            // The view changed its own selection, so its detail is its own to close.
            _ => {
                self.clear(model);
                ViewSync::Cleared
            }
        }
    }

    /// Selects `identity`'s row and scrolls it into view without dispatching.
    pub fn select_externally(
        &mut self,
        identity: &FeatureId,
        projector: &ListProjector,
        model: &mut ListModel,
    ) -> ViewSync {
        let value = identity.to_string();
        if projector.identity_for(&value) != Some(identity) || !model.select_value(&value) {
            debug!(%identity, "external selection is not listed");
            return ViewSync::Unchanged;
        }
        model.scroll_into_view(&value);
        self.state = SelectionState::SelectedExternally(identity.clone());
        ViewSync::Selected(identity.clone())
    }

    pub fn clear(&mut self, model: &mut ListModel) {
        model.deselect_all();
        self.state = SelectionState::Idle;
    }
}

fn plan(
    activity: ActivityKind,
    record: &FeatureRecord,
    event: impl FnOnce(FeatureRecord) -> ListEvent,
) -> Dispatch {
    match activity {
        ActivityKind::None => Dispatch::Nothing,
        ActivityKind::Goto => Dispatch::Navigate(record.identity.clone()),
        ActivityKind::Popup => Dispatch::ShowDetail(record.clone()),
        ActivityKind::Event => Dispatch::Emit(event(record.clone())),
    }
}
