use std::cell::RefCell;
use std::rc::Rc;

use foundation::handles::Generation;
use foundation::ids::FeatureId;
use layers::gateway::QueryGateway;
use layers::geometry::Geometry;
use layers::query::{QueryOverrides, QueryParameters};
use layers::record::FeatureRecord;
use runtime::event_bus::Event;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::ListOptions;
use crate::error::Error;
use crate::events::ListEvent;
use crate::host::{HostView, ViewSelection};
use crate::model::{ListChange, LoadState};
use crate::navigation::{NavigationCoordinator, NavigationTarget};
use crate::projector::{DisplayItem, Formatter};
use crate::selection::{Dispatch, SelectionState, SelectionSyncController, ViewSync};
use crate::state::{Binding, ListState};

/// Arguments to [`FeaturesList::initialize`]. Store and formatter are required.
#[derive(Default)]
pub struct InitOptions {
    pub store: Option<Rc<dyn QueryGateway>>,
    pub query_params: QueryOverrides,
    pub formatter: Option<Formatter>,
}

/// A list of features from one store, kept in step with a host view.
///
/// Cloning yields another handle to the same list.
#[derive(Clone)]
pub struct FeaturesList {
    inner: Rc<Inner>,
}

struct Inner {
    options: ListOptions,
    view: Rc<dyn HostView>,
    navigation: NavigationCoordinator,
    state: Rc<RefCell<ListState>>,
}

impl FeaturesList {
    pub fn new(options: ListOptions, view: Rc<dyn HostView>) -> Self {
        let sync = SelectionSyncController::new(options.select_activity, options.action_activity);
        Self {
            inner: Rc::new(Inner {
                navigation: NavigationCoordinator::new(view.clone()),
                state: Rc::new(RefCell::new(ListState::new(sync))),
                options,
                view,
            }),
        }
    }

    /// Binds the store, builds the list and starts following the view's selection.
    ///
    /// Returns the number of listed items.
    pub async fn initialize(&self, init: InitOptions) -> Result<usize, Error> {
        let InitOptions {
            store,
            query_params,
            formatter,
        } = init;
        let store =
            store.ok_or_else(|| Error::Configuration("a feature store is required".to_string()))?;
        let formatter =
            formatter.ok_or_else(|| Error::Configuration("a formatter is required".to_string()))?;

        {
            let mut s = self.inner.state.borrow_mut();
            if s.binding.is_some() {
                return Err(Error::Configuration("list is already initialized".to_string()));
            }
            s.params = QueryParameters::merged(query_params);
            s.model
                .set_filter_placeholder(format!("Find {}...", store.title()));
            s.binding = Some(Binding {
                store: store.clone(),
                formatter,
            });
        }

        let weak = Rc::downgrade(&self.inner);
        self.inner.view.watch_selection(Box::new(move |selection: Option<&ViewSelection>| {
            if let Some(inner) = weak.upgrade() {
                FeaturesList { inner }.on_view_selection_changed(selection);
            }
        }));

        info!(
            store = %store.store_id(),
            title = store.title(),
            container = self.inner.options.container.as_deref().unwrap_or("-"),
            "features list initialized"
        );
        self.rebuild().await
    }

    /// Replaces the query parameters (defaults plus `overrides`) and rebuilds.
    pub async fn set_query_params(&self, overrides: QueryOverrides) -> Result<usize, Error> {
        self.inner.state.borrow_mut().params = QueryParameters::merged(overrides);
        self.rebuild().await
    }

    /// Starts a new generation, lists the store and repopulates cache and items.
    ///
    /// A rebuild overtaken by a newer one resolves to [`Error::Superseded`]
    /// and leaves the newer state alone.
    pub async fn rebuild(&self) -> Result<usize, Error> {
        let (store, params, generation) = {
            let mut s = self.inner.state.borrow_mut();
            let store = match &s.binding {
                Some(binding) => binding.store.clone(),
                None => return Err(not_initialized()),
            };
            let generation = s.cache.begin_generation();
            s.projector.clear();
            s.model.reset(generation);
            s.sync.reset();
            (store, s.params.clone(), generation)
        };
        debug!(%generation, store = %store.store_id(), "rebuilding list");

        let listed = store.list_features(&params).await;

        let mut s = self.inner.state.borrow_mut();
        if s.cache.generation() != generation {
            debug!(%generation, current = %s.cache.generation(), "dropping superseded listing");
            return Err(Error::Superseded(generation));
        }
        let records = match listed {
            Ok(records) => records,
            Err(err) => {
                warn!(%generation, %err, "listing failed");
                s.model.set_load_state(LoadState::Failed(err.to_string()));
                return Err(err.into());
            }
        };
        let formatter = match &s.binding {
            Some(binding) => binding.formatter.clone(),
            None => return Err(not_initialized()),
        };

        let ListState {
            cache,
            projector,
            model,
            sync,
            ..
        } = &mut *s;
        match projector.build(records, &*formatter, sync.action_activity(), cache) {
            Ok(items) => {
                let count = items.len();
                model.replace_items(generation, items);
                model.set_load_state(LoadState::Ready);
                info!(%generation, count, "list ready");
                Ok(count)
            }
            Err(err) => {
                warn!(%generation, %err, "could not build list items");
                model.set_load_state(LoadState::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// User selection reported by the list widget, as item values.
    pub async fn on_list_selection_changed(&self, values: &[String]) -> Result<(), Error> {
        let dispatch = {
            let mut s = self.inner.state.borrow_mut();
            if let Some(value) = values.first() {
                if s.projector.identity_for(value).is_none() {
                    return Err(Error::UnknownValue(value.clone()));
                }
            }
            let ListState {
                cache,
                projector,
                model,
                sync,
                ..
            } = &mut *s;
            sync.on_list_selection(values, projector, cache, model)
        };
        self.run(dispatch).await
    }

    /// Click on the action control of the row with `value`.
    pub async fn on_action(&self, value: &str) -> Result<(), Error> {
        let dispatch = {
            let s = self.inner.state.borrow();
            if s.projector.identity_for(value).is_none() {
                return Err(Error::UnknownValue(value.to_string()));
            }
            s.sync.on_action(value, &s.projector, &s.cache)
        };
        self.run(dispatch).await
    }

    /// Moves the view to a listed feature, fetching its geometry if needed.
    pub async fn go_to(&self, identity: &FeatureId) -> Result<NavigationTarget, Error> {
        let store = self.bound_store()?;
        let result = self
            .inner
            .navigation
            .go_to(&self.inner.state, store, identity.clone())
            .await;
        if let Err(err) = &result {
            warn!(%identity, %err, "navigation failed");
        }
        result
    }

    /// Mirrors the host view's selection into the list without dispatching
    /// any activity.
    pub fn on_view_selection_changed(&self, selection: Option<&ViewSelection>) -> ViewSync {
        let Ok(mut s) = self.inner.state.try_borrow_mut() else {
            warn!("view selection arrived while the list was updating, ignoring");
            return ViewSync::Unchanged;
        };
        let Some(bound) = s.binding.as_ref().map(|b| b.store.store_id()) else {
            return ViewSync::Unchanged;
        };
        let ListState {
            projector,
            model,
            sync,
            ..
        } = &mut *s;
        sync.on_view_selection(selection, bound, projector, model)
    }

    /// Programmatically selects `identity`'s row. `None` behaves like
    /// [`FeaturesList::clear_selection`].
    pub fn update_selection(&self, identity: Option<&FeatureId>) -> ViewSync {
        let Some(identity) = identity else {
            self.clear_selection();
            return ViewSync::Cleared;
        };
        let mut s = self.inner.state.borrow_mut();
        let ListState {
            projector,
            model,
            sync,
            ..
        } = &mut *s;
        sync.select_externally(identity, projector, model)
    }

    /// Deselects everything and closes the view's detail presentation.
    pub fn clear_selection(&self) {
        self.inner.view.close_detail();
        let mut s = self.inner.state.borrow_mut();
        let ListState { model, sync, .. } = &mut *s;
        sync.clear(model);
    }

    pub fn set_filter_text(&self, text: impl Into<String>) {
        self.inner.state.borrow_mut().model.set_filter_text(text);
    }

    pub fn options(&self) -> &ListOptions {
        &self.inner.options
    }

    pub fn query_params(&self) -> QueryParameters {
        self.inner.state.borrow().params.clone()
    }

    pub fn items(&self) -> Vec<DisplayItem> {
        self.inner.state.borrow().model.items().to_vec()
    }

    /// Items passing the current filter text.
    pub fn visible_items(&self) -> Vec<DisplayItem> {
        let s = self.inner.state.borrow();
        s.model.visible_items().into_iter().cloned().collect()
    }

    pub fn selected_value(&self) -> Option<String> {
        self.inner.state.borrow().model.selected_value().map(str::to_string)
    }

    pub fn selection_state(&self) -> SelectionState {
        self.inner.state.borrow().sync.state().clone()
    }

    pub fn is_busy(&self, value: &str) -> bool {
        self.inner.state.borrow().model.is_busy(value)
    }

    pub fn load_state(&self) -> LoadState {
        self.inner.state.borrow().model.load_state().clone()
    }

    pub fn generation(&self) -> Generation {
        self.inner.state.borrow().cache.generation()
    }

    pub fn filter_placeholder(&self) -> String {
        self.inner.state.borrow().model.filter_placeholder().to_string()
    }

    /// Cached record for a listed feature.
    pub fn feature(&self, identity: &FeatureId) -> Option<FeatureRecord> {
        self.inner.state.borrow().cache.get(identity).cloned()
    }

    /// Cached geometry for a listed feature.
    pub fn geometry(&self, identity: &FeatureId) -> Option<Geometry> {
        self.inner.state.borrow().cache.geometry(identity).cloned()
    }

    pub fn drain_events(&self) -> Vec<Event<ListEvent>> {
        self.inner.state.borrow_mut().events.drain()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event<ListEvent>> {
        self.inner.state.borrow_mut().events.subscribe()
    }

    pub fn drain_list_changes(&self) -> Vec<Event<ListChange>> {
        self.inner.state.borrow_mut().model.drain_changes()
    }

    /// Live feed of programmatic list changes for a widget layer.
    pub fn subscribe_list_changes(&self) -> broadcast::Receiver<Event<ListChange>> {
        self.inner.state.borrow_mut().model.subscribe_changes()
    }

    async fn run(&self, dispatch: Dispatch) -> Result<(), Error> {
        match dispatch {
            Dispatch::Nothing => Ok(()),
            Dispatch::Navigate(identity) => self.go_to(&identity).await.map(|_| ()),
            Dispatch::ShowDetail(record) => {
                debug!(identity = %record.identity, "opening detail");
                self.inner.view.open_detail(vec![record]);
                Ok(())
            }
            Dispatch::Emit(event) => {
                let sequence = self.inner.state.borrow_mut().events.emit(event);
                debug!(sequence, "list event emitted");
                Ok(())
            }
        }
    }

    fn bound_store(&self) -> Result<Rc<dyn QueryGateway>, Error> {
        match &self.inner.state.borrow().binding {
            Some(binding) => Ok(binding.store.clone()),
            None => Err(not_initialized()),
        }
    }
}

fn not_initialized() -> Error {
    Error::Configuration("list is not initialized".to_string())
}
