//! Fakes for the store and the host view.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::ids::FeatureId;
use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};
use layers::gateway::{GatewayError, QueryGateway};
use layers::geometry::Geometry;
use layers::layer::StoreId;
use layers::query::{QueryOverrides, QueryParameters};
use layers::record::FeatureRecord;
use tokio::sync::oneshot;

use crate::component::{FeaturesList, InitOptions};
use crate::config::ListOptions;
use crate::host::{HostView, SelectionListener, ViewError, ViewSelection};
use crate::navigation::NavigationTarget;
use crate::projector::{Formatter, ItemInfo};

pub const STORE: StoreId = StoreId(7);

pub fn record(id: i64, name: &str) -> FeatureRecord {
    FeatureRecord::new(id)
        .with_attribute("name", name)
        .with_attribute("kind", "well")
}

pub fn formatter() -> Formatter {
    Rc::new(|r: &FeatureRecord| ItemInfo {
        label: r.attribute_text("name"),
        description: r.attribute_text("kind"),
        value: r.identity.to_string(),
    })
}

pub struct FakeStore {
    pub id: StoreId,
    pub title: String,
    pub records: RefCell<Vec<FeatureRecord>>,
    pub geometries: RefCell<BTreeMap<FeatureId, Geometry>>,
    pub fail_listing: Cell<bool>,
    pub list_calls: Cell<usize>,
    pub fetch_calls: Cell<usize>,
    pub last_params: RefCell<Option<QueryParameters>>,
    listing_gate: RefCell<Option<oneshot::Receiver<()>>>,
    geometry_gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl FakeStore {
    /// Records 1..=`count` named `F1`, `F2`, ... each with a point geometry.
    pub fn numbered(count: i64) -> Self {
        let store = Self {
            id: STORE,
            title: "Wells".to_string(),
            records: RefCell::new(Vec::new()),
            geometries: RefCell::new(BTreeMap::new()),
            fail_listing: Cell::new(false),
            list_calls: Cell::new(0),
            fetch_calls: Cell::new(0),
            last_params: RefCell::new(None),
            listing_gate: RefCell::new(None),
            geometry_gate: RefCell::new(None),
        };
        for n in 1..=count {
            store.records.borrow_mut().push(record(n, &format!("F{n}")));
            store
                .geometries
                .borrow_mut()
                .insert(FeatureId::Int(n), Geometry::point(n as f64, n as f64 * 2.0));
        }
        store
    }

    /// Holds the next listing until the returned sender fires.
    pub fn gate_listing(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.listing_gate.borrow_mut() = Some(rx);
        tx
    }

    /// Holds the next geometry fetch until the returned sender fires.
    pub fn gate_geometry(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.geometry_gate.borrow_mut() = Some(rx);
        tx
    }
}

impl QueryGateway for FakeStore {
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
        self.list_calls.set(self.list_calls.get() + 1);
        *self.last_params.borrow_mut() = Some(params.clone());
        let gate = self.listing_gate.borrow_mut().take();
        let result = if self.fail_listing.get() {
            Err(GatewayError::Query("store offline".to_string()))
        } else {
            let geometries = self.geometries.borrow();
            Ok(self
                .records
                .borrow()
                .iter()
                .map(|r| match geometries.get(&r.identity) {
                    Some(g) if params.return_geometry => r.clone().with_geometry(g.clone()),
                    _ => r.clone(),
                })
                .collect())
        };
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            result
        }
        .boxed_local()
    }

    fn fetch_geometry(
        &self,
        identity: &FeatureId,
    ) -> LocalBoxFuture<'_, Result<Geometry, GatewayError>> {
        self.fetch_calls.set(self.fetch_calls.get() + 1);
        let gate = self.geometry_gate.borrow_mut().take();
        let result = self
            .geometries
            .borrow()
            .get(identity)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(identity.clone()));
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            result
        }
        .boxed_local()
    }
}

/// Records every call; optionally mirrors opened details back as a view
/// selection the way a map popup selects its feature.
#[derive(Default)]
pub struct FakeView {
    listener: RefCell<Option<SelectionListener>>,
    pub moves: RefCell<Vec<NavigationTarget>>,
    pub details: RefCell<Vec<Vec<FeatureRecord>>>,
    pub closes: Cell<usize>,
    pub fail_moves: Cell<bool>,
    pub echo: Option<StoreId>,
}

impl FakeView {
    pub fn echoing(store: StoreId) -> Self {
        Self {
            echo: Some(store),
            ..Self::default()
        }
    }

    pub fn is_watched(&self) -> bool {
        self.listener.borrow().is_some()
    }

    /// Simulates the user selecting something on the map.
    pub fn select(&self, selection: Option<&ViewSelection>) {
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(selection);
        }
    }
}

impl HostView for FakeView {
    fn watch_selection(&self, listener: SelectionListener) {
        *self.listener.borrow_mut() = Some(listener);
    }

    fn move_to(&self, target: NavigationTarget) -> LocalBoxFuture<'_, Result<(), ViewError>> {
        let result = if self.fail_moves.get() {
            Err(ViewError("animation interrupted".to_string()))
        } else {
            self.moves.borrow_mut().push(target);
            Ok(())
        };
        future::ready(result).boxed_local()
    }

    fn open_detail(&self, records: Vec<FeatureRecord>) {
        let echoed = match (self.echo, records.first()) {
            (Some(store), Some(first)) => Some(ViewSelection::new(store, first.identity.clone())),
            _ => None,
        };
        self.details.borrow_mut().push(records);
        if let Some(selection) = echoed {
            self.select(Some(&selection));
        }
    }

    fn close_detail(&self) {
        self.closes.set(self.closes.get() + 1);
        if self.echo.is_some() {
            self.select(None);
        }
    }
}

/// Initializes a list over `store` and `view` with the test formatter.
pub async fn ready_list(
    options: ListOptions,
    store: FakeStore,
    view: FakeView,
) -> (FeaturesList, Rc<FakeStore>, Rc<FakeView>) {
    let store = Rc::new(store);
    let view = Rc::new(view);
    let list = FeaturesList::new(options, view.clone());
    let store_handle: Rc<dyn QueryGateway> = store.clone();
    list.initialize(InitOptions {
        store: Some(store_handle),
        query_params: QueryOverrides::default(),
        formatter: Some(formatter()),
    })
    .await
    .unwrap();
    (list, store, view)
}
