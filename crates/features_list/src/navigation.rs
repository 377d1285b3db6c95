use std::cell::RefCell;
use std::rc::{Rc, Weak};

use foundation::bounds::Aabb2;
use foundation::handles::Generation;
use foundation::ids::FeatureId;
use layers::gateway::QueryGateway;
use layers::geometry::Geometry;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Error;
use crate::host::HostView;
use crate::state::ListState;

/// View scale used when navigating to a point.
pub const REFERENCE_SCALE: f64 = 500_000.0;

/// Extents are enlarged by this factor so the feature does not touch the view edges.
pub const EXTENT_MARGIN: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavigationTarget {
    Point { x: f64, y: f64, scale: f64 },
    Extent { extent: Aabb2 },
}

impl NavigationTarget {
    /// `None` for a geometry without vertices.
    pub fn for_geometry(geometry: &Geometry) -> Option<Self> {
        match geometry {
            Geometry::Point { x, y } => Some(NavigationTarget::Point {
                x: *x,
                y: *y,
                scale: REFERENCE_SCALE,
            }),
            other => other.extent().map(|extent| NavigationTarget::Extent {
                extent: extent.expand(EXTENT_MARGIN),
            }),
        }
    }
}

/// Clears a row's busy flag when dropped, whichever way navigation ends.
struct BusyGuard {
    state: Weak<RefCell<ListState>>,
    value: String,
    generation: Generation,
}

impl BusyGuard {
    fn acquire(state: &Rc<RefCell<ListState>>, value: String) -> Self {
        let mut s = state.borrow_mut();
        s.model.acquire_busy(&value);
        Self {
            state: Rc::downgrade(state),
            generation: s.model.generation(),
            value,
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        // State borrows are synchronous and never drop a navigation future
        // while held, so this only fails if a formatter drops one.
        let Ok(mut s) = state.try_borrow_mut() else {
            warn!(value = %self.value, "list state busy while releasing row");
            return;
        };
        // A rebuild already reset every busy flag of the old generation.
        if s.model.generation() == self.generation {
            s.model.release_busy(&self.value);
        }
    }
}

enum Lookup {
    Cached(Geometry),
    Fetch(cache::GeometryTicket),
}

/// Executes "go to feature" requests against the host view.
///
/// Overlapping requests are not cancelled; each runs to completion and moves
/// the view in turn.
pub struct NavigationCoordinator {
    view: Rc<dyn HostView>,
}

impl NavigationCoordinator {
    pub fn new(view: Rc<dyn HostView>) -> Self {
        Self { view }
    }

    pub(crate) async fn go_to(
        &self,
        state: &Rc<RefCell<ListState>>,
        gateway: Rc<dyn QueryGateway>,
        identity: FeatureId,
    ) -> Result<NavigationTarget, Error> {
        let lookup = {
            let s = state.borrow();
            if !s.cache.contains(&identity) {
                return Err(Error::NotListed(identity));
            }
            match s.cache.geometry(&identity) {
                Some(geometry) => Lookup::Cached(geometry.clone()),
                None => Lookup::Fetch(s.cache.issue_ticket(identity.clone())),
            }
        };

        let _busy = BusyGuard::acquire(state, identity.to_string());

        let geometry = match lookup {
            Lookup::Cached(geometry) => geometry,
            Lookup::Fetch(ticket) => {
                debug!(%identity, generation = %ticket.generation, "fetching geometry");
                let geometry = gateway.fetch_geometry(&identity).await?;
                let stored = state
                    .borrow_mut()
                    .cache
                    .put_geometry_for(ticket, geometry.clone());
                if let Err(err) = stored {
                    warn!(%identity, %err, "discarding fetched geometry");
                    return Err(err.into());
                }
                geometry
            }
        };

        let target = NavigationTarget::for_geometry(&geometry)
            .ok_or_else(|| Error::EmptyGeometry(identity.clone()))?;
        self.view.move_to(target).await?;
        debug!(%identity, ?target, "navigated to feature");
        Ok(target)
    }
}
