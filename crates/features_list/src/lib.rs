//! A list widget's logic for the features of one store, synchronized with a
//! host map view: selection in either direction, configurable activities,
//! on-demand geometry and navigation.

pub mod activity;
pub mod component;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod model;
pub mod navigation;
pub mod projector;
pub mod selection;
mod state;

#[cfg(test)]
mod testing;

pub use activity::*;
pub use component::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use host::*;
pub use model::*;
pub use navigation::*;
pub use projector::*;
pub use selection::*;
