pub mod gateway;
pub mod geometry;
pub mod layer;
pub mod memory;
pub mod query;
pub mod record;

pub use gateway::*;
pub use geometry::*;
pub use layer::*;
pub use memory::*;
pub use query::*;
pub use record::*;
