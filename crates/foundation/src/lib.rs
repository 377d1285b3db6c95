pub mod bounds;
pub mod handles;
pub mod ids;

// Identity, generation and extent primitives shared by every crate.
pub use bounds::*;
pub use handles::*;
pub use ids::*;
