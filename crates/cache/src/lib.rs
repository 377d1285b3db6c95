pub mod cache;
pub mod request;

pub use cache::*;
pub use request::*;
