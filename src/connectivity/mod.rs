//! Downward connectivity: derived boundary entities of every cell, their
//! bidirectional links, and the queries built on them.

pub mod builder;
pub mod query;
pub mod tier;

pub use builder::{DownwardBuilder, DownwardConnectivity, DEFAULT_MAX_OWNERS};
pub use query::Neighbor;
pub use tier::DownRef;
