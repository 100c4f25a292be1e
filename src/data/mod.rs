//! Mesh data storage: the dense hole-tolerant store, live-element counters,
//! the node-to-cell index and the shared-producer wrapper.

pub mod cell_store;
pub mod counters;
pub mod links;
pub mod shared;

pub use cell_store::MeshStore;
pub use counters::ElementCounters;
pub use links::NodeLinks;
pub use shared::SharedMeshStore;
