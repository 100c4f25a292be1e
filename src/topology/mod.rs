//! Mesh topology primitives: strongly-typed ids, the cell-type taxonomy and
//! the data-driven boundary catalog.

pub mod catalog;
pub mod cell_type;
pub mod ids;

pub use cell_type::CellType;
pub use ids::{CellId, NodeId};
