//! # mesh-downward
//!
//! mesh-downward is a topological connectivity engine for unstructured
//! meshes. It stores points and cells in dense hole-tolerant arrays, derives
//! the full downward connectivity of a mesh (volumes to faces to edges,
//! including the implicit entities shared between cells but never stored
//! explicitly), and answers neighborhood queries on top of it.
//!
//! ## Features
//! - Dense cell/point storage with O(1) hole-marking removal and explicit
//!   compaction with caller-supplied renumbering maps
//! - Four-pass downward connectivity builder producing per-type CSR tables
//!   of `up`/`down` adjacency, with order-independent node-set matching
//! - Neighbor and parent-volume queries with skin detection and version-based
//!   staleness checking
//! - The full linear and quadratic cell taxonomy, polygons, polyhedra and
//!   ball elements included
//! - Flat-volume extrusion between duplicated node domains, the
//!   cell-creation step of domain splitting
//!
//! ## Usage
//! ```
//! use mesh_downward::prelude::*;
//!
//! let mut store = MeshStore::new();
//! let n: Vec<NodeId> = [
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0],
//!     [0.5, 0.5, -1.0],
//! ]
//! .into_iter()
//! .map(|p| store.add_node(p))
//! .collect();
//! let t0 = store.add_cell(CellType::Tetra, &[n[0], n[1], n[2], n[3]])?;
//! let t1 = store.add_cell(CellType::Tetra, &[n[0], n[2], n[1], n[4]])?;
//!
//! let down = DownwardBuilder::new(&store).build()?;
//! let nbrs = down.neighbors(&store, t0, false)?;
//! assert!(matches!(nbrs[..], [Neighbor::Cell { cell, .. }] if cell == t1));
//! # Ok::<(), mesh_downward::mesh_error::MeshError>(())
//! ```

pub mod algs;
pub mod connectivity;
pub mod data;
pub mod mesh_error;
pub mod topology;

/// A convenient prelude importing the most-used types.
pub mod prelude {
    pub use crate::algs::extrude::{extrude_volume_from_face, NodeDomains, QuadMids};
    pub use crate::connectivity::builder::{DownwardBuilder, DownwardConnectivity};
    pub use crate::connectivity::query::Neighbor;
    pub use crate::connectivity::tier::DownRef;
    pub use crate::data::cell_store::MeshStore;
    pub use crate::data::links::NodeLinks;
    pub use crate::data::shared::SharedMeshStore;
    pub use crate::mesh_error::MeshError;
    pub use crate::topology::cell_type::CellType;
    pub use crate::topology::ids::{CellId, NodeId};
}
