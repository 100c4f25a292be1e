//! MeshError: unified error type for mesh-downward public APIs
//!
//! Every fallible operation in the crate reports through this enum so that
//! callers get robust, non-panicking error handling for contract violations:
//! invalid ids, stale downward structures, owner-capacity overflow and
//! incomplete domain mappings.

use thiserror::Error;

use crate::topology::cell_type::CellType;
use crate::topology::ids::{CellId, NodeId};

/// Unified error type for mesh-downward operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Access to a node id that was never created or is out of range.
    #[error("invalid node id {0}: out of range")]
    InvalidNodeId(NodeId),
    /// Access to a node slot previously removed (a hole).
    #[error("node {0} has been removed")]
    NodeRemoved(NodeId),
    /// Access to a cell id that was never created or is out of range.
    #[error("invalid cell id {0}: out of range")]
    InvalidCellId(CellId),
    /// Access to a cell slot previously removed (a hole).
    #[error("cell {0} has been removed")]
    CellRemoved(CellId),
    /// Fill-at-id insertion into an occupied node slot.
    #[error("node slot {0} is already occupied")]
    OccupiedNodeId(NodeId),
    /// Fill-at-id insertion into an occupied cell slot.
    #[error("cell slot {0} is already occupied")]
    OccupiedCellId(CellId),
    /// Node sequence length does not match the cell type.
    #[error("cell type {ty:?} requires {expected} nodes, got {found}")]
    NodeCountMismatch {
        ty: CellType,
        expected: usize,
        found: usize,
    },
    /// Query against a downward structure invalidated by a later mutation.
    #[error("downward structure is stale: built at store version {built}, store is at {current}")]
    StaleConnectivity { built: u64, current: u64 },
    /// Query on a cell whose dimension does not support it.
    #[error("cell {cell} has dimension {dim}, unsupported for this query")]
    UnsupportedCellDimension { cell: CellId, dim: u8 },
    /// A boundary entity exceeded the configured owner bound (non-manifold
    /// input beyond `max_owners`).
    #[error("entity {ty:?}#{id} exceeds the owner capacity of {cap}")]
    CapacityOverflow { ty: CellType, id: u32, cap: usize },
    /// `extrude_volume_from_face` invoked with a node absent from the
    /// domain-duplicate mapping.
    #[error("node {node} has no duplicate registered for domain {domain}")]
    MissingDomainNode { node: NodeId, domain: i32 },
    /// The supplied node set matches no boundary face of the given cell.
    #[error("node set is not a boundary face of cell {0}")]
    FaceNotInCell(CellId),
    /// Compaction maps are shorter than the live arrays they must cover.
    #[error("compaction map for {what} covers {found} entries, store holds {expected}")]
    CompactionMapTooShort {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A compaction map sends an entry past the new dense size.
    #[error("compaction map for {what} sends {id} to {target}, new size is {cap}")]
    CompactionMapOutOfRange {
        what: &'static str,
        id: u32,
        target: u32,
        cap: usize,
    },
}
