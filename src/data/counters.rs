//! ElementCounters: O(1) running counts of live mesh entities.
//!
//! Maintained incrementally by the store on every insert/remove, consumed by
//! the downward builder to pre-size its per-type tables and exposed to
//! collaborators for planning and reporting.

use crate::topology::cell_type::CellType;

/// Live entity counts by type and by dimension, plus the node count.
#[derive(Clone, Debug, Default)]
pub struct ElementCounters {
    by_type: [u64; CellType::COUNT],
    by_dimension: [u64; 4],
    nodes: u64,
}

impl ElementCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live cells of one type.
    #[inline]
    pub fn count_of(&self, ty: CellType) -> u64 {
        self.by_type[ty.code()]
    }

    /// Number of live cells of one dimension (0..=3).
    #[inline]
    pub fn by_dimension(&self, dim: u8) -> u64 {
        self.by_dimension[dim as usize]
    }

    /// Total number of live cells.
    #[inline]
    pub fn total(&self) -> u64 {
        self.by_dimension.iter().sum()
    }

    /// Number of live nodes.
    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub(crate) fn add_cell(&mut self, ty: CellType) {
        self.by_type[ty.code()] += 1;
        self.by_dimension[ty.dimension() as usize] += 1;
    }

    pub(crate) fn remove_cell(&mut self, ty: CellType) {
        debug_assert!(self.by_type[ty.code()] > 0);
        self.by_type[ty.code()] -= 1;
        self.by_dimension[ty.dimension() as usize] -= 1;
    }

    pub(crate) fn add_node(&mut self) {
        self.nodes += 1;
    }

    pub(crate) fn remove_node(&mut self) {
        debug_assert!(self.nodes > 0);
        self.nodes -= 1;
    }
}
