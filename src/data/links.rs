//! NodeLinks: node-to-incident-cells index.
//!
//! Built in two passes (count uses per node, then fill) so each per-node list
//! is allocated exactly once, skipping removed cells. The downward builder
//! uses it to narrow candidate owners of a boundary entity by intersecting
//! the incidence lists of the entity's nodes.

use crate::data::cell_store::MeshStore;
use crate::topology::ids::{CellId, NodeId};

/// Immutable node→cells index over one store snapshot.
#[derive(Clone, Debug)]
pub struct NodeLinks {
    cells: Vec<Vec<CellId>>,
}

impl NodeLinks {
    /// Build the index for every node slot of the store (holes get empty
    /// lists).
    pub fn build(store: &MeshStore) -> Self {
        let mut counts = vec![0usize; store.node_capacity()];
        for (_, _, nodes) in store.iter_cells() {
            for &n in nodes {
                counts[n.index()] += 1;
            }
        }
        let mut cells: Vec<Vec<CellId>> =
            counts.iter().map(|&c| Vec::with_capacity(c)).collect();
        for (id, _, nodes) in store.iter_cells() {
            for &n in nodes {
                cells[n.index()].push(id);
            }
        }
        NodeLinks { cells }
    }

    /// Cells incident on `node`, in insertion (id) order.
    #[inline]
    pub fn cells_of(&self, node: NodeId) -> &[CellId] {
        self.cells
            .get(node.index())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Cells of dimension `dim` incident on *all* of `nodes`. The candidate
    /// set starts from the first node's list and shrinks by intersection, so
    /// the cost is bounded by one node's fan-out.
    pub fn cells_sharing(&self, nodes: &[NodeId], dim: u8, store: &MeshStore) -> Vec<CellId> {
        let Some((&first, rest)) = nodes.split_first() else {
            return Vec::new();
        };
        self.cells_of(first)
            .iter()
            .copied()
            .filter(|&c| {
                store.cell_type(c).map(|t| t.dimension()) == Ok(dim)
                    && rest.iter().all(|n| self.cells_of(*n).contains(&c))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::cell_type::CellType;

    fn n(i: u32) -> NodeId {
        NodeId::new(i)
    }

    #[test]
    fn links_skip_removed_cells() {
        let mut s = MeshStore::new();
        for i in 0..4 {
            s.add_node([i as f64, 0.0, 0.0]);
        }
        let c0 = s.add_cell(CellType::Triangle, &[n(0), n(1), n(2)]).unwrap();
        let c1 = s.add_cell(CellType::Triangle, &[n(1), n(2), n(3)]).unwrap();
        s.remove_cell(c0).unwrap();
        let links = NodeLinks::build(&s);
        assert_eq!(links.cells_of(n(0)), &[]);
        assert_eq!(links.cells_of(n(1)), &[c1]);
    }

    #[test]
    fn shared_cells_intersection() {
        let mut s = MeshStore::new();
        for i in 0..5 {
            s.add_node([i as f64, 0.0, 0.0]);
        }
        let t0 = s.add_cell(CellType::Tetra, &[n(0), n(1), n(2), n(3)]).unwrap();
        let t1 = s.add_cell(CellType::Tetra, &[n(0), n(2), n(1), n(4)]).unwrap();
        let links = NodeLinks::build(&s);
        let shared = links.cells_sharing(&[n(0), n(1), n(2)], 3, &s);
        assert_eq!(shared.len(), 2);
        assert!(shared.contains(&t0) && shared.contains(&t1));
        let only_t0 = links.cells_sharing(&[n(0), n(1), n(3)], 3, &s);
        assert_eq!(only_t0, vec![t0]);
    }
}
