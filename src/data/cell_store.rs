//! MeshStore: dense, hole-tolerant storage of points and cells.
//!
//! Points are triples of coordinates; cells are a type tag plus an ordered
//! node-id sequence whose order encodes orientation and mid-side positions.
//! Removal marks a slot as a hole in O(1) without shifting ids; physical
//! removal and renumbering happen only in [`MeshStore::compact`], which the
//! caller must pair with a reindexing of every id it still holds.
//!
//! Every mutation except [`MeshStore::substitute_cell_nodes`] bumps an
//! internal version; the downward structure records the version it was built
//! against and refuses queries once they diverge.

use hashbrown::HashMap;
use log::debug;

use crate::data::counters::ElementCounters;
use crate::mesh_error::MeshError;
use crate::topology::cell_type::CellType;
use crate::topology::ids::{CellId, NodeId};

#[derive(Clone, Debug)]
struct Cell {
    ty: CellType,
    nodes: Vec<NodeId>,
}

#[derive(Clone, Debug)]
enum CellSlot {
    Live(Cell),
    Hole,
}

/// Dense cell/point storage with O(1) hole-marking removal.
#[derive(Clone, Debug, Default)]
pub struct MeshStore {
    points: Vec<[f64; 3]>,
    point_live: Vec<bool>,
    cells: Vec<CellSlot>,
    counters: ElementCounters,
    /// Face-definition blocks of polyhedron cells.
    polyhedron_faces: HashMap<CellId, Vec<Vec<NodeId>>>,
    /// Diameters of ball elements.
    diameters: HashMap<CellId, f64>,
    version: u64,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic mutation counter consumed for staleness detection.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn counters(&self) -> &ElementCounters {
        &self.counters
    }

    #[inline]
    pub fn live_node_count(&self) -> usize {
        self.counters.nodes() as usize
    }

    #[inline]
    pub fn live_cell_count(&self) -> usize {
        self.counters.total() as usize
    }

    /// Upper bound of node ids ever allocated (holes included).
    #[inline]
    pub fn node_capacity(&self) -> usize {
        self.points.len()
    }

    /// Upper bound of cell ids ever allocated (holes included).
    #[inline]
    pub fn cell_capacity(&self) -> usize {
        self.cells.len()
    }

    // --- nodes --------------------------------------------------------------

    /// Append a node, returning its id.
    pub fn add_node(&mut self, xyz: [f64; 3]) -> NodeId {
        let id = NodeId::new(self.points.len() as u32);
        self.points.push(xyz);
        self.point_live.push(true);
        self.counters.add_node();
        self.version += 1;
        id
    }

    /// Fill a node at an explicit id (restore path). Slots between the
    /// current end and `id` become holes.
    pub fn add_node_at(&mut self, id: NodeId, xyz: [f64; 3]) -> Result<NodeId, MeshError> {
        let i = id.index();
        if i < self.points.len() {
            if self.point_live[i] {
                return Err(MeshError::OccupiedNodeId(id));
            }
        } else {
            self.points.resize(i + 1, [0.0; 3]);
            self.point_live.resize(i + 1, false);
        }
        self.points[i] = xyz;
        self.point_live[i] = true;
        self.counters.add_node();
        self.version += 1;
        Ok(id)
    }

    /// Mark a node slot as a hole. The id must not be referenced by any live
    /// cell afterwards; that contract is the caller's.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), MeshError> {
        self.check_node(id)?;
        self.point_live[id.index()] = false;
        self.counters.remove_node();
        self.version += 1;
        Ok(())
    }

    pub fn node_coords(&self, id: NodeId) -> Result<[f64; 3], MeshError> {
        self.check_node(id)?;
        Ok(self.points[id.index()])
    }

    #[inline]
    pub fn is_node_live(&self, id: NodeId) -> bool {
        id.index() < self.points.len() && self.point_live[id.index()]
    }

    /// Id-ordered iteration over live nodes.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, [f64; 3])> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.point_live[i])
            .map(|(i, &p)| (NodeId::new(i as u32), p))
    }

    fn check_node(&self, id: NodeId) -> Result<(), MeshError> {
        if id.index() >= self.points.len() {
            return Err(MeshError::InvalidNodeId(id));
        }
        if !self.point_live[id.index()] {
            return Err(MeshError::NodeRemoved(id));
        }
        Ok(())
    }

    // --- cells --------------------------------------------------------------

    /// Append a cell of a fixed-size or polygon type, returning its id.
    pub fn add_cell(&mut self, ty: CellType, nodes: &[NodeId]) -> Result<CellId, MeshError> {
        self.validate_cell(ty, nodes)?;
        let id = CellId::new(self.cells.len() as u32);
        self.cells.push(CellSlot::Live(Cell {
            ty,
            nodes: nodes.to_vec(),
        }));
        self.counters.add_cell(ty);
        self.version += 1;
        Ok(id)
    }

    /// Fill a cell at an explicit id (restore path).
    pub fn add_cell_at(
        &mut self,
        id: CellId,
        ty: CellType,
        nodes: &[NodeId],
    ) -> Result<CellId, MeshError> {
        self.validate_cell(ty, nodes)?;
        let i = id.index();
        if i < self.cells.len() {
            if matches!(self.cells[i], CellSlot::Live(_)) {
                return Err(MeshError::OccupiedCellId(id));
            }
        } else {
            self.cells.resize_with(i + 1, || CellSlot::Hole);
        }
        self.cells[i] = CellSlot::Live(Cell {
            ty,
            nodes: nodes.to_vec(),
        });
        self.counters.add_cell(ty);
        self.version += 1;
        Ok(id)
    }

    /// Append a polyhedron described by its polygonal faces. The cell's node
    /// sequence is the deduplicated union of the face nodes; the face blocks
    /// are kept in a side table.
    pub fn add_polyhedron(&mut self, faces: &[Vec<NodeId>]) -> Result<CellId, MeshError> {
        let mut nodes = Vec::new();
        for f in faces {
            for &n in f {
                self.check_node(n)?;
                if !nodes.contains(&n) {
                    nodes.push(n);
                }
            }
        }
        let id = CellId::new(self.cells.len() as u32);
        self.cells.push(CellSlot::Live(Cell {
            ty: CellType::Polyhedron,
            nodes,
        }));
        self.polyhedron_faces.insert(id, faces.to_vec());
        self.counters.add_cell(CellType::Polyhedron);
        self.version += 1;
        Ok(id)
    }

    /// Append a ball element on `node` carrying a diameter attribute.
    pub fn add_ball(&mut self, node: NodeId, diameter: f64) -> Result<CellId, MeshError> {
        let id = self.add_cell(CellType::Ball, &[node])?;
        self.diameters.insert(id, diameter);
        Ok(id)
    }

    /// Mark a cell slot as a hole, O(1). Removing twice is an error.
    pub fn remove_cell(&mut self, id: CellId) -> Result<(), MeshError> {
        let ty = self.cell_type(id)?;
        self.cells[id.index()] = CellSlot::Hole;
        self.counters.remove_cell(ty);
        self.polyhedron_faces.remove(&id);
        self.diameters.remove(&id);
        self.version += 1;
        Ok(())
    }

    pub fn cell_type(&self, id: CellId) -> Result<CellType, MeshError> {
        Ok(self.cell(id)?.ty)
    }

    pub fn cell_nodes(&self, id: CellId) -> Result<&[NodeId], MeshError> {
        Ok(&self.cell(id)?.nodes)
    }

    /// Face-definition block of a polyhedron cell, if `id` is one.
    pub fn polyhedron_faces(&self, id: CellId) -> Option<&[Vec<NodeId>]> {
        self.polyhedron_faces.get(&id).map(|v| v.as_slice())
    }

    /// Diameter of a ball element, if `id` is one.
    pub fn ball_diameter(&self, id: CellId) -> Option<f64> {
        self.diameters.get(&id).copied()
    }

    #[inline]
    pub fn is_cell_live(&self, id: CellId) -> bool {
        matches!(self.cells.get(id.index()), Some(CellSlot::Live(_)))
    }

    /// Id-ordered iteration over live cells.
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellId, CellType, &[NodeId])> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, slot)| match slot {
            CellSlot::Live(c) => Some((CellId::new(i as u32), c.ty, c.nodes.as_slice())),
            CellSlot::Hole => None,
        })
    }

    fn cell(&self, id: CellId) -> Result<&Cell, MeshError> {
        match self.cells.get(id.index()) {
            Some(CellSlot::Live(c)) => Ok(c),
            Some(CellSlot::Hole) => Err(MeshError::CellRemoved(id)),
            None => Err(MeshError::InvalidCellId(id)),
        }
    }

    fn validate_cell(&self, ty: CellType, nodes: &[NodeId]) -> Result<(), MeshError> {
        if let Some(expected) = ty.node_count() {
            if nodes.len() != expected {
                return Err(MeshError::NodeCountMismatch {
                    ty,
                    expected,
                    found: nodes.len(),
                });
            }
        } else if ty == CellType::Polygon && nodes.len() < 3 {
            return Err(MeshError::NodeCountMismatch {
                ty,
                expected: 3,
                found: nodes.len(),
            });
        }
        for &n in nodes {
            self.check_node(n)?;
        }
        Ok(())
    }

    // --- structure-preserving edit ------------------------------------------

    /// Substitute node ids referenced by a cell without changing its type or
    /// connectivity layout. The only mutation that keeps a built downward
    /// structure valid; the version is deliberately not bumped.
    pub fn substitute_cell_nodes(
        &mut self,
        id: CellId,
        old_to_new: &HashMap<NodeId, NodeId>,
    ) -> Result<(), MeshError> {
        self.cell(id)?;
        if let CellSlot::Live(c) = &mut self.cells[id.index()] {
            for n in &mut c.nodes {
                if let Some(&new) = old_to_new.get(n) {
                    *n = new;
                }
            }
        }
        if let Some(blocks) = self.polyhedron_faces.get_mut(&id) {
            for f in blocks {
                for n in f {
                    if let Some(&new) = old_to_new.get(n) {
                        *n = new;
                    }
                }
            }
        }
        Ok(())
    }

    // --- compaction ---------------------------------------------------------

    /// Rebuild dense point/cell arrays eliminating holes.
    ///
    /// `node_old_to_new[i]` gives the new id of old node `i` (`None` for a
    /// hole); `cell_old_to_new` likewise for cells. Afterwards ids are dense
    /// in `[0, new_count)`; any id held before the call is invalid unless
    /// translated through the maps. Live slots mapped to `None` are dropped.
    pub fn compact(
        &mut self,
        node_old_to_new: &[Option<NodeId>],
        new_node_count: usize,
        cell_old_to_new: &[Option<CellId>],
        new_cell_count: usize,
    ) -> Result<(), MeshError> {
        if node_old_to_new.len() < self.points.len() {
            return Err(MeshError::CompactionMapTooShort {
                what: "nodes",
                expected: self.points.len(),
                found: node_old_to_new.len(),
            });
        }
        if cell_old_to_new.len() < self.cells.len() {
            return Err(MeshError::CompactionMapTooShort {
                what: "cells",
                expected: self.cells.len(),
                found: cell_old_to_new.len(),
            });
        }
        for (old, m) in node_old_to_new.iter().enumerate() {
            if let Some(new) = m {
                if new.index() >= new_node_count {
                    return Err(MeshError::CompactionMapOutOfRange {
                        what: "nodes",
                        id: old as u32,
                        target: new.get(),
                        cap: new_node_count,
                    });
                }
            }
        }
        for (old, m) in cell_old_to_new.iter().enumerate() {
            if let Some(new) = m {
                if new.index() >= new_cell_count {
                    return Err(MeshError::CompactionMapOutOfRange {
                        what: "cells",
                        id: old as u32,
                        target: new.get(),
                        cap: new_cell_count,
                    });
                }
            }
        }

        // points: copy contiguous non-hole runs into the new dense array
        let mut new_points = vec![[0.0f64; 3]; new_node_count];
        let old_node_size = self.points.len();
        let mut i = 0;
        while i < old_node_size {
            while i < old_node_size && node_old_to_new[i].is_none() {
                i += 1;
            }
            let start = i;
            while i < old_node_size && node_old_to_new[i].is_some() {
                i += 1;
            }
            if start < i {
                let dst = node_old_to_new[start].unwrap().index();
                new_points[dst..dst + (i - start)].copy_from_slice(&self.points[start..i]);
            }
        }

        // cells: place each surviving cell at its new id, remapping node refs
        let mut new_cells: Vec<CellSlot> = Vec::with_capacity(new_cell_count);
        new_cells.resize_with(new_cell_count, || CellSlot::Hole);
        let mut new_poly: HashMap<CellId, Vec<Vec<NodeId>>> = HashMap::new();
        let mut new_diam: HashMap<CellId, f64> = HashMap::new();
        let remap_node = |n: NodeId| -> Result<NodeId, MeshError> {
            node_old_to_new
                .get(n.index())
                .copied()
                .flatten()
                .ok_or(MeshError::InvalidNodeId(n))
        };
        let mut dropped = 0usize;
        for (old, slot) in self.cells.iter().enumerate() {
            let CellSlot::Live(c) = slot else { continue };
            let old_id = CellId::new(old as u32);
            let Some(new_id) = cell_old_to_new[old] else {
                // live cell dropped by the caller's map
                self.counters.remove_cell(c.ty);
                dropped += 1;
                continue;
            };
            let nodes = c
                .nodes
                .iter()
                .map(|&n| remap_node(n))
                .collect::<Result<Vec<_>, _>>()?;
            new_cells[new_id.index()] = CellSlot::Live(Cell { ty: c.ty, nodes });
            if let Some(blocks) = self.polyhedron_faces.get(&old_id) {
                let blocks = blocks
                    .iter()
                    .map(|f| f.iter().map(|&n| remap_node(n)).collect::<Result<Vec<_>, _>>())
                    .collect::<Result<Vec<_>, _>>()?;
                new_poly.insert(new_id, blocks);
            }
            if let Some(&d) = self.diameters.get(&old_id) {
                new_diam.insert(new_id, d);
            }
        }

        // nodes dropped by the caller's map leave the counters too
        for (old, live) in self.point_live.iter().enumerate() {
            if *live && node_old_to_new[old].is_none() {
                self.counters.remove_node();
            }
        }

        debug!(
            "compacted store: {} -> {} nodes, {} -> {} cells ({} dropped)",
            old_node_size,
            new_node_count,
            self.cells.len(),
            new_cell_count,
            dropped
        );

        self.points = new_points;
        self.point_live = vec![true; new_node_count];
        self.cells = new_cells;
        self.polyhedron_faces = new_poly;
        self.diameters = new_diam;
        self.version += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: u32) -> NodeId {
        NodeId::new(i)
    }

    fn store_with_nodes(count: u32) -> MeshStore {
        let mut s = MeshStore::new();
        for i in 0..count {
            s.add_node([i as f64, 0.0, 0.0]);
        }
        s
    }

    #[test]
    fn add_and_lookup_cell() {
        let mut s = store_with_nodes(4);
        let c = s.add_cell(CellType::Tetra, &[n(0), n(1), n(2), n(3)]).unwrap();
        assert_eq!(s.cell_type(c).unwrap(), CellType::Tetra);
        assert_eq!(s.cell_nodes(c).unwrap(), &[n(0), n(1), n(2), n(3)]);
        assert_eq!(s.live_cell_count(), 1);
        assert_eq!(s.counters().count_of(CellType::Tetra), 1);
    }

    #[test]
    fn node_count_validated() {
        let mut s = store_with_nodes(3);
        let err = s.add_cell(CellType::Tetra, &[n(0), n(1), n(2)]).unwrap_err();
        assert!(matches!(err, MeshError::NodeCountMismatch { .. }));
    }

    #[test]
    fn dead_node_reference_rejected() {
        let mut s = store_with_nodes(4);
        s.remove_node(n(3)).unwrap();
        let err = s.add_cell(CellType::Tetra, &[n(0), n(1), n(2), n(3)]).unwrap_err();
        assert_eq!(err, MeshError::NodeRemoved(n(3)));
    }

    #[test]
    fn remove_twice_errors() {
        let mut s = store_with_nodes(3);
        let c = s.add_cell(CellType::Triangle, &[n(0), n(1), n(2)]).unwrap();
        s.remove_cell(c).unwrap();
        assert_eq!(s.remove_cell(c).unwrap_err(), MeshError::CellRemoved(c));
        assert_eq!(s.live_cell_count(), 0);
    }

    #[test]
    fn fill_at_id_restores_holes() {
        let mut s = MeshStore::new();
        s.add_node_at(n(2), [1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.live_node_count(), 1);
        assert!(!s.is_node_live(n(0)));
        assert_eq!(s.node_coords(n(2)).unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(
            s.add_node_at(n(2), [0.0; 3]).unwrap_err(),
            MeshError::OccupiedNodeId(n(2))
        );
        // back-filling an intermediate hole is allowed
        s.add_node_at(n(0), [9.0, 0.0, 0.0]).unwrap();
        assert_eq!(s.live_node_count(), 2);
    }

    #[test]
    fn substitution_keeps_version() {
        let mut s = store_with_nodes(5);
        let c = s.add_cell(CellType::Triangle, &[n(0), n(1), n(2)]).unwrap();
        let v = s.version();
        let map: HashMap<NodeId, NodeId> = [(n(2), n(4))].into_iter().collect();
        s.substitute_cell_nodes(c, &map).unwrap();
        assert_eq!(s.version(), v);
        assert_eq!(s.cell_nodes(c).unwrap(), &[n(0), n(1), n(4)]);
    }

    #[test]
    fn polyhedron_side_block() {
        let mut s = store_with_nodes(4);
        let faces = vec![
            vec![n(0), n(1), n(2)],
            vec![n(0), n(3), n(1)],
            vec![n(1), n(3), n(2)],
            vec![n(2), n(3), n(0)],
        ];
        let c = s.add_polyhedron(&faces).unwrap();
        assert_eq!(s.cell_type(c).unwrap(), CellType::Polyhedron);
        assert_eq!(s.cell_nodes(c).unwrap().len(), 4);
        assert_eq!(s.polyhedron_faces(c).unwrap().len(), 4);
    }

    #[test]
    fn compact_removes_holes_and_remaps() {
        let mut s = store_with_nodes(5);
        let c0 = s.add_cell(CellType::Triangle, &[n(0), n(1), n(2)]).unwrap();
        let c1 = s.add_cell(CellType::Triangle, &[n(2), n(3), n(4)]).unwrap();
        s.remove_cell(c0).unwrap();
        s.remove_node(n(0)).unwrap();
        s.remove_node(n(1)).unwrap();

        // nodes 2,3,4 -> 0,1,2; cell c1 -> 0
        let node_map = vec![None, None, Some(n(0)), Some(n(1)), Some(n(2))];
        let cell_map = vec![None, Some(CellId::new(0))];
        s.compact(&node_map, 3, &cell_map, 1).unwrap();

        assert_eq!(s.live_node_count(), 3);
        assert_eq!(s.live_cell_count(), 1);
        assert_eq!(s.node_capacity(), 3);
        assert_eq!(s.cell_capacity(), 1);
        let c = CellId::new(0);
        assert_eq!(s.cell_nodes(c).unwrap(), &[n(0), n(1), n(2)]);
        assert_eq!(s.node_coords(n(0)).unwrap(), [2.0, 0.0, 0.0]);
        assert!(matches!(s.cell_type(c1), Err(MeshError::InvalidCellId(_))));
    }

    #[test]
    fn compact_remaps_ball_and_polyhedron_tables() {
        let mut s = store_with_nodes(5);
        let b = s.add_ball(n(4), 2.5).unwrap();
        let faces = vec![
            vec![n(1), n(2), n(3)],
            vec![n(1), n(4), n(2)],
            vec![n(2), n(4), n(3)],
            vec![n(3), n(4), n(1)],
        ];
        let p = s.add_polyhedron(&faces).unwrap();
        s.remove_node(n(0)).unwrap();

        let node_map = vec![None, Some(n(0)), Some(n(1)), Some(n(2)), Some(n(3))];
        let cell_map = vec![Some(CellId::new(1)), Some(CellId::new(0))];
        s.compact(&node_map, 4, &cell_map, 2).unwrap();

        let new_ball = CellId::new(1);
        let new_poly = CellId::new(0);
        assert_eq!(s.ball_diameter(new_ball), Some(2.5));
        assert_eq!(s.cell_nodes(new_ball).unwrap(), &[n(3)]);
        let blocks = s.polyhedron_faces(new_poly).unwrap();
        assert_eq!(blocks[0], vec![n(0), n(1), n(2)]);
        let _ = (b, p);
    }

    #[test]
    fn compact_rejects_out_of_range_targets() {
        let mut s = store_with_nodes(2);
        let c = s.add_cell(CellType::Line, &[n(0), n(1)]).unwrap();

        let node_map = vec![Some(n(0)), Some(n(5))];
        let cell_map = vec![Some(CellId::new(0))];
        let err = s.compact(&node_map, 2, &cell_map, 1).unwrap_err();
        assert!(matches!(
            err,
            MeshError::CompactionMapOutOfRange {
                what: "nodes",
                id: 1,
                target: 5,
                ..
            }
        ));

        let node_map = vec![Some(n(0)), Some(n(1))];
        let cell_map = vec![Some(CellId::new(3))];
        let err = s.compact(&node_map, 2, &cell_map, 1).unwrap_err();
        assert!(matches!(
            err,
            MeshError::CompactionMapOutOfRange { what: "cells", .. }
        ));

        // the store is untouched by the rejected calls
        assert_eq!(s.cell_nodes(c).unwrap(), &[n(0), n(1)]);
    }

    #[test]
    fn iteration_skips_holes() {
        let mut s = store_with_nodes(4);
        let c0 = s.add_cell(CellType::Triangle, &[n(0), n(1), n(2)]).unwrap();
        let _c1 = s.add_cell(CellType::Triangle, &[n(1), n(2), n(3)]).unwrap();
        s.remove_cell(c0).unwrap();
        let ids: Vec<_> = s.iter_cells().map(|(id, _, _)| id).collect();
        assert_eq!(ids, vec![CellId::new(1)]);
    }
}
