//! Per-type record tables of the downward structure.
//!
//! Every cell type that participates in downward connectivity owns one
//! [`Tier`]: a dense array of records addressed by a small per-type running
//! id, distinct from store cell ids. A record keeps an optional back
//! reference to the store (explicit entities), its `up` and `down` adjacency
//! lists, and a node-id scratch list used for order-independent matching
//! while owners are still being discovered.
//!
//! Adjacency grows as vector-of-vectors during the build and is frozen into
//! CSR (offsets plus one flat ref array) afterwards, releasing the scratch
//! node sets of faces in the same step.

use log::{debug, warn};

use crate::mesh_error::MeshError;
use crate::topology::cell_type::CellType;
use crate::topology::ids::{CellId, NodeId};

/// Reference to a record in another tier: entity type plus running id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DownRef {
    pub ty: CellType,
    pub id: u32,
}

impl DownRef {
    #[inline]
    pub fn new(ty: CellType, id: u32) -> Self {
        Self { ty, id }
    }
}

#[derive(Clone, Debug)]
enum AdjStorage {
    Growing(Vec<Vec<DownRef>>),
    Frozen { offsets: Vec<u32>, refs: Vec<DownRef> },
}

impl AdjStorage {
    fn get(&self, id: u32) -> &[DownRef] {
        match self {
            AdjStorage::Growing(rows) => &rows[id as usize],
            AdjStorage::Frozen { offsets, refs } => {
                let i = id as usize;
                &refs[offsets[i] as usize..offsets[i + 1] as usize]
            }
        }
    }

    fn freeze(&mut self) {
        if let AdjStorage::Growing(rows) = self {
            let mut offsets = Vec::with_capacity(rows.len() + 1);
            offsets.push(0u32);
            let total: usize = rows.iter().map(|r| r.len()).sum();
            let mut refs = Vec::with_capacity(total);
            for row in rows.iter() {
                refs.extend_from_slice(row);
                offsets.push(refs.len() as u32);
            }
            *self = AdjStorage::Frozen { offsets, refs };
        }
    }
}

/// Record table of one cell type.
#[derive(Clone, Debug)]
pub(crate) struct Tier {
    pub ty: CellType,
    store_cell: Vec<Option<CellId>>,
    up: AdjStorage,
    down: AdjStorage,
    /// Defining node sequences: scratch for faces (dropped on freeze),
    /// permanent for edges (they define implicit entities).
    nodes: Vec<Vec<NodeId>>,
}

impl Tier {
    pub fn new(ty: CellType, capacity_guess: usize) -> Self {
        Tier {
            ty,
            store_cell: Vec::with_capacity(capacity_guess),
            up: AdjStorage::Growing(Vec::with_capacity(capacity_guess)),
            down: AdjStorage::Growing(Vec::with_capacity(capacity_guess)),
            nodes: Vec::with_capacity(capacity_guess),
        }
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.store_cell.len()
    }

    /// Append a record; `store_cell` is `None` for implicit entities.
    pub fn add_record(&mut self, store_cell: Option<CellId>) -> u32 {
        let id = self.store_cell.len() as u32;
        self.store_cell.push(store_cell);
        if let AdjStorage::Growing(rows) = &mut self.up {
            rows.push(Vec::new());
        }
        if let AdjStorage::Growing(rows) = &mut self.down {
            rows.push(Vec::new());
        }
        self.nodes.push(Vec::new());
        id
    }

    #[inline]
    pub fn store_cell(&self, id: u32) -> Option<CellId> {
        self.store_cell[id as usize]
    }

    #[inline]
    pub fn set_nodes(&mut self, id: u32, nodes: Vec<NodeId>) {
        self.nodes[id as usize] = nodes;
    }

    /// Node list of a record; empty once the tier dropped its scratch lists.
    #[inline]
    pub fn nodes(&self, id: u32) -> &[NodeId] {
        self.nodes.get(id as usize).map_or(&[], Vec::as_slice)
    }

    #[inline]
    pub fn up(&self, id: u32) -> &[DownRef] {
        self.up.get(id)
    }

    #[inline]
    pub fn down(&self, id: u32) -> &[DownRef] {
        self.down.get(id)
    }

    /// Link an owner into the `up` list, skipping duplicates. Exceeding
    /// `max_owners` is the reportable non-manifold overflow, not truncation.
    pub fn push_up_unique(&mut self, id: u32, r: DownRef, max_owners: usize) -> Result<(), MeshError> {
        let AdjStorage::Growing(rows) = &mut self.up else {
            unreachable!("tier mutated after freeze");
        };
        let row = &mut rows[id as usize];
        if row.contains(&r) {
            return Ok(());
        }
        if row.len() >= max_owners {
            warn!(
                "entity {:?}#{} already has {} owners, cap is {}",
                self.ty,
                id,
                row.len(),
                max_owners
            );
            return Err(MeshError::CapacityOverflow {
                ty: self.ty,
                id,
                cap: max_owners,
            });
        }
        row.push(r);
        Ok(())
    }

    /// Link a boundary entity into the `down` list, skipping duplicates.
    pub fn push_down_unique(&mut self, id: u32, r: DownRef) {
        let AdjStorage::Growing(rows) = &mut self.down else {
            unreachable!("tier mutated after freeze");
        };
        let row = &mut rows[id as usize];
        if !row.contains(&r) {
            row.push(r);
        }
    }

    /// Convert adjacency to CSR and release face scratch nodes.
    pub fn freeze(&mut self, keep_nodes: bool) {
        self.up.freeze();
        self.down.freeze();
        if !keep_nodes {
            self.nodes = Vec::new();
        }
        self.store_cell.shrink_to_fit();
        debug!("froze tier {:?}: {} records", self.ty, self.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_link_freeze() {
        let mut t = Tier::new(CellType::Triangle, 4);
        let a = t.add_record(Some(CellId::new(3)));
        let b = t.add_record(None);
        t.push_up_unique(a, DownRef::new(CellType::Tetra, 0), 8).unwrap();
        t.push_up_unique(a, DownRef::new(CellType::Tetra, 0), 8).unwrap(); // dup ignored
        t.push_up_unique(a, DownRef::new(CellType::Tetra, 1), 8).unwrap();
        t.push_down_unique(b, DownRef::new(CellType::Line, 5));
        assert_eq!(t.up(a).len(), 2);
        t.freeze(false);
        assert_eq!(t.up(a).len(), 2);
        assert_eq!(t.up(b).len(), 0);
        assert_eq!(t.down(b), &[DownRef::new(CellType::Line, 5)]);
        assert_eq!(t.store_cell(a), Some(CellId::new(3)));
        assert_eq!(t.store_cell(b), None);
    }

    #[test]
    fn owner_cap_overflows() {
        let mut t = Tier::new(CellType::Line, 1);
        let e = t.add_record(None);
        t.push_up_unique(e, DownRef::new(CellType::Triangle, 0), 2).unwrap();
        t.push_up_unique(e, DownRef::new(CellType::Triangle, 1), 2).unwrap();
        let err = t
            .push_up_unique(e, DownRef::new(CellType::Triangle, 2), 2)
            .unwrap_err();
        assert!(matches!(err, MeshError::CapacityOverflow { cap: 2, .. }));
    }
}
