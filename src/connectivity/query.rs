//! Queries over a frozen [`DownwardConnectivity`]: lateral neighbors through
//! shared boundary entities, and upward parents of faces and edges.
//!
//! Every query re-validates the store version first. Neighbor discovery walks
//! one step down (boundary entities of the query cell) and one step up (their
//! other owners); a boundary entity with no other owner is reported as skin
//! when requested.

use std::collections::BTreeSet;

use log::trace;

use crate::connectivity::builder::DownwardConnectivity;
use crate::connectivity::tier::DownRef;
use crate::data::cell_store::MeshStore;
use crate::mesh_error::MeshError;
use crate::topology::ids::{CellId, NodeId};

/// One lateral adjacency of a cell, always carrying the boundary entity it
/// goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighbor {
    /// An explicit cell of the same dimension on the other side of `via`.
    Cell { cell: CellId, via: DownRef },
    /// `via` bounds the query cell only: a free boundary of the mesh.
    Skin { via: DownRef },
}

impl DownwardConnectivity {
    /// Cells of the same dimension as `cell` sharing one of its boundary
    /// entities. With `include_skin`, boundary entities owned by `cell` alone
    /// are reported as [`Neighbor::Skin`].
    pub fn neighbors(
        &self,
        store: &MeshStore,
        cell: CellId,
        include_skin: bool,
    ) -> Result<Vec<Neighbor>, MeshError> {
        self.check_current(store)?;
        let ty = store.cell_type(cell)?;
        let dim = ty.dimension();
        if dim < 2 {
            return Err(MeshError::UnsupportedCellDimension { cell, dim });
        }
        let me = self
            .down_id_of(store, cell)
            .ok_or(MeshError::InvalidCellId(cell))?;
        let mut out = Vec::new();
        for &via in self.tier(me.ty).down(me.id) {
            if via.ty.dimension() + 1 != dim {
                continue;
            }
            let ups = self.tier(via.ty).up(via.id);
            if ups.len() == 1 {
                if include_skin {
                    out.push(Neighbor::Skin { via });
                }
                continue;
            }
            for &up in ups {
                if up == me {
                    continue;
                }
                match self.tier(up.ty).store_cell(up.id) {
                    Some(c) => out.push(Neighbor::Cell { cell: c, via }),
                    None => trace!("implicit owner {:?}#{} skipped", up.ty, up.id),
                }
            }
        }
        Ok(out)
    }

    /// Volumes containing `cell`, which must be an explicit face or edge.
    /// Edges reach volumes through their faces; the result is deduplicated.
    pub fn parent_volumes(
        &self,
        store: &MeshStore,
        cell: CellId,
    ) -> Result<Vec<CellId>, MeshError> {
        self.check_current(store)?;
        let ty = store.cell_type(cell)?;
        let dim = ty.dimension();
        if dim < 1 || dim > 2 {
            return Err(MeshError::UnsupportedCellDimension { cell, dim });
        }
        let me = self
            .down_id_of(store, cell)
            .ok_or(MeshError::InvalidCellId(cell))?;
        Ok(self.parent_volumes_of(me))
    }

    /// Volumes containing a face or edge record, explicit or implicit.
    pub fn parent_volumes_of(&self, entity: DownRef) -> Vec<CellId> {
        let mut out = Vec::new();
        match entity.ty.dimension() {
            2 => self.push_face_parents(entity, &mut out),
            1 => {
                for &face in self.tier(entity.ty).up(entity.id) {
                    self.push_face_parents(face, &mut out);
                }
            }
            _ => {}
        }
        out
    }

    fn push_face_parents(&self, face: DownRef, out: &mut Vec<CellId>) {
        for &up in self.tier(face.ty).up(face.id) {
            if up.ty.dimension() != 3 {
                continue;
            }
            if let Some(c) = self.tier(up.ty).store_cell(up.id) {
                if !out.contains(&c) {
                    out.push(c);
                }
            }
        }
    }

    /// Defining node set of an edge or face record. Edges and biquadratic
    /// faces keep their node lists through the freeze; any other face's set
    /// is the union of its edges.
    pub fn node_set(&self, entity: DownRef) -> BTreeSet<NodeId> {
        let mut set = BTreeSet::new();
        match entity.ty.dimension() {
            1 => {
                set.extend(self.tier(entity.ty).nodes(entity.id).iter().copied());
            }
            2 => {
                let own = self.tier(entity.ty).nodes(entity.id);
                if own.is_empty() {
                    for &d in self.tier(entity.ty).down(entity.id) {
                        if d.ty.dimension() == 1 {
                            set.extend(self.tier(d.ty).nodes(d.id).iter().copied());
                        }
                    }
                } else {
                    set.extend(own.iter().copied());
                }
            }
            _ => {}
        }
        set
    }
}
