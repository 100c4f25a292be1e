//! DownwardConnectivityBuilder: derive boundary-entity adjacency from the
//! raw cell definitions.
//!
//! The build is four ordered passes, each computing one dimension tier from
//! cells already known:
//!
//! 1. explicit faces, linked to the volumes found by intersecting the
//!    node→cell index over the face nodes;
//! 2. explicit volumes, decomposed into boundary faces via the type catalog;
//!    each face is searched for (order-independent node-set comparison) in
//!    the down lists of the volumes sharing its nodes and created as an
//!    implicit record when absent;
//! 3. explicit edges, linked into the faces already containing a matching
//!    edge position (guarding against duplicate edge cells on one node set);
//! 4. implicit edges from the face templates, with the same find-or-create
//!    search restricted to candidate faces.
//!
//! Afterwards the per-type tables are frozen into dense CSR arrays from
//! dimension 3 down to 1, so the widest temporaries (edge up lists) are
//! finalized last and face scratch node sets are released tier by tier.
//!
//! The result is a pure cache: any store mutation except node substitution
//! invalidates it, and queries re-validate the store version on every call.

use itertools::Itertools;
use log::{debug, trace};

use crate::connectivity::tier::{DownRef, Tier};
use crate::data::cell_store::MeshStore;
use crate::data::links::NodeLinks;
use crate::mesh_error::MeshError;
use crate::topology::catalog;
use crate::topology::cell_type::{ALL_CELL_TYPES, CellType};
use crate::topology::ids::{CellId, NodeId};

/// Default bound on the owners of a single boundary entity. Manifold meshes
/// need 2; anything past the bound is reported, never truncated.
pub const DEFAULT_MAX_OWNERS: usize = 64;

/// The built downward structure: per-type record tables plus the mapping
/// from store cell ids to tier-local ids.
#[derive(Clone, Debug)]
pub struct DownwardConnectivity {
    pub(crate) tiers: Vec<Tier>,
    pub(crate) cell_to_down: Vec<Option<u32>>,
    built_version: u64,
}

impl DownwardConnectivity {
    /// Number of records (explicit plus implicit) of one entity type.
    pub fn entity_count(&self, ty: CellType) -> usize {
        self.tiers[ty.code()].len()
    }

    /// Tier-local record of an explicit cell, if it participated in the
    /// build.
    pub fn down_id_of(&self, store: &MeshStore, cell: CellId) -> Option<DownRef> {
        let local = (*self.cell_to_down.get(cell.index())?)?;
        let ty = store.cell_type(cell).ok()?;
        Some(DownRef::new(ty, local))
    }

    #[inline]
    pub(crate) fn tier(&self, ty: CellType) -> &Tier {
        &self.tiers[ty.code()]
    }

    /// Fail unless the store is still at the version the structure was built
    /// against.
    pub(crate) fn check_current(&self, store: &MeshStore) -> Result<(), MeshError> {
        if store.version() != self.built_version {
            return Err(MeshError::StaleConnectivity {
                built: self.built_version,
                current: store.version(),
            });
        }
        Ok(())
    }
}

/// Builder over one immutable store snapshot.
pub struct DownwardBuilder<'a> {
    store: &'a MeshStore,
    max_owners: usize,
}

impl<'a> DownwardBuilder<'a> {
    pub fn new(store: &'a MeshStore) -> Self {
        Self {
            store,
            max_owners: DEFAULT_MAX_OWNERS,
        }
    }

    /// Override the per-entity owner bound (non-manifold headroom).
    pub fn with_max_owners(mut self, max_owners: usize) -> Self {
        self.max_owners = max_owners.max(2);
        self
    }

    /// Run the four passes and freeze the tables.
    pub fn build(self) -> Result<DownwardConnectivity, MeshError> {
        let links = NodeLinks::build(self.store);
        let mut state = BuildState::new(self.store, self.max_owners);

        state.pass_explicit_faces(&links)?;
        debug!(
            "downward pass 1: {} explicit faces",
            dim_records(&state.tiers, 2)
        );
        state.pass_volumes_and_implicit_faces(&links)?;
        debug!(
            "downward pass 2: {} volumes, {} faces total",
            dim_records(&state.tiers, 3),
            dim_records(&state.tiers, 2)
        );
        state.pass_explicit_edges(&links)?;
        state.pass_implicit_edges(&links)?;
        debug!(
            "downward pass 3+4: {} edges total",
            dim_records(&state.tiers, 1)
        );

        // freeze largest dimension first to release scratch memory early;
        // edge node lists stay, they define the implicit edges, and
        // biquadratic faces keep theirs too: the center sits on no edge
        for dim in [3u8, 2, 1] {
            for ty in ALL_CELL_TYPES {
                if ty.dimension() == dim {
                    let keep = dim == 1
                        || matches!(
                            ty,
                            CellType::BiquadraticTriangle | CellType::BiquadraticQuadrangle
                        );
                    state.tiers[ty.code()].freeze(keep);
                }
            }
        }

        Ok(DownwardConnectivity {
            tiers: state.tiers,
            cell_to_down: state.cell_to_down,
            built_version: self.store.version(),
        })
    }
}

fn dim_records(tiers: &[Tier], dim: u8) -> usize {
    tiers
        .iter()
        .filter(|t| t.ty.dimension() == dim)
        .map(|t| t.len())
        .sum()
}

/// Order-independent node-set identity: same geometric entity.
fn node_set_eq(a: &[NodeId], b: &[NodeId]) -> bool {
    a.len() == b.len() && a.iter().sorted().eq(b.iter().sorted())
}

struct BuildState<'a> {
    store: &'a MeshStore,
    tiers: Vec<Tier>,
    cell_to_down: Vec<Option<u32>>,
    max_owners: usize,
}

impl<'a> BuildState<'a> {
    fn new(store: &'a MeshStore, max_owners: usize) -> Self {
        let tiers = ALL_CELL_TYPES
            .iter()
            .map(|&ty| Tier::new(ty, guess_count(store, ty)))
            .collect();
        BuildState {
            store,
            tiers,
            cell_to_down: vec![None; store.cell_capacity()],
            max_owners,
        }
    }

    /// Tier-local record for an explicit cell, creating it on first sight.
    fn register_explicit(&mut self, cell: CellId, ty: CellType) -> u32 {
        if let Some(local) = self.cell_to_down[cell.index()] {
            return local;
        }
        let local = self.tiers[ty.code()].add_record(Some(cell));
        self.cell_to_down[cell.index()] = Some(local);
        local
    }

    /// Link `owner` (dimension d+1) and `boundary` (dimension d) both ways.
    fn link(&mut self, owner: DownRef, boundary: DownRef) -> Result<(), MeshError> {
        let (a, b) = (owner.ty.code(), boundary.ty.code());
        debug_assert_ne!(a, b);
        let (owner_tier, boundary_tier) = if a < b {
            let (lo, hi) = self.tiers.split_at_mut(b);
            (&mut lo[a], &mut hi[0])
        } else {
            let (lo, hi) = self.tiers.split_at_mut(a);
            (&mut hi[0], &mut lo[b])
        };
        boundary_tier.push_up_unique(boundary.id, owner, self.max_owners)?;
        owner_tier.push_down_unique(owner.id, boundary);
        Ok(())
    }

    // --- pass 1 -------------------------------------------------------------

    fn pass_explicit_faces(&mut self, links: &NodeLinks) -> Result<(), MeshError> {
        let faces: Vec<(CellId, CellType, Vec<NodeId>)> = self
            .store
            .iter_cells()
            .filter(|(_, ty, _)| ty.dimension() == 2)
            .map(|(id, ty, nodes)| (id, ty, nodes.to_vec()))
            .collect();
        for (cell, ty, nodes) in faces {
            let face_local = self.register_explicit(cell, ty);
            self.tiers[ty.code()].set_nodes(face_local, nodes.clone());
            let face_ref = DownRef::new(ty, face_local);
            for vol in links.cells_sharing(&nodes, 3, self.store) {
                let vty = self.store.cell_type(vol)?;
                let vol_local = self.register_explicit(vol, vty);
                self.link(DownRef::new(vty, vol_local), face_ref)?;
            }
        }
        Ok(())
    }

    // --- pass 2 -------------------------------------------------------------

    fn pass_volumes_and_implicit_faces(&mut self, links: &NodeLinks) -> Result<(), MeshError> {
        let volumes: Vec<(CellId, CellType, Vec<NodeId>)> = self
            .store
            .iter_cells()
            .filter(|(_, ty, _)| ty.dimension() == 3)
            .map(|(id, ty, nodes)| (id, ty, nodes.to_vec()))
            .collect();
        for (cell, ty, nodes) in volumes {
            self.register_explicit(cell, ty);
            let face_defs = catalog::faces_of_cell(ty, &nodes, self.store.polyhedron_faces(cell));
            for (fty, fnodes) in face_defs {
                // the small set of volumes sharing this face's node set,
                // including the current one
                let mut owners = Vec::new();
                for vol in links.cells_sharing(&fnodes, 3, self.store) {
                    let vty = self.store.cell_type(vol)?;
                    let vlocal = self.register_explicit(vol, vty);
                    owners.push(DownRef::new(vty, vlocal));
                }
                // reuse a face record already linked under any owner
                let mut face_ref = None;
                'search: for owner in &owners {
                    for &d in self.tiers[owner.ty.code()].down(owner.id) {
                        if d.ty == fty && node_set_eq(self.tiers[fty.code()].nodes(d.id), &fnodes)
                        {
                            face_ref = Some(d);
                            break 'search;
                        }
                    }
                }
                let face_ref = match face_ref {
                    Some(r) => r,
                    None => {
                        let id = self.tiers[fty.code()].add_record(None);
                        self.tiers[fty.code()].set_nodes(id, fnodes);
                        DownRef::new(fty, id)
                    }
                };
                if owners.len() > 2 {
                    trace!(
                        "non-manifold face {:?}#{} with {} owners",
                        face_ref.ty,
                        face_ref.id,
                        owners.len()
                    );
                }
                for owner in owners {
                    self.link(owner, face_ref)?;
                }
            }
        }
        Ok(())
    }

    // --- pass 3 -------------------------------------------------------------

    fn pass_explicit_edges(&mut self, links: &NodeLinks) -> Result<(), MeshError> {
        let edges: Vec<(CellId, CellType, Vec<NodeId>)> = self
            .store
            .iter_cells()
            .filter(|(_, ty, _)| ty.dimension() == 1)
            .map(|(id, ty, nodes)| (id, ty, nodes.to_vec()))
            .collect();
        for (cell, ty, nodes) in edges {
            let edge_local = self.register_explicit(cell, ty);
            self.tiers[ty.code()].set_nodes(edge_local, nodes.clone());
            let edge_ref = DownRef::new(ty, edge_local);
            for face in self.candidate_faces(links, &nodes)? {
                // multiple edge cells can sit on one node set; link only the
                // first into each face
                if self.face_has_edge(face, ty, &nodes) {
                    continue;
                }
                self.link(face, edge_ref)?;
            }
        }
        Ok(())
    }

    // --- pass 4 -------------------------------------------------------------

    fn pass_implicit_edges(&mut self, links: &NodeLinks) -> Result<(), MeshError> {
        for fty in ALL_CELL_TYPES {
            if fty.dimension() != 2 {
                continue;
            }
            for face_id in 0..self.tiers[fty.code()].len() as u32 {
                let fnodes = self.tiers[fty.code()].nodes(face_id).to_vec();
                for (ety, enodes) in catalog::edges_of_face(fty, &fnodes) {
                    let faces = self.candidate_faces(links, &enodes)?;
                    let mut edge_ref = None;
                    'search: for face in &faces {
                        for &d in self.tiers[face.ty.code()].down(face.id) {
                            if d.ty == ety
                                && node_set_eq(self.tiers[ety.code()].nodes(d.id), &enodes)
                            {
                                edge_ref = Some(d);
                                break 'search;
                            }
                        }
                    }
                    let edge_ref = match edge_ref {
                        Some(r) => r,
                        None => {
                            let id = self.tiers[ety.code()].add_record(None);
                            self.tiers[ety.code()].set_nodes(id, enodes);
                            DownRef::new(ety, id)
                        }
                    };
                    for face in faces {
                        self.link(face, edge_ref)?;
                    }
                }
            }
        }
        Ok(())
    }

    // --- helpers ------------------------------------------------------------

    /// Face records carrying `edge_nodes` as one of their boundary edges,
    /// discovered through the cells incident on the edge's two corner nodes.
    fn candidate_faces(
        &mut self,
        links: &NodeLinks,
        edge_nodes: &[NodeId],
    ) -> Result<Vec<DownRef>, MeshError> {
        let corners = &edge_nodes[..2.min(edge_nodes.len())];
        let mut faces: Vec<DownRef> = Vec::new();
        for dim in [2u8, 3] {
            for cell in links.cells_sharing(corners, dim, self.store) {
                let ty = self.store.cell_type(cell)?;
                let local = self.register_explicit(cell, ty);
                if dim == 2 {
                    let r = DownRef::new(ty, local);
                    if !faces.contains(&r) {
                        faces.push(r);
                    }
                } else {
                    for &d in self.tiers[ty.code()].down(local) {
                        if d.ty.dimension() == 2 && !faces.contains(&d) {
                            faces.push(d);
                        }
                    }
                }
            }
        }
        // node containment is not enough: a quadrangle holds both ends of its
        // diagonal without having it as an edge
        faces.retain(|f| {
            let fnodes = self.tiers[f.ty.code()].nodes(f.id);
            catalog::edges_of_face(f.ty, fnodes)
                .into_iter()
                .any(|(_, en)| node_set_eq(&en, edge_nodes))
        });
        Ok(faces)
    }

    /// True if `face` already lists a down edge of `ty` on this node set.
    fn face_has_edge(&self, face: DownRef, ty: CellType, nodes: &[NodeId]) -> bool {
        self.tiers[face.ty.code()]
            .down(face.id)
            .iter()
            .any(|d| d.ty == ty && node_set_eq(self.tiers[ty.code()].nodes(d.id), nodes))
    }
}

/// Pre-size a tier from the live counters: explicit cells of the type plus
/// the fan-out of the volumes that will spawn implicit entities of it.
fn guess_count(store: &MeshStore, ty: CellType) -> usize {
    let c = store.counters();
    let explicit = c.count_of(ty) as usize;
    let tet = c.count_of(CellType::Tetra) as usize;
    let qtet = c.count_of(CellType::QuadraticTetra) as usize;
    let pyra = c.count_of(CellType::Pyramid) as usize;
    let qpyra = c.count_of(CellType::QuadraticPyramid) as usize;
    let wedge = c.count_of(CellType::Wedge) as usize;
    let qwedge = c.count_of(CellType::QuadraticWedge) as usize;
    let hexa = c.count_of(CellType::Hexahedron) as usize;
    let qhexa = c.count_of(CellType::QuadraticHexahedron) as usize
        + c.count_of(CellType::TriquadraticHexahedron) as usize;
    let hexprism = c.count_of(CellType::HexagonalPrism) as usize;
    let implicit = match ty {
        CellType::Line => 4 * tet / 3 + 2 * wedge + 5 * pyra / 2 + 3 * hexa,
        CellType::QuadraticEdge => 4 * qtet / 3 + 2 * qwedge + 5 * qpyra / 2 + 3 * qhexa,
        CellType::Triangle => 2 * tet + wedge + 2 * pyra,
        CellType::QuadraticTriangle => 2 * qtet + qwedge + 2 * qpyra,
        CellType::Quadrangle => 2 * wedge / 3 + pyra / 2 + 3 * hexa,
        CellType::QuadraticQuadrangle => 2 * qwedge / 3 + qpyra / 2 + 3 * qhexa,
        CellType::BiquadraticQuadrangle => {
            3 * c.count_of(CellType::TriquadraticHexahedron) as usize
        }
        CellType::Polygon => 2 * hexprism,
        _ => 0,
    };
    explicit + implicit
}
