//! Flat-volume extrusion between node domains, the cell-creation step of
//! domain splitting.
//!
//! A splitter that separates a mesh into domains first duplicates every node
//! of a shared internal face once per domain, recording the copies in a
//! node-to-domain map. [`extrude_volume_from_face`] then inserts a flat cell
//! between the two duplicated copies of one face: a wedge for triangular
//! faces, a hexahedron for quadrangular ones, their quadratic variants when
//! the face carries mid-side nodes, and a polyhedron for larger polygons. In
//! 2D meshes the shared entity is an edge and the inserted cell is a
//! quadrangle.
//!
//! Quadratic extrusion needs mid nodes on the new vertical edges. Those are
//! created at the corner position and deduplicated per (corner, domain pair)
//! through the caller-owned `quad_mids` map, so adjacent extrusions along the
//! same domain boundary share them.

use std::collections::BTreeSet;

use hashbrown::HashMap;
use log::debug;

use crate::data::cell_store::MeshStore;
use crate::mesh_error::MeshError;
use crate::topology::catalog;
use crate::topology::cell_type::CellType;
use crate::topology::ids::{CellId, NodeId};

/// Duplicated copies of a node, keyed by domain.
pub type NodeDomains = HashMap<NodeId, HashMap<i32, NodeId>>;

/// Vertical mid nodes created so far, keyed by corner node and unordered
/// domain pair.
pub type QuadMids = HashMap<(NodeId, (i32, i32)), NodeId>;

/// Insert a flat volume between the `domain_a` and `domain_b` duplicates of
/// one boundary face of `owner`.
///
/// `face_nodes` selects the face by node set; the inserted cell follows the
/// face's ordered cycle in the owner's orientation, domain-a side first.
/// Every face node must have a duplicate registered for both domains.
pub fn extrude_volume_from_face(
    store: &mut MeshStore,
    owner: CellId,
    domain_a: i32,
    domain_b: i32,
    face_nodes: &BTreeSet<NodeId>,
    node_domains: &NodeDomains,
    quad_mids: &mut QuadMids,
) -> Result<CellId, MeshError> {
    let ty = store.cell_type(owner)?;
    match ty.dimension() {
        3 => extrude_3d(store, owner, ty, domain_a, domain_b, face_nodes, node_domains, quad_mids),
        2 => extrude_2d(store, owner, ty, domain_a, domain_b, face_nodes, node_domains, quad_mids),
        dim => Err(MeshError::UnsupportedCellDimension { cell: owner, dim }),
    }
}

fn domain_node(
    node_domains: &NodeDomains,
    node: NodeId,
    domain: i32,
) -> Result<NodeId, MeshError> {
    node_domains
        .get(&node)
        .and_then(|m| m.get(&domain))
        .copied()
        .ok_or(MeshError::MissingDomainNode { node, domain })
}

/// Mid node of the vertical edge rising from `corner`, shared by every
/// extrusion along the same domain pair.
fn vertical_mid(
    store: &mut MeshStore,
    quad_mids: &mut QuadMids,
    corner: NodeId,
    domain_a: i32,
    domain_b: i32,
) -> Result<NodeId, MeshError> {
    let key = (corner, (domain_a.min(domain_b), domain_a.max(domain_b)));
    if let Some(&n) = quad_mids.get(&key) {
        return Ok(n);
    }
    let n = store.add_node(store.node_coords(corner)?);
    quad_mids.insert(key, n);
    Ok(n)
}

#[allow(clippy::too_many_arguments)]
fn extrude_3d(
    store: &mut MeshStore,
    owner: CellId,
    ty: CellType,
    domain_a: i32,
    domain_b: i32,
    face_nodes: &BTreeSet<NodeId>,
    node_domains: &NodeDomains,
    quad_mids: &mut QuadMids,
) -> Result<CellId, MeshError> {
    let nodes = store.cell_nodes(owner)?.to_vec();
    let poly = store.polyhedron_faces(owner).map(|b| b.to_vec());
    let (fty, cycle) = catalog::ordered_face_cycle(ty, &nodes, poly.as_deref(), face_nodes)
        .ok_or(MeshError::FaceNotInCell(owner))?;

    let k = fty.corner_count().unwrap_or(cycle.len());
    let corners = &cycle[..k];
    let a = map_domain(node_domains, corners, domain_a)?;
    let b = map_domain(node_domains, corners, domain_b)?;

    if !fty.is_quadratic() {
        let created = match k {
            3 => store.add_cell(
                CellType::Wedge,
                &[a[0], a[1], a[2], b[0], b[1], b[2]],
            )?,
            4 => store.add_cell(
                CellType::Hexahedron,
                &[a[0], a[1], a[2], a[3], b[0], b[1], b[2], b[3]],
            )?,
            _ => {
                // larger polygonal faces become a flat prism polyhedron
                let mut faces: Vec<Vec<NodeId>> = Vec::with_capacity(k + 2);
                faces.push(a.iter().rev().copied().collect());
                faces.push(b.clone());
                for i in 0..k {
                    faces.push(vec![a[i], a[(i + 1) % k], b[(i + 1) % k], b[i]]);
                }
                store.add_polyhedron(&faces)?
            }
        };
        debug!(
            "extruded {:?} from cell {} between domains {} and {}",
            store.cell_type(created)?,
            owner,
            domain_a,
            domain_b
        );
        return Ok(created);
    }

    // quadratic face: mids follow the corners in the cycle; a biquadratic
    // center, if present, has no place in the prism and is dropped
    let mids = &cycle[k..2 * k];
    let am = map_domain(node_domains, mids, domain_a)?;
    let bm = map_domain(node_domains, mids, domain_b)?;
    let mut v = Vec::with_capacity(k);
    for &c in corners {
        v.push(vertical_mid(store, quad_mids, c, domain_a, domain_b)?);
    }

    let created = match k {
        3 => store.add_cell(
            CellType::QuadraticWedge,
            &[
                a[0], a[1], a[2], b[0], b[1], b[2], am[0], am[1], am[2], bm[0], bm[1], bm[2],
                v[0], v[1], v[2],
            ],
        )?,
        4 => store.add_cell(
            CellType::QuadraticHexahedron,
            &[
                a[0], a[1], a[2], a[3], b[0], b[1], b[2], b[3], am[0], am[1], am[2], am[3],
                bm[0], bm[1], bm[2], bm[3], v[0], v[1], v[2], v[3],
            ],
        )?,
        _ => return Err(MeshError::FaceNotInCell(owner)),
    };
    debug!(
        "extruded {:?} from cell {} between domains {} and {}",
        store.cell_type(created)?,
        owner,
        domain_a,
        domain_b
    );
    Ok(created)
}

#[allow(clippy::too_many_arguments)]
fn extrude_2d(
    store: &mut MeshStore,
    owner: CellId,
    ty: CellType,
    domain_a: i32,
    domain_b: i32,
    edge_nodes: &BTreeSet<NodeId>,
    node_domains: &NodeDomains,
    quad_mids: &mut QuadMids,
) -> Result<CellId, MeshError> {
    let nodes = store.cell_nodes(owner)?.to_vec();
    let corner_n = ty.corner_count().unwrap_or(nodes.len());
    let corners = &nodes[..corner_n];

    // split the selection into the two edge ends and an optional mid node
    let mut ends: Vec<(NodeId, usize)> = Vec::with_capacity(2);
    let mut mid = None;
    for &node in edge_nodes {
        match corners.iter().position(|&c| c == node) {
            Some(i) => ends.push((node, i)),
            None if nodes[corner_n..].contains(&node) => mid = Some(node),
            None => return Err(MeshError::FaceNotInCell(owner)),
        }
    }
    let [(e0, i0), (e1, i1)] = ends[..] else {
        return Err(MeshError::FaceNotInCell(owner));
    };

    // the ends must be consecutive corners; the base cycle [a0, a1, b1, b0]
    // traverses the shared edge e0 -> e1, and a consistently wound neighbor
    // traverses it opposite to the owner, so the cycle is flipped exactly
    // when the owner also runs e0 -> e1
    let diff = i1 as i32 - i0 as i32;
    let wrap = corner_n as i32 - 1;
    let co_winding = diff == 1 || diff == -wrap;
    if !co_winding && diff != -1 && diff != wrap {
        return Err(MeshError::FaceNotInCell(owner));
    }

    let a0 = domain_node(node_domains, e0, domain_a)?;
    let a1 = domain_node(node_domains, e1, domain_a)?;
    let b0 = domain_node(node_domains, e0, domain_b)?;
    let b1 = domain_node(node_domains, e1, domain_b)?;

    let (qty, mut cell_nodes) = match mid {
        None => (CellType::Quadrangle, vec![a0, a1, b1, b0]),
        Some(mid) => {
            let am = domain_node(node_domains, mid, domain_a)?;
            let bm = domain_node(node_domains, mid, domain_b)?;
            let v0 = vertical_mid(store, quad_mids, e0, domain_a, domain_b)?;
            let v1 = vertical_mid(store, quad_mids, e1, domain_a, domain_b)?;
            (
                CellType::QuadraticQuadrangle,
                vec![a0, a1, b1, b0, am, v1, bm, v0],
            )
        }
    };
    if co_winding {
        catalog::apply_interlace(catalog::reverse_interlace(qty), &mut cell_nodes);
    }
    store.add_cell(qty, &cell_nodes)
}

fn map_domain(
    node_domains: &NodeDomains,
    nodes: &[NodeId],
    domain: i32,
) -> Result<Vec<NodeId>, MeshError> {
    nodes
        .iter()
        .map(|&n| domain_node(node_domains, n, domain))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: u32) -> NodeId {
        NodeId::new(i)
    }

    /// Duplicate `nodes` once per domain, registering the copies.
    fn split_nodes(store: &mut MeshStore, nodes: &[NodeId], domains: (i32, i32)) -> NodeDomains {
        let mut map = NodeDomains::new();
        for &node in nodes {
            let xyz = store.node_coords(node).unwrap();
            let a = store.add_node(xyz);
            let b = store.add_node(xyz);
            let entry = map.entry(node).or_default();
            entry.insert(domains.0, a);
            entry.insert(domains.1, b);
        }
        map
    }

    #[test]
    fn hexa_face_extrudes_to_flat_hexa() {
        let mut s = MeshStore::new();
        for z in [0.0, 1.0] {
            for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                s.add_node([x, y, z]);
            }
        }
        let hexa = s
            .add_cell(
                CellType::Hexahedron,
                &[n(0), n(1), n(2), n(3), n(4), n(5), n(6), n(7)],
            )
            .unwrap();
        let top = [n(4), n(5), n(6), n(7)];
        let domains = split_nodes(&mut s, &top, (1, 2));
        let mut mids = QuadMids::new();
        let set: BTreeSet<NodeId> = top.into_iter().collect();
        let c = extrude_volume_from_face(&mut s, hexa, 1, 2, &set, &domains, &mut mids).unwrap();
        assert_eq!(s.cell_type(c).unwrap(), CellType::Hexahedron);
        let nodes = s.cell_nodes(c).unwrap();
        // domain-1 copies of the ordered top cycle, then domain-2 copies
        for (i, &orig) in top.iter().enumerate() {
            assert_eq!(nodes[i], domains[&orig][&1]);
            assert_eq!(nodes[i + 4], domains[&orig][&2]);
        }
        assert!(mids.is_empty());
    }

    #[test]
    fn tetra_face_extrudes_to_wedge() {
        let mut s = MeshStore::new();
        for xyz in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ] {
            s.add_node(xyz);
        }
        let tet = s.add_cell(CellType::Tetra, &[n(0), n(1), n(2), n(3)]).unwrap();
        let face = [n(0), n(1), n(2)];
        let domains = split_nodes(&mut s, &face, (7, 8));
        let mut mids = QuadMids::new();
        let set: BTreeSet<NodeId> = face.into_iter().collect();
        let c = extrude_volume_from_face(&mut s, tet, 7, 8, &set, &domains, &mut mids).unwrap();
        assert_eq!(s.cell_type(c).unwrap(), CellType::Wedge);
        assert_eq!(s.cell_nodes(c).unwrap().len(), 6);
    }

    #[test]
    fn quadratic_tetra_shares_vertical_mids() {
        let mut s = MeshStore::new();
        for i in 0..10 {
            s.add_node([i as f64, 0.0, 0.0]);
        }
        let nodes: Vec<NodeId> = (0..10).map(n).collect();
        let tet = s.add_cell(CellType::QuadraticTetra, &nodes).unwrap();
        // two faces sharing the edge (1,3): nodes 0,1,3,4,8,7 and 1,2,3,5,9,8
        let domains = split_nodes(&mut s, &nodes, (1, 2));
        let mut mids = QuadMids::new();
        let f0: BTreeSet<NodeId> = [n(0), n(1), n(3), n(4), n(8), n(7)].into_iter().collect();
        let f1: BTreeSet<NodeId> = [n(1), n(2), n(3), n(5), n(9), n(8)].into_iter().collect();
        let c0 = extrude_volume_from_face(&mut s, tet, 1, 2, &f0, &domains, &mut mids).unwrap();
        let c1 = extrude_volume_from_face(&mut s, tet, 1, 2, &f1, &domains, &mut mids).unwrap();
        assert_eq!(s.cell_type(c0).unwrap(), CellType::QuadraticWedge);
        assert_eq!(s.cell_type(c1).unwrap(), CellType::QuadraticWedge);
        // verticals for corners 0,1,3 then 2 more for corner 2: 4 total
        assert_eq!(mids.len(), 4);
        // the shared corners reuse the same vertical mid in both wedges
        let w0 = s.cell_nodes(c0).unwrap().to_vec();
        let w1 = s.cell_nodes(c1).unwrap().to_vec();
        let shared: Vec<_> = w0[12..].iter().filter(|m| w1[12..].contains(m)).collect();
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn polygonal_cap_extrudes_to_polyhedron() {
        let mut s = MeshStore::new();
        for z in [0.0, 1.0] {
            for i in 0..6 {
                let ang = i as f64;
                s.add_node([ang.cos(), ang.sin(), z]);
            }
        }
        let nodes: Vec<NodeId> = (0..12).map(n).collect();
        let prism = s.add_cell(CellType::HexagonalPrism, &nodes).unwrap();
        let cap = [n(6), n(7), n(8), n(9), n(10), n(11)];
        let domains = split_nodes(&mut s, &cap, (0, 1));
        let mut mids = QuadMids::new();
        let set: BTreeSet<NodeId> = cap.into_iter().collect();
        let c = extrude_volume_from_face(&mut s, prism, 0, 1, &set, &domains, &mut mids).unwrap();
        assert_eq!(s.cell_type(c).unwrap(), CellType::Polyhedron);
        // two hexagonal caps plus six side quads
        assert_eq!(s.polyhedron_faces(c).unwrap().len(), 8);
    }

    #[test]
    fn triangle_edge_extrudes_to_quad() {
        let mut s = MeshStore::new();
        for xyz in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            s.add_node(xyz);
        }
        let tri = s.add_cell(CellType::Triangle, &[n(0), n(1), n(2)]).unwrap();
        let edge = [n(1), n(2)];
        let domains = split_nodes(&mut s, &edge, (1, 2));
        let mut mids = QuadMids::new();
        let set: BTreeSet<NodeId> = edge.into_iter().collect();
        let c = extrude_volume_from_face(&mut s, tri, 1, 2, &set, &domains, &mut mids).unwrap();
        assert_eq!(s.cell_type(c).unwrap(), CellType::Quadrangle);
        let q = s.cell_nodes(c).unwrap();
        // the triangle runs 1 -> 2, so the quad must run it 2 -> 1
        assert_eq!(q[0], domains[&n(1)][&1]);
        assert_eq!(q[1], domains[&n(1)][&2]);
        assert_eq!(q[2], domains[&n(2)][&2]);
        assert_eq!(q[3], domains[&n(2)][&1]);
    }

    #[test]
    fn extruded_quad_runs_shared_edge_against_owner() {
        let mut s = MeshStore::new();
        for xyz in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            s.add_node(xyz);
        }
        let tri = s.add_cell(CellType::Triangle, &[n(0), n(1), n(2)]).unwrap();
        let edge = [n(1), n(2)];
        let domains = split_nodes(&mut s, &edge, (1, 2));
        let mut mids = QuadMids::new();
        let set: BTreeSet<NodeId> = edge.into_iter().collect();
        let c = extrude_volume_from_face(&mut s, tri, 1, 2, &set, &domains, &mut mids).unwrap();
        let q = s.cell_nodes(c).unwrap();
        let a1 = domains[&n(1)][&1];
        let a2 = domains[&n(2)][&1];
        let pos = |x| q.iter().position(|&v| v == x).unwrap();
        // the owner traverses a1 -> a2 on the domain-1 side; a consistently
        // wound quad holds the directed edge a2 -> a1, never a1 -> a2
        assert_eq!((pos(a2) + 1) % q.len(), pos(a1));
    }

    #[test]
    fn counter_winding_edge_keeps_base_cycle() {
        let mut s = MeshStore::new();
        for xyz in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            s.add_node(xyz);
        }
        let tri = s.add_cell(CellType::Triangle, &[n(0), n(1), n(2)]).unwrap();
        // the set visits (0, 2) but the triangle's boundary runs 2 -> 0,
        // so the base cycle already opposes the owner and stays as built
        let edge = [n(0), n(2)];
        let domains = split_nodes(&mut s, &edge, (1, 2));
        let mut mids = QuadMids::new();
        let set: BTreeSet<NodeId> = edge.into_iter().collect();
        let c = extrude_volume_from_face(&mut s, tri, 1, 2, &set, &domains, &mut mids).unwrap();
        let q = s.cell_nodes(c).unwrap();
        assert_eq!(q[0], domains[&n(0)][&1]);
        assert_eq!(q[1], domains[&n(2)][&1]);
        assert_eq!(q[2], domains[&n(2)][&2]);
        assert_eq!(q[3], domains[&n(0)][&2]);
    }

    #[test]
    fn quadratic_edge_extrudes_to_quadratic_quad() {
        let mut s = MeshStore::new();
        for i in 0..6 {
            s.add_node([i as f64, 0.0, 0.0]);
        }
        let nodes: Vec<NodeId> = (0..6).map(n).collect();
        let tri = s.add_cell(CellType::QuadraticTriangle, &nodes).unwrap();
        // edge (1, 2) carries mid node 4
        let edge = [n(1), n(2), n(4)];
        let domains = split_nodes(&mut s, &edge, (1, 2));
        let mut mids = QuadMids::new();
        let set: BTreeSet<NodeId> = edge.into_iter().collect();
        let c = extrude_volume_from_face(&mut s, tri, 1, 2, &set, &domains, &mut mids).unwrap();
        assert_eq!(s.cell_type(c).unwrap(), CellType::QuadraticQuadrangle);
        let q = s.cell_nodes(c).unwrap();
        // the flipped cycle puts the domain mids opposite each other
        assert_eq!(q[5], domains[&n(4)][&2]);
        assert_eq!(q[7], domains[&n(4)][&1]);
        // vertical mids sit on the two corners
        assert_eq!(mids.len(), 2);
        assert!(mids.values().any(|&v| v == q[4]) && mids.values().any(|&v| v == q[6]));
    }

    #[test]
    fn missing_domain_mapping_is_reported() {
        let mut s = MeshStore::new();
        for xyz in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ] {
            s.add_node(xyz);
        }
        let tet = s.add_cell(CellType::Tetra, &[n(0), n(1), n(2), n(3)]).unwrap();
        let domains = split_nodes(&mut s, &[n(0), n(1)], (1, 2));
        let mut mids = QuadMids::new();
        let set: BTreeSet<NodeId> = [n(0), n(1), n(2)].into_iter().collect();
        let err =
            extrude_volume_from_face(&mut s, tet, 1, 2, &set, &domains, &mut mids).unwrap_err();
        assert_eq!(
            err,
            MeshError::MissingDomainNode {
                node: n(2),
                domain: 1
            }
        );
    }

    #[test]
    fn wrong_face_set_is_reported() {
        let mut s = MeshStore::new();
        for xyz in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [2.0, 2.0, 2.0],
        ] {
            s.add_node(xyz);
        }
        let tet = s.add_cell(CellType::Tetra, &[n(0), n(1), n(2), n(3)]).unwrap();
        let set: BTreeSet<NodeId> = [n(0), n(1), n(4)].into_iter().collect();
        let err = extrude_volume_from_face(
            &mut s,
            tet,
            1,
            2,
            &set,
            &NodeDomains::new(),
            &mut QuadMids::new(),
        )
        .unwrap_err();
        assert_eq!(err, MeshError::FaceNotInCell(tet));
    }
}
