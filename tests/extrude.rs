//! Domain splitting end to end: duplicate the shared face, insert the flat
//! volume, rewire the cells, compact and rebuild.

use std::collections::BTreeSet;

use mesh_downward::algs::extrude::{extrude_volume_from_face, NodeDomains, QuadMids};
use mesh_downward::prelude::*;

fn stacked_hexas() -> (MeshStore, CellId, CellId, [NodeId; 4]) {
    let mut store = MeshStore::new();
    let mut nodes = Vec::new();
    for z in [0.0, 1.0, 2.0] {
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            nodes.push(store.add_node([x, y, z]));
        }
    }
    let lower = store
        .add_cell(
            CellType::Hexahedron,
            &[
                nodes[0], nodes[1], nodes[2], nodes[3], nodes[4], nodes[5], nodes[6], nodes[7],
            ],
        )
        .unwrap();
    let upper = store
        .add_cell(
            CellType::Hexahedron,
            &[
                nodes[4], nodes[5], nodes[6], nodes[7], nodes[8], nodes[9], nodes[10], nodes[11],
            ],
        )
        .unwrap();
    (store, lower, upper, [nodes[4], nodes[5], nodes[6], nodes[7]])
}

#[test]
fn split_two_stacked_hexahedra() {
    let (mut store, lower, upper, shared) = stacked_hexas();

    // 1. duplicate the shared face nodes once per domain
    let mut domains = NodeDomains::new();
    for &node in &shared {
        let xyz = store.node_coords(node).unwrap();
        let a = store.add_node(xyz);
        let b = store.add_node(xyz);
        let entry = domains.entry(node).or_default();
        entry.insert(1, a);
        entry.insert(2, b);
    }

    // 2. insert the flat hexahedron between the duplicates
    let mut mids = QuadMids::new();
    let set: BTreeSet<NodeId> = shared.into_iter().collect();
    let flat =
        extrude_volume_from_face(&mut store, lower, 1, 2, &set, &domains, &mut mids).unwrap();

    // 3. rewire each side onto its own copies
    let to_a: hashbrown::HashMap<NodeId, NodeId> =
        shared.iter().map(|&n| (n, domains[&n][&1])).collect();
    let to_b: hashbrown::HashMap<NodeId, NodeId> =
        shared.iter().map(|&n| (n, domains[&n][&2])).collect();
    store.substitute_cell_nodes(lower, &to_a).unwrap();
    store.substitute_cell_nodes(upper, &to_b).unwrap();

    // 4. retire the originals and compact
    for &node in &shared {
        store.remove_node(node).unwrap();
    }
    let mut node_map = Vec::new();
    let mut next = 0u32;
    for i in 0..store.node_capacity() {
        if store.is_node_live(NodeId::new(i as u32)) {
            node_map.push(Some(NodeId::new(next)));
            next += 1;
        } else {
            node_map.push(None);
        }
    }
    let cell_map: Vec<Option<CellId>> = (0..store.cell_capacity() as u32)
        .map(|i| Some(CellId::new(i)))
        .collect();
    let cell_count = store.cell_capacity();
    store
        .compact(&node_map, next as usize, &cell_map, cell_count)
        .unwrap();
    assert_eq!(store.live_node_count(), 16);

    // 5. the flat volume now separates the two original cells
    let down = DownwardBuilder::new(&store).build().unwrap();
    let lower_nbrs = down.neighbors(&store, lower, false).unwrap();
    assert!(matches!(lower_nbrs[..], [Neighbor::Cell { cell, .. }] if cell == flat));
    let upper_nbrs = down.neighbors(&store, upper, false).unwrap();
    assert!(matches!(upper_nbrs[..], [Neighbor::Cell { cell, .. }] if cell == flat));
    let flat_nbrs = down.neighbors(&store, flat, false).unwrap();
    let mut found: Vec<CellId> = flat_nbrs
        .iter()
        .map(|x| match x {
            Neighbor::Cell { cell, .. } => *cell,
            Neighbor::Skin { .. } => unreachable!(),
        })
        .collect();
    found.sort();
    let mut expected = vec![lower, upper];
    expected.sort();
    assert_eq!(found, expected);
}

#[test]
fn quadratic_hexa_face_extrudes_to_quadratic_hexa() {
    let mut store = MeshStore::new();
    for i in 0..20 {
        store.add_node([i as f64, 0.0, 0.0]);
    }
    let nodes: Vec<NodeId> = (0..20).map(NodeId::new).collect();
    let hexa = store.add_cell(CellType::QuadraticHexahedron, &nodes).unwrap();
    // top face: corners 4..8, mids 12..16
    let face = [4u32, 5, 6, 7, 12, 13, 14, 15].map(NodeId::new);
    let mut domains = NodeDomains::new();
    for &n in &face {
        let xyz = store.node_coords(n).unwrap();
        let a = store.add_node(xyz);
        let b = store.add_node(xyz);
        let entry = domains.entry(n).or_default();
        entry.insert(10, a);
        entry.insert(20, b);
    }
    let mut mids = QuadMids::new();
    let set: BTreeSet<NodeId> = face.into_iter().collect();
    let c = extrude_volume_from_face(&mut store, hexa, 10, 20, &set, &domains, &mut mids).unwrap();
    assert_eq!(store.cell_type(c).unwrap(), CellType::QuadraticHexahedron);
    assert_eq!(store.cell_nodes(c).unwrap().len(), 20);
    // one vertical mid per corner of the face
    assert_eq!(mids.len(), 4);
    // extruding the same face again reuses every vertical mid
    let before = store.live_node_count();
    extrude_volume_from_face(&mut store, hexa, 10, 20, &set, &domains, &mut mids).unwrap();
    assert_eq!(store.live_node_count(), before);
    assert_eq!(mids.len(), 4);
}
