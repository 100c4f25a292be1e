//! TypeCatalog: data-driven boundary templates for every cell type.
//!
//! For each fixed-size 3D type this module lists the ordered templates of its
//! boundary faces (corner indices first, then mid-edge indices, then face
//! centers), oriented so that traversing them consistently yields
//! outward-pointing boundaries. For each fixed-size 2D type it lists the
//! boundary edges. Polygons, polyhedron face blocks and hexagonal-prism caps
//! are resolved dynamically from the actual node sequence.
//!
//! All per-type branching in the crate funnels through this module: the
//! downward builder and the domain splitter consume templates, they never
//! switch on shapes themselves.

use once_cell::sync::Lazy;

use crate::topology::cell_type::CellType;
use crate::topology::ids::NodeId;

/// A boundary face of a 3D type: target face type plus indices into the
/// owning cell's node sequence.
#[derive(Clone, Copy, Debug)]
pub struct FaceTemplate {
    pub ty: CellType,
    pub nodes: &'static [u8],
}

/// A boundary edge of a 2D type.
#[derive(Clone, Copy, Debug)]
pub struct EdgeTemplate {
    pub ty: CellType,
    pub nodes: &'static [u8],
}

const fn face(ty: CellType, nodes: &'static [u8]) -> FaceTemplate {
    FaceTemplate { ty, nodes }
}

const fn edge(ty: CellType, nodes: &'static [u8]) -> EdgeTemplate {
    EdgeTemplate { ty, nodes }
}

// --- 3D boundary face templates -------------------------------------------

const TETRA_FACES: [FaceTemplate; 4] = [
    face(CellType::Triangle, &[0, 1, 3]),
    face(CellType::Triangle, &[1, 2, 3]),
    face(CellType::Triangle, &[2, 0, 3]),
    face(CellType::Triangle, &[0, 2, 1]),
];

const QUADRATIC_TETRA_FACES: [FaceTemplate; 4] = [
    face(CellType::QuadraticTriangle, &[0, 1, 3, 4, 8, 7]),
    face(CellType::QuadraticTriangle, &[1, 2, 3, 5, 9, 8]),
    face(CellType::QuadraticTriangle, &[2, 0, 3, 6, 7, 9]),
    face(CellType::QuadraticTriangle, &[0, 2, 1, 6, 5, 4]),
];

const PYRAMID_FACES: [FaceTemplate; 5] = [
    face(CellType::Quadrangle, &[0, 3, 2, 1]),
    face(CellType::Triangle, &[0, 1, 4]),
    face(CellType::Triangle, &[1, 2, 4]),
    face(CellType::Triangle, &[2, 3, 4]),
    face(CellType::Triangle, &[3, 0, 4]),
];

const QUADRATIC_PYRAMID_FACES: [FaceTemplate; 5] = [
    face(CellType::QuadraticQuadrangle, &[0, 3, 2, 1, 8, 7, 6, 5]),
    face(CellType::QuadraticTriangle, &[0, 1, 4, 5, 10, 9]),
    face(CellType::QuadraticTriangle, &[1, 2, 4, 6, 11, 10]),
    face(CellType::QuadraticTriangle, &[2, 3, 4, 7, 12, 11]),
    face(CellType::QuadraticTriangle, &[3, 0, 4, 8, 9, 12]),
];

const WEDGE_FACES: [FaceTemplate; 5] = [
    face(CellType::Triangle, &[0, 1, 2]),
    face(CellType::Triangle, &[3, 5, 4]),
    face(CellType::Quadrangle, &[0, 3, 4, 1]),
    face(CellType::Quadrangle, &[1, 4, 5, 2]),
    face(CellType::Quadrangle, &[2, 5, 3, 0]),
];

const QUADRATIC_WEDGE_FACES: [FaceTemplate; 5] = [
    face(CellType::QuadraticTriangle, &[0, 1, 2, 6, 7, 8]),
    face(CellType::QuadraticTriangle, &[3, 5, 4, 11, 10, 9]),
    face(CellType::QuadraticQuadrangle, &[0, 3, 4, 1, 12, 9, 13, 6]),
    face(CellType::QuadraticQuadrangle, &[1, 4, 5, 2, 13, 10, 14, 7]),
    face(CellType::QuadraticQuadrangle, &[2, 5, 3, 0, 14, 11, 12, 8]),
];

const HEXAHEDRON_FACES: [FaceTemplate; 6] = [
    face(CellType::Quadrangle, &[0, 4, 7, 3]),
    face(CellType::Quadrangle, &[1, 2, 6, 5]),
    face(CellType::Quadrangle, &[0, 1, 5, 4]),
    face(CellType::Quadrangle, &[3, 7, 6, 2]),
    face(CellType::Quadrangle, &[0, 3, 2, 1]),
    face(CellType::Quadrangle, &[4, 5, 6, 7]),
];

const QUADRATIC_HEXAHEDRON_FACES: [FaceTemplate; 6] = [
    face(CellType::QuadraticQuadrangle, &[0, 4, 7, 3, 16, 15, 19, 11]),
    face(CellType::QuadraticQuadrangle, &[1, 2, 6, 5, 9, 18, 13, 17]),
    face(CellType::QuadraticQuadrangle, &[0, 1, 5, 4, 8, 17, 12, 16]),
    face(CellType::QuadraticQuadrangle, &[3, 7, 6, 2, 19, 14, 18, 10]),
    face(CellType::QuadraticQuadrangle, &[0, 3, 2, 1, 11, 10, 9, 8]),
    face(CellType::QuadraticQuadrangle, &[4, 5, 6, 7, 12, 13, 14, 15]),
];

const TRIQUADRATIC_HEXAHEDRON_FACES: [FaceTemplate; 6] = [
    face(CellType::BiquadraticQuadrangle, &[0, 1, 5, 4, 8, 17, 12, 16, 20]),
    face(CellType::BiquadraticQuadrangle, &[1, 2, 6, 5, 9, 18, 13, 17, 21]),
    face(CellType::BiquadraticQuadrangle, &[2, 3, 7, 6, 10, 19, 14, 18, 22]),
    face(CellType::BiquadraticQuadrangle, &[3, 0, 4, 7, 11, 16, 15, 19, 23]),
    face(CellType::BiquadraticQuadrangle, &[0, 3, 2, 1, 11, 10, 9, 8, 24]),
    face(CellType::BiquadraticQuadrangle, &[4, 5, 6, 7, 12, 13, 14, 15, 25]),
];

const HEXAGONAL_PRISM_FACES: [FaceTemplate; 8] = [
    face(CellType::Polygon, &[0, 5, 4, 3, 2, 1]),
    face(CellType::Polygon, &[6, 7, 8, 9, 10, 11]),
    face(CellType::Quadrangle, &[0, 1, 7, 6]),
    face(CellType::Quadrangle, &[1, 2, 8, 7]),
    face(CellType::Quadrangle, &[2, 3, 9, 8]),
    face(CellType::Quadrangle, &[3, 4, 10, 9]),
    face(CellType::Quadrangle, &[4, 5, 11, 10]),
    face(CellType::Quadrangle, &[5, 0, 6, 11]),
];

// --- 2D boundary edge templates -------------------------------------------

const TRIANGLE_EDGES: [EdgeTemplate; 3] = [
    edge(CellType::Line, &[0, 1]),
    edge(CellType::Line, &[1, 2]),
    edge(CellType::Line, &[2, 0]),
];

const QUADRATIC_TRIANGLE_EDGES: [EdgeTemplate; 3] = [
    edge(CellType::QuadraticEdge, &[0, 1, 3]),
    edge(CellType::QuadraticEdge, &[1, 2, 4]),
    edge(CellType::QuadraticEdge, &[2, 0, 5]),
];

const QUADRANGLE_EDGES: [EdgeTemplate; 4] = [
    edge(CellType::Line, &[0, 1]),
    edge(CellType::Line, &[1, 2]),
    edge(CellType::Line, &[2, 3]),
    edge(CellType::Line, &[3, 0]),
];

const QUADRATIC_QUADRANGLE_EDGES: [EdgeTemplate; 4] = [
    edge(CellType::QuadraticEdge, &[0, 1, 4]),
    edge(CellType::QuadraticEdge, &[1, 2, 5]),
    edge(CellType::QuadraticEdge, &[2, 3, 6]),
    edge(CellType::QuadraticEdge, &[3, 0, 7]),
];

// --- lookup ----------------------------------------------------------------

/// Per-code face-template registry, derived once from the tables above.
static FACES_BY_CODE: Lazy<[&'static [FaceTemplate]; CellType::COUNT]> = Lazy::new(|| {
    let mut table: [&'static [FaceTemplate]; CellType::COUNT] = [&[]; CellType::COUNT];
    table[CellType::Tetra.code()] = &TETRA_FACES;
    table[CellType::QuadraticTetra.code()] = &QUADRATIC_TETRA_FACES;
    table[CellType::Pyramid.code()] = &PYRAMID_FACES;
    table[CellType::QuadraticPyramid.code()] = &QUADRATIC_PYRAMID_FACES;
    table[CellType::Wedge.code()] = &WEDGE_FACES;
    table[CellType::QuadraticWedge.code()] = &QUADRATIC_WEDGE_FACES;
    table[CellType::Hexahedron.code()] = &HEXAHEDRON_FACES;
    table[CellType::QuadraticHexahedron.code()] = &QUADRATIC_HEXAHEDRON_FACES;
    table[CellType::TriquadraticHexahedron.code()] = &TRIQUADRATIC_HEXAHEDRON_FACES;
    table[CellType::HexagonalPrism.code()] = &HEXAGONAL_PRISM_FACES;
    table
});

/// Per-code edge-template registry.
static EDGES_BY_CODE: Lazy<[&'static [EdgeTemplate]; CellType::COUNT]> = Lazy::new(|| {
    let mut table: [&'static [EdgeTemplate]; CellType::COUNT] = [&[]; CellType::COUNT];
    table[CellType::Triangle.code()] = &TRIANGLE_EDGES;
    table[CellType::QuadraticTriangle.code()] = &QUADRATIC_TRIANGLE_EDGES;
    table[CellType::BiquadraticTriangle.code()] = &QUADRATIC_TRIANGLE_EDGES;
    table[CellType::Quadrangle.code()] = &QUADRANGLE_EDGES;
    table[CellType::QuadraticQuadrangle.code()] = &QUADRATIC_QUADRANGLE_EDGES;
    table[CellType::BiquadraticQuadrangle.code()] = &QUADRATIC_QUADRANGLE_EDGES;
    table
});

/// Static boundary face templates for a fixed-size 3D type. Empty for
/// everything else (polyhedra are resolved via [`faces_of_cell`]).
#[inline]
pub fn boundary_faces(ty: CellType) -> &'static [FaceTemplate] {
    FACES_BY_CODE[ty.code()]
}

/// Static boundary edge templates for a fixed-size 2D type. Empty for
/// polygons, which are resolved via [`edges_of_face`].
#[inline]
pub fn boundary_edges(ty: CellType) -> &'static [EdgeTemplate] {
    EDGES_BY_CODE[ty.code()]
}

/// Classify a polygonal face block by size.
#[inline]
pub fn polygon_face_type(node_count: usize) -> CellType {
    match node_count {
        3 => CellType::Triangle,
        4 => CellType::Quadrangle,
        _ => CellType::Polygon,
    }
}

/// Resolve the boundary faces of a 3D cell against its node sequence.
/// `polyhedron_faces` supplies the face-definition block for polyhedra.
pub fn faces_of_cell(
    ty: CellType,
    nodes: &[NodeId],
    polyhedron_faces: Option<&[Vec<NodeId>]>,
) -> Vec<(CellType, Vec<NodeId>)> {
    debug_assert_eq!(ty.dimension(), 3);
    if ty == CellType::Polyhedron {
        let Some(blocks) = polyhedron_faces else {
            return Vec::new();
        };
        return blocks
            .iter()
            .map(|f| (polygon_face_type(f.len()), f.clone()))
            .collect();
    }
    boundary_faces(ty)
        .iter()
        .map(|t| (t.ty, t.nodes.iter().map(|&i| nodes[i as usize]).collect()))
        .collect()
}

/// Resolve the boundary edges of a 2D entity against its node sequence.
pub fn edges_of_face(ty: CellType, nodes: &[NodeId]) -> Vec<(CellType, Vec<NodeId>)> {
    debug_assert_eq!(ty.dimension(), 2);
    if ty == CellType::Polygon {
        let n = nodes.len();
        return (0..n)
            .map(|i| (CellType::Line, vec![nodes[i], nodes[(i + 1) % n]]))
            .collect();
    }
    boundary_edges(ty)
        .iter()
        .map(|t| (t.ty, t.nodes.iter().map(|&i| nodes[i as usize]).collect()))
        .collect()
}

/// Find the boundary face of `(ty, nodes)` whose node set equals `face_set`,
/// returning its type and ordered cycle in the owner's orientation.
pub fn ordered_face_cycle(
    ty: CellType,
    nodes: &[NodeId],
    polyhedron_faces: Option<&[Vec<NodeId>]>,
    face_set: &std::collections::BTreeSet<NodeId>,
) -> Option<(CellType, Vec<NodeId>)> {
    faces_of_cell(ty, nodes, polyhedron_faces)
        .into_iter()
        .find(|(_, fnodes)| {
            fnodes.len() == face_set.len() && fnodes.iter().all(|n| face_set.contains(n))
        })
}

/// Node interlace reversing the winding of a 2D type, preserving node roles
/// (corners stay corners, mid-side nodes stay on their edge).
pub fn reverse_interlace(ty: CellType) -> &'static [u8] {
    match ty {
        CellType::Triangle => &[0, 2, 1],
        CellType::QuadraticTriangle => &[0, 2, 1, 5, 4, 3],
        CellType::BiquadraticTriangle => &[0, 2, 1, 5, 4, 3, 6],
        CellType::Quadrangle => &[0, 3, 2, 1],
        CellType::QuadraticQuadrangle => &[0, 3, 2, 1, 7, 6, 5, 4],
        CellType::BiquadraticQuadrangle => &[0, 3, 2, 1, 7, 6, 5, 4, 8],
        _ => &[],
    }
}

/// Apply an interlace permutation in place: `out[i] = in[interlace[i]]`.
pub fn apply_interlace(interlace: &[u8], nodes: &mut Vec<NodeId>) {
    if interlace.len() != nodes.len() {
        return;
    }
    let src = nodes.clone();
    for (i, &j) in interlace.iter().enumerate() {
        nodes[i] = src[j as usize];
    }
}
