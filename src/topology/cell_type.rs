//! Cell type metadata for mesh entities.
//!
//! Each stored cell carries one of these tags; the tag encodes the
//! topological dimension, the node count (for fixed-size shapes) and the
//! shape family up to its quadratic/bi-quadratic variants. Variable-size
//! polygons and polyhedra take their size from the stored node sequence.

/// Supported cell types, 0D through 3D, linear and higher-order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum CellType {
    /// 0D element on a node.
    Vertex,
    /// 0D ball element carrying a diameter attribute.
    Ball,
    /// 2-node segment.
    Line,
    /// 3-node segment (mid-side node).
    QuadraticEdge,
    /// 3-node triangle.
    Triangle,
    /// 6-node triangle.
    QuadraticTriangle,
    /// 7-node triangle (face center).
    BiquadraticTriangle,
    /// 4-node quadrangle.
    Quadrangle,
    /// 8-node quadrangle.
    QuadraticQuadrangle,
    /// 9-node quadrangle (face center).
    BiquadraticQuadrangle,
    /// Variable-size polygon.
    Polygon,
    /// 4-node tetrahedron.
    Tetra,
    /// 10-node tetrahedron.
    QuadraticTetra,
    /// 5-node pyramid.
    Pyramid,
    /// 13-node pyramid.
    QuadraticPyramid,
    /// 6-node wedge/prism.
    Wedge,
    /// 15-node wedge/prism.
    QuadraticWedge,
    /// 8-node hexahedron.
    Hexahedron,
    /// 20-node hexahedron.
    QuadraticHexahedron,
    /// 27-node hexahedron (face and body centers).
    TriquadraticHexahedron,
    /// 12-node hexagonal prism.
    HexagonalPrism,
    /// Variable-size polyhedron described by polygonal faces.
    Polyhedron,
}

/// All variants in `code()` order; `CellType::COUNT` indexes past the end.
pub const ALL_CELL_TYPES: [CellType; CellType::COUNT] = [
    CellType::Vertex,
    CellType::Ball,
    CellType::Line,
    CellType::QuadraticEdge,
    CellType::Triangle,
    CellType::QuadraticTriangle,
    CellType::BiquadraticTriangle,
    CellType::Quadrangle,
    CellType::QuadraticQuadrangle,
    CellType::BiquadraticQuadrangle,
    CellType::Polygon,
    CellType::Tetra,
    CellType::QuadraticTetra,
    CellType::Pyramid,
    CellType::QuadraticPyramid,
    CellType::Wedge,
    CellType::QuadraticWedge,
    CellType::Hexahedron,
    CellType::QuadraticHexahedron,
    CellType::TriquadraticHexahedron,
    CellType::HexagonalPrism,
    CellType::Polyhedron,
];

impl CellType {
    /// Number of distinct cell types.
    pub const COUNT: usize = 22;

    /// Dense per-type index, used to address the downward tier array.
    #[inline]
    pub const fn code(self) -> usize {
        match self {
            CellType::Vertex => 0,
            CellType::Ball => 1,
            CellType::Line => 2,
            CellType::QuadraticEdge => 3,
            CellType::Triangle => 4,
            CellType::QuadraticTriangle => 5,
            CellType::BiquadraticTriangle => 6,
            CellType::Quadrangle => 7,
            CellType::QuadraticQuadrangle => 8,
            CellType::BiquadraticQuadrangle => 9,
            CellType::Polygon => 10,
            CellType::Tetra => 11,
            CellType::QuadraticTetra => 12,
            CellType::Pyramid => 13,
            CellType::QuadraticPyramid => 14,
            CellType::Wedge => 15,
            CellType::QuadraticWedge => 16,
            CellType::Hexahedron => 17,
            CellType::QuadraticHexahedron => 18,
            CellType::TriquadraticHexahedron => 19,
            CellType::HexagonalPrism => 20,
            CellType::Polyhedron => 21,
        }
    }

    /// Topological dimension of the cell.
    #[inline]
    pub const fn dimension(self) -> u8 {
        match self {
            CellType::Vertex | CellType::Ball => 0,
            CellType::Line | CellType::QuadraticEdge => 1,
            CellType::Triangle
            | CellType::QuadraticTriangle
            | CellType::BiquadraticTriangle
            | CellType::Quadrangle
            | CellType::QuadraticQuadrangle
            | CellType::BiquadraticQuadrangle
            | CellType::Polygon => 2,
            CellType::Tetra
            | CellType::QuadraticTetra
            | CellType::Pyramid
            | CellType::QuadraticPyramid
            | CellType::Wedge
            | CellType::QuadraticWedge
            | CellType::Hexahedron
            | CellType::QuadraticHexahedron
            | CellType::TriquadraticHexahedron
            | CellType::HexagonalPrism
            | CellType::Polyhedron => 3,
        }
    }

    /// Node count for fixed-size types, `None` for polygons and polyhedra.
    #[inline]
    pub const fn node_count(self) -> Option<usize> {
        match self {
            CellType::Vertex | CellType::Ball => Some(1),
            CellType::Line => Some(2),
            CellType::QuadraticEdge => Some(3),
            CellType::Triangle => Some(3),
            CellType::QuadraticTriangle => Some(6),
            CellType::BiquadraticTriangle => Some(7),
            CellType::Quadrangle => Some(4),
            CellType::QuadraticQuadrangle => Some(8),
            CellType::BiquadraticQuadrangle => Some(9),
            CellType::Tetra => Some(4),
            CellType::QuadraticTetra => Some(10),
            CellType::Pyramid => Some(5),
            CellType::QuadraticPyramid => Some(13),
            CellType::Wedge => Some(6),
            CellType::QuadraticWedge => Some(15),
            CellType::Hexahedron => Some(8),
            CellType::QuadraticHexahedron => Some(20),
            CellType::TriquadraticHexahedron => Some(27),
            CellType::HexagonalPrism => Some(12),
            CellType::Polygon | CellType::Polyhedron => None,
        }
    }

    /// Number of corner nodes (orientation-defining cycle), `None` for
    /// variable-size types.
    #[inline]
    pub const fn corner_count(self) -> Option<usize> {
        match self {
            CellType::Vertex | CellType::Ball => Some(1),
            CellType::Line | CellType::QuadraticEdge => Some(2),
            CellType::Triangle
            | CellType::QuadraticTriangle
            | CellType::BiquadraticTriangle => Some(3),
            CellType::Quadrangle
            | CellType::QuadraticQuadrangle
            | CellType::BiquadraticQuadrangle => Some(4),
            CellType::Tetra | CellType::QuadraticTetra => Some(4),
            CellType::Pyramid | CellType::QuadraticPyramid => Some(5),
            CellType::Wedge | CellType::QuadraticWedge => Some(6),
            CellType::Hexahedron
            | CellType::QuadraticHexahedron
            | CellType::TriquadraticHexahedron => Some(8),
            CellType::HexagonalPrism => Some(12),
            CellType::Polygon | CellType::Polyhedron => None,
        }
    }

    /// True for types with mid-side (or center) nodes.
    #[inline]
    pub const fn is_quadratic(self) -> bool {
        matches!(
            self,
            CellType::QuadraticEdge
                | CellType::QuadraticTriangle
                | CellType::BiquadraticTriangle
                | CellType::QuadraticQuadrangle
                | CellType::BiquadraticQuadrangle
                | CellType::QuadraticTetra
                | CellType::QuadraticPyramid
                | CellType::QuadraticWedge
                | CellType::QuadraticHexahedron
                | CellType::TriquadraticHexahedron
        )
    }
}

impl Default for CellType {
    fn default() -> Self {
        CellType::Vertex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_dense_and_unique() {
        for (i, ty) in ALL_CELL_TYPES.iter().enumerate() {
            assert_eq!(ty.code(), i);
        }
    }

    #[test]
    fn dimensions() {
        assert_eq!(CellType::Ball.dimension(), 0);
        assert_eq!(CellType::QuadraticEdge.dimension(), 1);
        assert_eq!(CellType::Polygon.dimension(), 2);
        assert_eq!(CellType::Polyhedron.dimension(), 3);
    }

    #[test]
    fn node_counts_match_corner_counts() {
        // corners never exceed nodes for fixed-size types
        for ty in ALL_CELL_TYPES {
            if let (Some(n), Some(c)) = (ty.node_count(), ty.corner_count()) {
                assert!(c <= n, "{ty:?}");
            }
        }
        assert_eq!(CellType::QuadraticWedge.node_count(), Some(15));
        assert_eq!(CellType::TriquadraticHexahedron.node_count(), Some(27));
    }

    #[test]
    fn quadratic_flags() {
        assert!(CellType::QuadraticTetra.is_quadratic());
        assert!(!CellType::Tetra.is_quadratic());
        assert!(!CellType::Polygon.is_quadratic());
    }
}
