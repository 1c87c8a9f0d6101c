//! FEMAP topology code → VTK cell kind mapping (§4.3).

/// VTK unstructured-grid cell type codes (standard `vtkCellType` numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VtkCellKind {
    Vertex,
    Line,
    Triangle,
    QuadraticTriangle,
    Quad,
    QuadraticQuad,
    Tetra,
    QuadraticTetra,
    Wedge,
    QuadraticWedge,
    Hexahedron,
    QuadraticHexahedron,
}

impl VtkCellKind {
    /// The numeric VTK cell type written into a `.vtu`'s `types` array.
    pub fn vtk_type_id(self) -> u8 {
        match self {
            VtkCellKind::Vertex => 1,
            VtkCellKind::Line => 3,
            VtkCellKind::Triangle => 5,
            VtkCellKind::Quad => 9,
            VtkCellKind::Tetra => 10,
            VtkCellKind::Hexahedron => 12,
            VtkCellKind::Wedge => 13,
            VtkCellKind::QuadraticTriangle => 22,
            VtkCellKind::QuadraticQuad => 23,
            VtkCellKind::QuadraticTetra => 24,
            VtkCellKind::QuadraticHexahedron => 25,
            VtkCellKind::QuadraticWedge => 26,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyInfo {
    pub cell_kind: VtkCellKind,
    pub required_nodes: usize,
}

/// Look up the VTK cell kind and required node count for a FEMAP topology
/// code. When `force_2d` is set, Brick/Wedge topologies are reduced to their
/// Quad/Tri counterparts by taking a prefix of the node list; other codes
/// pass through unchanged.
pub fn lookup(code: i64, force_2d: bool) -> Option<TopologyInfo> {
    if force_2d {
        if let Some(reduced) = reduce_2d(code) {
            return Some(reduced);
        }
    }

    let (cell_kind, required_nodes) = match code {
        9 => (VtkCellKind::Vertex, 1),
        0 => (VtkCellKind::Line, 2),
        2 => (VtkCellKind::Triangle, 3),
        3 => (VtkCellKind::QuadraticTriangle, 6),
        4 => (VtkCellKind::Quad, 4),
        5 => (VtkCellKind::QuadraticQuad, 8),
        6 => (VtkCellKind::Tetra, 4),
        10 => (VtkCellKind::QuadraticTetra, 10),
        7 => (VtkCellKind::Wedge, 6),
        11 => (VtkCellKind::QuadraticWedge, 15),
        8 => (VtkCellKind::Hexahedron, 8),
        12 => (VtkCellKind::QuadraticHexahedron, 20),
        _ => return None,
    };

    Some(TopologyInfo { cell_kind, required_nodes })
}

fn reduce_2d(code: i64) -> Option<TopologyInfo> {
    let (cell_kind, required_nodes) = match code {
        8 => (VtkCellKind::Quad, 4),
        12 => (VtkCellKind::QuadraticQuad, 8),
        7 => (VtkCellKind::Triangle, 3),
        11 => (VtkCellKind::QuadraticTriangle, 6),
        _ => return None,
    };
    Some(TopologyInfo { cell_kind, required_nodes })
}
