//! Mesh assembly: FEMAP node/element tables → an unstructured-grid model
//! with stable ID↔index mappings (§4.4).

use std::collections::{BTreeMap, HashMap};

use crate::diagnostics::{Diagnostics, DiagnosticKind};
use crate::entities::{Element, Node, Property};
use crate::topology::{self, VtkCellKind};

/// One emitted cell: its VTK kind plus point-buffer indices (not node IDs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub kind: VtkCellKind,
    pub point_indices: Vec<usize>,
}

/// An assembled mesh: a point buffer plus cells, with the bookkeeping
/// needed to translate between FEMAP IDs and buffer/cell indices.
///
/// The point buffer is the only thing a time-step worker mutates (to apply
/// displacement); everything else here is read-only and shared.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub points: Vec<[f64; 3]>,
    pub cells: Vec<Cell>,
    pub node_index: HashMap<i64, usize>,
    pub element_index: HashMap<i64, usize>,
    /// Per-cell original element ID, parallel to `cells`.
    pub cell_element_id: Vec<i64>,
    /// Per-cell property ID, parallel to `cells`.
    pub cell_prop_id: Vec<i64>,
    /// Per-cell material ID (0 if the element's property has none), parallel to `cells`.
    pub cell_material_id: Vec<i64>,
    /// Per-cell original FEMAP topology code, parallel to `cells`.
    pub cell_topology_code: Vec<i64>,
    /// Distinct property IDs, in order of first appearance among valid elements.
    pub unique_property_ids: Vec<i64>,
}

impl Mesh {
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Build a [`Mesh`] from the typed node/element/property tables.
///
/// Elements whose topology is unknown, whose connectivity prefix is shorter
/// than required, or that reference a missing node are skipped; their IDs
/// are recorded in the returned [`Diagnostics`] and they do not appear in
/// any output array.
pub fn build(
    nodes: &BTreeMap<i64, Node>,
    elements: &[Element],
    properties: &BTreeMap<i64, Property>,
    force_2d: bool,
) -> (Mesh, Diagnostics) {
    let mut diagnostics = Diagnostics::new();

    let mut points = Vec::with_capacity(nodes.len());
    let mut node_index = HashMap::with_capacity(nodes.len());
    for (index, node) in nodes.values().enumerate() {
        points.push([node.coords.0, node.coords.1, node.coords.2]);
        node_index.insert(node.id, index);
    }

    let mut cells = Vec::new();
    let mut element_index = HashMap::new();
    let mut cell_element_id = Vec::new();
    let mut cell_prop_id = Vec::new();
    let mut cell_material_id = Vec::new();
    let mut cell_topology_code = Vec::new();
    let mut unique_property_ids = Vec::new();
    let mut seen_property_ids = std::collections::HashSet::new();

    for element in elements {
        let Some(info) = topology::lookup(element.topology, force_2d) else {
            diagnostics.push(DiagnosticKind::UnknownTopology {
                element_id: element.id,
                topology: element.topology,
            });
            continue;
        };

        if element.nodes.len() < info.required_nodes {
            diagnostics.push(DiagnosticKind::ShortConnectivity {
                element_id: element.id,
                topology: element.topology,
            });
            continue;
        }

        let prefix = &element.nodes[..info.required_nodes];
        let mut point_indices = Vec::with_capacity(prefix.len());
        let mut missing = None;
        for &node_id in prefix {
            match node_index.get(&node_id) {
                Some(&idx) => point_indices.push(idx),
                None => {
                    missing = Some(node_id);
                    break;
                }
            }
        }

        if let Some(node_id) = missing {
            diagnostics.push(DiagnosticKind::MissingNode { element_id: element.id, node_id });
            continue;
        }

        let material_id = properties.get(&element.prop_id).map(|p| p.material_id).unwrap_or(0);

        element_index.insert(element.id, cells.len());
        cell_element_id.push(element.id);
        cell_prop_id.push(element.prop_id);
        cell_material_id.push(material_id);
        cell_topology_code.push(element.topology);
        cells.push(Cell { kind: info.cell_kind, point_indices });

        if seen_property_ids.insert(element.prop_id) {
            unique_property_ids.push(element.prop_id);
        }
    }

    let mesh = Mesh {
        points,
        cells,
        node_index,
        element_index,
        cell_element_id,
        cell_prop_id,
        cell_material_id,
        cell_topology_code,
        unique_property_ids,
    };

    (mesh, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Property;

    fn node(id: i64, x: f64, y: f64, z: f64) -> Node {
        Node { id, coords: (x, y, z) }
    }

    #[test]
    fn minimal_static_mesh_emits_one_triangle() {
        let nodes: BTreeMap<i64, Node> = [
            (1, node(1, 0.0, 0.0, 0.0)),
            (2, node(2, 1.0, 0.0, 0.0)),
            (3, node(3, 0.0, 1.0, 0.0)),
        ]
        .into_iter()
        .collect();
        let properties: BTreeMap<i64, Property> = [(
            7,
            Property { id: 7, material_id: 1, title: String::new() },
        )]
        .into_iter()
        .collect();
        let elements = vec![Element { id: 10, prop_id: 7, topology: 2, nodes: vec![1, 2, 3] }];

        let (mesh, diagnostics) = build(&nodes, &elements, &properties, false);
        assert!(diagnostics.is_empty());
        assert_eq!(mesh.points.len(), 3);
        assert_eq!(mesh.cell_count(), 1);
        assert_eq!(mesh.cell_element_id, vec![10]);
        assert_eq!(mesh.cell_prop_id, vec![7]);
        assert_eq!(mesh.cell_topology_code, vec![2]);
        assert_eq!(mesh.unique_property_ids, vec![7]);
    }

    #[test]
    fn short_connectivity_is_discarded_and_logged() {
        let nodes: BTreeMap<i64, Node> = (1..=6).map(|id| (id, node(id, 0.0, 0.0, 0.0))).collect();
        let properties = BTreeMap::new();
        // Topology 8 (hex) needs 8 nodes but only 6 are given.
        let elements = vec![Element { id: 10, prop_id: 1, topology: 8, nodes: vec![1, 2, 3, 4, 5, 6] }];

        let (mesh, diagnostics) = build(&nodes, &elements, &properties, false);
        assert_eq!(mesh.cell_count(), 0);
        assert_eq!(diagnostics.len(), 1);
        assert!(mesh.element_index.get(&10).is_none());
    }

    #[test]
    fn missing_node_reference_is_discarded_and_logged() {
        let nodes: BTreeMap<i64, Node> = [(1, node(1, 0.0, 0.0, 0.0))].into_iter().collect();
        let properties = BTreeMap::new();
        let elements = vec![Element { id: 5, prop_id: 1, topology: 0, nodes: vec![1, 99] }];

        let (mesh, diagnostics) = build(&nodes, &elements, &properties, false);
        assert_eq!(mesh.cell_count(), 0);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn force_2d_reduces_hex_to_quad_but_keeps_original_topology_code() {
        let nodes: BTreeMap<i64, Node> = (1..=8).map(|id| (id, node(id, id as f64, 0.0, 0.0))).collect();
        let properties = BTreeMap::new();
        let elements = vec![Element {
            id: 1,
            prop_id: 1,
            topology: 8,
            nodes: vec![1, 2, 3, 4, 5, 6, 7, 8],
        }];

        let (mesh, diagnostics) = build(&nodes, &elements, &properties, true);
        assert!(diagnostics.is_empty());
        assert_eq!(mesh.points.len(), 8);
        assert_eq!(mesh.cells[0].kind, VtkCellKind::Quad);
        assert_eq!(mesh.cells[0].point_indices.len(), 4);
        assert_eq!(mesh.cell_topology_code, vec![8]);
    }

    #[test]
    fn cell_count_invariant_holds_across_property_groups() {
        let nodes: BTreeMap<i64, Node> = (1..=4).map(|id| (id, node(id, 0.0, 0.0, 0.0))).collect();
        let properties = BTreeMap::new();
        let elements = vec![
            Element { id: 1, prop_id: 1, topology: 0, nodes: vec![1, 2] },
            Element { id: 2, prop_id: 2, topology: 0, nodes: vec![3, 4] },
            Element { id: 3, prop_id: 99, topology: 12345, nodes: vec![1, 2] }, // unknown topology
        ];

        let (mesh, diagnostics) = build(&nodes, &elements, &properties, false);
        assert_eq!(mesh.cell_count(), elements.len() - 1);
        assert_eq!(diagnostics.len(), 1);

        let mut per_prop: BTreeMap<i64, usize> = BTreeMap::new();
        for &prop_id in &mesh.cell_prop_id {
            *per_prop.entry(prop_id).or_insert(0) += 1;
        }
        let total: usize = per_prop.values().sum();
        assert_eq!(total, mesh.cell_count());
    }

    #[test]
    fn node_and_element_index_maps_are_bijections() {
        let nodes: BTreeMap<i64, Node> = (1..=4).map(|id| (id, node(id, 0.0, 0.0, 0.0))).collect();
        let properties = BTreeMap::new();
        let elements = vec![
            Element { id: 11, prop_id: 1, topology: 0, nodes: vec![1, 2] },
            Element { id: 12, prop_id: 1, topology: 0, nodes: vec![3, 4] },
        ];

        let (mesh, _) = build(&nodes, &elements, &properties, false);

        let mut node_indices: Vec<usize> = mesh.node_index.values().copied().collect();
        node_indices.sort();
        assert_eq!(node_indices, vec![0, 1, 2, 3]);

        let mut element_indices: Vec<usize> = mesh.element_index.values().copied().collect();
        element_indices.sort();
        assert_eq!(element_indices, vec![0, 1]);
    }
}
