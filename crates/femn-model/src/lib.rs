//! Typed FEMAP Neutral domain model built on top of `femn-neutral`'s raw
//! block scan: nodes, elements, properties, materials, output sets and
//! vectors, the topology table, and the mesh builder (§3, §4.3, §4.4).

mod diagnostics;
mod entities;
mod extractors;
mod mesh;
mod topology;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use entities::{Element, EntityType, Header, Material, Node, OutputSet, OutputVector, Property};
pub use extractors::{
    extract_elements, extract_header, extract_materials, extract_nodes, extract_output_sets,
    extract_output_vectors, extract_properties,
};
pub use mesh::{build as build_mesh, Cell, Mesh};
pub use topology::{lookup as lookup_topology, TopologyInfo, VtkCellKind};

use std::collections::BTreeMap;

use femn_neutral::BlockTable;

/// Everything the typed extractors pull out of one Neutral file's block
/// table, bundled together for convenience.
#[derive(Debug, Clone, Default)]
pub struct NeutralDocument {
    pub header: Header,
    pub nodes: BTreeMap<i64, Node>,
    pub properties: BTreeMap<i64, Property>,
    pub elements: Vec<Element>,
    pub materials: BTreeMap<i64, Material>,
    pub output_sets: BTreeMap<i64, OutputSet>,
    pub output_vectors: Vec<OutputVector>,
}

/// Run every typed extractor over a scanned block table.
pub fn extract_document(table: &BlockTable) -> (NeutralDocument, Diagnostics) {
    let mut diagnostics = Diagnostics::new();

    let header = extract_header(table);

    let (nodes, nodes_diag) = extract_nodes(table);
    diagnostics.extend(nodes_diag);

    let (properties, properties_diag) = extract_properties(table);
    diagnostics.extend(properties_diag);

    let (elements, elements_diag) = extract_elements(table);
    diagnostics.extend(elements_diag);

    let (materials, materials_diag) = extract_materials(table);
    diagnostics.extend(materials_diag);

    let (output_sets, sets_diag) = extract_output_sets(table);
    diagnostics.extend(sets_diag);

    let (output_vectors, vectors_diag) = extract_output_vectors(table);
    diagnostics.extend(vectors_diag);

    let document = NeutralDocument {
        header,
        nodes,
        properties,
        elements,
        materials,
        output_sets,
        output_vectors,
    };

    (document, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use femn_neutral::scan;

    #[test]
    fn extract_document_wires_every_extractor() {
        let text = "\
   -1
100
Demo
4.41
   -1
   -1
403
1,0,0,0,0,0,0,0,0,0,0,0.0,0.0,0.0
2,0,0,0,0,0,0,0,0,0,0,1.0,0.0,0.0
3,0,0,0,0,0,0,0,0,0,0,0.0,1.0,0.0
   -1
   -1
402
7,0,1,0,0,0,0
Bracket
0
0
0
0
0
   -1
   -1
404
10,0,7,0,2,0,0
1,2,3,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0
0
0
0
0
   -1
";
        let table = scan(text);
        let (doc, diagnostics) = extract_document(&table);
        assert!(diagnostics.is_empty());
        assert_eq!(doc.header.version, "4.41");
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.properties[&7].title, "Bracket");
        assert_eq!(doc.elements.len(), 1);

        let (mesh, mesh_diag) = build_mesh(&doc.nodes, &doc.elements, &doc.properties, false);
        assert!(mesh_diag.is_empty());
        assert_eq!(mesh.cell_count(), 1);
        assert_eq!(mesh.cell_prop_id, vec![7]);
        assert_eq!(mesh.cell_topology_code, vec![2]);
    }
}
