//! Time-step writer (§4.7): for one output set, clones the shared mesh's
//! point buffer, applies displacement, fuses channel result records into
//! named point/cell arrays, splits the grid into one `.vtu` per property
//! (sharing the full point buffer rather than remapping indices, per §9),
//! and writes the step's `.vtm`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use femn_model::{EntityType, Mesh, OutputSet, OutputVector};

use crate::channels::{ChannelGrouping, ChannelKind};
use crate::config::VtkFormat;
use crate::sanitize::sanitize_title;
use crate::vtk_xml::{write_vtm, write_vtu, NumericArray, VtmEntry, VtuCell};

/// One named array resolved for this step, carrying both the point variant
/// (present only for nodal channels) and the cell variant (always present).
struct ChannelArray {
    name: &'static str,
    components: usize,
    point_values: Option<Vec<f64>>,
    cell_values: Vec<f64>,
}

/// Apply the displacement channel (§4.7 step 2) to a fresh point buffer.
/// Displacement records for a step are fused into (x, y, z) triplets the
/// same way other channels are, but the result offsets coordinates rather
/// than becoming an attached array.
fn apply_displacement(points: &mut [[f64; 3]], mesh: &Mesh, records: &[OutputVector], step_id: i64) {
    let for_step: Vec<&OutputVector> = records
        .iter()
        .filter(|r| r.set_id == step_id && r.ent_type == EntityType::Nodal)
        .collect();

    for chunk in for_step.chunks_exact(3) {
        for (&node_id, &idx) in &mesh.node_index {
            let dx = chunk[0].results.get(&node_id).copied().unwrap_or(0.0);
            let dy = chunk[1].results.get(&node_id).copied().unwrap_or(0.0);
            let dz = chunk[2].results.get(&node_id).copied().unwrap_or(0.0);
            points[idx][0] += dx;
            points[idx][1] += dy;
            points[idx][2] += dz;
        }
    }
}

/// One scalar component resolved over its record's own entity domain
/// (nodes for `ent_type=7`, elements for `ent_type=8`), plus which domain it
/// came from.
fn component_values(record: &OutputVector, mesh: &Mesh) -> (EntityType, Vec<f64>) {
    match record.ent_type {
        EntityType::Nodal => {
            let mut values = vec![0.0; mesh.points.len()];
            for (&node_id, &idx) in &mesh.node_index {
                if let Some(&v) = record.results.get(&node_id) {
                    values[idx] = v;
                }
            }
            (EntityType::Nodal, values)
        }
        EntityType::Elemental => {
            let mut values = vec![0.0; mesh.cells.len()];
            for (&element_id, &idx) in &mesh.element_index {
                if let Some(&v) = record.results.get(&element_id) {
                    values[idx] = v;
                }
            }
            (EntityType::Elemental, values)
        }
    }
}

/// Average a per-point scalar array onto per-cell values by averaging each
/// cell's corner indices.
fn average_to_cells(point_values: &[f64], mesh: &Mesh) -> Vec<f64> {
    mesh.cells
        .iter()
        .map(|cell| {
            if cell.point_indices.is_empty() {
                return 0.0;
            }
            let sum: f64 = cell.point_indices.iter().map(|&idx| point_values[idx]).sum();
            sum / cell.point_indices.len() as f64
        })
        .collect()
}

fn scalar_channel_array(name: &'static str, record: &OutputVector, mesh: &Mesh) -> ChannelArray {
    let (ent_type, values) = component_values(record, mesh);
    match ent_type {
        EntityType::Nodal => {
            let cell_values = average_to_cells(&values, mesh);
            ChannelArray { name, components: 1, point_values: Some(values), cell_values }
        }
        EntityType::Elemental => ChannelArray { name, components: 1, point_values: None, cell_values: values },
    }
}

fn vector_triplet_arrays(
    vector_name: &'static str,
    magnitude_name: &'static str,
    chunk: &[&OutputVector],
    mesh: &Mesh,
) -> Vec<ChannelArray> {
    let (ent_type_x, x) = component_values(chunk[0], mesh);
    let (_, y) = component_values(chunk[1], mesh);
    let (_, z) = component_values(chunk[2], mesh);

    let interleave = |x: &[f64], y: &[f64], z: &[f64]| -> Vec<f64> {
        (0..x.len()).flat_map(|i| [x[i], y[i], z[i]]).collect()
    };
    let magnitudes = |v3: &[f64]| -> Vec<f64> {
        v3.chunks_exact(3).map(|c| (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt()).collect()
    };

    match ent_type_x {
        EntityType::Nodal => {
            let point_vec3 = interleave(&x, &y, &z);
            let point_mag = magnitudes(&point_vec3);
            let cell_x = average_to_cells(&x, mesh);
            let cell_y = average_to_cells(&y, mesh);
            let cell_z = average_to_cells(&z, mesh);
            let cell_vec3 = interleave(&cell_x, &cell_y, &cell_z);
            let cell_mag = magnitudes(&cell_vec3);
            vec![
                ChannelArray {
                    name: vector_name,
                    components: 3,
                    point_values: Some(point_vec3),
                    cell_values: cell_vec3,
                },
                ChannelArray {
                    name: magnitude_name,
                    components: 1,
                    point_values: Some(point_mag),
                    cell_values: cell_mag,
                },
            ]
        }
        EntityType::Elemental => {
            let cell_vec3 = interleave(&x, &y, &z);
            let cell_mag = magnitudes(&cell_vec3);
            vec![
                ChannelArray { name: vector_name, components: 3, point_values: None, cell_values: cell_vec3 },
                ChannelArray { name: magnitude_name, components: 1, point_values: None, cell_values: cell_mag },
            ]
        }
    }
}

/// Resolve one channel's records for this step into named arrays, per its
/// grouping policy (§9 open question, resolved per-channel in `channels.rs`).
fn channel_arrays_for_step(channel: ChannelKind, records: &[&OutputVector], mesh: &Mesh) -> Vec<ChannelArray> {
    match channel.grouping() {
        ChannelGrouping::Geometry => Vec::new(),
        ChannelGrouping::VectorTriplet { vector_name, magnitude_name, extra_scalar_name } => {
            let mut out = Vec::new();
            let chunks = records.chunks_exact(3);
            let remainder = chunks.remainder().to_vec();
            for chunk in chunks {
                out.extend(vector_triplet_arrays(vector_name, magnitude_name, chunk, mesh));
            }
            if let (Some(extra_name), Some(&record)) = (extra_scalar_name, remainder.first()) {
                out.push(scalar_channel_array(extra_name, record, mesh));
            }
            out
        }
        ChannelGrouping::NamedScalars(names) => records
            .iter()
            .zip(names.iter())
            .map(|(record, name)| scalar_channel_array(name, record, mesh))
            .collect(),
    }
}

fn subset(values: &[f64], components: usize, cell_indices: &[usize]) -> Vec<f64> {
    cell_indices
        .iter()
        .flat_map(|&ci| values[ci * components..ci * components + components].iter().copied())
        .collect()
}

/// Write one step's `.vtm` plus its per-property `.vtu` files under
/// `<run_dir>/<sanitized step title>/`. Returns the `.vtm`'s path.
pub fn write_time_step(
    mesh: &Mesh,
    channel_records: &[(ChannelKind, Vec<OutputVector>)],
    step: &OutputSet,
    run_dir: &Path,
    format: VtkFormat,
) -> io::Result<PathBuf> {
    let mut points = mesh.points.clone();

    if let Some((_, records)) = channel_records.iter().find(|(c, _)| *c == ChannelKind::Displacement) {
        apply_displacement(&mut points, mesh, records, step.id);
    }

    let mut point_arrays: Vec<(&'static str, usize, Vec<f64>)> = Vec::new();
    let mut cell_arrays: Vec<(&'static str, usize, Vec<f64>)> = Vec::new();

    for (channel, records) in channel_records {
        if *channel == ChannelKind::Displacement {
            continue;
        }
        let for_step: Vec<&OutputVector> = records.iter().filter(|r| r.set_id == step.id).collect();
        if for_step.is_empty() {
            continue;
        }
        for array in channel_arrays_for_step(*channel, &for_step, mesh) {
            if let Some(pv) = array.point_values {
                point_arrays.push((array.name, array.components, pv));
            }
            cell_arrays.push((array.name, array.components, array.cell_values));
        }
    }

    let title = sanitize_title(&step.title);
    let step_dir = run_dir.join(&title);
    fs::create_dir_all(&step_dir)?;

    let point_numeric_arrays: Vec<NumericArray> = point_arrays
        .iter()
        .map(|(name, components, values)| NumericArray::Float64 { name: *name, components: *components, values })
        .collect();

    let mut vtm_entries = Vec::new();
    for (k, &prop_id) in mesh.unique_property_ids.iter().enumerate() {
        let cell_indices: Vec<usize> = mesh
            .cell_prop_id
            .iter()
            .enumerate()
            .filter(|(_, &p)| p == prop_id)
            .map(|(i, _)| i)
            .collect();

        let vtu_cells: Vec<VtuCell> = cell_indices
            .iter()
            .map(|&ci| VtuCell { vtk_type: mesh.cells[ci].kind.vtk_type_id(), point_indices: &mesh.cells[ci].point_indices })
            .collect();

        let element_id_sub: Vec<i64> = cell_indices.iter().map(|&ci| mesh.cell_element_id[ci]).collect();
        let property_id_sub: Vec<i64> = cell_indices.iter().map(|&ci| mesh.cell_prop_id[ci]).collect();
        let material_id_sub: Vec<i64> = cell_indices.iter().map(|&ci| mesh.cell_material_id[ci]).collect();
        let topology_id_sub: Vec<i64> = cell_indices.iter().map(|&ci| mesh.cell_topology_code[ci]).collect();

        let channel_cell_subsets: Vec<(&'static str, usize, Vec<f64>)> = cell_arrays
            .iter()
            .map(|(name, components, values)| (*name, *components, subset(values, *components, &cell_indices)))
            .collect();

        let mut cell_numeric_arrays = vec![
            NumericArray::Int64 { name: "ElementID", values: &element_id_sub },
            NumericArray::Int64 { name: "PropertyID", values: &property_id_sub },
            NumericArray::Int64 { name: "MaterialID", values: &material_id_sub },
            NumericArray::Int64 { name: "TopologyID", values: &topology_id_sub },
        ];
        for (name, components, values) in &channel_cell_subsets {
            cell_numeric_arrays.push(NumericArray::Float64 { name: *name, components: *components, values });
        }

        let vtu_name = format!("{title}_{k}.vtu");
        let vtu_path = step_dir.join(&vtu_name);
        write_vtu(&vtu_path, &points, &vtu_cells, &point_numeric_arrays, &cell_numeric_arrays, format)?;

        vtm_entries.push(VtmEntry { index: k, name: prop_id.to_string(), relative_path: format!("{title}/{vtu_name}") });
    }

    let vtm_path = run_dir.join(format!("{title}.vtm"));
    write_vtm(&vtm_path, &vtm_entries)?;

    Ok(vtm_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use femn_model::{build_mesh, Element, Node, Property};

    fn minimal_mesh() -> Mesh {
        let nodes: BTreeMap<i64, Node> = [
            (1, Node { id: 1, coords: (0.0, 0.0, 0.0) }),
            (2, Node { id: 2, coords: (1.0, 0.0, 0.0) }),
            (3, Node { id: 3, coords: (0.0, 1.0, 0.0) }),
        ]
        .into_iter()
        .collect();
        let properties: BTreeMap<i64, Property> =
            [(7, Property { id: 7, material_id: 1, title: String::new() })].into_iter().collect();
        let elements = vec![Element { id: 10, prop_id: 7, topology: 2, nodes: vec![1, 2, 3] }];
        let (mesh, _) = build_mesh(&nodes, &elements, &properties, false);
        mesh
    }

    fn vector(set_id: i64, vec_id: i64, ent_type: EntityType, results: &[(i64, f64)]) -> OutputVector {
        OutputVector {
            set_id,
            vec_id,
            title: format!("v{vec_id}"),
            ent_type,
            results: results.iter().copied().collect(),
        }
    }

    #[test]
    fn displacement_offsets_every_point_by_the_fused_triplet() {
        let mesh = minimal_mesh();
        let mut points = mesh.points.clone();
        let records = vec![
            vector(1, 1, EntityType::Nodal, &[(1, 0.5), (2, 0.5), (3, 0.5)]),
            vector(1, 2, EntityType::Nodal, &[(1, 0.0), (2, 0.0), (3, 0.0)]),
            vector(1, 3, EntityType::Nodal, &[(1, 0.0), (2, 0.0), (3, 0.0)]),
        ];
        apply_displacement(&mut points, &mesh, &records, 1);
        assert_eq!(points[mesh.node_index[&1]], [0.5, 0.0, 0.0]);
        assert_eq!(points[mesh.node_index[&2]], [1.5, 0.0, 0.0]);
        assert_eq!(points[mesh.node_index[&3]], [0.5, 1.0, 0.0]);
    }

    #[test]
    fn writes_one_vtm_and_one_vtu_for_minimal_static_mesh() {
        let mesh = minimal_mesh();
        let step = OutputSet { id: 1, value: 0.0, title: "Step 1".to_string() };
        let dir = tempfile::tempdir().unwrap();

        let vtm_path = write_time_step(&mesh, &[], &step, dir.path(), VtkFormat::Ascii).unwrap();
        assert!(vtm_path.exists());

        let vtu_path = dir.path().join("Step 1").join("Step 1_0.vtu");
        assert!(vtu_path.exists());
        let contents = std::fs::read_to_string(&vtu_path).unwrap();
        assert!(contents.contains("NumberOfCells=\"1\""));
    }

    #[test]
    fn elemental_channel_writes_only_cell_variant() {
        let mesh = minimal_mesh();
        let records = vec![vector(1, 1, EntityType::Elemental, &[(10, 3.0)])];
        let arrays = channel_arrays_for_step(ChannelKind::Heat, &records.iter().collect::<Vec<_>>(), &mesh);
        assert_eq!(arrays.len(), 1);
        assert!(arrays[0].point_values.is_none());
        assert_eq!(arrays[0].cell_values, vec![3.0]);
    }

    #[test]
    fn nodal_vector_triplet_derives_cell_values_by_averaging_corners() {
        let mesh = minimal_mesh();
        let records = vec![
            vector(1, 1, EntityType::Nodal, &[(1, 1.0), (2, 2.0), (3, 3.0)]),
            vector(1, 2, EntityType::Nodal, &[(1, 0.0), (2, 0.0), (3, 0.0)]),
            vector(1, 3, EntityType::Nodal, &[(1, 0.0), (2, 0.0), (3, 0.0)]),
        ];
        let arrays = channel_arrays_for_step(ChannelKind::Magnetic, &records.iter().collect::<Vec<_>>(), &mesh);
        let vec_array = &arrays[0];
        assert_eq!(vec_array.cell_values[0], 2.0); // average of 1.0, 2.0, 3.0
    }
}
