//! Hand-written VTK XML writers: `.vtu` (UnstructuredGrid), `.vtm`
//! (vtkMultiBlockDataSet), and `.pvd` (Collection). No XML crate is used —
//! the documents are small and rigidly shaped enough to `writeln!`/`write!`
//! directly, the same way this codebase's existing VTK writer does.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::config::VtkFormat;

/// One named array attached to points or cells.
pub enum NumericArray<'a> {
    Int64 { name: &'a str, values: &'a [i64] },
    Float64 { name: &'a str, components: usize, values: &'a [f64] },
    UInt8 { name: &'a str, values: &'a [u8] },
}

/// One cell: its VTK type code plus point-buffer indices.
pub struct VtuCell<'a> {
    pub vtk_type: u8,
    pub point_indices: &'a [usize],
}

/// Write one `.vtu` unstructured-grid document.
pub fn write_vtu(
    path: &Path,
    points: &[[f64; 3]],
    cells: &[VtuCell],
    point_arrays: &[NumericArray],
    cell_arrays: &[NumericArray],
    format: VtkFormat,
) -> io::Result<()> {
    let mut file = File::create(path)?;
    let format_attr = format_attr(format);

    writeln!(file, "<?xml version=\"1.0\"?>")?;
    writeln!(
        file,
        "<VTKFile type=\"UnstructuredGrid\" version=\"1.0\" byte_order=\"LittleEndian\">"
    )?;
    writeln!(file, "  <UnstructuredGrid>")?;
    writeln!(
        file,
        "    <Piece NumberOfPoints=\"{}\" NumberOfCells=\"{}\">",
        points.len(),
        cells.len()
    )?;

    writeln!(file, "      <Points>")?;
    let flat_points: Vec<f64> = points.iter().flat_map(|p| p.iter().copied()).collect();
    write_data_array(
        &mut file,
        &NumericArray::Float64 { name: "Points", components: 3, values: &flat_points },
        format,
        format_attr,
        3,
    )?;
    writeln!(file, "      </Points>")?;

    write_cells(&mut file, cells, format, format_attr)?;

    writeln!(file, "      <PointData>")?;
    for array in point_arrays {
        write_named_data_array(&mut file, array, format, format_attr)?;
    }
    writeln!(file, "      </PointData>")?;

    writeln!(file, "      <CellData>")?;
    for array in cell_arrays {
        write_named_data_array(&mut file, array, format, format_attr)?;
    }
    writeln!(file, "      </CellData>")?;

    writeln!(file, "    </Piece>")?;
    writeln!(file, "  </UnstructuredGrid>")?;
    writeln!(file, "</VTKFile>")?;

    Ok(())
}

fn write_cells(
    file: &mut File,
    cells: &[VtuCell],
    format: VtkFormat,
    format_attr: &str,
) -> io::Result<()> {
    writeln!(file, "      <Cells>")?;

    let connectivity: Vec<i64> =
        cells.iter().flat_map(|c| c.point_indices.iter().map(|&idx| idx as i64)).collect();
    write_data_array(
        file,
        &NumericArray::Int64 { name: "connectivity", values: &connectivity },
        format,
        format_attr,
        1,
    )?;

    let mut running = 0i64;
    let offsets: Vec<i64> = cells
        .iter()
        .map(|c| {
            running += c.point_indices.len() as i64;
            running
        })
        .collect();
    write_data_array(
        file,
        &NumericArray::Int64 { name: "offsets", values: &offsets },
        format,
        format_attr,
        1,
    )?;

    let types: Vec<u8> = cells.iter().map(|c| c.vtk_type).collect();
    write_data_array(file, &NumericArray::UInt8 { name: "types", values: &types }, format, format_attr, 1)?;

    writeln!(file, "      </Cells>")?;
    Ok(())
}

fn write_named_data_array(
    file: &mut File,
    array: &NumericArray,
    format: VtkFormat,
    format_attr: &str,
) -> io::Result<()> {
    let components = match array {
        NumericArray::Float64 { components, .. } => *components,
        _ => 1,
    };
    write_data_array(file, array, format, format_attr, components)
}

fn write_data_array(
    file: &mut File,
    array: &NumericArray,
    format: VtkFormat,
    format_attr: &str,
    components: usize,
) -> io::Result<()> {
    let (type_attr, name) = match array {
        NumericArray::Int64 { name, .. } => ("Int64", *name),
        NumericArray::Float64 { name, .. } => ("Float64", *name),
        NumericArray::UInt8 { name, .. } => ("UInt8", *name),
    };

    writeln!(
        file,
        "        <DataArray type=\"{type_attr}\" Name=\"{name}\" NumberOfComponents=\"{components}\" format=\"{format_attr}\">"
    )?;

    match format {
        VtkFormat::Ascii => write_ascii_values(file, array)?,
        VtkFormat::Binary => write_binary_values(file, array)?,
    }

    writeln!(file, "        </DataArray>")?;
    Ok(())
}

fn write_ascii_values(file: &mut File, array: &NumericArray) -> io::Result<()> {
    write!(file, "         ")?;
    match array {
        NumericArray::Int64 { values, .. } => {
            for value in *values {
                write!(file, " {value}")?;
            }
        }
        NumericArray::Float64 { values, .. } => {
            for value in *values {
                write!(file, " {value}")?;
            }
        }
        NumericArray::UInt8 { values, .. } => {
            for value in *values {
                write!(file, " {value}")?;
            }
        }
    }
    writeln!(file)
}

/// Binary DataArrays carry a little-endian byte-count header (as a u32)
/// immediately followed by the raw little-endian payload, with the whole
/// thing base64-encoded as one blob (the legacy, uncompressed VTK XML
/// binary encoding).
fn write_binary_values(file: &mut File, array: &NumericArray) -> io::Result<()> {
    let mut bytes = Vec::new();
    let payload_len: u32 = match array {
        NumericArray::Int64 { values, .. } => (values.len() * 8) as u32,
        NumericArray::Float64 { values, .. } => (values.len() * 8) as u32,
        NumericArray::UInt8 { values, .. } => values.len() as u32,
    };
    bytes.extend_from_slice(&payload_len.to_le_bytes());

    match array {
        NumericArray::Int64 { values, .. } => {
            for value in *values {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        NumericArray::Float64 { values, .. } => {
            for value in *values {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        NumericArray::UInt8 { values, .. } => bytes.extend_from_slice(values),
    }

    writeln!(file, "          {}", BASE64.encode(&bytes))
}

fn format_attr(format: VtkFormat) -> &'static str {
    match format {
        VtkFormat::Ascii => "ascii",
        VtkFormat::Binary => "binary",
    }
}

/// One child grid listed in a `.vtm` file.
pub struct VtmEntry {
    pub index: usize,
    pub name: String,
    pub relative_path: String,
}

pub fn write_vtm(path: &Path, entries: &[VtmEntry]) -> io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "<?xml version=\"1.0\"?>")?;
    writeln!(file, "<VTKFile type=\"vtkMultiBlockDataSet\" version=\"1.0\" byte_order=\"LittleEndian\">")?;
    writeln!(file, "  <vtkMultiBlockDataSet>")?;
    for entry in entries {
        writeln!(
            file,
            "    <DataSet index=\"{}\" name=\"{}\" file=\"{}\"/>",
            entry.index, entry.name, entry.relative_path
        )?;
    }
    writeln!(file, "  </vtkMultiBlockDataSet>")?;
    writeln!(file, "</VTKFile>")?;
    Ok(())
}

/// One step listed in a `.pvd` file.
pub struct PvdEntry<'a> {
    pub timestep: f64,
    pub relative_path: &'a str,
}

pub fn write_pvd(path: &Path, entries: &[PvdEntry]) -> io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "<?xml version=\"1.0\"?>")?;
    writeln!(file, "<VTKFile type=\"Collection\" version=\"0.1\" byte_order=\"LittleEndian\">")?;
    writeln!(file, "  <Collection>")?;
    for entry in entries {
        writeln!(
            file,
            "    <DataSet timestep=\"{}\" part=\"0\" file=\"{}\"/>",
            entry.timestep, entry.relative_path
        )?;
    }
    writeln!(file, "  </Collection>")?;
    writeln!(file, "</VTKFile>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_minimal_vtu_with_one_triangle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.vtu");
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let cells = [VtuCell { vtk_type: 5, point_indices: &[0, 1, 2] }];
        let element_id = [10i64];
        let cell_arrays = [NumericArray::Int64 { name: "ElementID", values: &element_id }];

        write_vtu(&path, &points, &cells, &[], &cell_arrays, VtkFormat::Ascii).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("NumberOfPoints=\"3\""));
        assert!(contents.contains("NumberOfCells=\"1\""));
        assert!(contents.contains("Name=\"ElementID\""));
        assert!(contents.contains(" 10"));
    }

    #[test]
    fn binary_format_emits_base64_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.vtu");
        let points = [[0.0, 0.0, 0.0]];
        let cells: [VtuCell; 0] = [];

        write_vtu(&path, &points, &cells, &[], &[], VtkFormat::Binary).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("format=\"binary\""));
    }

    #[test]
    fn writes_vtm_entries_in_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("step.vtm");
        let entries = [
            VtmEntry { index: 0, name: "7".to_string(), relative_path: "step/step_0.vtu".to_string() },
            VtmEntry { index: 1, name: "8".to_string(), relative_path: "step/step_1.vtu".to_string() },
        ];
        write_vtm(&path, &entries).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("name=\"7\""));
        assert!(contents.contains("name=\"8\""));
        assert!(contents.find("name=\"7\"").unwrap() < contents.find("name=\"8\"").unwrap());
    }

    #[test]
    fn writes_pvd_with_timestep_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.pvd");
        let entries =
            [PvdEntry { timestep: 0.01, relative_path: "run/step1.vtm" }, PvdEntry { timestep: 0.02, relative_path: "run/step2.vtm" }];
        write_pvd(&path, &entries).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("timestep=\"0.01\""));
        assert!(contents.contains("timestep=\"0.02\""));
    }
}
