//! Collection writer (§4.8): the `.pvd` index listing every step that wrote
//! successfully, in ascending step-ID order, with paths relative to the
//! collection file regardless of write-completion order.

use std::io;
use std::path::{Path, PathBuf};

use crate::vtk_xml::{write_pvd, PvdEntry};

/// One step that wrote its `.vtm` successfully.
pub struct WrittenStep {
    pub step_id: i64,
    pub timestep: f64,
    pub vtm_path: PathBuf,
}

/// Write `<output_dir>/<output_name>.pvd`. `steps` need not be sorted; this
/// sorts by step ID before emitting so the final document's order never
/// depends on write-completion order (§5).
pub fn write_collection(collection_path: &Path, output_dir: &Path, mut steps: Vec<WrittenStep>) -> io::Result<()> {
    steps.sort_by_key(|s| s.step_id);

    let relative_paths: Vec<String> = steps
        .iter()
        .map(|s| {
            s.vtm_path
                .strip_prefix(output_dir)
                .unwrap_or(&s.vtm_path)
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();

    let entries: Vec<PvdEntry> = steps
        .iter()
        .zip(relative_paths.iter())
        .map(|(s, path)| PvdEntry { timestep: s.timestep, relative_path: path })
        .collect();

    write_pvd(collection_path, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_steps_in_ascending_step_id_order_regardless_of_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path();
        let collection_path = output_dir.join("run.pvd");

        let steps = vec![
            WrittenStep { step_id: 2, timestep: 0.02, vtm_path: output_dir.join("run/Step_2.vtm") },
            WrittenStep { step_id: 1, timestep: 0.01, vtm_path: output_dir.join("run/Step_1.vtm") },
        ];

        write_collection(&collection_path, output_dir, steps).unwrap();

        let contents = std::fs::read_to_string(&collection_path).unwrap();
        let first = contents.find("timestep=\"0.01\"").unwrap();
        let second = contents.find("timestep=\"0.02\"").unwrap();
        assert!(first < second);
        assert!(contents.contains("file=\"run/Step_1.vtm\""));
    }

    #[test]
    fn skips_steps_that_failed_to_write() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path();
        let collection_path = output_dir.join("run.pvd");

        let steps =
            vec![WrittenStep { step_id: 1, timestep: 0.01, vtm_path: output_dir.join("run/Step_1.vtm") }];
        write_collection(&collection_path, output_dir, steps).unwrap();

        let contents = std::fs::read_to_string(&collection_path).unwrap();
        assert_eq!(contents.matches("<DataSet").count(), 1);
    }
}
