//! Top-level pipeline orchestration: read the mesh, build it, parse result
//! channels in parallel, write every step in parallel, then the collection
//! index. The only fatal error is an unreadable mesh file (§7); everything
//! else recoverable accumulates into the returned [`Diagnostics`] log.

use std::path::PathBuf;
use std::sync::Mutex;

use femn_model::{build_mesh, extract_document, DiagnosticKind, Diagnostics, OutputSet};
use femn_neutral::scan;
use rayon::prelude::*;

use crate::collection::{write_collection, WrittenStep};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::result_pool::{canonical_output_sets, parse_channels_parallel};
use crate::timestep::write_time_step;

pub struct RunReport {
    pub diagnostics: Diagnostics,
    pub steps_written: usize,
    pub collection_path: PathBuf,
}

pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    let mesh_path = config.mesh_path();
    let mesh_text = std::fs::read_to_string(&mesh_path)
        .map_err(|source| PipelineError::UnreadableMesh { path: mesh_path.clone(), source })?;

    let table = scan(&mesh_text);
    let (document, mut diagnostics) = extract_document(&table);
    let (mesh, mesh_diag) =
        build_mesh(&document.nodes, &document.elements, &document.properties, config.force_2d);
    diagnostics.extend(mesh_diag);
    log::info!("mesh loaded from {}: {} points, {} cells", mesh_path.display(), mesh.points.len(), mesh.cell_count());

    let configured_channels: Vec<_> = config
        .channels
        .configured()
        .into_iter()
        .map(|(channel, path)| (channel, config.resolve_input(&path)))
        .collect();
    let channel_outputs = parse_channels_parallel(&configured_channels);
    let mut canonical_sets = canonical_output_sets(&channel_outputs);
    if canonical_sets.is_empty() {
        // No result channel carried a step axis (e.g. a purely static mesh
        // with no transient results): fall back to one implicit step so the
        // mesh itself still gets written out.
        canonical_sets.insert(0, OutputSet { id: 0, value: 0.0, title: config.output_name.clone() });
    }
    log::debug!("canonical step axis has {} steps", canonical_sets.len());

    let mut channel_records = Vec::with_capacity(channel_outputs.len());
    for output in channel_outputs {
        diagnostics.extend(output.diagnostics);
        let mut kept = Vec::with_capacity(output.vectors.len());
        for vector in output.vectors {
            if canonical_sets.contains_key(&vector.set_id) {
                kept.push(vector);
            } else {
                diagnostics.push(DiagnosticKind::InconsistentStepAxis {
                    channel: output.channel.tag().to_string(),
                    set_id: vector.set_id,
                });
            }
        }
        channel_records.push((output.channel, kept));
    }

    let run_dir = config.run_dir();
    std::fs::create_dir_all(&run_dir)
        .map_err(|source| PipelineError::OutputDir { path: run_dir.clone(), source })?;

    let write_diagnostics = Mutex::new(Diagnostics::new());
    let steps: Vec<_> = canonical_sets.values().collect();
    let written: Vec<WrittenStep> = steps
        .par_iter()
        .filter_map(|step| match write_time_step(&mesh, &channel_records, step, &run_dir, config.vtk_format) {
            Ok(vtm_path) => {
                log::info!("wrote step {} -> {}", step.id, vtm_path.display());
                Some(WrittenStep { step_id: step.id, timestep: step.value, vtm_path })
            }
            Err(err) => {
                log::warn!("step {} failed to write: {err}", step.id);
                write_diagnostics
                    .lock()
                    .unwrap()
                    .push(DiagnosticKind::WriteFailed { step_id: step.id, message: err.to_string() });
                None
            }
        })
        .collect();
    diagnostics.extend(write_diagnostics.into_inner().unwrap());

    let steps_written = written.len();
    let collection_path = config.collection_path();
    write_collection(&collection_path, &config.output_dir, written)
        .map_err(|source| PipelineError::WriteCollection { path: collection_path.clone(), source })?;
    log::info!("wrote collection {} ({steps_written} steps)", collection_path.display());

    Ok(RunReport { diagnostics, steps_written, collection_path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelFiles;
    use crate::config::VtkFormat;
    use std::io::Write;

    fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn unreadable_mesh_file_is_the_only_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            input_dir: dir.path().to_path_buf(),
            output_dir: dir.path().join("out"),
            output_name: "run1".to_string(),
            force_2d: false,
            vtk_format: VtkFormat::Ascii,
            mesh_file: PathBuf::from("missing.dat"),
            channels: ChannelFiles::default(),
        };
        let result = run(&config);
        assert!(matches!(result, Err(PipelineError::UnreadableMesh { .. })));
    }

    #[test]
    fn minimal_static_mesh_produces_one_step_and_one_pvd_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_text = "\
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
        write_file(dir.path(), "mesh.dat", mesh_text);

        let config = PipelineConfig {
            input_dir: dir.path().to_path_buf(),
            output_dir: dir.path().join("out"),
            output_name: "run1".to_string(),
            force_2d: false,
            vtk_format: VtkFormat::Ascii,
            mesh_file: PathBuf::from("mesh.dat"),
            channels: ChannelFiles::default(),
        };

        let report = run(&config).expect("run should succeed");
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.steps_written, 1);
        assert!(report.collection_path.exists());

        let pvd = std::fs::read_to_string(&report.collection_path).unwrap();
        assert_eq!(pvd.matches("<DataSet").count(), 1);
        assert!(pvd.contains("timestep=\"0\""));
    }

    #[test]
    fn channel_paths_resolve_relative_to_input_dir_like_the_mesh_path() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_text = "\
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
        write_file(dir.path(), "mesh.dat", mesh_text);

        let displacement_text = "\
   -1
450
1,0,0,0,0,0
Step 1
0
0.01
0
   -1
   -1
1051
1,1,1,0,0,0
DX
0,0,0
0
0
0,0,0,7
0
1,0.5
2,0.5
3,0.5
-1,0.
   -1
   -1
1051
1,1,2,0,0,0
DY
0,0,0
0
0
0,0,0,7
0
1,0.0
2,0.0
3,0.0
-1,0.
   -1
   -1
1051
1,1,3,0,0,0
DZ
0,0,0
0
0
0,0,0,7
0
1,0.0
2,0.0
3,0.0
-1,0.
   -1
";
        // channel file lives under input_dir, referenced only by its file name,
        // the same way mesh_file is.
        write_file(dir.path(), "disp.dat", displacement_text);

        let config = PipelineConfig {
            input_dir: dir.path().to_path_buf(),
            output_dir: dir.path().join("out"),
            output_name: "run1".to_string(),
            force_2d: false,
            vtk_format: VtkFormat::Ascii,
            mesh_file: PathBuf::from("mesh.dat"),
            channels: ChannelFiles { displacement: Some(PathBuf::from("disp.dat")), ..Default::default() },
        };

        let report = run(&config).expect("run should succeed");
        assert!(report.diagnostics.is_empty(), "channel file should resolve under input_dir, not CWD");

        let vtu_path = dir.path().join("out").join("run1").join("Step 1").join("Step 1_0.vtu");
        let contents = std::fs::read_to_string(&vtu_path).unwrap();
        // node 1 starts at (0,0,0) and is displaced by (0.5, 0.0, 0.0)
        assert!(contents.contains(" 0.5 0 0 "));
    }
}
