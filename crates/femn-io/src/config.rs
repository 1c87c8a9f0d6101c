//! Typed pipeline configuration (§6, §10.3). Deserializable from a JSON
//! config file; `femn-cli` overrides individual fields with command-line
//! flags.

use std::path::PathBuf;

use serde::Deserialize;

use crate::channels::ChannelFiles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VtkFormat {
    Ascii,
    Binary,
}

impl Default for VtkFormat {
    fn default() -> Self {
        VtkFormat::Ascii
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_name: String,
    #[serde(default)]
    pub force_2d: bool,
    #[serde(default)]
    pub vtk_format: VtkFormat,
    pub mesh_file: PathBuf,
    #[serde(default)]
    pub channels: ChannelFiles,
}

impl PipelineConfig {
    /// Resolve a path that may be relative to `input_dir`.
    pub fn resolve_input(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.input_dir.join(path)
        }
    }

    pub fn mesh_path(&self) -> PathBuf {
        self.resolve_input(&self.mesh_file)
    }

    /// The root directory the whole run writes under: `<output_dir>/<output_name>`.
    pub fn run_dir(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    pub fn collection_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.pvd", self.output_name))
    }
}
