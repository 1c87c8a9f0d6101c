//! Result-file parsing pool, VTK/VTU/VTM/PVD XML writers, and pipeline
//! orchestration (§4.5-§4.8, §10).

mod channels;
mod collection;
mod config;
mod error;
mod pipeline;
mod result_pool;
mod sanitize;
mod timestep;
mod vtk_xml;

pub use channels::{ChannelFiles, ChannelGrouping, ChannelKind};
pub use collection::WrittenStep;
pub use config::{PipelineConfig, VtkFormat};
pub use error::{PipelineError, Result};
pub use pipeline::{run, RunReport};
pub use result_pool::{parse_channels_parallel, ChannelOutput};
pub use sanitize::sanitize_title;
