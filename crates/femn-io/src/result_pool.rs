//! Result parser pool (§4.5): one worker per configured channel, run in
//! parallel, each returning owned output sets and vectors. A channel that
//! fails to read does not abort the others.

use std::collections::BTreeMap;
use std::path::PathBuf;

use femn_model::{extract_output_sets, extract_output_vectors, Diagnostics, OutputSet, OutputVector};
use femn_neutral::scan;
use rayon::prelude::*;

use crate::channels::ChannelKind;

/// Everything one channel's result file yielded.
pub struct ChannelOutput {
    pub channel: ChannelKind,
    pub output_sets: BTreeMap<i64, OutputSet>,
    pub vectors: Vec<OutputVector>,
    pub diagnostics: Diagnostics,
    /// Set when the file could not be read at all; `output_sets`/`vectors`
    /// are empty in that case and other channels are unaffected.
    pub read_error: Option<String>,
}

/// Parse every configured channel's result file in parallel.
pub fn parse_channels_parallel(channels: &[(ChannelKind, PathBuf)]) -> Vec<ChannelOutput> {
    channels
        .par_iter()
        .map(|(channel, path)| parse_one_channel(*channel, path))
        .collect()
}

fn parse_one_channel(channel: ChannelKind, path: &std::path::Path) -> ChannelOutput {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("channel '{}' ({}): {err}", channel.tag(), path.display());
            return ChannelOutput {
                channel,
                output_sets: BTreeMap::new(),
                vectors: Vec::new(),
                diagnostics: Diagnostics::new(),
                read_error: Some(err.to_string()),
            };
        }
    };

    let table = scan(&text);
    let (output_sets, sets_diag) = extract_output_sets(&table);
    let (vectors, vectors_diag) = extract_output_vectors(&table);

    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(sets_diag);
    diagnostics.extend(vectors_diag);

    ChannelOutput { channel, output_sets, vectors, diagnostics, read_error: None }
}

/// The caller's merge rule from §4.5: output sets come from the first
/// channel (in the given order) whose set table is non-empty.
pub fn canonical_output_sets(channels: &[ChannelOutput]) -> BTreeMap<i64, OutputSet> {
    channels
        .iter()
        .find(|c| !c.output_sets.is_empty())
        .map(|c| c.output_sets.clone())
        .unwrap_or_default()
}
