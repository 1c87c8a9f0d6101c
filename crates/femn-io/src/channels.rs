//! Result channels (§3, §6) and the per-channel array-grouping policy that
//! resolves the open question in §9: how consecutive output-vector records
//! for a channel fuse into named point/cell arrays.

use std::path::PathBuf;

/// One named result stream. Displacement is geometric (applied to point
/// coordinates, never emitted as its own array); the rest attach arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelKind {
    Displacement,
    Magnetic,
    Current,
    Force,
    LorentzForce,
    Heat,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 6] = [
        ChannelKind::Displacement,
        ChannelKind::Magnetic,
        ChannelKind::Current,
        ChannelKind::Force,
        ChannelKind::LorentzForce,
        ChannelKind::Heat,
    ];

    /// Label used in diagnostics and log lines.
    pub fn tag(self) -> &'static str {
        match self {
            ChannelKind::Displacement => "displacement",
            ChannelKind::Magnetic => "magnetic",
            ChannelKind::Current => "current",
            ChannelKind::Force => "force",
            ChannelKind::LorentzForce => "lorentz-force",
            ChannelKind::Heat => "heat",
        }
    }

    pub fn grouping(self) -> ChannelGrouping {
        match self {
            ChannelKind::Displacement => ChannelGrouping::Geometry,
            ChannelKind::Magnetic => ChannelGrouping::VectorTriplet {
                vector_name: "B-Vec (T)",
                magnitude_name: "B-Mag (T)",
                extra_scalar_name: Some("Flux (A/m)"),
            },
            ChannelKind::Current => ChannelGrouping::VectorTriplet {
                vector_name: "J-Vec (A/m^2)",
                magnitude_name: "J-Mag (A/m^2)",
                extra_scalar_name: Some("Loss (W/m^3)"),
            },
            ChannelKind::Force => ChannelGrouping::VectorTriplet {
                vector_name: "F Nodal-Vec (N/m^3)",
                magnitude_name: "F Nodal-Mag (N/m^3)",
                extra_scalar_name: None,
            },
            ChannelKind::LorentzForce => ChannelGrouping::VectorTriplet {
                vector_name: "F Lorents-Vec (N/m^3)",
                magnitude_name: "F Lorents-Mag (N/m^3)",
                extra_scalar_name: None,
            },
            ChannelKind::Heat => ChannelGrouping::NamedScalars(&["Heat Density (W/m^3)", "Heat (W)"]),
        }
    }
}

/// How a channel's output-vector records for one step fuse into arrays.
///
/// `Displacement` never reaches the array writer: the time-step writer
/// consumes it directly to offset point coordinates. The other two variants
/// are an explicit, per-channel policy rather than a single heuristic
/// applied to every channel (§9 open question).
#[derive(Debug, Clone, Copy)]
pub enum ChannelGrouping {
    Geometry,
    /// Every three consecutive records for one set ID fuse into a 3-vector
    /// plus derived magnitude. A leftover single record (when the channel's
    /// record count for a step isn't a multiple of three) becomes a named
    /// scalar when `extra_scalar_name` is set, and is otherwise dropped.
    VectorTriplet {
        vector_name: &'static str,
        magnitude_name: &'static str,
        extra_scalar_name: Option<&'static str>,
    },
    /// Each record in source order becomes its own scalar array, named by
    /// position from this list. Records beyond the list length are dropped.
    NamedScalars(&'static [&'static str]),
}

/// Paths to the six channel files. The mesh file lives in [`crate::config::PipelineConfig`]
/// separately since it's always required; these are all optional.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ChannelFiles {
    #[serde(default)]
    pub displacement: Option<PathBuf>,
    #[serde(default)]
    pub magnetic: Option<PathBuf>,
    #[serde(default)]
    pub current: Option<PathBuf>,
    #[serde(default)]
    pub force: Option<PathBuf>,
    #[serde(default)]
    pub lorentz_force: Option<PathBuf>,
    #[serde(default)]
    pub heat: Option<PathBuf>,
}

impl ChannelFiles {
    /// The configured `(channel, path)` pairs, skipping absent channels.
    pub fn configured(&self) -> Vec<(ChannelKind, PathBuf)> {
        let slots = [
            (ChannelKind::Displacement, &self.displacement),
            (ChannelKind::Magnetic, &self.magnetic),
            (ChannelKind::Current, &self.current),
            (ChannelKind::Force, &self.force),
            (ChannelKind::LorentzForce, &self.lorentz_force),
            (ChannelKind::Heat, &self.heat),
        ];
        slots
            .into_iter()
            .filter_map(|(channel, path)| path.clone().map(|p| (channel, p)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_skips_absent_channels() {
        let files = ChannelFiles {
            displacement: Some(PathBuf::from("disp.dat")),
            magnetic: None,
            current: Some(PathBuf::from("cur.dat")),
            force: None,
            lorentz_force: None,
            heat: None,
        };
        let configured = files.configured();
        assert_eq!(configured.len(), 2);
        assert_eq!(configured[0].0, ChannelKind::Displacement);
        assert_eq!(configured[1].0, ChannelKind::Current);
    }

    #[test]
    fn heat_uses_named_scalars_not_vector_triplet() {
        match ChannelKind::Heat.grouping() {
            ChannelGrouping::NamedScalars(names) => {
                assert_eq!(names, ["Heat Density (W/m^3)", "Heat (W)"]);
            }
            _ => panic!("heat channel must use named-scalar grouping"),
        }
    }
}
