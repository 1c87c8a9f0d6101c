//! In-memory diagnostics log (§7).
//!
//! Recoverable format issues never fail the pipeline — they are appended
//! here and returned alongside whatever was successfully built, the same
//! accumulate-and-continue shape used by earlier parsers.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A single record failed field parsing; the record was skipped.
    MalformedRecord { block_id: i64 },
    /// An element's topology code has no entry in the topology table.
    UnknownTopology { element_id: i64, topology: i64 },
    /// An element's node prefix is shorter than its topology requires.
    ShortConnectivity { element_id: i64, topology: i64 },
    /// An element references a node ID absent from the node table.
    MissingNode { element_id: i64, node_id: i64 },
    /// A result record's set ID is absent from the canonical step axis.
    InconsistentStepAxis { channel: String, set_id: i64 },
    /// A per-step output file could not be written.
    WriteFailed { step_id: i64, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::MalformedRecord { block_id } => {
                write!(f, "malformed record in block {block_id}")
            }
            DiagnosticKind::UnknownTopology { element_id, topology } => {
                write!(f, "element {element_id}: unknown topology code {topology}")
            }
            DiagnosticKind::ShortConnectivity { element_id, topology } => {
                write!(
                    f,
                    "element {element_id}: connectivity shorter than required by topology {topology}"
                )
            }
            DiagnosticKind::MissingNode { element_id, node_id } => {
                write!(f, "element {element_id}: references unknown node {node_id}")
            }
            DiagnosticKind::InconsistentStepAxis { channel, set_id } => {
                write!(f, "channel '{channel}': set id {set_id} absent from canonical step axis")
            }
            DiagnosticKind::WriteFailed { step_id, message } => {
                write!(f, "step {step_id}: write failed: {message}")
            }
        }
    }
}

/// The accumulated log for one parse/build run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind) {
        self.entries.push(Diagnostic { kind });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_extend() {
        let mut log = Diagnostics::new();
        log.push(DiagnosticKind::MalformedRecord { block_id: 403 });

        let mut other = Diagnostics::new();
        other.push(DiagnosticKind::MissingNode { element_id: 10, node_id: 99 });

        log.extend(other);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn display_messages_are_human_readable() {
        let diag = Diagnostic {
            kind: DiagnosticKind::ShortConnectivity { element_id: 10, topology: 8 },
        };
        assert_eq!(
            diag.to_string(),
            "element 10: connectivity shorter than required by topology 8"
        );
    }
}
