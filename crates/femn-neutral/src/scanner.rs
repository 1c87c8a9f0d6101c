//! Block-oriented scanner for FEMAP Neutral files.
//!
//! A Neutral file is a sequence of blocks, each delimited by the literal
//! sentinel line `   -1` (three spaces then `-1`). The line after the opening
//! sentinel is the block's integer ID; everything up to the closing sentinel
//! belongs to that block. Blocks with the same ID may repeat anywhere in the
//! file and later instances are appended, never merged, so callers can still
//! see the original record boundaries.

use std::collections::BTreeMap;

/// Integer identifier for a block family (100, 403, 404, ...).
pub type BlockId = i64;

/// One delimited block: its ID plus the raw lines it contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub lines: Vec<String>,
}

/// All blocks in a file, keyed by ID, preserving appearance order per ID.
#[derive(Debug, Clone, Default)]
pub struct BlockTable {
    blocks: BTreeMap<BlockId, Vec<Block>>,
}

impl BlockTable {
    /// The block instances recorded under `id`, in appearance order.
    pub fn blocks_for(&self, id: BlockId) -> &[Block] {
        self.blocks.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All lines across every instance of `id`, concatenated in appearance
    /// order. This is the view typed extractors walk with their fixed
    /// per-record stride.
    pub fn lines_for(&self, id: BlockId) -> Vec<&str> {
        self.blocks_for(id)
            .iter()
            .flat_map(|block| block.lines.iter().map(String::as_str))
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.keys().copied()
    }

    fn push(&mut self, block: Block) {
        self.blocks.entry(block.id).or_default().push(block);
    }
}

const BOUNDARY: &str = "   -1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekBoundary,
    ReadId,
    Accumulate,
}

/// Scan `text` into a [`BlockTable`]. Malformed block headers are skipped
/// without aborting the scan; extractors are responsible for validating
/// block contents.
pub fn scan(text: &str) -> BlockTable {
    let mut table = BlockTable::default();
    let mut state = State::SeekBoundary;
    let mut current: Option<Block> = None;
    let mut just_saw_boundary = false;

    for raw_line in text.lines() {
        match state {
            State::SeekBoundary => {
                if raw_line == BOUNDARY {
                    state = State::ReadId;
                    just_saw_boundary = true;
                }
            }
            State::ReadId => {
                // Doubled-delimiter guard: a stray bare "-1" right after the
                // boundary is not a block ID, it's noise from the emitter.
                if just_saw_boundary && raw_line.trim() == "-1" && raw_line != BOUNDARY {
                    // Stray doubled delimiter: skip it and keep waiting for
                    // the real block ID on the next line.
                    continue;
                }
                just_saw_boundary = false;

                match raw_line.trim().parse::<BlockId>() {
                    Ok(id) => {
                        current = Some(Block { id, lines: Vec::new() });
                        state = State::Accumulate;
                    }
                    Err(_) => state = State::SeekBoundary,
                }
            }
            State::Accumulate => {
                if raw_line == BOUNDARY {
                    if let Some(block) = current.take() {
                        table.push(block);
                    }
                    state = State::ReadId;
                    just_saw_boundary = true;
                } else if let Some(block) = current.as_mut() {
                    block.lines.push(raw_line.to_string());
                }
            }
        }
    }

    // A block left open at EOF (no closing sentinel) is dropped: it never
    // terminated, so its contents are indeterminate.
    table
}
