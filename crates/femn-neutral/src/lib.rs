//! Block-oriented lexical scanner for FEMAP Neutral files.
//!
//! This crate only knows about the free-form record syntax (§4.1) and the
//! block delimiter convention (§4.2) of the FEMAP Neutral format. It has no
//! notion of nodes, elements, or any other domain concept — that typed view
//! is built on top of this crate by `femn-model`.

mod scanner;
mod tokenizer;

pub use scanner::{scan, Block, BlockId, BlockTable};
pub use tokenizer::{normalize_null, split_record, NULL_SENTINEL};
