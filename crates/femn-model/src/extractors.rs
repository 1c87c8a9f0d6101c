//! Typed extractors, one per FEMAP block family (§4.2, §4.6).
//!
//! Each extractor walks the concatenated lines of its block family with a
//! fixed per-record stride. A record that fails to parse is skipped (one
//! line advance) and logged to [`Diagnostics`]; the scan resumes from the
//! next line rather than aborting.

use std::collections::BTreeMap;

use femn_neutral::{normalize_null, split_record, BlockTable};

use crate::diagnostics::{Diagnostics, DiagnosticKind};
use crate::entities::{Element, EntityType, Header, Material, Node, OutputSet, OutputVector, Property};

const BLOCK_HEADER: i64 = 100;
const BLOCK_NODES: i64 = 403;
const BLOCK_PROPERTIES: i64 = 402;
const BLOCK_ELEMENTS: i64 = 404;
const BLOCK_MATERIALS: i64 = 601;
const BLOCK_OUTPUT_SETS: i64 = 450;
const BLOCK_OUTPUT_VECTORS: i64 = 1051;

pub fn extract_header(table: &BlockTable) -> Header {
    let lines = table.lines_for(BLOCK_HEADER);
    Header {
        title: lines.first().map(|l| normalize_null(l)).unwrap_or_default(),
        version: lines.get(1).map(|l| l.trim().to_string()).unwrap_or_default(),
    }
}

pub fn extract_nodes(table: &BlockTable) -> (BTreeMap<i64, Node>, Diagnostics) {
    let mut nodes = BTreeMap::new();
    let mut diagnostics = Diagnostics::new();

    for line in table.lines_for(BLOCK_NODES) {
        let fields = split_record(line);
        match parse_node_record(&fields) {
            Some(node) => {
                nodes.insert(node.id, node);
            }
            None => diagnostics.push(DiagnosticKind::MalformedRecord { block_id: BLOCK_NODES }),
        }
    }

    (nodes, diagnostics)
}

fn parse_node_record(fields: &[String]) -> Option<Node> {
    if fields.len() < 14 {
        return None;
    }
    let id = fields[0].parse::<i64>().ok()?;
    let x = fields[11].parse::<f64>().ok()?;
    let y = fields[12].parse::<f64>().ok()?;
    let z = fields[13].parse::<f64>().ok()?;
    Some(Node { id, coords: (x, y, z) })
}

pub fn extract_properties(table: &BlockTable) -> (BTreeMap<i64, Property>, Diagnostics) {
    let mut properties = BTreeMap::new();
    let mut diagnostics = Diagnostics::new();

    let lines = table.lines_for(BLOCK_PROPERTIES);
    const STRIDE: usize = 7;
    let mut i = 0;
    while i < lines.len() {
        let header_fields = split_record(lines[i]);
        match parse_property_header(&header_fields) {
            Some((id, material_id)) => {
                let title = lines
                    .get(i + 1)
                    .map(|l| normalize_null(l))
                    .unwrap_or_default();
                properties.insert(id, Property { id, material_id, title });
                i += STRIDE;
            }
            None => {
                diagnostics.push(DiagnosticKind::MalformedRecord { block_id: BLOCK_PROPERTIES });
                i += 1;
            }
        }
    }

    (properties, diagnostics)
}

fn parse_property_header(fields: &[String]) -> Option<(i64, i64)> {
    if fields.len() < 3 {
        return None;
    }
    let id = fields[0].parse::<i64>().ok()?;
    let material_id = fields[2].parse::<i64>().ok()?;
    Some((id, material_id))
}

pub fn extract_elements(table: &BlockTable) -> (Vec<Element>, Diagnostics) {
    let mut elements = Vec::new();
    let mut diagnostics = Diagnostics::new();

    let lines = table.lines_for(BLOCK_ELEMENTS);
    const STRIDE: usize = 7;
    let mut i = 0;
    while i < lines.len() {
        let header_fields = split_record(lines[i]);
        match parse_element_header(&header_fields) {
            Some((id, prop_id, topology)) => {
                let mut nodes = Vec::new();
                for offset in 1..=2 {
                    if let Some(line) = lines.get(i + offset) {
                        nodes.extend(parse_node_run(line));
                    }
                }
                elements.push(Element { id, prop_id, topology, nodes });
                i += STRIDE;
            }
            None => {
                diagnostics.push(DiagnosticKind::MalformedRecord { block_id: BLOCK_ELEMENTS });
                i += 1;
            }
        }
    }

    (elements, diagnostics)
}

fn parse_element_header(fields: &[String]) -> Option<(i64, i64, i64)> {
    if fields.len() < 5 {
        return None;
    }
    let id = fields[0].parse::<i64>().ok()?;
    let prop_id = fields[2].parse::<i64>().ok()?;
    let topology = fields[4].parse::<i64>().ok()?;
    Some((id, prop_id, topology))
}

/// Parse up to 10 node IDs from one connectivity line, dropping zeros (and
/// any field that isn't a valid integer).
fn parse_node_run(line: &str) -> Vec<i64> {
    split_record(line)
        .iter()
        .take(10)
        .filter_map(|f| f.parse::<i64>().ok())
        .filter(|&id| id != 0)
        .collect()
}

pub fn extract_materials(table: &BlockTable) -> (BTreeMap<i64, Material>, Diagnostics) {
    let mut materials = BTreeMap::new();
    let mut diagnostics = Diagnostics::new();

    for line in table.lines_for(BLOCK_MATERIALS) {
        let fields = split_record(line);
        match fields.first().and_then(|f| f.parse::<i64>().ok()) {
            Some(id) => {
                materials.insert(id, Material { id });
            }
            None => diagnostics.push(DiagnosticKind::MalformedRecord { block_id: BLOCK_MATERIALS }),
        }
    }

    (materials, diagnostics)
}

pub fn extract_output_sets(table: &BlockTable) -> (BTreeMap<i64, OutputSet>, Diagnostics) {
    let mut sets = BTreeMap::new();
    let mut diagnostics = Diagnostics::new();

    let lines = table.lines_for(BLOCK_OUTPUT_SETS);
    const STRIDE: usize = 6;
    let mut i = 0;
    while i < lines.len() {
        let header_fields = split_record(lines[i]);
        match header_fields.first().and_then(|f| f.parse::<i64>().ok()) {
            Some(id) => {
                let title = lines
                    .get(i + 1)
                    .map(|l| normalize_null(l))
                    .unwrap_or_default();
                let value = lines
                    .get(i + 3)
                    .and_then(|l| split_record(l).first().and_then(|f| f.parse::<f64>().ok()))
                    .unwrap_or(0.0);
                sets.insert(id, OutputSet { id, value, title });
                i += STRIDE;
            }
            None => {
                diagnostics.push(DiagnosticKind::MalformedRecord { block_id: BLOCK_OUTPUT_SETS });
                i += 1;
            }
        }
    }

    (sets, diagnostics)
}

/// Literal terminator fields for a block-1051 result-record sequence.
const TERMINATOR_FIELDS: (&str, &str) = ("-1", "0.");

fn is_terminator(fields: &[String]) -> bool {
    fields.len() >= 2 && fields[0] == TERMINATOR_FIELDS.0 && fields[1] == TERMINATOR_FIELDS.1
}

pub fn extract_output_vectors(table: &BlockTable) -> (Vec<OutputVector>, Diagnostics) {
    let mut vectors = Vec::new();
    let mut diagnostics = Diagnostics::new();

    let lines = table.lines_for(BLOCK_OUTPUT_VECTORS);
    let mut i = 0;
    while i < lines.len() {
        match parse_one_output_vector(&lines, i) {
            Some((vector, next_i)) => {
                vectors.push(vector);
                i = next_i;
            }
            None => {
                diagnostics.push(DiagnosticKind::MalformedRecord { block_id: BLOCK_OUTPUT_VECTORS });
                i += 1;
            }
        }
    }

    (vectors, diagnostics)
}

/// Parse one output-vector record starting at `lines[start]`. Returns the
/// vector plus the index just past its terminator line.
fn parse_one_output_vector(lines: &[&str], start: usize) -> Option<(OutputVector, usize)> {
    const FIXED_HEADER_LEN: usize = 7;
    if start + FIXED_HEADER_LEN > lines.len() {
        return None;
    }

    let header = split_record(lines[start]);
    if header.len() < 2 {
        return None;
    }
    let set_id = header[0].parse::<i64>().ok()?;
    let vec_id = header[1].parse::<i64>().ok()?;

    let title = normalize_null(lines[start + 1]);

    let ent_type_line = split_record(lines[start + 5]);
    let ent_type = ent_type_line
        .get(3)
        .and_then(|f| f.parse::<i64>().ok())
        .and_then(EntityType::from_code)?;

    let mut results = BTreeMap::new();
    let mut i = start + FIXED_HEADER_LEN;

    while i < lines.len() {
        let fields = split_record(lines[i]);
        if is_terminator(&fields) {
            i += 1;
            break;
        }

        if fields.len() == 2 {
            if let (Ok(entity_id), Ok(value)) =
                (fields[0].parse::<i64>(), fields[1].parse::<f64>())
            {
                results.insert(entity_id, value);
            }
            i += 1;
        } else if fields.len() > 2 {
            let (consumed, parsed) = parse_run_record(lines, i, &fields);
            for (entity_id, value) in parsed {
                results.insert(entity_id, value);
            }
            i = consumed;
        } else {
            // A blank or unparsable line inside the record body: skip it.
            i += 1;
        }
    }

    Some((
        OutputVector { set_id, vec_id, title, ent_type, results },
        i,
    ))
}

/// Parse a format-2 "run" record starting at `lines[i]`, whose fields are
/// already split in `first_fields`. Continuation lines (pure value lists)
/// are consumed until enough values are collected or the terminator is
/// seen. Returns the index to resume at and the expanded `(entity_id,
/// value)` pairs.
fn parse_run_record(lines: &[&str], i: usize, first_fields: &[String]) -> (usize, Vec<(i64, f64)>) {
    let mut cursor = i + 1;

    let start_id = first_fields[0].parse::<i64>().ok();
    let end_id = first_fields[1].parse::<i64>().ok();
    let (Some(start_id), Some(end_id)) = (start_id, end_id) else {
        return (cursor, Vec::new());
    };

    let expected = (end_id - start_id + 1).max(0) as usize;
    let mut values: Vec<f64> = first_fields[2..]
        .iter()
        .filter_map(|f| f.parse::<f64>().ok())
        .collect();

    while values.len() < expected && cursor < lines.len() {
        let fields = split_record(lines[cursor]);
        if is_terminator(&fields) {
            break;
        }
        values.extend(fields.iter().filter_map(|f| f.parse::<f64>().ok()));
        cursor += 1;
    }

    let n = values.len().min(expected);
    let pairs = (0..n).map(|k| (start_id + k as i64, values[k])).collect();
    (cursor, pairs)
}
