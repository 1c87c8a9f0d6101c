//! Typed domain entities produced by the block extractors (§3).

use std::collections::BTreeMap;

/// A mesh node (FEMAP block 403).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub coords: (f64, f64, f64),
}

/// An element property / section (FEMAP block 402). Repeated property IDs
/// across multiple block instances overwrite earlier entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub id: i64,
    pub material_id: i64,
    pub title: String,
}

/// An element (FEMAP block 404).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: i64,
    pub prop_id: i64,
    pub topology: i64,
    pub nodes: Vec<i64>,
}

/// A material definition (FEMAP block 601). Only the ID is consumed; the
/// rest of the payload is opaque and deliberately not modeled (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Material {
    pub id: i64,
}

/// One time step or frequency point (FEMAP block 450).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSet {
    pub id: i64,
    pub value: f64,
    pub title: String,
}

/// Discriminates whether an output vector's entity IDs index into the node
/// table or the element table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Nodal,
    Elemental,
}

impl EntityType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            7 => Some(EntityType::Nodal),
            8 => Some(EntityType::Elemental),
            _ => None,
        }
    }
}

/// One named result attached to one output set (FEMAP block 1051).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputVector {
    pub set_id: i64,
    pub vec_id: i64,
    pub title: String,
    pub ent_type: EntityType,
    pub results: BTreeMap<i64, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub version: String,
}
