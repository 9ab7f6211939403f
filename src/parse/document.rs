use std::fmt;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::node::{Cycle, LEAF_LEVEL, Node, NodeId, Results, Year};
use crate::model::plan::{Plan, YearAxis};
use crate::ops::Derived;

/// Error type for decoding a plan document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid document format: {0}")]
    Shape(&'static str),
    #[error("duplicate node id {0}")]
    DuplicateId(NodeId),
    #[error("node {id} has invalid level {level} (expected 1-4)")]
    InvalidLevel { id: NodeId, level: u8 },
    #[error("node {id} has level {level} but level {expected} was expected at its depth")]
    LevelMismatch { id: NodeId, level: u8, expected: u8 },
    #[error("node {0} is a maintenance action but has children")]
    LeafWithChildren(NodeId),
}

/// The persisted/exchanged document. Storage, export and import all use
/// this exact shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub years: Vec<Year>,
    #[serde(rename = "maintenanceData")]
    pub maintenance_data: Vec<NodeRecord>,
}

/// One node as it appears in the document.
///
/// `bomCode`, `parentId` and `rolledUpResults` are derived: they may be
/// written on export but are always ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub task: String,
    pub level: u8,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub bom_code: Option<String>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Cycle::is_unset")]
    pub cycle: Cycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Results>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub rolled_up_results: Option<Results>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeRecord>>,
}

// ---------------------------------------------------------------------------
// Cycle encoding: a number, or "" for the blank marker
// ---------------------------------------------------------------------------

impl Serialize for Cycle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cycle::Years(n) => serializer.serialize_u32(*n),
            Cycle::Unset | Cycle::Empty => serializer.serialize_str(""),
        }
    }
}

impl<'de> Deserialize<'de> for Cycle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CycleVisitor)
    }
}

struct CycleVisitor;

impl<'de> Visitor<'de> for CycleVisitor {
    type Value = Cycle;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer, a numeric string, or \"\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Cycle, E> {
        u32::try_from(v)
            .map(Cycle::Years)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Cycle, E> {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::invalid_value(Unexpected::Signed(v), &self)),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Cycle, E> {
        if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) {
            Ok(Cycle::Years(v as u32))
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Cycle, E> {
        Cycle::parse(v).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Cycle, E> {
        Ok(Cycle::Empty)
    }

    fn visit_none<E: de::Error>(self) -> Result<Cycle, E> {
        Ok(Cycle::Empty)
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Parse document text, checking the top-level shape before decoding nodes.
pub fn decode_document(text: &str) -> Result<PlanDocument, DocumentError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    check_shape(&value)?;
    Ok(serde_json::from_value(value)?)
}

fn check_shape(value: &serde_json::Value) -> Result<(), DocumentError> {
    let obj = value
        .as_object()
        .ok_or(DocumentError::Shape("expected a JSON object"))?;
    if !obj.get("years").is_some_and(|v| v.is_array()) {
        return Err(DocumentError::Shape("`years` must be an array"));
    }
    if !obj.get("maintenanceData").is_some_and(|v| v.is_array()) {
        return Err(DocumentError::Shape("`maintenanceData` must be an array"));
    }
    Ok(())
}

/// Build the node arena from a decoded document.
///
/// The tree is validated while flattening: ids must be unique, levels must
/// run 1..=4 from the roots down, and maintenance actions cannot own
/// children. Result years outside the axis are kept as-is.
pub fn into_plan(doc: PlanDocument) -> Result<Plan, DocumentError> {
    let mut plan = Plan::new(YearAxis::from_years(doc.years));
    for record in doc.maintenance_data {
        attach_record(&mut plan, None, 0, record)?;
    }
    Ok(plan)
}

fn attach_record(
    plan: &mut Plan,
    parent: Option<NodeId>,
    parent_level: u8,
    record: NodeRecord,
) -> Result<(), DocumentError> {
    let NodeRecord {
        id,
        task,
        level,
        cycle,
        results,
        children,
        ..
    } = record;

    if !(1..=LEAF_LEVEL).contains(&level) {
        return Err(DocumentError::InvalidLevel { id, level });
    }
    if level != parent_level + 1 {
        return Err(DocumentError::LevelMismatch {
            id,
            level,
            expected: parent_level + 1,
        });
    }
    let children = children.unwrap_or_default();
    if level == LEAF_LEVEL && !children.is_empty() {
        return Err(DocumentError::LeafWithChildren(id));
    }

    let mut node = Node::new(id, level, task);
    node.cycle = cycle;
    node.results = results.unwrap_or_default();
    plan.attach(parent, node)
        .map_err(|n| DocumentError::DuplicateId(n.id))?;

    for child in children {
        attach_record(plan, Some(id), level, child)?;
    }
    Ok(())
}

/// Decode document text straight into a plan
pub fn decode_plan(text: &str) -> Result<Plan, DocumentError> {
    into_plan(decode_document(text)?)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Build the document for a plan. When `derived` is given, BOM codes,
/// parent ids and container rollups are included.
pub fn from_plan(plan: &Plan, derived: Option<&Derived>) -> PlanDocument {
    PlanDocument {
        years: plan.years.to_vec(),
        maintenance_data: plan
            .roots()
            .iter()
            .filter_map(|&id| node_record(plan, id, derived))
            .collect(),
    }
}

fn node_record(plan: &Plan, id: NodeId, derived: Option<&Derived>) -> Option<NodeRecord> {
    let node = plan.node(id)?;
    let children: Vec<NodeRecord> = node
        .children
        .iter()
        .filter_map(|&c| node_record(plan, c, derived))
        .collect();

    let (results, children) = if node.is_action() {
        let children = (!children.is_empty()).then_some(children);
        (Some(node.results.clone()), children)
    } else {
        let results = (!node.results.is_empty()).then(|| node.results.clone());
        (results, Some(children))
    };

    Some(NodeRecord {
        id,
        task: node.task.clone(),
        level: node.level,
        bom_code: derived.and_then(|d| d.index.bom_code(id).map(str::to_string)),
        parent_id: derived.and(node.parent),
        cycle: node.cycle,
        results,
        rolled_up_results: derived.and_then(|d| d.rollups.get(id).cloned()),
        children,
    })
}

/// The record for one node and everything below it, without derived fields
pub fn subtree_record(plan: &Plan, id: NodeId) -> Option<NodeRecord> {
    node_record(plan, id, None)
}

/// Serialize a document as 2-space indented JSON
pub fn encode_document(doc: &PlanDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

/// Serialize a plan (without derived fields) for storage
pub fn encode_plan(plan: &Plan) -> Result<String, serde_json::Error> {
    encode_document(&from_plan(plan, None))
}
