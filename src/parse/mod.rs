pub mod document;

pub use document::{
    DocumentError, NodeRecord, PlanDocument, decode_document, decode_plan, encode_document,
    encode_plan, from_plan, into_plan, subtree_record,
};
