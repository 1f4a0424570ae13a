//! Update diffs as SPARQL `INSERT DATA` / `DELETE DATA` requests.
//!
//! Snapshots record their change as ground update requests:
//!
//! ```text
//! DELETE DATA { GRAPH <g> { <s> <p> "old" . } };
//! INSERT DATA { GRAPH <g> { <s> <p> "new" . } }
//! ```
//!
//! Parsing is delegated to `spargebra`. Only the ground-data operations are
//! accepted and graph names are dropped; any other update operation, and any
//! quoted triple, is a syntax error.

use chrona_core::models::{sorted_triples, TripleSet, UpdateDiff};
use oxrdf::{Subject, Term, Triple};
use spargebra::term::{GroundQuad, GroundSubject, GroundTerm};
use spargebra::{GraphUpdateOperation, Update};

/// Malformed or unsupported update text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("update syntax error: {message}")]
pub struct UpdateSyntaxError {
    pub message: String,
}

impl UpdateSyntaxError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Decode an update request into the triples it inserts and deletes. A
/// triple named on both sides is kept on both and rejected at replay.
pub fn parse_update(text: &str) -> Result<UpdateDiff, UpdateSyntaxError> {
    let mut diff = UpdateDiff::default();
    if text.trim().is_empty() {
        return Ok(diff);
    }

    let update = Update::parse(text, None).map_err(|e| UpdateSyntaxError::new(e.to_string()))?;
    for operation in update.operations {
        match operation {
            GraphUpdateOperation::InsertData { data } => {
                diff.inserted.extend(
                    data.into_iter()
                        .map(|quad| Triple::new(quad.subject, quad.predicate, quad.object)),
                );
            }
            GraphUpdateOperation::DeleteData { data } => {
                for quad in data {
                    diff.deleted.insert(ground_triple(quad)?);
                }
            }
            _ => {
                return Err(UpdateSyntaxError::new(
                    "only INSERT DATA and DELETE DATA are supported",
                ))
            }
        }
    }
    Ok(diff)
}

#[allow(unreachable_patterns)]
fn ground_triple(quad: GroundQuad) -> Result<Triple, UpdateSyntaxError> {
    let subject: Subject = match quad.subject {
        GroundSubject::NamedNode(node) => node.into(),
        _ => return Err(UpdateSyntaxError::new("quoted triples are not supported")),
    };
    let object: Term = match quad.object {
        GroundTerm::NamedNode(node) => node.into(),
        GroundTerm::Literal(literal) => literal.into(),
        _ => return Err(UpdateSyntaxError::new("quoted triples are not supported")),
    };
    Ok(Triple::new(subject, quad.predicate, object))
}

/// Render a diff as an update request `parse_update` accepts. Triples are
/// written in sorted order so equal diffs render identically.
pub fn render_update(diff: &UpdateDiff) -> String {
    let mut operations = Vec::with_capacity(2);
    if !diff.deleted.is_empty() {
        operations.push(format!("DELETE DATA {{ {} }}", data_block(&diff.deleted)));
    }
    if !diff.inserted.is_empty() {
        operations.push(format!("INSERT DATA {{ {} }}", data_block(&diff.inserted)));
    }
    operations.join(" ; ")
}

fn data_block(triples: &TripleSet) -> String {
    sorted_triples(triples)
        .into_iter()
        .map(|t| format!("{t} ."))
        .collect::<Vec<_>>()
        .join(" ")
}
