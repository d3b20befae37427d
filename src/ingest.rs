use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::descriptor::{DecodeError, decode_class};
use crate::index::MethodIndex;
use crate::ir::MethodIdentity;

/// Raw method reference as emitted by the extractors: owner class
/// descriptor, method name, and raw method descriptor.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RawMethodRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl RawMethodRef {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Decode the owner and build the method's structural identity. The
    /// descriptor is carried raw; only the owner needs decoding here.
    pub fn identity(&self) -> Result<MethodIdentity, DecodeError> {
        let owner = decode_class(&self.owner)?;
        Ok(MethodIdentity::new(
            owner,
            self.name.clone(),
            self.descriptor.clone(),
        ))
    }
}

impl fmt::Display for RawMethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}{}", self.owner, self.name, self.descriptor)
    }
}

/// Compiled-level fact: one call instruction in `caller` targeting `callee`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawCallEdge {
    pub caller: RawMethodRef,
    pub callee: RawMethodRef,
}

impl RawCallEdge {
    pub fn new(caller: RawMethodRef, callee: RawMethodRef) -> Self {
        Self { caller, callee }
    }
}

/// A fact dropped during ingestion, with the decode failure that caused it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rejected {
    pub fact: String,
    pub error: DecodeError,
}

/// Decode declaration facts, skipping undecodable entries.
///
/// Descriptor strings are independent, so the batch decodes in parallel;
/// output order follows input order either way. A malformed fact is logged
/// and reported, never fatal to the batch.
pub fn decode_declarations<D: Send>(
    declared: Vec<(RawMethodRef, D)>,
) -> (Vec<(MethodIdentity, D)>, Vec<Rejected>) {
    let results: Vec<_> = declared
        .into_par_iter()
        .map(|(raw, facts)| match raw.identity() {
            Ok(identity) => Ok((identity, facts)),
            Err(error) => Err(Rejected {
                fact: raw.to_string(),
                error,
            }),
        })
        .collect();
    partition(results, "declaration")
}

/// Decode compiled call-edge facts, skipping undecodable entries. An edge is
/// dropped as a whole if either end fails to decode.
pub fn decode_call_edges(
    edges: Vec<RawCallEdge>,
) -> (Vec<(MethodIdentity, MethodIdentity)>, Vec<Rejected>) {
    let results: Vec<_> = edges
        .into_par_iter()
        .map(|edge| {
            let caller = edge.caller.identity().map_err(|error| Rejected {
                fact: edge.caller.to_string(),
                error,
            })?;
            let callee = edge.callee.identity().map_err(|error| Rejected {
                fact: edge.callee.to_string(),
                error,
            })?;
            Ok((caller, callee))
        })
        .collect();
    partition(results, "call edge")
}

/// Decode both fact batches and build a full index in one pass. Rejected
/// facts from either batch are reported together.
pub fn correlate<D: Send, Y>(
    declared: Vec<(RawMethodRef, D)>,
    edges: Vec<RawCallEdge>,
) -> (MethodIndex<D, Y>, Vec<Rejected>) {
    let (declared, mut rejected) = decode_declarations(declared);
    let (edges, edge_rejects) = decode_call_edges(edges);
    rejected.extend(edge_rejects);
    (MethodIndex::with_call_edges(declared, edges), rejected)
}

fn partition<T>(results: Vec<Result<T, Rejected>>, kind: &str) -> (Vec<T>, Vec<Rejected>) {
    let mut accepted = Vec::with_capacity(results.len());
    let mut rejected = Vec::new();
    for result in results {
        match result {
            Ok(value) => accepted.push(value),
            Err(reject) => {
                warn!(
                    fact = %reject.fact,
                    error = %reject.error,
                    "skipping undecodable {}",
                    kind
                );
                rejected.push(reject);
            }
        }
    }
    (accepted, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(owner: &str, name: &str) -> RawMethodRef {
        RawMethodRef::new(owner, name, "()V")
    }

    #[test]
    fn identities_decode_owner_chains() {
        let identity = raw("Lcom/example/Outer$Inner;", "run")
            .identity()
            .expect("decode owner");
        assert_eq!(identity.owner.names, vec!["Outer", "Inner"]);
        assert_eq!(identity.name, "run");
        assert_eq!(identity.descriptor, "()V");
    }

    #[test]
    fn malformed_declarations_do_not_abort_the_batch() {
        let declared = vec![
            (raw("Lcom/example/Good;", "first"), 1),
            (raw("com/example/NoTag", "broken"), 2),
            (raw("Lcom/example/Good;", "second"), 3),
        ];

        let (accepted, rejected) = decode_declarations(declared);

        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[0].1, 1);
        assert_eq!(accepted[1].1, 3);
        assert_eq!(rejected.len(), 1);
        assert!(matches!(
            rejected[0].error,
            DecodeError::InvalidClassName { .. }
        ));
    }

    #[test]
    fn an_edge_is_dropped_when_either_end_fails() {
        let edges = vec![
            RawCallEdge::new(
                raw("Lcom/example/Caller;", "run"),
                raw("Lcom/example/Callee;", "target"),
            ),
            RawCallEdge::new(
                raw("Lcom/example/Caller;", "run"),
                raw("Lcom/example/Unterminated", "target"),
            ),
        ];

        let (accepted, rejected) = decode_call_edges(edges);

        assert_eq!(accepted.len(), 1);
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn correlate_builds_an_index_and_reports_rejects() {
        let declared = vec![
            (raw("Lcom/example/Widget;", "refresh"), "declared"),
            (raw("bad", "broken"), "declared"),
        ];
        let edges = vec![RawCallEdge::new(
            raw("Lcom/example/Screen;", "paint"),
            raw("Lcom/example/Widget;", "refresh"),
        )];

        let (index, rejected) = correlate::<&str, ()>(declared, edges);

        assert_eq!(index.len(), 1);
        assert_eq!(rejected.len(), 1);
        let target = raw("Lcom/example/Widget;", "refresh")
            .identity()
            .expect("decode");
        let association = index
            .associate(&target)
            .expect("usages indexed")
            .expect("entry present");
        assert_eq!(association.callers.len(), 1);
    }
}
