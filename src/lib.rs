//! Decode the JVM's compact descriptor and signature encodings into a
//! structured type model, and correlate methods discovered by independent
//! extraction sources into a queryable cross-reference index.
//!
//! The crate consumes pre-extracted, fully materialized facts: raw
//! descriptor strings, source-level declaration facts, compiled call edges,
//! and dynamic-analysis payloads. Parsing source files or class files,
//! scanning classpaths, and running dynamic analysis belong to the
//! surrounding tooling.
//!
//! Decoding is pure and synchronous; the index is read-mostly once built.
//! Concurrent readers need no locking, while [`MethodIndex::update`] needs
//! single-writer discipline if dynamic facts arrive from several producers.

pub mod descriptor;
pub mod index;
pub mod ingest;
pub mod ir;
pub mod resolve;
pub mod signature;

pub use descriptor::{
    DecodeError, ReturnKind, decode_class, decode_method_descriptor, decode_type,
    method_param_count, method_return_kind,
};
pub use index::{Association, IndexError, MethodEntry, MethodIndex};
pub use ingest::{
    RawCallEdge, RawMethodRef, Rejected, correlate, decode_call_edges, decode_declarations,
};
pub use ir::{ClassRef, MethodDescriptor, MethodIdentity, MethodSignature, Primitive, Type};
pub use resolve::{PackageLookup, SourceTypeResolver};
pub use signature::{decode_method_signature, decode_signature_type};
