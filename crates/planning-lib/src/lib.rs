//! Resource planning schema and wire codec
//!
//! This crate provides:
//! - Message types for container, pod and controller plannings
//! - A length-delimited protobuf codec with lenient and strict decoding
//! - Static schema descriptors, a wire inspector and compatibility checks
//! - Advisory validation and Prometheus metrics

pub mod codec;
pub mod error;
pub mod observability;
pub mod proto;
pub mod schema;
pub mod validate;

pub use codec::{
    AnyPlanning, Codec, DecodeMode, DecodeReport, Framing, MessageKind, PlanningMessage,
};
pub use error::{CodecError, TypeMismatch};
pub use observability::CodecMetrics;
pub use proto::*;
pub use validate::{Validate, ValidationIssue};
