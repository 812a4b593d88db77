//! Codec error taxonomy

use prost::encoding::WireType;
use std::fmt;
use thiserror::Error;

/// Errors returned by the planning codec
///
/// Unrecognized enum values are not errors: they decode to the
/// `Unrecognized(raw)` variant of the open enum and encode back unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The byte sequence violates the base wire grammar (truncated key or
    /// length, invalid varint, declared length past the end of input).
    #[error("malformed wire data: {reason}")]
    MalformedWireData { reason: String },

    /// A field arrived with a wire type other than the one its schema declares.
    /// Only returned in strict decode mode.
    #[error("type mismatch: {0}")]
    TypeMismatch(TypeMismatch),

    /// The encoded message could not be written to the destination buffer.
    #[error("encoding failed: {0}")]
    Encoding(String),
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CodecError::MalformedWireData {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_at(offset: usize, reason: impl fmt::Display) -> Self {
        CodecError::MalformedWireData {
            reason: format!("at byte {}: {}", offset, reason),
        }
    }

    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::MalformedWireData { .. } => "malformed",
            CodecError::TypeMismatch(_) => "type_mismatch",
            CodecError::Encoding(_) => "encoding",
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, CodecError::MalformedWireData { .. })
    }
}

impl From<prost::DecodeError> for CodecError {
    fn from(err: prost::DecodeError) -> Self {
        CodecError::malformed(err.to_string())
    }
}

impl From<prost::EncodeError> for CodecError {
    fn from(err: prost::EncodeError) -> Self {
        CodecError::Encoding(err.to_string())
    }
}

/// A field whose wire type disagrees with the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatch {
    /// Full name of the message declaring the field
    pub message: &'static str,
    pub field: &'static str,
    pub tag: u32,
    pub expected: WireType,
    pub actual: WireType,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} (tag {}) expects {} but got {}",
            self.message,
            self.field,
            self.tag,
            wire_type_name(self.expected),
            wire_type_name(self.actual)
        )
    }
}

/// Human-readable name of a protobuf wire type
pub fn wire_type_name(wire_type: WireType) -> &'static str {
    match wire_type {
        WireType::Varint => "varint",
        WireType::SixtyFourBit => "fixed64",
        WireType::LengthDelimited => "length-delimited",
        WireType::StartGroup => "start-group",
        WireType::EndGroup => "end-group",
        WireType::ThirtyTwoBit => "fixed32",
    }
}
