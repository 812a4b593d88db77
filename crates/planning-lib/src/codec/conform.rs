//! Descriptor-driven pre-pass run before prost decodes a body
//!
//! Walks the wire bytes against the static descriptors, recursing into
//! nested messages. Fields whose wire type disagrees with the schema are
//! dropped (lenient) or fail the decode (strict). The input is only copied
//! when something has to be dropped.

use std::borrow::Cow;

use prost::encoding::{self, WireType};
use tracing::warn;

use super::wire::{FieldReader, RawField, RawValue, RECURSION_LIMIT};
use super::{DecodeMode, DecodeReport, UnknownTag, UnrecognizedEnum};
use crate::error::{CodecError, TypeMismatch};
use crate::schema::{FieldDescriptor, FieldType, MessageDescriptor};

pub(crate) fn conform<'a>(
    descriptor: &'static MessageDescriptor,
    body: &'a [u8],
    mode: DecodeMode,
    report: &mut DecodeReport,
) -> Result<Cow<'a, [u8]>, CodecError> {
    conform_nested(descriptor, body, 0, 0, mode, report)
}

enum Action {
    Keep,
    Drop,
    Replace(Vec<u8>),
}

fn conform_nested<'a>(
    descriptor: &'static MessageDescriptor,
    body: &'a [u8],
    base: usize,
    depth: u32,
    mode: DecodeMode,
    report: &mut DecodeReport,
) -> Result<Cow<'a, [u8]>, CodecError> {
    if depth >= RECURSION_LIMIT {
        return Err(CodecError::malformed_at(base, "recursion limit reached"));
    }

    let mut rewritten: Option<Vec<u8>> = None;
    for field in FieldReader::nested(body, base, depth) {
        let field = field?;
        let action = match descriptor.field_by_tag(field.tag) {
            None => {
                report.unknown_fields.push(UnknownTag {
                    message: descriptor.full_name,
                    tag: field.tag,
                    wire_type: field.wire_type,
                    offset: field.offset,
                    retained: descriptor.retains_unknown
                        && field.wire_type != WireType::StartGroup,
                });
                Action::Keep
            }
            Some(known) if !known.accepts(field.wire_type) => {
                let mismatch = TypeMismatch {
                    message: descriptor.full_name,
                    field: known.name,
                    tag: field.tag,
                    expected: known.ty.wire_type(),
                    actual: field.wire_type,
                };
                if mode == DecodeMode::Strict {
                    return Err(CodecError::TypeMismatch(mismatch));
                }
                warn!(
                    event = "field_dropped",
                    schema_message = %mismatch.message,
                    field = %mismatch.field,
                    tag = mismatch.tag,
                    offset = field.offset,
                    "Dropping field with mismatched wire type"
                );
                report.mismatches.push(mismatch);
                Action::Drop
            }
            Some(known) => check_known(descriptor, known, &field, depth, mode, report)?,
        };

        let start = field.offset - base;
        match action {
            Action::Keep => {
                if let Some(out) = rewritten.as_mut() {
                    out.extend_from_slice(field.encoded);
                }
            }
            Action::Drop => {
                rewritten.get_or_insert_with(|| body[..start].to_vec());
            }
            Action::Replace(bytes) => {
                rewritten
                    .get_or_insert_with(|| body[..start].to_vec())
                    .extend_from_slice(&bytes);
            }
        }
    }

    Ok(match rewritten {
        Some(bytes) => Cow::Owned(bytes),
        None => Cow::Borrowed(body),
    })
}

/// Recurse into nested messages and note enum values without a symbol
fn check_known(
    descriptor: &'static MessageDescriptor,
    known: &'static FieldDescriptor,
    field: &RawField<'_>,
    depth: u32,
    mode: DecodeMode,
    report: &mut DecodeReport,
) -> Result<Action, CodecError> {
    match (known.ty, field.value) {
        (FieldType::Message(nested), RawValue::LengthDelimited(payload)) => {
            let conformed = conform_nested(
                nested,
                payload,
                field.payload_offset(),
                depth + 1,
                mode,
                report,
            )?;
            Ok(match conformed {
                Cow::Borrowed(_) => Action::Keep,
                Cow::Owned(payload) => {
                    let mut bytes = Vec::with_capacity(
                        encoding::key_len(field.tag)
                            + encoding::encoded_len_varint(payload.len() as u64)
                            + payload.len(),
                    );
                    encoding::encode_key(field.tag, WireType::LengthDelimited, &mut bytes);
                    encoding::encode_varint(payload.len() as u64, &mut bytes);
                    bytes.extend_from_slice(&payload);
                    Action::Replace(bytes)
                }
            })
        }
        (FieldType::Enum(enum_descriptor), RawValue::Varint(raw)) => {
            let value = raw as i32;
            if !enum_descriptor.is_known(value) {
                report.unrecognized_enums.push(UnrecognizedEnum {
                    message: descriptor.full_name,
                    field: known.name,
                    enum_name: enum_descriptor.full_name,
                    value,
                });
            }
            Ok(Action::Keep)
        }
        _ => Ok(Action::Keep),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CONTROLLER, NAMESPACED_NAME, POD_PLANNING};

    #[test]
    fn test_clean_body_is_borrowed() {
        let mut body = Vec::new();
        encoding::string::encode(1, &"ns1".to_string(), &mut body);
        encoding::string::encode(2, &"pod-a".to_string(), &mut body);

        let mut report = DecodeReport::default();
        let conformed =
            conform(&NAMESPACED_NAME, &body, DecodeMode::Lenient, &mut report).unwrap();
        assert!(matches!(conformed, Cow::Borrowed(_)));
        assert!(report.is_clean());
    }

    #[test]
    fn test_mismatch_in_nested_message_is_dropped() {
        // Controller { namespaced_name { namespace: varint 3 (should be a string), name: "a" } }
        let mut inner = Vec::new();
        encoding::int32::encode(1, &3, &mut inner);
        encoding::string::encode(2, &"a".to_string(), &mut inner);
        let mut body = Vec::new();
        encoding::bytes::encode(1, &inner, &mut body);
        encoding::int32::encode(2, &1, &mut body);

        let mut report = DecodeReport::default();
        let conformed = conform(&CONTROLLER, &body, DecodeMode::Lenient, &mut report).unwrap();

        let mut expected_inner = Vec::new();
        encoding::string::encode(2, &"a".to_string(), &mut expected_inner);
        let mut expected = Vec::new();
        encoding::bytes::encode(1, &expected_inner, &mut expected);
        encoding::int32::encode(2, &1, &mut expected);

        assert_eq!(&conformed[..], expected.as_slice());
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].field, "namespace");
        assert_eq!(report.mismatches[0].actual, WireType::Varint);
    }

    #[test]
    fn test_strict_mode_fails_on_mismatch() {
        let mut body = Vec::new();
        encoding::string::encode(1, &"oops".to_string(), &mut body);

        let mut report = DecodeReport::default();
        let err = conform(&POD_PLANNING, &body, DecodeMode::Strict, &mut report).unwrap_err();
        match err {
            CodecError::TypeMismatch(mismatch) => {
                assert_eq!(mismatch.field, "planning_type");
                assert_eq!(mismatch.expected, WireType::Varint);
                assert_eq!(mismatch.actual, WireType::LengthDelimited);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tags_and_enum_values_are_reported() {
        let mut body = Vec::new();
        encoding::int32::encode(1, &5, &mut body);
        encoding::string::encode(20, &"future".to_string(), &mut body);

        let mut report = DecodeReport::default();
        let conformed = conform(&POD_PLANNING, &body, DecodeMode::Strict, &mut report).unwrap();
        assert_eq!(&conformed[..], body.as_slice());
        assert_eq!(report.unknown_fields.len(), 1);
        assert_eq!(report.unknown_fields[0].tag, 20);
        assert!(report.unknown_fields[0].retained);
        assert_eq!(report.unrecognized_enums.len(), 1);
        assert_eq!(report.unrecognized_enums[0].value, 5);
    }
}
