//! Wire inspector
//!
//! Decodes a message body into a field tree using only the static
//! descriptors, without building the typed message. Unknown tags and fields
//! with unexpected wire types are shown with their raw payload.

use serde::Serialize;
use std::fmt::Write;

use super::{FieldType, MessageDescriptor};
use crate::codec::wire::{FieldReader, RawField, RawValue, RECURSION_LIMIT};
use crate::error::{wire_type_name, CodecError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectedField {
    pub tag: u32,
    /// Schema name, `None` for unknown tags
    pub name: Option<&'static str>,
    pub wire_type: &'static str,
    pub offset: usize,
    /// The field is declared with a different wire type
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub mismatch: bool,
    pub value: InspectedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InspectedValue {
    Int { value: i64 },
    Bool { value: bool },
    Double { value: f64 },
    String { value: String },
    Enum { value: i32, symbol: Option<&'static str> },
    Message {
        name: &'static str,
        fields: Vec<InspectedField>,
    },
    Varint { value: u64 },
    Fixed64 { value: u64 },
    Fixed32 { value: u32 },
    /// Hex-encoded payload
    Bytes { hex: String },
}

/// Walk `body` as an instance of `descriptor`
pub fn inspect(
    descriptor: &'static MessageDescriptor,
    body: &[u8],
) -> Result<Vec<InspectedField>, CodecError> {
    inspect_nested(descriptor, body, 0, 0)
}

fn inspect_nested(
    descriptor: &'static MessageDescriptor,
    body: &[u8],
    base: usize,
    depth: u32,
) -> Result<Vec<InspectedField>, CodecError> {
    if depth >= RECURSION_LIMIT {
        return Err(CodecError::malformed_at(base, "recursion limit reached"));
    }
    FieldReader::nested(body, base, depth)
        .map(|field| -> Result<InspectedField, CodecError> {
            let field = field?;
            let known = descriptor.field_by_tag(field.tag);
            let mismatch = known.is_some_and(|known| !known.accepts(field.wire_type));
            let value = match known {
                Some(known) if !mismatch => typed_value(known.ty, &field, depth)?,
                _ => raw_value(&field),
            };
            Ok(InspectedField {
                tag: field.tag,
                name: known.map(|known| known.name),
                wire_type: wire_type_name(field.wire_type),
                offset: field.offset,
                mismatch,
                value,
            })
        })
        .collect()
}

fn typed_value(
    ty: FieldType,
    field: &RawField<'_>,
    depth: u32,
) -> Result<InspectedValue, CodecError> {
    Ok(match (ty, field.value) {
        (FieldType::Int32, RawValue::Varint(v)) => InspectedValue::Int {
            value: i64::from(v as i32),
        },
        (FieldType::Int64, RawValue::Varint(v)) => InspectedValue::Int { value: v as i64 },
        (FieldType::Bool, RawValue::Varint(v)) => InspectedValue::Bool { value: v != 0 },
        (FieldType::Enum(descriptor), RawValue::Varint(v)) => InspectedValue::Enum {
            value: v as i32,
            symbol: descriptor.symbol(v as i32),
        },
        (FieldType::Double, RawValue::Fixed64(bits)) => InspectedValue::Double {
            value: f64::from_bits(bits),
        },
        (FieldType::String, RawValue::LengthDelimited(payload)) => {
            match std::str::from_utf8(payload) {
                Ok(text) => InspectedValue::String {
                    value: text.to_string(),
                },
                Err(_) => raw_value(field),
            }
        }
        (FieldType::Message(nested), RawValue::LengthDelimited(payload)) => {
            InspectedValue::Message {
                name: nested.full_name,
                fields: inspect_nested(nested, payload, field.payload_offset(), depth + 1)?,
            }
        }
        // packed repeated scalars
        _ => raw_value(field),
    })
}

fn raw_value(field: &RawField<'_>) -> InspectedValue {
    match field.value {
        RawValue::Varint(value) => InspectedValue::Varint { value },
        RawValue::Fixed64(value) => InspectedValue::Fixed64 { value },
        RawValue::Fixed32(value) => InspectedValue::Fixed32 { value },
        RawValue::LengthDelimited(payload) | RawValue::Group(payload) => InspectedValue::Bytes {
            hex: hex::encode(payload),
        },
    }
}

/// Render an inspected tree as indented text
pub fn render(fields: &[InspectedField]) -> String {
    let mut out = String::new();
    render_into(&mut out, fields, 0);
    out
}

fn render_into(out: &mut String, fields: &[InspectedField], indent: usize) {
    for field in fields {
        let pad = "  ".repeat(indent);
        let name = field.name.unwrap_or("?");
        let _ = write!(out, "{}[{}] {}", pad, field.tag, name);
        match &field.value {
            InspectedValue::Message { name, fields } => {
                let _ = writeln!(out, ": {} {{", name);
                render_into(out, fields, indent + 1);
                let _ = write!(out, "{}}}", pad);
            }
            value => {
                let _ = write!(out, " = {}", render_value(value));
            }
        }
        if field.name.is_none() {
            let _ = write!(out, "  (unknown, {})", field.wire_type);
        } else if field.mismatch {
            let _ = write!(out, "  (wire type mismatch: {})", field.wire_type);
        }
        out.push('\n');
    }
}

fn render_value(value: &InspectedValue) -> String {
    match value {
        InspectedValue::Int { value } => value.to_string(),
        InspectedValue::Bool { value } => value.to_string(),
        InspectedValue::Double { value } => value.to_string(),
        InspectedValue::String { value } => format!("{:?}", value),
        InspectedValue::Enum {
            value,
            symbol: Some(symbol),
        } => format!("{} ({})", symbol, value),
        InspectedValue::Enum {
            value,
            symbol: None,
        } => format!("{} (unrecognized)", value),
        InspectedValue::Varint { value } => value.to_string(),
        InspectedValue::Fixed64 { value } => format!("{:#018x}", value),
        InspectedValue::Fixed32 { value } => format!("{:#010x}", value),
        InspectedValue::Bytes { hex } => format!("0x{}", hex),
        InspectedValue::Message { name, .. } => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::timestamp;
    use crate::proto::{NamespacedName, PlanningType, PodPlanning};
    use crate::schema::POD_PLANNING;
    use prost::encoding;
    use prost::Message;

    #[test]
    fn test_inspect_names_fields_and_symbols() {
        let pod = PodPlanning {
            planning_type: PlanningType::Recommendation,
            namespaced_name: Some(NamespacedName::new("ns1", "pod-a")),
            start_time: Some(timestamp::from_unix_seconds(5)),
            total_cost: 1.5,
            ..Default::default()
        };
        let fields = inspect(&POD_PLANNING, &pod.encode_to_vec()).unwrap();

        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].name, Some("planning_type"));
        assert_eq!(
            fields[0].value,
            InspectedValue::Enum {
                value: 1,
                symbol: Some("PT_RECOMMENDATION")
            }
        );
        match &fields[1].value {
            InspectedValue::Message { name, fields } => {
                assert_eq!(*name, "datahub.resources.v1alpha1.NamespacedName");
                assert_eq!(
                    fields[1].value,
                    InspectedValue::String {
                        value: "pod-a".to_string()
                    }
                );
            }
            other => panic!("unexpected value: {:?}", other),
        }
        assert_eq!(fields[3].value, InspectedValue::Double { value: 1.5 });
    }

    #[test]
    fn test_unknown_and_mismatched_fields_are_raw() {
        let mut body = Vec::new();
        encoding::string::encode(9, &"plan".to_string(), &mut body);
        encoding::string::encode(1, &"oops".to_string(), &mut body);
        encoding::string::encode(30, &"new".to_string(), &mut body);

        let fields = inspect(&POD_PLANNING, &body).unwrap();
        assert!(!fields[0].mismatch);
        assert!(fields[1].mismatch);
        assert_eq!(
            fields[1].value,
            InspectedValue::Bytes {
                hex: "6f6f7073".to_string()
            }
        );
        assert_eq!(fields[2].name, None);

        let text = render(&fields);
        assert!(text.contains("[9] planning_id = \"plan\""));
        assert!(text.contains(
            "[1] planning_type = 0x6f6f7073  (wire type mismatch: length-delimited)"
        ));
        assert!(text.contains("[30] ? = 0x6e6577  (unknown, length-delimited)"));
    }

    #[test]
    fn test_render_nests_messages() {
        let pod = PodPlanning {
            namespaced_name: Some(NamespacedName::new("ns1", "pod-a")),
            ..Default::default()
        };
        let text = render(&inspect(&POD_PLANNING, &pod.encode_to_vec()).unwrap());
        assert_eq!(
            text,
            "[2] namespaced_name: datahub.resources.v1alpha1.NamespacedName {\n  [1] namespace = \"ns1\"\n  [2] name = \"pod-a\"\n}\n"
        );
    }

    #[test]
    fn test_truncated_body_is_an_error() {
        let pod = PodPlanning {
            planning_id: "abcdef".to_string(),
            ..Default::default()
        };
        let bytes = pod.encode_to_vec();
        assert!(inspect(&POD_PLANNING, &bytes[..bytes.len() - 1])
            .unwrap_err()
            .is_malformed());
    }
}
