//! Wire compatibility checks between schema versions
//!
//! A [`SchemaSnapshot`] is a serializable copy of the descriptor tables.
//! CI stores the snapshot of the last release and compares it with the
//! current one; any change that would let an old reader misinterpret new
//! bytes (or the reverse) is reported as a [`BreakingChange`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{all_enums, all_messages, Cardinality, FieldDescriptor, MessageDescriptor};
use crate::error::wire_type_name;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub messages: BTreeMap<String, MessageSnapshot>,
    #[serde(default)]
    pub enums: BTreeMap<String, BTreeMap<String, i32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    /// Fields keyed by name
    pub fields: BTreeMap<String, FieldSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub tag: u32,
    /// Scalar name or full name of the referenced enum/message
    #[serde(rename = "type")]
    pub ty: String,
    pub wire_type: String,
    pub repeated: bool,
}

impl From<&FieldDescriptor> for FieldSnapshot {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            tag: field.tag,
            ty: field.ty.type_name().to_string(),
            wire_type: wire_type_name(field.ty.wire_type()).to_string(),
            repeated: field.cardinality == Cardinality::Repeated,
        }
    }
}

impl From<&MessageDescriptor> for MessageSnapshot {
    fn from(descriptor: &MessageDescriptor) -> Self {
        Self {
            fields: descriptor
                .fields
                .iter()
                .map(|field| (field.name.to_string(), FieldSnapshot::from(field)))
                .collect(),
        }
    }
}

impl SchemaSnapshot {
    /// Snapshot of the schema compiled into this crate
    pub fn current() -> Self {
        let messages = all_messages()
            .iter()
            .map(|descriptor| {
                (
                    descriptor.full_name.to_string(),
                    MessageSnapshot::from(*descriptor),
                )
            })
            .collect();
        let enums = all_enums()
            .iter()
            .map(|descriptor| {
                (
                    descriptor.full_name.to_string(),
                    descriptor
                        .values
                        .iter()
                        .map(|(symbol, value)| (symbol.to_string(), *value))
                        .collect(),
                )
            })
            .collect();
        Self { messages, enums }
    }
}

/// A change that breaks wire compatibility
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum BreakingChange {
    MessageRemoved {
        message: String,
    },
    /// No field with the old tag exists any more
    FieldRemoved {
        message: String,
        field: String,
        tag: u32,
    },
    FieldRenumbered {
        message: String,
        field: String,
        old_tag: u32,
        new_tag: u32,
    },
    WireTypeChanged {
        message: String,
        field: String,
        tag: u32,
        old: String,
        new: String,
    },
    /// A repeated field became singular or the reverse
    CardinalityChanged {
        message: String,
        field: String,
        tag: u32,
    },
    /// An enum symbol now maps to a different number
    EnumValueChanged {
        enum_name: String,
        symbol: String,
        old: i32,
        new: i32,
    },
}

impl fmt::Display for BreakingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakingChange::MessageRemoved { message } => {
                write!(f, "message {} was removed", message)
            }
            BreakingChange::FieldRemoved {
                message,
                field,
                tag,
            } => write!(f, "{}.{} (tag {}) was removed", message, field, tag),
            BreakingChange::FieldRenumbered {
                message,
                field,
                old_tag,
                new_tag,
            } => write!(
                f,
                "{}.{} was renumbered from tag {} to {}",
                message, field, old_tag, new_tag
            ),
            BreakingChange::WireTypeChanged {
                message,
                field,
                tag,
                old,
                new,
            } => write!(
                f,
                "{}.{} (tag {}) changed wire type from {} to {}",
                message, field, tag, old, new
            ),
            BreakingChange::CardinalityChanged {
                message,
                field,
                tag,
            } => write!(
                f,
                "{}.{} (tag {}) changed between repeated and singular",
                message, field, tag
            ),
            BreakingChange::EnumValueChanged {
                enum_name,
                symbol,
                old,
                new,
            } => write!(
                f,
                "{}.{} changed value from {} to {}",
                enum_name, symbol, old, new
            ),
        }
    }
}

/// Compare `current` against `baseline`
///
/// Tags are the wire identity, so a field that keeps its tag under a new
/// name is compatible, and a field that keeps its name under a new tag is
/// reported as renumbered. Added messages, fields and enum values are
/// compatible.
pub fn check_compatibility(
    baseline: &SchemaSnapshot,
    current: &SchemaSnapshot,
) -> Vec<BreakingChange> {
    let mut changes = Vec::new();

    for (message_name, old_message) in &baseline.messages {
        let Some(new_message) = current.messages.get(message_name) else {
            changes.push(BreakingChange::MessageRemoved {
                message: message_name.clone(),
            });
            continue;
        };

        let new_by_tag: BTreeMap<u32, (&String, &FieldSnapshot)> = new_message
            .fields
            .iter()
            .map(|(name, field)| (field.tag, (name, field)))
            .collect();

        for (field_name, old_field) in &old_message.fields {
            match new_by_tag.get(&old_field.tag) {
                Some((_, new_field)) => {
                    if new_field.wire_type != old_field.wire_type {
                        changes.push(BreakingChange::WireTypeChanged {
                            message: message_name.clone(),
                            field: field_name.clone(),
                            tag: old_field.tag,
                            old: old_field.wire_type.clone(),
                            new: new_field.wire_type.clone(),
                        });
                    } else if new_field.repeated != old_field.repeated {
                        changes.push(BreakingChange::CardinalityChanged {
                            message: message_name.clone(),
                            field: field_name.clone(),
                            tag: old_field.tag,
                        });
                    }
                }
                None => match new_message.fields.get(field_name) {
                    Some(moved) => changes.push(BreakingChange::FieldRenumbered {
                        message: message_name.clone(),
                        field: field_name.clone(),
                        old_tag: old_field.tag,
                        new_tag: moved.tag,
                    }),
                    None => changes.push(BreakingChange::FieldRemoved {
                        message: message_name.clone(),
                        field: field_name.clone(),
                        tag: old_field.tag,
                    }),
                },
            }
        }
    }

    for (enum_name, old_values) in &baseline.enums {
        let Some(new_values) = current.enums.get(enum_name) else {
            continue;
        };
        for (symbol, old) in old_values {
            if let Some(new) = new_values.get(symbol) {
                if new != old {
                    changes.push(BreakingChange::EnumValueChanged {
                        enum_name: enum_name.clone(),
                        symbol: symbol.clone(),
                        old: *old,
                        new: *new,
                    });
                }
            }
        }
    }

    changes
}
