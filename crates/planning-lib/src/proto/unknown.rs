//! Passthrough storage for fields this schema version does not know.

use prost::bytes::{Buf, BufMut};
use prost::encoding::{self, DecodeContext, WireType};
use prost::DecodeError;

/// Unknown fields captured while decoding, re-emitted verbatim on encode
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnknownFields {
    fields: Vec<UnknownField>,
}

/// One unknown field as it appeared on the wire
#[derive(Clone, Debug, PartialEq)]
pub struct UnknownField {
    pub tag: u32,
    pub value: UnknownValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UnknownValue {
    Varint(u64),
    Fixed64(u64),
    Fixed32(u32),
    LengthDelimited(Vec<u8>),
}

impl UnknownValue {
    pub fn wire_type(&self) -> WireType {
        match self {
            UnknownValue::Varint(_) => WireType::Varint,
            UnknownValue::Fixed64(_) => WireType::SixtyFourBit,
            UnknownValue::Fixed32(_) => WireType::ThirtyTwoBit,
            UnknownValue::LengthDelimited(_) => WireType::LengthDelimited,
        }
    }

    fn payload_len(&self) -> usize {
        match self {
            UnknownValue::Varint(value) => encoding::encoded_len_varint(*value),
            UnknownValue::Fixed64(_) => 8,
            UnknownValue::Fixed32(_) => 4,
            UnknownValue::LengthDelimited(bytes) => {
                encoding::encoded_len_varint(bytes.len() as u64) + bytes.len()
            }
        }
    }
}

impl UnknownFields {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnknownField> {
        self.fields.iter()
    }

    pub fn push(&mut self, tag: u32, value: UnknownValue) {
        self.fields.push(UnknownField { tag, value });
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Capture one field. Groups are skipped rather than retained.
    pub(crate) fn merge_field<B>(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
    {
        let value = match wire_type {
            WireType::Varint => UnknownValue::Varint(encoding::decode_varint(buf)?),
            WireType::SixtyFourBit => {
                if buf.remaining() < 8 {
                    return Err(DecodeError::new("buffer underflow"));
                }
                UnknownValue::Fixed64(buf.get_u64_le())
            }
            WireType::ThirtyTwoBit => {
                if buf.remaining() < 4 {
                    return Err(DecodeError::new("buffer underflow"));
                }
                UnknownValue::Fixed32(buf.get_u32_le())
            }
            WireType::LengthDelimited => {
                let mut bytes: Vec<u8> = Vec::new();
                encoding::bytes::merge(wire_type, &mut bytes, buf, ctx)?;
                UnknownValue::LengthDelimited(bytes)
            }
            WireType::StartGroup | WireType::EndGroup => {
                return encoding::skip_field(wire_type, tag, buf, ctx);
            }
        };
        self.push(tag, value);
        Ok(())
    }

    pub(crate) fn encode_raw<B>(&self, buf: &mut B)
    where
        B: BufMut,
    {
        for field in &self.fields {
            encoding::encode_key(field.tag, field.value.wire_type(), buf);
            match &field.value {
                UnknownValue::Varint(value) => encoding::encode_varint(*value, buf),
                UnknownValue::Fixed64(value) => buf.put_u64_le(*value),
                UnknownValue::Fixed32(value) => buf.put_u32_le(*value),
                UnknownValue::LengthDelimited(bytes) => {
                    encoding::encode_varint(bytes.len() as u64, buf);
                    buf.put_slice(bytes);
                }
            }
        }
    }

    pub(crate) fn encoded_len(&self) -> usize {
        self.fields
            .iter()
            .map(|field| encoding::key_len(field.tag) + field.value.payload_len())
            .sum()
    }
}
