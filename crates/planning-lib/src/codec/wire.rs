//! Field-level reader over raw protobuf bytes
//!
//! Splits a message body into `(tag, wire type, payload)` records without
//! interpreting them. Used by the conform pass and the wire inspector.

use prost::bytes::Buf;
use prost::encoding::{self, WireType};

use crate::error::CodecError;

/// Maximum nesting of groups and messages walked by the reader
pub const RECURSION_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Fixed32(u32),
    LengthDelimited(&'a [u8]),
    /// Body of a group, without its start and end keys
    Group(&'a [u8]),
}

/// One field as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawField<'a> {
    pub tag: u32,
    pub wire_type: WireType,
    pub value: RawValue<'a>,
    /// Key and payload bytes of the field
    pub encoded: &'a [u8],
    /// Offset of the key from the start of the outermost input
    pub offset: usize,
}

impl<'a> RawField<'a> {
    /// Absolute offset of the payload of a length-delimited field
    pub fn payload_offset(&self) -> usize {
        match self.value {
            RawValue::LengthDelimited(payload) | RawValue::Group(payload) => {
                self.offset + (self.encoded.len() - payload.len())
                    - self.trailer_len()
            }
            _ => self.offset,
        }
    }

    fn trailer_len(&self) -> usize {
        match self.value {
            RawValue::Group(_) => encoding::key_len(self.tag),
            _ => 0,
        }
    }
}

/// Iterator over the fields of one message body
///
/// Yields `Err` once on the first malformed field and then stops.
pub struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
    depth: u32,
    failed: bool,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::nested(data, 0, 0)
    }

    /// Reader over a payload found `base` bytes into the outermost input
    pub fn nested(data: &'a [u8], base: usize, depth: u32) -> Self {
        Self {
            data,
            pos: 0,
            base,
            depth,
            failed: false,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    fn read_field(&mut self) -> Result<RawField<'a>, CodecError> {
        let start = self.pos;
        let mut cursor = &self.data[start..];
        let (tag, wire_type) = encoding::decode_key(&mut cursor)
            .map_err(|e| CodecError::malformed_at(self.base + start, e))?;
        let value_start = self.data.len() - cursor.len();

        let value = match wire_type {
            WireType::Varint => RawValue::Varint(
                encoding::decode_varint(&mut cursor)
                    .map_err(|e| CodecError::malformed_at(self.base + value_start, e))?,
            ),
            WireType::SixtyFourBit => {
                if cursor.remaining() < 8 {
                    return Err(self.truncated(value_start, 8, cursor.remaining()));
                }
                RawValue::Fixed64(cursor.get_u64_le())
            }
            WireType::ThirtyTwoBit => {
                if cursor.remaining() < 4 {
                    return Err(self.truncated(value_start, 4, cursor.remaining()));
                }
                RawValue::Fixed32(cursor.get_u32_le())
            }
            WireType::LengthDelimited => {
                let declared = encoding::decode_varint(&mut cursor)
                    .map_err(|e| CodecError::malformed_at(self.base + value_start, e))?;
                let len = match usize::try_from(declared) {
                    Ok(len) if len <= cursor.len() => len,
                    _ => {
                        return Err(CodecError::malformed_at(
                            self.base + value_start,
                            format!(
                                "declared length {} exceeds the {} remaining bytes",
                                declared,
                                cursor.len()
                            ),
                        ))
                    }
                };
                let (payload, rest) = cursor.split_at(len);
                cursor = rest;
                RawValue::LengthDelimited(payload)
            }
            WireType::StartGroup => {
                let (body_len, total_len) =
                    self.group_extent(cursor, tag, self.base + value_start)?;
                let body = &cursor[..body_len];
                cursor = &cursor[total_len..];
                RawValue::Group(body)
            }
            WireType::EndGroup => {
                return Err(CodecError::malformed_at(
                    self.base + start,
                    format!("end-group for tag {} without a matching start", tag),
                ))
            }
        };

        let end = self.data.len() - cursor.len();
        self.pos = end;
        Ok(RawField {
            tag,
            wire_type,
            value,
            encoded: &self.data[start..end],
            offset: self.base + start,
        })
    }

    /// Length of a group body and of the body plus its end key
    fn group_extent(
        &self,
        data: &'a [u8],
        tag: u32,
        base: usize,
    ) -> Result<(usize, usize), CodecError> {
        if self.depth + 1 >= RECURSION_LIMIT {
            return Err(CodecError::malformed_at(base, "recursion limit reached"));
        }
        let mut inner = FieldReader::nested(data, base, self.depth + 1);
        loop {
            if inner.pos >= data.len() {
                return Err(CodecError::malformed_at(
                    base + data.len(),
                    format!("group {} is not terminated", tag),
                ));
            }
            let mut peek = &data[inner.pos..];
            let (inner_tag, inner_wire_type) = encoding::decode_key(&mut peek)
                .map_err(|e| CodecError::malformed_at(base + inner.pos, e))?;
            if inner_wire_type == WireType::EndGroup {
                if inner_tag != tag {
                    return Err(CodecError::malformed_at(
                        base + inner.pos,
                        format!("group {} closed by end-group {}", tag, inner_tag),
                    ));
                }
                let total = data.len() - peek.len();
                return Ok((inner.pos, total));
            }
            inner.read_field()?;
        }
    }

    fn truncated(&self, offset: usize, needed: usize, available: usize) -> CodecError {
        CodecError::malformed_at(
            self.base + offset,
            format!("need {} bytes but only {} remain", needed, available),
        )
    }
}

impl<'a> Iterator for FieldReader<'a> {
    type Item = Result<RawField<'a>, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        let result = self.read_field();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(data: &[u8]) -> Result<Vec<RawField<'_>>, CodecError> {
        FieldReader::new(data).collect()
    }

    #[test]
    fn test_reads_each_wire_type() {
        let mut buf = Vec::new();
        encoding::int32::encode(1, &150, &mut buf);
        encoding::double::encode(2, &1.5, &mut buf);
        encoding::string::encode(3, &"abc".to_string(), &mut buf);
        encoding::fixed32::encode(4, &7, &mut buf);

        let fields = fields(&buf).unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].value, RawValue::Varint(150));
        assert_eq!(fields[1].value, RawValue::Fixed64(1.5f64.to_bits()));
        assert_eq!(fields[2].value, RawValue::LengthDelimited(b"abc"));
        assert_eq!(fields[2].offset, 3 + 9);
        assert_eq!(fields[2].payload_offset(), 3 + 9 + 2);
        assert_eq!(fields[3].value, RawValue::Fixed32(7));
    }

    #[test]
    fn test_group_body_is_captured() {
        // field 5 start-group, field 1 varint 1, field 5 end-group, field 2 varint 2
        let data = [0x2b, 0x08, 0x01, 0x2c, 0x10, 0x02];
        let fields = fields(&data).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].value, RawValue::Group(&[0x08, 0x01]));
        assert_eq!(fields[0].encoded.len(), 4);
        assert_eq!(fields[1].value, RawValue::Varint(2));
    }

    #[test]
    fn test_unterminated_group_is_malformed() {
        let data = [0x2b, 0x08, 0x01];
        assert!(fields(&data).unwrap_err().is_malformed());
    }

    #[test]
    fn test_stray_end_group_is_malformed() {
        let data = [0x2c];
        assert!(fields(&data).unwrap_err().is_malformed());
    }

    #[test]
    fn test_declared_length_past_end_reports_offset() {
        let data = [0x08, 0x01, 0x1a, 0x05, b'a'];
        let err = fields(&data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed wire data: at byte 3: declared length 5 exceeds the 1 remaining bytes"
        );
    }

    #[test]
    fn test_reader_stops_after_first_error() {
        let data = [0xff];
        let mut reader = FieldReader::new(&data);
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }
}
