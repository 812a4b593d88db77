//! Encode/decode contract for planning messages
//!
//! [`Codec`] turns planning messages into bytes and back. By default each
//! message is written length-delimited (a varint body length followed by the
//! body) and the decoder requires the declared length to match the input
//! exactly, so any truncated input is rejected. [`Framing::Bare`] reads and
//! writes the body alone for transports that already frame messages.
//!
//! Decoding runs a descriptor-driven pass over the body before handing it to
//! prost. In [`DecodeMode::Lenient`] fields whose wire type disagrees with the
//! schema are dropped and recorded in a [`DecodeReport`]; in
//! [`DecodeMode::Strict`] they fail the decode with
//! [`CodecError::TypeMismatch`].
//!
//! The codec holds no mutable state and may be shared freely across threads.

mod conform;
pub mod wire;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use prost::bytes::BufMut;
use prost::encoding::WireType;
use prost::Message;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, TypeMismatch};
use crate::observability::{self, CodecMetrics};
use crate::proto::{
    ContainerPlanning, ControllerPlanning, CreateControllerPlanningsRequest,
    CreatePodPlanningsRequest, PodPlanning,
};
use crate::schema::{self, MessageDescriptor};

/// How fields with an unexpected wire type are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Drop the field, record it in the report and continue
    #[default]
    Lenient,
    /// Fail the whole decode
    Strict,
}

/// How one message is delimited in a byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// Varint body length, then the body
    #[default]
    Delimited,
    /// The body alone
    Bare,
}

impl DecodeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeMode::Lenient => "lenient",
            DecodeMode::Strict => "strict",
        }
    }
}

impl Framing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framing::Delimited => "delimited",
            Framing::Bare => "bare",
        }
    }
}

impl FromStr for DecodeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(DecodeMode::Lenient),
            "strict" => Ok(DecodeMode::Strict),
            other => Err(format!(
                "unknown decode mode `{}` (expected lenient or strict)",
                other
            )),
        }
    }
}

impl FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delimited" => Ok(Framing::Delimited),
            "bare" => Ok(Framing::Bare),
            other => Err(format!(
                "unknown framing `{}` (expected delimited or bare)",
                other
            )),
        }
    }
}

impl fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a top-level message. It travels out of band: the bytes do
/// not say which message they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    ContainerPlanning,
    PodPlanning,
    ControllerPlanning,
    CreatePodPlanningsRequest,
    CreateControllerPlanningsRequest,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        MessageKind::ContainerPlanning,
        MessageKind::PodPlanning,
        MessageKind::ControllerPlanning,
        MessageKind::CreatePodPlanningsRequest,
        MessageKind::CreateControllerPlanningsRequest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::ContainerPlanning => "container-planning",
            MessageKind::PodPlanning => "pod-planning",
            MessageKind::ControllerPlanning => "controller-planning",
            MessageKind::CreatePodPlanningsRequest => "create-pod-plannings-request",
            MessageKind::CreateControllerPlanningsRequest => "create-controller-plannings-request",
        }
    }

    pub fn descriptor(&self) -> &'static MessageDescriptor {
        match self {
            MessageKind::ContainerPlanning => &schema::CONTAINER_PLANNING,
            MessageKind::PodPlanning => &schema::POD_PLANNING,
            MessageKind::ControllerPlanning => &schema::CONTROLLER_PLANNING,
            MessageKind::CreatePodPlanningsRequest => &schema::CREATE_POD_PLANNINGS_REQUEST,
            MessageKind::CreateControllerPlanningsRequest => {
                &schema::CREATE_CONTROLLER_PLANNINGS_REQUEST
            }
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageKind::ALL
            .iter()
            .copied()
            .find(|kind| {
                kind.as_str() == s || kind.descriptor().name() == s || kind.descriptor().full_name == s
            })
            .ok_or_else(|| {
                let known: Vec<&str> = MessageKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown message kind `{}` (expected one of: {})", s, known.join(", "))
            })
    }
}

/// A top-level message the codec can encode and decode
pub trait PlanningMessage: Message + Default + Sized {
    const KIND: MessageKind;
}

impl PlanningMessage for ContainerPlanning {
    const KIND: MessageKind = MessageKind::ContainerPlanning;
}

impl PlanningMessage for PodPlanning {
    const KIND: MessageKind = MessageKind::PodPlanning;
}

impl PlanningMessage for ControllerPlanning {
    const KIND: MessageKind = MessageKind::ControllerPlanning;
}

impl PlanningMessage for CreatePodPlanningsRequest {
    const KIND: MessageKind = MessageKind::CreatePodPlanningsRequest;
}

impl PlanningMessage for CreateControllerPlanningsRequest {
    const KIND: MessageKind = MessageKind::CreateControllerPlanningsRequest;
}

/// Any top-level message, for callers that pick the kind at runtime
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyPlanning {
    ContainerPlanning(ContainerPlanning),
    PodPlanning(PodPlanning),
    ControllerPlanning(ControllerPlanning),
    CreatePodPlanningsRequest(CreatePodPlanningsRequest),
    CreateControllerPlanningsRequest(CreateControllerPlanningsRequest),
}

impl AnyPlanning {
    pub fn kind(&self) -> MessageKind {
        match self {
            AnyPlanning::ContainerPlanning(_) => MessageKind::ContainerPlanning,
            AnyPlanning::PodPlanning(_) => MessageKind::PodPlanning,
            AnyPlanning::ControllerPlanning(_) => MessageKind::ControllerPlanning,
            AnyPlanning::CreatePodPlanningsRequest(_) => MessageKind::CreatePodPlanningsRequest,
            AnyPlanning::CreateControllerPlanningsRequest(_) => {
                MessageKind::CreateControllerPlanningsRequest
            }
        }
    }

    /// Parse the JSON form of a message of the given kind
    pub fn from_json(kind: MessageKind, json: &str) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            MessageKind::ContainerPlanning => {
                AnyPlanning::ContainerPlanning(serde_json::from_str(json)?)
            }
            MessageKind::PodPlanning => AnyPlanning::PodPlanning(serde_json::from_str(json)?),
            MessageKind::ControllerPlanning => {
                AnyPlanning::ControllerPlanning(serde_json::from_str(json)?)
            }
            MessageKind::CreatePodPlanningsRequest => {
                AnyPlanning::CreatePodPlanningsRequest(serde_json::from_str(json)?)
            }
            MessageKind::CreateControllerPlanningsRequest => {
                AnyPlanning::CreateControllerPlanningsRequest(serde_json::from_str(json)?)
            }
        })
    }
}

/// Unknown tag seen while decoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnknownTag {
    pub message: &'static str,
    pub tag: u32,
    pub wire_type: WireType,
    /// Offset of the field key within the body
    pub offset: usize,
    /// Kept for re-encoding (planning messages) or discarded (leaf messages)
    pub retained: bool,
}

/// Enum value decoded without a known symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnrecognizedEnum {
    pub message: &'static str,
    pub field: &'static str,
    pub enum_name: &'static str,
    pub value: i32,
}

/// Diagnostics collected during one decode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeReport {
    /// Fields dropped in lenient mode
    pub mismatches: Vec<TypeMismatch>,
    pub unknown_fields: Vec<UnknownTag>,
    pub unrecognized_enums: Vec<UnrecognizedEnum>,
}

impl DecodeReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
            && self.unknown_fields.is_empty()
            && self.unrecognized_enums.is_empty()
    }
}

/// Stateless encoder/decoder for planning messages
#[derive(Debug, Clone, Default)]
pub struct Codec {
    mode: DecodeMode,
    metrics: Option<CodecMetrics>,
}

impl Codec {
    /// Lenient codec without metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Record Prometheus metrics for every call
    pub fn with_metrics(mut self, metrics: CodecMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Encode a message length-delimited
    pub fn encode<M: PlanningMessage>(&self, message: &M) -> Vec<u8> {
        let bytes = message.encode_length_delimited_to_vec();
        self.encoded(M::KIND, bytes.len());
        bytes
    }

    /// Encode a message without a length prefix
    pub fn encode_body<M: PlanningMessage>(&self, message: &M) -> Vec<u8> {
        let bytes = message.encode_to_vec();
        self.encoded(M::KIND, bytes.len());
        bytes
    }

    /// Encode into a caller-supplied buffer
    ///
    /// Fails with [`CodecError::Encoding`] when the buffer cannot hold the
    /// whole message; nothing is written in that case.
    pub fn encode_to<M, B>(
        &self,
        message: &M,
        buf: &mut B,
        framing: Framing,
    ) -> Result<(), CodecError>
    where
        M: PlanningMessage,
        B: BufMut,
    {
        match framing {
            Framing::Delimited => message.encode_length_delimited(buf)?,
            Framing::Bare => message.encode(buf)?,
        }
        let len = message.encoded_len();
        let written = match framing {
            Framing::Delimited => prost::length_delimiter_len(len) + len,
            Framing::Bare => len,
        };
        self.encoded(M::KIND, written);
        Ok(())
    }

    /// Decode a length-delimited message
    pub fn decode<M: PlanningMessage>(&self, bytes: &[u8]) -> Result<M, CodecError> {
        self.decode_with_report(bytes).map(|(message, _)| message)
    }

    pub fn decode_with_report<M: PlanningMessage>(
        &self,
        bytes: &[u8],
    ) -> Result<(M, DecodeReport), CodecError> {
        match unframe(bytes) {
            Ok(body) => self.decode_body_with_report(body),
            Err(err) => Err(self.failed(M::KIND, bytes.len(), err)),
        }
    }

    /// Decode a message body with no length prefix
    pub fn decode_body<M: PlanningMessage>(&self, body: &[u8]) -> Result<M, CodecError> {
        self.decode_body_with_report(body).map(|(message, _)| message)
    }

    pub fn decode_body_with_report<M: PlanningMessage>(
        &self,
        body: &[u8],
    ) -> Result<(M, DecodeReport), CodecError> {
        let mut report = DecodeReport::default();
        let result = conform::conform(M::KIND.descriptor(), body, self.mode, &mut report)
            .and_then(|conformed| M::decode(&conformed[..]).map_err(CodecError::from));

        match result {
            Ok(message) => {
                observability::log_decoded(M::KIND, body.len(), &report);
                if let Some(metrics) = &self.metrics {
                    metrics.record_decode(M::KIND, body.len(), &report);
                }
                Ok((message, report))
            }
            Err(err) => Err(self.failed(M::KIND, body.len(), err)),
        }
    }

    /// Encode a message whose kind is only known at runtime
    pub fn encode_any(&self, message: &AnyPlanning, framing: Framing) -> Vec<u8> {
        fn encode_one<M: PlanningMessage>(codec: &Codec, message: &M, framing: Framing) -> Vec<u8> {
            match framing {
                Framing::Delimited => codec.encode(message),
                Framing::Bare => codec.encode_body(message),
            }
        }

        match message {
            AnyPlanning::ContainerPlanning(m) => encode_one(self, m, framing),
            AnyPlanning::PodPlanning(m) => encode_one(self, m, framing),
            AnyPlanning::ControllerPlanning(m) => encode_one(self, m, framing),
            AnyPlanning::CreatePodPlanningsRequest(m) => encode_one(self, m, framing),
            AnyPlanning::CreateControllerPlanningsRequest(m) => encode_one(self, m, framing),
        }
    }

    /// Decode a message of the given kind
    pub fn decode_any(
        &self,
        kind: MessageKind,
        bytes: &[u8],
        framing: Framing,
    ) -> Result<(AnyPlanning, DecodeReport), CodecError> {
        fn decode_one<M: PlanningMessage>(
            codec: &Codec,
            bytes: &[u8],
            framing: Framing,
        ) -> Result<(M, DecodeReport), CodecError> {
            match framing {
                Framing::Delimited => codec.decode_with_report(bytes),
                Framing::Bare => codec.decode_body_with_report(bytes),
            }
        }

        Ok(match kind {
            MessageKind::ContainerPlanning => {
                let (m, report) = decode_one(self, bytes, framing)?;
                (AnyPlanning::ContainerPlanning(m), report)
            }
            MessageKind::PodPlanning => {
                let (m, report) = decode_one(self, bytes, framing)?;
                (AnyPlanning::PodPlanning(m), report)
            }
            MessageKind::ControllerPlanning => {
                let (m, report) = decode_one(self, bytes, framing)?;
                (AnyPlanning::ControllerPlanning(m), report)
            }
            MessageKind::CreatePodPlanningsRequest => {
                let (m, report) = decode_one(self, bytes, framing)?;
                (AnyPlanning::CreatePodPlanningsRequest(m), report)
            }
            MessageKind::CreateControllerPlanningsRequest => {
                let (m, report) = decode_one(self, bytes, framing)?;
                (AnyPlanning::CreateControllerPlanningsRequest(m), report)
            }
        })
    }

    fn encoded(&self, kind: MessageKind, bytes: usize) {
        observability::log_encoded(kind, bytes);
        if let Some(metrics) = &self.metrics {
            metrics.record_encode(kind, bytes);
        }
    }

    fn failed(&self, kind: MessageKind, bytes: usize, err: CodecError) -> CodecError {
        observability::log_decode_failure(kind, bytes, &err);
        if let Some(metrics) = &self.metrics {
            metrics.record_failure(kind, &err);
        }
        err
    }
}

/// Strip the length prefix, requiring it to cover the rest of the input exactly
pub fn unframe(bytes: &[u8]) -> Result<&[u8], CodecError> {
    let mut cursor = bytes;
    let declared = prost::decode_length_delimiter(&mut cursor)
        .map_err(|e| CodecError::malformed_at(0, format!("length prefix: {}", e)))?;
    let prefix_len = bytes.len() - cursor.len();

    if declared > cursor.len() {
        return Err(CodecError::malformed_at(
            prefix_len,
            format!(
                "declared length {} but only {} bytes follow",
                declared,
                cursor.len()
            ),
        ));
    }
    if declared < cursor.len() {
        return Err(CodecError::malformed_at(
            prefix_len + declared,
            format!("{} trailing bytes after message", cursor.len() - declared),
        ));
    }
    Ok(cursor)
}
