//! Observability for the planning codec
//!
//! Provides:
//! - Prometheus metrics (messages encoded/decoded, failures, dropped and unknown fields, sizes)
//! - Structured logging helpers with tracing

use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::codec::{DecodeReport, MessageKind};
use crate::error::CodecError;

/// Histogram buckets for encoded message sizes (in bytes)
const SIZE_BUCKETS: &[f64] = &[
    16.0, 64.0, 256.0, 1024.0, 4096.0, 16384.0, 65536.0, 262144.0, 1048576.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<CodecMetricsInner> = OnceLock::new();

struct CodecMetricsInner {
    messages_encoded: IntCounterVec,
    messages_decoded: IntCounterVec,
    decode_failures: IntCounterVec,
    fields_dropped: IntCounterVec,
    unknown_fields: IntCounterVec,
    unrecognized_enum_values: IntCounterVec,
    message_size_bytes: HistogramVec,
}

impl CodecMetricsInner {
    fn new() -> Self {
        Self {
            messages_encoded: register_int_counter_vec!(
                "planning_codec_messages_encoded_total",
                "Planning messages encoded",
                &["kind"]
            )
            .expect("Failed to register messages_encoded"),

            messages_decoded: register_int_counter_vec!(
                "planning_codec_messages_decoded_total",
                "Planning messages decoded successfully",
                &["kind"]
            )
            .expect("Failed to register messages_decoded"),

            decode_failures: register_int_counter_vec!(
                "planning_codec_decode_failures_total",
                "Decode calls that returned an error",
                &["kind", "error"]
            )
            .expect("Failed to register decode_failures"),

            fields_dropped: register_int_counter_vec!(
                "planning_codec_fields_dropped_total",
                "Fields discarded by lenient decoding because of a wire type mismatch",
                &["kind"]
            )
            .expect("Failed to register fields_dropped"),

            unknown_fields: register_int_counter_vec!(
                "planning_codec_unknown_fields_total",
                "Fields with tags the schema does not declare",
                &["kind"]
            )
            .expect("Failed to register unknown_fields"),

            unrecognized_enum_values: register_int_counter_vec!(
                "planning_codec_unrecognized_enum_values_total",
                "Enum values decoded without a known symbol",
                &["kind"]
            )
            .expect("Failed to register unrecognized_enum_values"),

            message_size_bytes: register_histogram_vec!(
                "planning_codec_message_size_bytes",
                "Size of encoded and decoded planning messages",
                &["kind", "direction"],
                SIZE_BUCKETS.to_vec()
            )
            .expect("Failed to register message_size_bytes"),
        }
    }
}

/// Codec metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone, Debug)]
pub struct CodecMetrics {
    _private: (),
}

impl Default for CodecMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecMetrics {
    /// Create a new metrics handle (registers global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(CodecMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &CodecMetricsInner {
        GLOBAL_METRICS.get_or_init(CodecMetricsInner::new)
    }

    pub fn record_encode(&self, kind: MessageKind, bytes: usize) {
        let inner = self.inner();
        inner
            .messages_encoded
            .with_label_values(&[kind.as_str()])
            .inc();
        inner
            .message_size_bytes
            .with_label_values(&[kind.as_str(), "encode"])
            .observe(bytes as f64);
    }

    pub fn record_decode(&self, kind: MessageKind, bytes: usize, report: &DecodeReport) {
        let inner = self.inner();
        let label = [kind.as_str()];
        inner.messages_decoded.with_label_values(&label).inc();
        inner
            .message_size_bytes
            .with_label_values(&[kind.as_str(), "decode"])
            .observe(bytes as f64);
        inner
            .fields_dropped
            .with_label_values(&label)
            .inc_by(report.mismatches.len() as u64);
        inner
            .unknown_fields
            .with_label_values(&label)
            .inc_by(report.unknown_fields.len() as u64);
        inner
            .unrecognized_enum_values
            .with_label_values(&label)
            .inc_by(report.unrecognized_enums.len() as u64);
    }

    pub fn record_failure(&self, kind: MessageKind, error: &CodecError) {
        self.inner()
            .decode_failures
            .with_label_values(&[kind.as_str(), error.kind()])
            .inc();
    }

    /// Render the default registry in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Log a successful encode
pub(crate) fn log_encoded(kind: MessageKind, bytes: usize) {
    debug!(
        event = "planning_encoded",
        kind = %kind,
        bytes = bytes,
        "Encoded planning message"
    );
}

/// Log a successful decode with its diagnostics
pub(crate) fn log_decoded(kind: MessageKind, bytes: usize, report: &DecodeReport) {
    debug!(
        event = "planning_decoded",
        kind = %kind,
        bytes = bytes,
        dropped_fields = report.mismatches.len(),
        unknown_fields = report.unknown_fields.len(),
        unrecognized_enums = report.unrecognized_enums.len(),
        "Decoded planning message"
    );
}

/// Log a failed decode
pub(crate) fn log_decode_failure(kind: MessageKind, bytes: usize, error: &CodecError) {
    warn!(
        event = "planning_decode_failed",
        kind = %kind,
        bytes = bytes,
        error_kind = error.kind(),
        error = %error,
        "Failed to decode planning message"
    );
}
