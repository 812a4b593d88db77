//! Metric series (`datahub.metrics.v1alpha1`)

use prost::{Enumeration, Message};
use prost_types::Timestamp;
use serde::{Deserialize, Serialize};

use super::timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Enumeration)]
#[repr(i32)]
pub enum MetricType {
    MetricsTypeUndefined = 0,
    CpuUsageSecondsPercentage = 1,
    MemoryUsageBytes = 2,
    PowerUsageWatts = 3,
    TemperatureCelsius = 4,
    DutyCycle = 5,
}

impl MetricType {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            MetricType::MetricsTypeUndefined => "METRICS_TYPE_UNDEFINED",
            MetricType::CpuUsageSecondsPercentage => "CPU_USAGE_SECONDS_PERCENTAGE",
            MetricType::MemoryUsageBytes => "MEMORY_USAGE_BYTES",
            MetricType::PowerUsageWatts => "POWER_USAGE_WATTS",
            MetricType::TemperatureCelsius => "TEMPERATURE_CELSIUS",
            MetricType::DutyCycle => "DUTY_CYCLE",
        }
    }

    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "METRICS_TYPE_UNDEFINED" => Some(Self::MetricsTypeUndefined),
            "CPU_USAGE_SECONDS_PERCENTAGE" => Some(Self::CpuUsageSecondsPercentage),
            "MEMORY_USAGE_BYTES" => Some(Self::MemoryUsageBytes),
            "POWER_USAGE_WATTS" => Some(Self::PowerUsageWatts),
            "TEMPERATURE_CELSIUS" => Some(Self::TemperatureCelsius),
            "DUTY_CYCLE" => Some(Self::DutyCycle),
            _ => None,
        }
    }
}

/// One point of a metric series
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Sample {
    #[prost(message, optional, tag = "1")]
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    /// End of the interval the value covers, if it is not a point sample
    #[prost(message, optional, tag = "2")]
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
    /// Decimal value carried as text so producers keep their own precision
    #[prost(string, tag = "3")]
    pub num_value: String,
}

impl Sample {
    pub fn at(time: Timestamp, value: f64) -> Self {
        Self {
            time: Some(time),
            end_time: None,
            num_value: value.to_string(),
        }
    }

    /// Parsed numeric value, `None` when the text is not a number
    pub fn value(&self) -> Option<f64> {
        self.num_value.trim().parse().ok()
    }
}

/// A series of samples for one metric
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricData {
    #[prost(enumeration = "MetricType", tag = "1")]
    pub metric_type: i32,
    #[prost(message, repeated, tag = "2")]
    pub data: Vec<Sample>,
    /// Sampling step in seconds
    #[prost(int64, tag = "3")]
    pub granularity: i64,
}

impl MetricData {
    pub fn new(metric_type: MetricType, data: Vec<Sample>) -> Self {
        Self {
            metric_type: metric_type as i32,
            data,
            granularity: 0,
        }
    }

    /// Index of the first sample whose time is earlier than its predecessor's
    pub fn first_out_of_order(&self) -> Option<usize> {
        let mut previous: Option<(i64, i32)> = None;
        for (index, sample) in self.data.iter().enumerate() {
            let Some(time) = sample.time.as_ref() else {
                continue;
            };
            let key = timestamp::sort_key(time);
            if previous.is_some_and(|prev| key < prev) {
                return Some(index);
            }
            previous = Some(key);
        }
        None
    }
}
