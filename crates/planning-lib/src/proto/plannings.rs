//! Planning messages (`datahub.plannings.v1alpha1`)
//!
//! `ContainerPlanning`, `PodPlanning` and `ControllerPlanning` implement
//! `prost::Message` by hand so that their enum fields are open enums and
//! unknown fields survive a decode/encode cycle. The remaining messages are
//! derived.

use prost::bytes::{Buf, BufMut};
use prost::encoding::{self, DecodeContext, WireType};
use prost::{DecodeError, Message};
use prost_types::Timestamp;
use serde::{Deserialize, Serialize};

use super::metrics::MetricData;
use super::open_enum::{open_enum, OpenEnum};
use super::resources::{AssignPodPolicy, Controller, NamespacedName};
use super::timestamp;
use super::unknown::UnknownFields;

/// Granularity assumed when a batch request leaves it at zero
pub const DEFAULT_GRANULARITY_SECS: i64 = 30;

open_enum! {
    /// Category of a planning
    pub enum PlanningType as "datahub.plannings.v1alpha1.PlanningType" {
        Undefined = 0 => "PT_UNDEFINED",
        Recommendation = 1 => "PT_RECOMMENDATION",
        Planning = 2 => "PT_PLANNING",
    }
}

open_enum! {
    /// Which controller spec representation a controller planning carries
    pub enum ControllerPlanningType as "datahub.plannings.v1alpha1.ControllerPlanningType" {
        Undefined = 0 => "CPT_UNDEFINED",
        Primitive = 1 => "CPT_PRIMITIVE",
        K8s = 2 => "CPT_K8S",
    }
}

/// Field tags of the hand-written messages
pub mod tags {
    pub mod container_planning {
        pub const NAME: u32 = 1;
        pub const LIMIT_PLANNINGS: u32 = 2;
        pub const REQUEST_PLANNINGS: u32 = 3;
        pub const INITIAL_LIMIT_PLANNINGS: u32 = 4;
        pub const INITIAL_REQUEST_PLANNINGS: u32 = 5;
    }

    pub mod pod_planning {
        pub const PLANNING_TYPE: u32 = 1;
        pub const NAMESPACED_NAME: u32 = 2;
        pub const APPLY_PLANNING_NOW: u32 = 3;
        pub const ASSIGN_POD_POLICY: u32 = 4;
        pub const CONTAINER_PLANNINGS: u32 = 5;
        pub const START_TIME: u32 = 6;
        pub const END_TIME: u32 = 7;
        pub const TOP_CONTROLLER: u32 = 8;
        pub const PLANNING_ID: u32 = 9;
        pub const TOTAL_COST: u32 = 10;
    }

    pub mod controller_planning {
        pub const PLANNING_TYPE: u32 = 1;
        pub const CTL_PLANNING_TYPE: u32 = 2;
        pub const CTL_PLANNING_SPEC: u32 = 3;
        pub const CTL_PLANNING_SPEC_K8S: u32 = 4;
    }
}

/// Planned resource trajectory of one container
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerPlanning {
    pub name: String,
    pub limit_plannings: Vec<MetricData>,
    pub request_plannings: Vec<MetricData>,
    /// Limits in force before the plan, kept for comparison
    pub initial_limit_plannings: Vec<MetricData>,
    pub initial_request_plannings: Vec<MetricData>,
    #[serde(skip)]
    pub unknown_fields: UnknownFields,
}

/// Planning scoped to one pod
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodPlanning {
    pub planning_type: PlanningType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespaced_name: Option<NamespacedName>,
    pub apply_planning_now: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_pod_policy: Option<AssignPodPolicy>,
    pub container_plannings: Vec<ContainerPlanning>,
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    /// Unset means the plan is open-ended
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_controller: Option<Controller>,
    pub planning_id: String,
    /// Aggregate cost estimate. A cost of exactly zero is not transmitted and
    /// reads back the same as an unset cost.
    pub total_cost: f64,
    #[serde(skip)]
    pub unknown_fields: UnknownFields,
}

impl PodPlanning {
    pub fn is_open_ended(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Planning scoped to a controller
///
/// When both spec representations are present they describe the same
/// end-state; neither is authoritative on its own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerPlanning {
    pub planning_type: PlanningType,
    pub ctl_planning_type: ControllerPlanningType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctl_planning_spec: Option<ControllerPlanningSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctl_planning_spec_k8s: Option<ControllerPlanningSpecK8s>,
    #[serde(skip)]
    pub unknown_fields: UnknownFields,
}

/// Desired controller state in the planner's own terms
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerPlanningSpec {
    #[prost(int32, tag = "1")]
    pub current_replicas: i32,
    #[prost(int32, tag = "2")]
    pub desired_replicas: i32,
    #[prost(message, optional, tag = "3")]
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    #[prost(message, optional, tag = "4")]
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub create_time: Option<Timestamp>,
    #[prost(double, tag = "5")]
    pub current_cpu_requests: f64,
    #[prost(double, tag = "6")]
    pub current_mem_requests: f64,
    #[prost(double, tag = "7")]
    pub current_cpu_limits: f64,
    #[prost(double, tag = "8")]
    pub current_mem_limits: f64,
    #[prost(double, tag = "9")]
    pub desired_cpu_limits: f64,
    #[prost(double, tag = "10")]
    pub desired_mem_limits: f64,
    #[prost(double, tag = "11")]
    pub total_cost: f64,
}

/// Desired controller state in the orchestrator's object shape
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerPlanningSpecK8s {
    #[prost(int32, tag = "1")]
    pub current_replicas: i32,
    #[prost(int32, tag = "2")]
    pub desired_replicas: i32,
    #[prost(message, optional, tag = "3")]
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    #[prost(message, optional, tag = "4")]
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub create_time: Option<Timestamp>,
}

/// Batch of pod plannings submitted together
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatePodPlanningsRequest {
    #[prost(message, repeated, tag = "1")]
    pub pod_plannings: Vec<PodPlanning>,
    /// Seconds between planned samples; zero means the default
    #[prost(int64, tag = "2")]
    pub granularity: i64,
}

/// Batch of controller plannings submitted together
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateControllerPlanningsRequest {
    #[prost(message, repeated, tag = "1")]
    pub controller_plannings: Vec<ControllerPlanning>,
    #[prost(int64, tag = "2")]
    pub granularity: i64,
}

impl CreatePodPlanningsRequest {
    pub fn effective_granularity(&self) -> i64 {
        effective_granularity(self.granularity)
    }
}

impl CreateControllerPlanningsRequest {
    pub fn effective_granularity(&self) -> i64 {
        effective_granularity(self.granularity)
    }
}

fn effective_granularity(granularity: i64) -> i64 {
    if granularity == 0 {
        DEFAULT_GRANULARITY_SECS
    } else {
        granularity
    }
}

fn encode_enum<E, B>(tag: u32, value: E, buf: &mut B)
where
    E: OpenEnum,
    B: BufMut,
{
    let raw = value.to_raw();
    if raw != 0 {
        encoding::int32::encode(tag, &raw, buf);
    }
}

fn encoded_len_enum<E: OpenEnum>(tag: u32, value: E) -> usize {
    let raw = value.to_raw();
    if raw != 0 {
        encoding::int32::encoded_len(tag, &raw)
    } else {
        0
    }
}

fn merge_enum<E, B>(
    wire_type: WireType,
    value: &mut E,
    buf: &mut B,
    ctx: DecodeContext,
) -> Result<(), DecodeError>
where
    E: OpenEnum,
    B: Buf,
{
    let mut raw = value.to_raw();
    encoding::int32::merge(wire_type, &mut raw, buf, ctx)?;
    *value = E::from_raw(raw);
    Ok(())
}

fn field_error(message: &'static str, field: &'static str) -> impl FnOnce(DecodeError) -> DecodeError {
    move |mut error| {
        error.push(message, field);
        error
    }
}

impl Message for ContainerPlanning {
    fn encode_raw<B>(&self, buf: &mut B)
    where
        B: BufMut,
        Self: Sized,
    {
        use tags::container_planning::*;
        if !self.name.is_empty() {
            encoding::string::encode(NAME, &self.name, buf);
        }
        encoding::message::encode_repeated(LIMIT_PLANNINGS, &self.limit_plannings, buf);
        encoding::message::encode_repeated(REQUEST_PLANNINGS, &self.request_plannings, buf);
        encoding::message::encode_repeated(
            INITIAL_LIMIT_PLANNINGS,
            &self.initial_limit_plannings,
            buf,
        );
        encoding::message::encode_repeated(
            INITIAL_REQUEST_PLANNINGS,
            &self.initial_request_plannings,
            buf,
        );
        self.unknown_fields.encode_raw(buf);
    }

    fn merge_field<B>(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
        Self: Sized,
    {
        use tags::container_planning::*;
        const STRUCT_NAME: &str = "ContainerPlanning";
        match tag {
            NAME => encoding::string::merge(wire_type, &mut self.name, buf, ctx)
                .map_err(field_error(STRUCT_NAME, "name")),
            LIMIT_PLANNINGS => {
                encoding::message::merge_repeated(wire_type, &mut self.limit_plannings, buf, ctx)
                    .map_err(field_error(STRUCT_NAME, "limit_plannings"))
            }
            REQUEST_PLANNINGS => {
                encoding::message::merge_repeated(wire_type, &mut self.request_plannings, buf, ctx)
                    .map_err(field_error(STRUCT_NAME, "request_plannings"))
            }
            INITIAL_LIMIT_PLANNINGS => encoding::message::merge_repeated(
                wire_type,
                &mut self.initial_limit_plannings,
                buf,
                ctx,
            )
            .map_err(field_error(STRUCT_NAME, "initial_limit_plannings")),
            INITIAL_REQUEST_PLANNINGS => encoding::message::merge_repeated(
                wire_type,
                &mut self.initial_request_plannings,
                buf,
                ctx,
            )
            .map_err(field_error(STRUCT_NAME, "initial_request_plannings")),
            _ => self.unknown_fields.merge_field(tag, wire_type, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        use tags::container_planning::*;
        let name = if self.name.is_empty() {
            0
        } else {
            encoding::string::encoded_len(NAME, &self.name)
        };
        name + encoding::message::encoded_len_repeated(LIMIT_PLANNINGS, &self.limit_plannings)
            + encoding::message::encoded_len_repeated(REQUEST_PLANNINGS, &self.request_plannings)
            + encoding::message::encoded_len_repeated(
                INITIAL_LIMIT_PLANNINGS,
                &self.initial_limit_plannings,
            )
            + encoding::message::encoded_len_repeated(
                INITIAL_REQUEST_PLANNINGS,
                &self.initial_request_plannings,
            )
            + self.unknown_fields.encoded_len()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Message for PodPlanning {
    fn encode_raw<B>(&self, buf: &mut B)
    where
        B: BufMut,
        Self: Sized,
    {
        use tags::pod_planning::*;
        encode_enum(PLANNING_TYPE, self.planning_type, buf);
        if let Some(namespaced_name) = &self.namespaced_name {
            encoding::message::encode(NAMESPACED_NAME, namespaced_name, buf);
        }
        if self.apply_planning_now {
            encoding::bool::encode(APPLY_PLANNING_NOW, &self.apply_planning_now, buf);
        }
        if let Some(policy) = &self.assign_pod_policy {
            encoding::message::encode(ASSIGN_POD_POLICY, policy, buf);
        }
        encoding::message::encode_repeated(CONTAINER_PLANNINGS, &self.container_plannings, buf);
        if let Some(start_time) = &self.start_time {
            encoding::message::encode(START_TIME, start_time, buf);
        }
        if let Some(end_time) = &self.end_time {
            encoding::message::encode(END_TIME, end_time, buf);
        }
        if let Some(controller) = &self.top_controller {
            encoding::message::encode(TOP_CONTROLLER, controller, buf);
        }
        if !self.planning_id.is_empty() {
            encoding::string::encode(PLANNING_ID, &self.planning_id, buf);
        }
        if self.total_cost != 0.0 {
            encoding::double::encode(TOTAL_COST, &self.total_cost, buf);
        }
        self.unknown_fields.encode_raw(buf);
    }

    fn merge_field<B>(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
        Self: Sized,
    {
        use tags::pod_planning::*;
        const STRUCT_NAME: &str = "PodPlanning";
        match tag {
            PLANNING_TYPE => merge_enum(wire_type, &mut self.planning_type, buf, ctx)
                .map_err(field_error(STRUCT_NAME, "planning_type")),
            NAMESPACED_NAME => encoding::message::merge(
                wire_type,
                self.namespaced_name.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(field_error(STRUCT_NAME, "namespaced_name")),
            APPLY_PLANNING_NOW => {
                encoding::bool::merge(wire_type, &mut self.apply_planning_now, buf, ctx)
                    .map_err(field_error(STRUCT_NAME, "apply_planning_now"))
            }
            ASSIGN_POD_POLICY => encoding::message::merge(
                wire_type,
                self.assign_pod_policy.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(field_error(STRUCT_NAME, "assign_pod_policy")),
            CONTAINER_PLANNINGS => encoding::message::merge_repeated(
                wire_type,
                &mut self.container_plannings,
                buf,
                ctx,
            )
            .map_err(field_error(STRUCT_NAME, "container_plannings")),
            START_TIME => encoding::message::merge(
                wire_type,
                self.start_time.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(field_error(STRUCT_NAME, "start_time")),
            END_TIME => encoding::message::merge(
                wire_type,
                self.end_time.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(field_error(STRUCT_NAME, "end_time")),
            TOP_CONTROLLER => encoding::message::merge(
                wire_type,
                self.top_controller.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(field_error(STRUCT_NAME, "top_controller")),
            PLANNING_ID => encoding::string::merge(wire_type, &mut self.planning_id, buf, ctx)
                .map_err(field_error(STRUCT_NAME, "planning_id")),
            TOTAL_COST => encoding::double::merge(wire_type, &mut self.total_cost, buf, ctx)
                .map_err(field_error(STRUCT_NAME, "total_cost")),
            _ => self.unknown_fields.merge_field(tag, wire_type, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        use tags::pod_planning::*;
        let mut len = encoded_len_enum(PLANNING_TYPE, self.planning_type);
        if let Some(namespaced_name) = &self.namespaced_name {
            len += encoding::message::encoded_len(NAMESPACED_NAME, namespaced_name);
        }
        if self.apply_planning_now {
            len += encoding::bool::encoded_len(APPLY_PLANNING_NOW, &self.apply_planning_now);
        }
        if let Some(policy) = &self.assign_pod_policy {
            len += encoding::message::encoded_len(ASSIGN_POD_POLICY, policy);
        }
        len += encoding::message::encoded_len_repeated(CONTAINER_PLANNINGS, &self.container_plannings);
        if let Some(start_time) = &self.start_time {
            len += encoding::message::encoded_len(START_TIME, start_time);
        }
        if let Some(end_time) = &self.end_time {
            len += encoding::message::encoded_len(END_TIME, end_time);
        }
        if let Some(controller) = &self.top_controller {
            len += encoding::message::encoded_len(TOP_CONTROLLER, controller);
        }
        if !self.planning_id.is_empty() {
            len += encoding::string::encoded_len(PLANNING_ID, &self.planning_id);
        }
        if self.total_cost != 0.0 {
            len += encoding::double::encoded_len(TOTAL_COST, &self.total_cost);
        }
        len + self.unknown_fields.encoded_len()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Message for ControllerPlanning {
    fn encode_raw<B>(&self, buf: &mut B)
    where
        B: BufMut,
        Self: Sized,
    {
        use tags::controller_planning::*;
        encode_enum(PLANNING_TYPE, self.planning_type, buf);
        encode_enum(CTL_PLANNING_TYPE, self.ctl_planning_type, buf);
        if let Some(spec) = &self.ctl_planning_spec {
            encoding::message::encode(CTL_PLANNING_SPEC, spec, buf);
        }
        if let Some(spec) = &self.ctl_planning_spec_k8s {
            encoding::message::encode(CTL_PLANNING_SPEC_K8S, spec, buf);
        }
        self.unknown_fields.encode_raw(buf);
    }

    fn merge_field<B>(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
        Self: Sized,
    {
        use tags::controller_planning::*;
        const STRUCT_NAME: &str = "ControllerPlanning";
        match tag {
            PLANNING_TYPE => merge_enum(wire_type, &mut self.planning_type, buf, ctx)
                .map_err(field_error(STRUCT_NAME, "planning_type")),
            CTL_PLANNING_TYPE => merge_enum(wire_type, &mut self.ctl_planning_type, buf, ctx)
                .map_err(field_error(STRUCT_NAME, "ctl_planning_type")),
            CTL_PLANNING_SPEC => encoding::message::merge(
                wire_type,
                self.ctl_planning_spec.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(field_error(STRUCT_NAME, "ctl_planning_spec")),
            CTL_PLANNING_SPEC_K8S => encoding::message::merge(
                wire_type,
                self.ctl_planning_spec_k8s.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(field_error(STRUCT_NAME, "ctl_planning_spec_k8s")),
            _ => self.unknown_fields.merge_field(tag, wire_type, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        use tags::controller_planning::*;
        let mut len = encoded_len_enum(PLANNING_TYPE, self.planning_type)
            + encoded_len_enum(CTL_PLANNING_TYPE, self.ctl_planning_type);
        if let Some(spec) = &self.ctl_planning_spec {
            len += encoding::message::encoded_len(CTL_PLANNING_SPEC, spec);
        }
        if let Some(spec) = &self.ctl_planning_spec_k8s {
            len += encoding::message::encoded_len(CTL_PLANNING_SPEC_K8S, spec);
        }
        len + self.unknown_fields.encoded_len()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::metrics::{MetricType, Sample};
    use crate::proto::unknown::UnknownValue;

    fn sample_container() -> ContainerPlanning {
        ContainerPlanning {
            name: "c1".to_string(),
            limit_plannings: vec![MetricData::new(
                MetricType::CpuUsageSecondsPercentage,
                vec![Sample::at(timestamp::from_unix_seconds(1_700_000_000), 2.0)],
            )],
            ..Default::default()
        }
    }

    #[test]
    fn test_encoded_len_matches_encoding() {
        let pod = PodPlanning {
            planning_type: PlanningType::Planning,
            namespaced_name: Some(NamespacedName::new("ns1", "pod-a")),
            apply_planning_now: true,
            container_plannings: vec![sample_container()],
            start_time: Some(timestamp::from_unix_seconds(1_700_000_000)),
            planning_id: "plan-1".to_string(),
            total_cost: 12.5,
            ..Default::default()
        };
        assert_eq!(pod.encode_to_vec().len(), pod.encoded_len());

        let controller = ControllerPlanning {
            planning_type: PlanningType::Recommendation,
            ctl_planning_type: ControllerPlanningType::K8s,
            ctl_planning_spec_k8s: Some(ControllerPlanningSpecK8s {
                desired_replicas: 3,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(controller.encode_to_vec().len(), controller.encoded_len());
    }

    #[test]
    fn test_default_message_encodes_to_nothing() {
        assert!(PodPlanning::default().encode_to_vec().is_empty());
        assert!(ContainerPlanning::default().encode_to_vec().is_empty());
        assert!(ControllerPlanning::default().encode_to_vec().is_empty());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let mut container = sample_container();
        container
            .unknown_fields
            .push(15, UnknownValue::LengthDelimited(b"gpu".to_vec()));
        let bytes = container.encode_to_vec();

        let decoded = ContainerPlanning::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, container);
        assert_eq!(decoded.encode_to_vec(), bytes);
    }

    #[test]
    fn test_unrecognized_enum_round_trips() {
        let controller = ControllerPlanning {
            planning_type: PlanningType::from_raw(9),
            ctl_planning_type: ControllerPlanningType::from_raw(-4),
            ..Default::default()
        };
        let decoded = ControllerPlanning::decode(controller.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.planning_type, PlanningType::Unrecognized(9));
        assert_eq!(decoded.ctl_planning_type, ControllerPlanningType::Unrecognized(-4));
    }

    #[test]
    fn test_decode_error_names_the_field() {
        // planning_id (tag 9) declared as 5 bytes with only 2 present
        let bytes = [0x4a, 0x05, b'a', b'b'];
        let err = PodPlanning::decode(&bytes[..]).unwrap_err();
        assert!(err.to_string().contains("PodPlanning.planning_id"));
    }

    #[test]
    fn test_effective_granularity() {
        let mut request = CreatePodPlanningsRequest::default();
        assert_eq!(request.effective_granularity(), DEFAULT_GRANULARITY_SECS);
        request.granularity = 60;
        assert_eq!(request.effective_granularity(), 60);
    }

    #[test]
    fn test_pod_planning_json_uses_symbols_and_rfc3339() {
        let pod = PodPlanning {
            planning_type: PlanningType::Recommendation,
            namespaced_name: Some(NamespacedName::new("ns1", "pod-a")),
            start_time: Some(timestamp::from_unix_seconds(0)),
            ..Default::default()
        };
        let json = serde_json::to_value(&pod).unwrap();
        assert_eq!(json["planning_type"], "PT_RECOMMENDATION");
        assert_eq!(json["start_time"], "1970-01-01T00:00:00Z");
        assert!(json.get("end_time").is_none());

        let back: PodPlanning = serde_json::from_value(json).unwrap();
        assert_eq!(back, pod);
    }
}
