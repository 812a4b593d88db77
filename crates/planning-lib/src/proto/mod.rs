//! Protobuf message types
//!
//! Rust bindings for the `.proto` files under `proto/datahub/`. Leaf
//! messages (metrics, resources, policies) are derived with prost; the
//! planning messages carry open enums and unknown-field passthrough.

pub mod metrics;
pub(crate) mod open_enum;
pub mod plannings;
pub mod resources;
pub mod timestamp;
pub mod unknown;

pub use metrics::{MetricData, MetricType, Sample};
pub use open_enum::OpenEnum;
pub use prost_types::Timestamp;
pub use plannings::{
    ContainerPlanning, ControllerPlanning, ControllerPlanningSpec, ControllerPlanningSpecK8s,
    ControllerPlanningType, CreateControllerPlanningsRequest, CreatePodPlanningsRequest,
    PlanningType, PodPlanning, DEFAULT_GRANULARITY_SECS,
};
pub use resources::{
    assign_pod_policy, AssignPodPolicy, Controller, Kind, NamespacedName, NodePriority, Selector,
};
pub use unknown::{UnknownField, UnknownFields, UnknownValue};
