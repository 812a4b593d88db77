//! Static message descriptors
//!
//! Every message the codec knows is described here by a `static`
//! [`MessageDescriptor`]. Descriptors are plain data built at compile time;
//! there is no runtime registry. The conform pass, the wire inspector and the
//! compatibility checker all walk these tables.

pub mod compat;
pub mod inspect;

use prost::encoding::WireType;

use crate::proto::{ControllerPlanningType, OpenEnum, PlanningType};

/// Semantic type of a field
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    Double,
    Int32,
    Int64,
    Bool,
    String,
    Enum(&'static EnumDescriptor),
    Message(&'static MessageDescriptor),
}

impl FieldType {
    /// Wire type a singular value of this type is written with
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldType::Double => WireType::SixtyFourBit,
            FieldType::Int32 | FieldType::Int64 | FieldType::Bool | FieldType::Enum(_) => {
                WireType::Varint
            }
            FieldType::String | FieldType::Message(_) => WireType::LengthDelimited,
        }
    }

    /// Numeric scalars may arrive packed into one length-delimited payload
    pub fn is_packable(&self) -> bool {
        !matches!(self, FieldType::String | FieldType::Message(_))
    }

    /// Name used in snapshots and inspector output
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Double => "double",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Enum(descriptor) => descriptor.full_name,
            FieldType::Message(descriptor) => descriptor.full_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
}

#[derive(Debug)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub tag: u32,
    pub ty: FieldType,
    pub cardinality: Cardinality,
    /// Name of the oneof this field belongs to
    pub oneof: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    /// Whether a value arriving with `wire_type` can belong to this field
    pub fn accepts(&self, wire_type: WireType) -> bool {
        wire_type == self.ty.wire_type()
            || (self.is_repeated()
                && self.ty.is_packable()
                && wire_type == WireType::LengthDelimited)
    }
}

#[derive(Debug)]
pub struct MessageDescriptor {
    pub full_name: &'static str,
    pub fields: &'static [FieldDescriptor],
    /// Unknown fields are kept and re-encoded rather than dropped
    pub retains_unknown: bool,
}

impl MessageDescriptor {
    pub fn field_by_tag(&self, tag: u32) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.tag == tag)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Unqualified message name
    pub fn name(&self) -> &'static str {
        self.full_name
            .rsplit_once('.')
            .map_or(self.full_name, |(_, name)| name)
    }
}

#[derive(Debug)]
pub struct EnumDescriptor {
    pub full_name: &'static str,
    pub values: &'static [(&'static str, i32)],
}

impl EnumDescriptor {
    pub fn symbol(&self, value: i32) -> Option<&'static str> {
        self.values
            .iter()
            .find(|(_, known)| *known == value)
            .map(|(symbol, _)| *symbol)
    }

    pub fn is_known(&self, value: i32) -> bool {
        self.symbol(value).is_some()
    }
}

const fn field(name: &'static str, tag: u32, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        name,
        tag,
        ty,
        cardinality: Cardinality::Singular,
        oneof: None,
    }
}

const fn repeated(name: &'static str, tag: u32, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        name,
        tag,
        ty,
        cardinality: Cardinality::Repeated,
        oneof: None,
    }
}

const fn one_of(
    oneof: &'static str,
    name: &'static str,
    tag: u32,
    ty: FieldType,
) -> FieldDescriptor {
    FieldDescriptor {
        name,
        tag,
        ty,
        cardinality: Cardinality::Singular,
        oneof: Some(oneof),
    }
}

// google.protobuf

pub static TIMESTAMP: MessageDescriptor = MessageDescriptor {
    full_name: "google.protobuf.Timestamp",
    fields: &[
        field("seconds", 1, FieldType::Int64),
        field("nanos", 2, FieldType::Int32),
    ],
    retains_unknown: false,
};

// datahub.metrics.v1alpha1

pub static METRIC_TYPE: EnumDescriptor = EnumDescriptor {
    full_name: "datahub.metrics.v1alpha1.MetricType",
    values: &[
        ("METRICS_TYPE_UNDEFINED", 0),
        ("CPU_USAGE_SECONDS_PERCENTAGE", 1),
        ("MEMORY_USAGE_BYTES", 2),
        ("POWER_USAGE_WATTS", 3),
        ("TEMPERATURE_CELSIUS", 4),
        ("DUTY_CYCLE", 5),
    ],
};

pub static SAMPLE: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.metrics.v1alpha1.Sample",
    fields: &[
        field("time", 1, FieldType::Message(&TIMESTAMP)),
        field("end_time", 2, FieldType::Message(&TIMESTAMP)),
        field("num_value", 3, FieldType::String),
    ],
    retains_unknown: false,
};

pub static METRIC_DATA: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.metrics.v1alpha1.MetricData",
    fields: &[
        field("metric_type", 1, FieldType::Enum(&METRIC_TYPE)),
        repeated("data", 2, FieldType::Message(&SAMPLE)),
        field("granularity", 3, FieldType::Int64),
    ],
    retains_unknown: false,
};

// datahub.resources.v1alpha1

pub static KIND: EnumDescriptor = EnumDescriptor {
    full_name: "datahub.resources.v1alpha1.Kind",
    values: &[
        ("KIND_UNDEFINED", 0),
        ("POD", 1),
        ("DEPLOYMENT", 2),
        ("DEPLOYMENTCONFIG", 3),
        ("STATEFULSET", 4),
    ],
};

pub static NAMESPACED_NAME: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.resources.v1alpha1.NamespacedName",
    fields: &[
        field("namespace", 1, FieldType::String),
        field("name", 2, FieldType::String),
    ],
    retains_unknown: false,
};

pub static CONTROLLER: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.resources.v1alpha1.Controller",
    fields: &[
        field("namespaced_name", 1, FieldType::Message(&NAMESPACED_NAME)),
        field("kind", 2, FieldType::Enum(&KIND)),
    ],
    retains_unknown: false,
};

pub static NODE_PRIORITY: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.resources.v1alpha1.NodePriority",
    fields: &[repeated("nodes", 1, FieldType::String)],
    retains_unknown: false,
};

/// Entry message of the `selector` map
pub static SELECTOR_ENTRY: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.resources.v1alpha1.Selector.SelectorEntry",
    fields: &[
        field("key", 1, FieldType::String),
        field("value", 2, FieldType::String),
    ],
    retains_unknown: false,
};

pub static SELECTOR: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.resources.v1alpha1.Selector",
    fields: &[repeated("selector", 1, FieldType::Message(&SELECTOR_ENTRY))],
    retains_unknown: false,
};

pub static ASSIGN_POD_POLICY: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.resources.v1alpha1.AssignPodPolicy",
    fields: &[
        field("time", 1, FieldType::Message(&TIMESTAMP)),
        one_of("policy", "node_priority", 2, FieldType::Message(&NODE_PRIORITY)),
        one_of("policy", "node_selector", 3, FieldType::Message(&SELECTOR)),
        one_of("policy", "node_name", 4, FieldType::String),
    ],
    retains_unknown: false,
};

// datahub.plannings.v1alpha1

pub static PLANNING_TYPE: EnumDescriptor = EnumDescriptor {
    full_name: <PlanningType as OpenEnum>::NAME,
    values: <PlanningType as OpenEnum>::KNOWN,
};

pub static CONTROLLER_PLANNING_TYPE: EnumDescriptor = EnumDescriptor {
    full_name: <ControllerPlanningType as OpenEnum>::NAME,
    values: <ControllerPlanningType as OpenEnum>::KNOWN,
};

pub static CONTAINER_PLANNING: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.plannings.v1alpha1.ContainerPlanning",
    fields: &[
        field("name", 1, FieldType::String),
        repeated("limit_plannings", 2, FieldType::Message(&METRIC_DATA)),
        repeated("request_plannings", 3, FieldType::Message(&METRIC_DATA)),
        repeated("initial_limit_plannings", 4, FieldType::Message(&METRIC_DATA)),
        repeated("initial_request_plannings", 5, FieldType::Message(&METRIC_DATA)),
    ],
    retains_unknown: true,
};

pub static POD_PLANNING: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.plannings.v1alpha1.PodPlanning",
    fields: &[
        field("planning_type", 1, FieldType::Enum(&PLANNING_TYPE)),
        field("namespaced_name", 2, FieldType::Message(&NAMESPACED_NAME)),
        field("apply_planning_now", 3, FieldType::Bool),
        field("assign_pod_policy", 4, FieldType::Message(&ASSIGN_POD_POLICY)),
        repeated("container_plannings", 5, FieldType::Message(&CONTAINER_PLANNING)),
        field("start_time", 6, FieldType::Message(&TIMESTAMP)),
        field("end_time", 7, FieldType::Message(&TIMESTAMP)),
        field("top_controller", 8, FieldType::Message(&CONTROLLER)),
        field("planning_id", 9, FieldType::String),
        field("total_cost", 10, FieldType::Double),
    ],
    retains_unknown: true,
};

pub static CONTROLLER_PLANNING_SPEC: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.plannings.v1alpha1.ControllerPlanningSpec",
    fields: &[
        field("current_replicas", 1, FieldType::Int32),
        field("desired_replicas", 2, FieldType::Int32),
        field("time", 3, FieldType::Message(&TIMESTAMP)),
        field("create_time", 4, FieldType::Message(&TIMESTAMP)),
        field("current_cpu_requests", 5, FieldType::Double),
        field("current_mem_requests", 6, FieldType::Double),
        field("current_cpu_limits", 7, FieldType::Double),
        field("current_mem_limits", 8, FieldType::Double),
        field("desired_cpu_limits", 9, FieldType::Double),
        field("desired_mem_limits", 10, FieldType::Double),
        field("total_cost", 11, FieldType::Double),
    ],
    retains_unknown: false,
};

pub static CONTROLLER_PLANNING_SPEC_K8S: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.plannings.v1alpha1.ControllerPlanningSpecK8s",
    fields: &[
        field("current_replicas", 1, FieldType::Int32),
        field("desired_replicas", 2, FieldType::Int32),
        field("time", 3, FieldType::Message(&TIMESTAMP)),
        field("create_time", 4, FieldType::Message(&TIMESTAMP)),
    ],
    retains_unknown: false,
};

pub static CONTROLLER_PLANNING: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.plannings.v1alpha1.ControllerPlanning",
    fields: &[
        field("planning_type", 1, FieldType::Enum(&PLANNING_TYPE)),
        field("ctl_planning_type", 2, FieldType::Enum(&CONTROLLER_PLANNING_TYPE)),
        field("ctl_planning_spec", 3, FieldType::Message(&CONTROLLER_PLANNING_SPEC)),
        field(
            "ctl_planning_spec_k8s",
            4,
            FieldType::Message(&CONTROLLER_PLANNING_SPEC_K8S),
        ),
    ],
    retains_unknown: true,
};

pub static CREATE_POD_PLANNINGS_REQUEST: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.plannings.v1alpha1.CreatePodPlanningsRequest",
    fields: &[
        repeated("pod_plannings", 1, FieldType::Message(&POD_PLANNING)),
        field("granularity", 2, FieldType::Int64),
    ],
    retains_unknown: false,
};

pub static CREATE_CONTROLLER_PLANNINGS_REQUEST: MessageDescriptor = MessageDescriptor {
    full_name: "datahub.plannings.v1alpha1.CreateControllerPlanningsRequest",
    fields: &[
        repeated("controller_plannings", 1, FieldType::Message(&CONTROLLER_PLANNING)),
        field("granularity", 2, FieldType::Int64),
    ],
    retains_unknown: false,
};

/// Every message descriptor, leaves first
pub fn all_messages() -> &'static [&'static MessageDescriptor] {
    static ALL: [&MessageDescriptor; 16] = [
        &TIMESTAMP,
        &SAMPLE,
        &METRIC_DATA,
        &NAMESPACED_NAME,
        &CONTROLLER,
        &NODE_PRIORITY,
        &SELECTOR_ENTRY,
        &SELECTOR,
        &ASSIGN_POD_POLICY,
        &CONTAINER_PLANNING,
        &POD_PLANNING,
        &CONTROLLER_PLANNING_SPEC,
        &CONTROLLER_PLANNING_SPEC_K8S,
        &CONTROLLER_PLANNING,
        &CREATE_POD_PLANNINGS_REQUEST,
        &CREATE_CONTROLLER_PLANNINGS_REQUEST,
    ];
    &ALL
}

/// Every enum descriptor
pub fn all_enums() -> &'static [&'static EnumDescriptor] {
    static ALL: [&EnumDescriptor; 4] = [
        &METRIC_TYPE,
        &KIND,
        &PLANNING_TYPE,
        &CONTROLLER_PLANNING_TYPE,
    ];
    &ALL
}

pub fn find_message(full_name: &str) -> Option<&'static MessageDescriptor> {
    all_messages()
        .iter()
        .copied()
        .find(|descriptor| descriptor.full_name == full_name)
}
