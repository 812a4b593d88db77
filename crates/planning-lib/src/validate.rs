//! Advisory validation of caller contracts
//!
//! The codec accepts anything the wire grammar allows. These checks flag
//! content that producers are expected to avoid; they never change what the
//! codec encodes or decodes.

use serde::Serialize;
use std::fmt;

use crate::codec::AnyPlanning;
use crate::proto::timestamp;
use crate::proto::{
    ContainerPlanning, ControllerPlanning, ControllerPlanningType,
    CreateControllerPlanningsRequest, CreatePodPlanningsRequest, MetricData, PodPlanning,
};

/// One contract violation, located by a field path such as
/// `container_plannings[0].limit_plannings[1]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

pub trait Validate {
    fn validate_at(&self, path: &str, issues: &mut Vec<ValidationIssue>);

    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.validate_at("", &mut issues);
        issues
    }
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", path, field)
    }
}

fn index(path: &str, field: &str, i: usize) -> String {
    format!("{}[{}]", join(path, field), i)
}

fn issue(issues: &mut Vec<ValidationIssue>, path: String, message: impl Into<String>) {
    issues.push(ValidationIssue {
        path,
        message: message.into(),
    });
}

impl Validate for MetricData {
    fn validate_at(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        if let Some(i) = self.first_out_of_order() {
            issue(
                issues,
                index(path, "data", i),
                "sample is earlier than the one before it",
            );
        }
        if self.granularity < 0 {
            issue(issues, join(path, "granularity"), "granularity is negative");
        }
    }
}

impl Validate for ContainerPlanning {
    fn validate_at(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        if self.name.trim().is_empty() {
            issue(issues, join(path, "name"), "container name is empty");
        }
        let groups = [
            ("limit_plannings", &self.limit_plannings),
            ("request_plannings", &self.request_plannings),
            ("initial_limit_plannings", &self.initial_limit_plannings),
            ("initial_request_plannings", &self.initial_request_plannings),
        ];
        for (field, series) in groups {
            for (i, data) in series.iter().enumerate() {
                data.validate_at(&index(path, field, i), issues);
            }
        }
    }
}

impl Validate for PodPlanning {
    fn validate_at(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        match &self.namespaced_name {
            Some(name) if !name.name.is_empty() => {}
            _ => issue(
                issues,
                join(path, "namespaced_name"),
                "pod reference is missing",
            ),
        }

        if let (Some(start), Some(end)) = (&self.start_time, &self.end_time) {
            if timestamp::sort_key(end) < timestamp::sort_key(start) {
                issue(
                    issues,
                    join(path, "end_time"),
                    format!(
                        "end_time {} is before start_time {}",
                        timestamp::format(end),
                        timestamp::format(start)
                    ),
                );
            }
        }

        if self.total_cost.is_nan() {
            issue(issues, join(path, "total_cost"), "total_cost is NaN");
        }

        for (i, container) in self.container_plannings.iter().enumerate() {
            container.validate_at(&index(path, "container_plannings", i), issues);
        }
    }
}

impl Validate for ControllerPlanning {
    fn validate_at(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        match self.ctl_planning_type {
            ControllerPlanningType::Primitive if self.ctl_planning_spec.is_none() => issue(
                issues,
                join(path, "ctl_planning_spec"),
                "ctl_planning_type is CPT_PRIMITIVE but ctl_planning_spec is absent",
            ),
            ControllerPlanningType::K8s if self.ctl_planning_spec_k8s.is_none() => issue(
                issues,
                join(path, "ctl_planning_spec_k8s"),
                "ctl_planning_type is CPT_K8S but ctl_planning_spec_k8s is absent",
            ),
            _ => {}
        }

        let (Some(native), Some(k8s)) = (&self.ctl_planning_spec, &self.ctl_planning_spec_k8s)
        else {
            return;
        };
        let mut diverging = Vec::new();
        if native.current_replicas != k8s.current_replicas {
            diverging.push("current_replicas");
        }
        if native.desired_replicas != k8s.desired_replicas {
            diverging.push("desired_replicas");
        }
        if native.time != k8s.time {
            diverging.push("time");
        }
        if native.create_time != k8s.create_time {
            diverging.push("create_time");
        }
        if !diverging.is_empty() {
            issue(
                issues,
                path.to_string(),
                format!(
                    "ctl_planning_spec and ctl_planning_spec_k8s disagree on {}",
                    diverging.join(", ")
                ),
            );
        }
    }
}

impl Validate for CreatePodPlanningsRequest {
    fn validate_at(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        if self.granularity < 0 {
            issue(issues, join(path, "granularity"), "granularity is negative");
        }
        for (i, pod) in self.pod_plannings.iter().enumerate() {
            pod.validate_at(&index(path, "pod_plannings", i), issues);
        }
    }
}

impl Validate for CreateControllerPlanningsRequest {
    fn validate_at(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        if self.granularity < 0 {
            issue(issues, join(path, "granularity"), "granularity is negative");
        }
        for (i, controller) in self.controller_plannings.iter().enumerate() {
            controller.validate_at(&index(path, "controller_plannings", i), issues);
        }
    }
}

impl Validate for AnyPlanning {
    fn validate_at(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        match self {
            AnyPlanning::ContainerPlanning(m) => m.validate_at(path, issues),
            AnyPlanning::PodPlanning(m) => m.validate_at(path, issues),
            AnyPlanning::ControllerPlanning(m) => m.validate_at(path, issues),
            AnyPlanning::CreatePodPlanningsRequest(m) => m.validate_at(path, issues),
            AnyPlanning::CreateControllerPlanningsRequest(m) => m.validate_at(path, issues),
        }
    }
}
