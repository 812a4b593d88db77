//! Resource metadata, controller descriptors and pod assignment policies
//! (`datahub.resources.v1alpha1`)

use prost::{Enumeration, Message};
use prost_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::timestamp;

/// Orchestrator object kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Enumeration)]
#[repr(i32)]
pub enum Kind {
    KindUndefined = 0,
    Pod = 1,
    Deployment = 2,
    Deploymentconfig = 3,
    Statefulset = 4,
}

impl Kind {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Kind::KindUndefined => "KIND_UNDEFINED",
            Kind::Pod => "POD",
            Kind::Deployment => "DEPLOYMENT",
            Kind::Deploymentconfig => "DEPLOYMENTCONFIG",
            Kind::Statefulset => "STATEFULSET",
        }
    }

    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "KIND_UNDEFINED" => Some(Self::KindUndefined),
            "POD" => Some(Self::Pod),
            "DEPLOYMENT" => Some(Self::Deployment),
            "DEPLOYMENTCONFIG" => Some(Self::Deploymentconfig),
            "STATEFULSET" => Some(Self::Statefulset),
            _ => None,
        }
    }
}

/// `(namespace, name)` key of an orchestrator object
#[derive(Clone, PartialEq, Eq, Hash, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespacedName {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(string, tag = "2")]
    pub name: String,
}

impl NamespacedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Owning controller of a pod
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Controller {
    #[prost(message, optional, tag = "1")]
    pub namespaced_name: Option<NamespacedName>,
    #[prost(enumeration = "Kind", tag = "2")]
    pub kind: i32,
}

impl Controller {
    pub fn new(namespaced_name: NamespacedName, kind: Kind) -> Self {
        Self {
            namespaced_name: Some(namespaced_name),
            kind: kind as i32,
        }
    }
}

/// How a pod should be (re)scheduled when a plan is applied
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignPodPolicy {
    #[prost(message, optional, tag = "1")]
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    #[prost(oneof = "assign_pod_policy::Policy", tags = "2, 3, 4")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<assign_pod_policy::Policy>,
}

pub mod assign_pod_policy {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, prost::Oneof, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Policy {
        /// Candidate nodes, most preferred first
        #[prost(message, tag = "2")]
        NodePriority(super::NodePriority),
        #[prost(message, tag = "3")]
        NodeSelector(super::Selector),
        #[prost(string, tag = "4")]
        NodeName(String),
    }
}

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePriority {
    #[prost(string, repeated, tag = "1")]
    pub nodes: Vec<String>,
}

/// Node label selector. Entries encode in key order.
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Selector {
    #[prost(btree_map = "string, string", tag = "1")]
    pub selector: BTreeMap<String, String>,
}

impl AssignPodPolicy {
    /// Node the policy points at first, if any
    pub fn preferred_node(&self) -> Option<&str> {
        match self.policy.as_ref()? {
            assign_pod_policy::Policy::NodeName(name) => Some(name.as_str()),
            assign_pod_policy::Policy::NodePriority(priority) => {
                priority.nodes.first().map(String::as_str)
            }
            assign_pod_policy::Policy::NodeSelector(_) => None,
        }
    }
}
