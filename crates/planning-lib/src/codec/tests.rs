use super::*;
use crate::proto::plannings::tags;
use crate::proto::timestamp;
use crate::proto::{
    assign_pod_policy::Policy, AssignPodPolicy, Controller, ControllerPlanningSpec,
    ControllerPlanningSpecK8s, ControllerPlanningType, Kind, MetricData, MetricType,
    NamespacedName, NodePriority, OpenEnum, PlanningType, Sample, Selector, UnknownValue,
};
use prost::encoding;
use proptest::prelude::*;

const T0: i64 = 1_700_000_000;

fn scenario_pod() -> PodPlanning {
    PodPlanning {
        planning_type: PlanningType::Recommendation,
        namespaced_name: Some(NamespacedName::new("ns1", "pod-a")),
        apply_planning_now: true,
        container_plannings: vec![ContainerPlanning {
            name: "c1".to_string(),
            limit_plannings: vec![MetricData::new(
                MetricType::CpuUsageSecondsPercentage,
                vec![Sample::at(timestamp::from_unix_seconds(T0), 2.0)],
            )],
            ..Default::default()
        }],
        start_time: Some(timestamp::from_unix_seconds(T0)),
        end_time: None,
        total_cost: 0.0,
        ..Default::default()
    }
}

fn full_pod() -> PodPlanning {
    let series = |metric_type, value| {
        MetricData {
            granularity: 30,
            ..MetricData::new(
                metric_type,
                vec![
                    Sample::at(timestamp::from_unix_seconds(T0), value),
                    Sample {
                        time: Some(timestamp::from_unix_seconds(T0 + 30)),
                        end_time: Some(timestamp::from_unix_seconds(T0 + 60)),
                        num_value: "1.25".to_string(),
                    },
                ],
            )
        }
    };
    let mut selector = Selector::default();
    selector
        .selector
        .insert("zone".to_string(), "eu-1".to_string());

    PodPlanning {
        planning_type: PlanningType::Planning,
        namespaced_name: Some(NamespacedName::new("ns1", "pod-a")),
        apply_planning_now: true,
        assign_pod_policy: Some(AssignPodPolicy {
            time: Some(timestamp::from_unix_seconds(T0)),
            policy: Some(Policy::NodeSelector(selector)),
        }),
        container_plannings: vec![ContainerPlanning {
            name: "app".to_string(),
            limit_plannings: vec![series(MetricType::CpuUsageSecondsPercentage, 0.5)],
            request_plannings: vec![series(MetricType::MemoryUsageBytes, 1024.0)],
            initial_limit_plannings: vec![series(MetricType::CpuUsageSecondsPercentage, 1.0)],
            initial_request_plannings: vec![series(MetricType::MemoryUsageBytes, 2048.0)],
            ..Default::default()
        }],
        start_time: Some(timestamp::from_unix_seconds(T0)),
        end_time: Some(timestamp::from_unix_seconds(T0 + 3600)),
        top_controller: Some(Controller::new(
            NamespacedName::new("ns1", "web"),
            Kind::Deployment,
        )),
        planning_id: "plan-42".to_string(),
        total_cost: 3.75,
        ..Default::default()
    }
}

fn full_controller() -> ControllerPlanning {
    ControllerPlanning {
        planning_type: PlanningType::Planning,
        ctl_planning_type: ControllerPlanningType::K8s,
        ctl_planning_spec: Some(ControllerPlanningSpec {
            current_replicas: 2,
            desired_replicas: 4,
            time: Some(timestamp::from_unix_seconds(T0)),
            create_time: Some(timestamp::from_unix_seconds(T0 - 60)),
            current_cpu_requests: 0.5,
            current_mem_requests: 256.0,
            current_cpu_limits: 1.0,
            current_mem_limits: 512.0,
            desired_cpu_limits: 2.0,
            desired_mem_limits: 1024.0,
            total_cost: 9.5,
        }),
        ctl_planning_spec_k8s: Some(ControllerPlanningSpecK8s {
            current_replicas: 2,
            desired_replicas: 4,
            time: Some(timestamp::from_unix_seconds(T0)),
            create_time: Some(timestamp::from_unix_seconds(T0 - 60)),
        }),
        ..Default::default()
    }
}

fn frame(body: &[u8]) -> Vec<u8> {
    let mut framed = Vec::new();
    encoding::encode_varint(body.len() as u64, &mut framed);
    framed.extend_from_slice(body);
    framed
}

#[test]
fn test_round_trip_every_kind() {
    let codec = Codec::new();

    let pod = full_pod();
    assert_eq!(codec.decode::<PodPlanning>(&codec.encode(&pod)).unwrap(), pod);

    let container = pod.container_plannings[0].clone();
    assert_eq!(
        codec
            .decode::<ContainerPlanning>(&codec.encode(&container))
            .unwrap(),
        container
    );

    let controller = full_controller();
    assert_eq!(
        codec
            .decode::<ControllerPlanning>(&codec.encode(&controller))
            .unwrap(),
        controller
    );

    let pods = CreatePodPlanningsRequest {
        pod_plannings: vec![pod.clone(), scenario_pod()],
        granularity: 60,
    };
    assert_eq!(
        codec
            .decode::<CreatePodPlanningsRequest>(&codec.encode(&pods))
            .unwrap(),
        pods
    );

    let controllers = CreateControllerPlanningsRequest {
        controller_plannings: vec![controller],
        granularity: 0,
    };
    let decoded: CreateControllerPlanningsRequest =
        codec.decode(&codec.encode(&controllers)).unwrap();
    assert_eq!(decoded, controllers);
    assert_eq!(decoded.effective_granularity(), 30);
}

#[test]
fn test_encoding_is_deterministic() {
    let codec = Codec::new();
    let pod = full_pod();
    assert_eq!(codec.encode(&pod), codec.encode(&pod.clone()));
}

#[test]
fn test_pod_planning_scenario() {
    let codec = Codec::new();
    let decoded: PodPlanning = codec.decode(&codec.encode(&scenario_pod())).unwrap();

    assert_eq!(decoded, scenario_pod());
    assert_eq!(decoded.planning_type, PlanningType::from_raw(1));
    assert_eq!(
        decoded.namespaced_name.as_ref().map(ToString::to_string),
        Some("ns1/pod-a".to_string())
    );
    assert!(decoded.apply_planning_now);
    assert_eq!(decoded.container_plannings.len(), 1);
    let series = &decoded.container_plannings[0].limit_plannings[0];
    assert_eq!(series.data[0].time, Some(timestamp::from_unix_seconds(T0)));
    assert_eq!(series.data[0].value(), Some(2.0));
    assert!(decoded.end_time.is_none());
    assert!(decoded.is_open_ended());
    assert_eq!(decoded.total_cost, 0.0);
}

#[test]
fn test_controller_planning_with_native_spec_only() {
    let codec = Codec::new();
    let controller = ControllerPlanning {
        planning_type: PlanningType::Recommendation,
        ctl_planning_type: ControllerPlanningType::Primitive,
        ctl_planning_spec: Some(ControllerPlanningSpec {
            desired_replicas: 3,
            ..Default::default()
        }),
        ..Default::default()
    };

    let decoded: ControllerPlanning = codec.decode(&codec.encode(&controller)).unwrap();
    assert!(decoded.ctl_planning_spec_k8s.is_none());
    assert_eq!(decoded.ctl_planning_spec.map(|s| s.desired_replicas), Some(3));
}

#[test]
fn test_empty_nested_message_stays_present() {
    let codec = Codec::new();
    let controller = ControllerPlanning {
        ctl_planning_spec_k8s: Some(ControllerPlanningSpecK8s::default()),
        ..Default::default()
    };
    let decoded: ControllerPlanning = codec.decode(&codec.encode(&controller)).unwrap();
    assert_eq!(
        decoded.ctl_planning_spec_k8s,
        Some(ControllerPlanningSpecK8s::default())
    );
    assert!(decoded.ctl_planning_spec.is_none());
}

#[test]
fn test_unknown_trailing_tags_do_not_change_known_fields() {
    let codec = Codec::new();
    let pod = full_pod();
    let mut body = codec.encode_body(&pod);
    encoding::string::encode(42, &"added later".to_string(), &mut body);
    encoding::uint64::encode(43, &7, &mut body);

    let (decoded, report) = codec
        .decode_with_report::<PodPlanning>(&frame(&body))
        .unwrap();

    let mut known_only = decoded.clone();
    known_only.unknown_fields.clear();
    assert_eq!(known_only, pod);
    assert_eq!(decoded.unknown_fields.len(), 2);
    assert_eq!(report.unknown_fields.len(), 2);

    // Passthrough: re-encoding reproduces the input exactly
    assert_eq!(codec.encode_body(&decoded), body);
}

#[test]
fn test_unknown_fields_in_nested_planning_are_kept() {
    let codec = Codec::new();
    let mut container = ContainerPlanning {
        name: "c1".to_string(),
        ..Default::default()
    };
    container
        .unknown_fields
        .push(9, UnknownValue::Varint(12));
    let pod = PodPlanning {
        container_plannings: vec![container.clone()],
        ..Default::default()
    };

    let decoded: PodPlanning = codec.decode(&codec.encode(&pod)).unwrap();
    assert_eq!(decoded.container_plannings[0], container);
}

#[test]
fn test_missing_newer_fields_decode_to_zero_values() {
    // A writer that only knows the first three pod planning fields
    let mut body = Vec::new();
    encoding::int32::encode(tags::pod_planning::PLANNING_TYPE, &2, &mut body);
    encoding::message::encode(
        tags::pod_planning::NAMESPACED_NAME,
        &NamespacedName::new("ns1", "pod-a"),
        &mut body,
    );
    encoding::bool::encode(tags::pod_planning::APPLY_PLANNING_NOW, &true, &mut body);

    let decoded: PodPlanning = Codec::new().decode(&frame(&body)).unwrap();
    assert_eq!(decoded.planning_type, PlanningType::Planning);
    assert!(decoded.apply_planning_now);
    assert!(decoded.assign_pod_policy.is_none());
    assert!(decoded.container_plannings.is_empty());
    assert!(decoded.start_time.is_none());
    assert!(decoded.top_controller.is_none());
    assert_eq!(decoded.planning_id, "");
    assert_eq!(decoded.total_cost, 0.0);
}

#[test]
fn test_out_of_range_enum_round_trips() {
    let codec = Codec::new();
    let controller = ControllerPlanning {
        planning_type: PlanningType::from_raw(17),
        ctl_planning_type: ControllerPlanningType::from_raw(1000),
        ..Default::default()
    };

    let (decoded, report) = codec
        .decode_with_report::<ControllerPlanning>(&codec.encode(&controller))
        .unwrap();
    assert_eq!(decoded.planning_type, PlanningType::Unrecognized(17));
    assert_eq!(decoded.ctl_planning_type.to_raw(), 1000);
    assert_eq!(report.unrecognized_enums.len(), 2);
    assert_eq!(codec.encode(&decoded), codec.encode(&controller));
}

#[test]
fn test_every_truncation_is_malformed() {
    let codec = Codec::new();
    let bytes = codec.encode(&full_pod());
    for cut in 0..bytes.len() {
        let err = codec
            .decode::<PodPlanning>(&bytes[..cut])
            .expect_err("truncated input must not decode");
        assert!(err.is_malformed(), "cut at {}: {:?}", cut, err);
    }
}

#[test]
fn test_trailing_bytes_are_malformed() {
    let codec = Codec::new();
    let mut bytes = codec.encode(&scenario_pod());
    bytes.push(0x08);
    let err = codec.decode::<PodPlanning>(&bytes).unwrap_err();
    assert!(err.is_malformed());
    assert!(err.to_string().contains("1 trailing bytes"));
}

#[test]
fn test_declared_length_past_end_in_body_is_malformed() {
    // planning_id says 10 bytes, 3 follow
    let body = [0x4a, 0x0a, b'a', b'b', b'c'];
    let err = Codec::new().decode_body::<PodPlanning>(&body).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_invalid_varint_is_malformed() {
    let body = [0x08, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
    let err = Codec::new().decode_body::<PodPlanning>(&body).unwrap_err();
    assert!(err.is_malformed());
}

fn body_with_mistyped_planning_id() -> Vec<u8> {
    let mut body = Vec::new();
    encoding::int32::encode(tags::pod_planning::PLANNING_TYPE, &1, &mut body);
    encoding::uint64::encode(tags::pod_planning::PLANNING_ID, &99, &mut body);
    encoding::bool::encode(tags::pod_planning::APPLY_PLANNING_NOW, &true, &mut body);
    body
}

#[test]
fn test_lenient_mode_drops_mismatched_field() {
    let codec = Codec::new();
    assert_eq!(codec.mode(), DecodeMode::Lenient);

    let (decoded, report) = codec
        .decode_body_with_report::<PodPlanning>(&body_with_mistyped_planning_id())
        .unwrap();
    assert_eq!(decoded.planning_type, PlanningType::Recommendation);
    assert!(decoded.apply_planning_now);
    assert_eq!(decoded.planning_id, "");
    assert!(decoded.unknown_fields.is_empty());
    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].field, "planning_id");
}

#[test]
fn test_strict_mode_rejects_mismatched_field() {
    let codec = Codec::new().with_mode(DecodeMode::Strict);
    let err = codec
        .decode_body::<PodPlanning>(&body_with_mistyped_planning_id())
        .unwrap_err();
    assert_eq!(err.kind(), "type_mismatch");
    assert!(err.to_string().contains("planning_id (tag 9)"));
}

#[test]
fn test_strict_mode_reaches_nested_messages() {
    let mut spec = Vec::new();
    encoding::string::encode(1, &"two".to_string(), &mut spec);
    let mut body = Vec::new();
    encoding::bytes::encode(tags::controller_planning::CTL_PLANNING_SPEC, &spec, &mut body);

    let strict = Codec::new().with_mode(DecodeMode::Strict);
    assert!(matches!(
        strict.decode_body::<ControllerPlanning>(&body),
        Err(CodecError::TypeMismatch(m)) if m.field == "current_replicas"
    ));

    let lenient: ControllerPlanning = Codec::new().decode_body(&body).unwrap();
    assert_eq!(lenient.ctl_planning_spec, Some(ControllerPlanningSpec::default()));
}

#[test]
fn test_fully_populated_messages_match_descriptors() {
    let strict = Codec::new().with_mode(DecodeMode::Strict);

    let request = CreatePodPlanningsRequest {
        pod_plannings: vec![full_pod()],
        granularity: 15,
    };
    let (_, report) = strict
        .decode_with_report::<CreatePodPlanningsRequest>(&strict.encode(&request))
        .unwrap();
    assert!(report.is_clean(), "{:?}", report);

    let mut other_policies = full_pod();
    other_policies.assign_pod_policy = Some(AssignPodPolicy {
        time: None,
        policy: Some(Policy::NodePriority(NodePriority {
            nodes: vec!["n1".to_string(), "n2".to_string()],
        })),
    });
    let (_, report) = strict
        .decode_with_report::<PodPlanning>(&strict.encode(&other_policies))
        .unwrap();
    assert!(report.is_clean(), "{:?}", report);

    let request = CreateControllerPlanningsRequest {
        controller_plannings: vec![full_controller()],
        granularity: 15,
    };
    let (_, report) = strict
        .decode_with_report::<CreateControllerPlanningsRequest>(&strict.encode(&request))
        .unwrap();
    assert!(report.is_clean(), "{:?}", report);
}

#[test]
fn test_encode_to_small_buffer_fails() {
    let codec = Codec::new();
    let pod = full_pod();

    let mut small = [0u8; 8];
    let err = codec
        .encode_to(&pod, &mut &mut small[..], Framing::Delimited)
        .unwrap_err();
    assert_eq!(err.kind(), "encoding");

    let mut exact = vec![0u8; pod.encoded_len()];
    codec
        .encode_to(&pod, &mut &mut exact[..], Framing::Bare)
        .unwrap();
    assert_eq!(exact, codec.encode_body(&pod));
}

#[test]
fn test_any_planning_through_json() {
    let codec = Codec::new();
    let json = r#"{
        "planning_type": "PT_RECOMMENDATION",
        "namespaced_name": { "namespace": "ns1", "name": "pod-a" },
        "apply_planning_now": true,
        "start_time": "2023-11-14T22:13:20Z"
    }"#;
    let message = AnyPlanning::from_json(MessageKind::PodPlanning, json).unwrap();
    assert_eq!(message.kind(), MessageKind::PodPlanning);

    let bytes = codec.encode_any(&message, Framing::Bare);
    let (decoded, report) = codec
        .decode_any(MessageKind::PodPlanning, &bytes, Framing::Bare)
        .unwrap();
    assert!(report.is_clean());
    assert_eq!(decoded, message);

    match decoded {
        AnyPlanning::PodPlanning(pod) => {
            assert_eq!(pod.start_time, Some(timestamp::from_unix_seconds(T0)));
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn test_decode_any_reports_kind_specific_errors() {
    let codec = Codec::new().with_mode(DecodeMode::Strict);
    let bytes = codec.encode(&scenario_pod());
    // Same bytes read as a controller planning: tag 2 is a message in pod
    // planning but an enum in controller planning
    let err = codec
        .decode_any(MessageKind::ControllerPlanning, &bytes, Framing::Delimited)
        .unwrap_err();
    assert_eq!(err.kind(), "type_mismatch");
}

#[test]
fn test_codec_with_metrics_records_calls() {
    let metrics = CodecMetrics::new();
    let codec = Codec::new().with_metrics(metrics.clone());
    let bytes = codec.encode(&scenario_pod());
    codec.decode::<PodPlanning>(&bytes).unwrap();
    codec.decode::<PodPlanning>(&bytes[..3]).unwrap_err();

    let text = metrics.render().unwrap();
    assert!(text.contains("planning_codec_messages_decoded_total{kind=\"pod-planning\"}"));
    assert!(text.contains("error=\"malformed\""));
}

#[test]
fn test_message_kind_parsing() {
    assert_eq!("pod-planning".parse(), Ok(MessageKind::PodPlanning));
    assert_eq!("PodPlanning".parse(), Ok(MessageKind::PodPlanning));
    assert_eq!(
        "datahub.plannings.v1alpha1.ControllerPlanning".parse(),
        Ok(MessageKind::ControllerPlanning)
    );
    assert!("pod".parse::<MessageKind>().is_err());
    assert_eq!("STRICT".parse(), Ok(DecodeMode::Strict));
    assert_eq!("bare".parse(), Ok(Framing::Bare));
}

fn arb_series() -> impl Strategy<Value = MetricData> {
    (
        0i32..6,
        prop::collection::vec((0i64..86_400, -1.0e6f64..1.0e6), 0..4),
        0i64..600,
    )
        .prop_map(|(metric_type, points, granularity)| {
            let mut offset = 0;
            let data = points
                .into_iter()
                .map(|(step, value)| {
                    offset += step;
                    Sample::at(timestamp::from_unix_seconds(T0 + offset), value)
                })
                .collect();
            MetricData {
                metric_type,
                data,
                granularity,
            }
        })
}

fn arb_container() -> impl Strategy<Value = ContainerPlanning> {
    (
        "[a-z][a-z0-9-]{0,10}",
        prop::collection::vec(arb_series(), 0..2),
        prop::collection::vec(arb_series(), 0..2),
    )
        .prop_map(|(name, limit_plannings, request_plannings)| ContainerPlanning {
            name,
            limit_plannings,
            request_plannings,
            ..Default::default()
        })
}

fn arb_pod() -> impl Strategy<Value = PodPlanning> {
    (
        any::<i32>(),
        prop::option::of(("[a-z0-9-]{0,12}", "[a-z0-9-]{1,12}")),
        any::<bool>(),
        prop::collection::vec(arb_container(), 0..3),
        prop::option::of(0i64..4_000_000_000),
        prop::option::of(0i64..4_000_000_000),
        "[a-z0-9]{0,8}",
        -1.0e9f64..1.0e9,
    )
        .prop_map(
            |(planning_type, name, apply, containers, start, end, planning_id, total_cost)| {
                PodPlanning {
                    planning_type: PlanningType::from_raw(planning_type),
                    namespaced_name: name.map(|(ns, name)| NamespacedName::new(ns, name)),
                    apply_planning_now: apply,
                    container_plannings: containers,
                    start_time: start.map(timestamp::from_unix_seconds),
                    end_time: end.map(timestamp::from_unix_seconds),
                    planning_id,
                    total_cost,
                    ..Default::default()
                }
            },
        )
}

proptest! {
    #[test]
    fn prop_pod_planning_round_trips(pod in arb_pod()) {
        let codec = Codec::new();
        let decoded: PodPlanning = codec.decode(&codec.encode(&pod)).unwrap();
        prop_assert_eq!(decoded, pod);
    }

    #[test]
    fn prop_truncated_pod_planning_is_malformed(pod in arb_pod(), cut in any::<prop::sample::Index>()) {
        let codec = Codec::new();
        let bytes = codec.encode(&pod);
        let cut = cut.index(bytes.len());
        let result = codec.decode::<PodPlanning>(&bytes[..cut]);
        prop_assert!(matches!(result, Err(ref err) if err.is_malformed()));
    }
}
