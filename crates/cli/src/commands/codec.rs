//! Encode, decode, inspect and validate commands

use anyhow::{bail, Context, Result};
use colored::Colorize;
use planning_lib::codec::unframe;
use planning_lib::schema::inspect as wire_inspect;
use planning_lib::{
    AnyPlanning, Codec, CodecMetrics, ControllerPlanning, DecodeReport, Framing, MessageKind,
    OpenEnum, PodPlanning, Validate,
};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;
use tracing::info;

use super::{read_input, read_wire, write_output};
use crate::config::Settings;
use crate::output::{
    color_symbol, format_bytes, format_timestamp, print_info, print_success, print_table,
    print_warning, OutputFormat,
};

/// Row for message summary tables
#[derive(Tabled, Serialize)]
struct SummaryRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl SummaryRow {
    fn new(field: &str, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Row for validation issue tables
#[derive(Tabled, Serialize)]
struct IssueRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Issue")]
    message: String,
}

fn codec_for(settings: &Settings) -> Codec {
    Codec::new().with_mode(settings.decode_mode)
}

/// Encode a JSON message to the wire format
pub fn encode(
    kind: MessageKind,
    input: Option<&Path>,
    output: Option<&Path>,
    hex: bool,
    settings: &Settings,
) -> Result<()> {
    let json = read_input(input)?;
    let json = String::from_utf8(json).context("JSON input is not valid UTF-8")?;
    let message = AnyPlanning::from_json(kind, &json)
        .with_context(|| format!("Failed to parse {} JSON", kind))?;

    let bytes = codec_for(settings).encode_any(&message, settings.framing);
    info!(
        event = "message_encoded",
        kind = %kind,
        framing = %settings.framing,
        bytes = bytes.len(),
        "Encoded message"
    );

    if hex {
        let mut text = hex::encode(&bytes);
        text.push('\n');
        write_output(output, text.as_bytes())?;
    } else {
        write_output(output, &bytes)?;
    }

    if let Some(path) = output {
        print_success(&format!(
            "Wrote {} ({}) to {}",
            kind,
            format_bytes(bytes.len()),
            path.display()
        ));
    }
    Ok(())
}

/// Decode wire bytes and print the message
pub fn decode(
    kind: MessageKind,
    input: Option<&Path>,
    hex: bool,
    show_metrics: bool,
    settings: &Settings,
) -> Result<()> {
    let bytes = read_wire(input, hex)?;
    let metrics = CodecMetrics::new();
    let codec = codec_for(settings).with_metrics(metrics.clone());

    let (message, report) = codec
        .decode_any(kind, &bytes, settings.framing)
        .with_context(|| format!("Failed to decode {}", kind))?;

    match settings.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&message)?);
        }
        OutputFormat::Table => {
            println!("{} {}", kind.to_string().bold(), format_bytes(bytes.len()).dimmed());
            print_table(&summary(&message), OutputFormat::Table);
        }
    }
    print_report(&report);

    if show_metrics {
        eprint!("{}", metrics.render()?);
    }
    Ok(())
}

/// Print the field tree of wire bytes
pub fn inspect(
    kind: MessageKind,
    input: Option<&Path>,
    hex: bool,
    settings: &Settings,
) -> Result<()> {
    let bytes = read_wire(input, hex)?;
    let body = match settings.framing {
        Framing::Delimited => unframe(&bytes)?,
        Framing::Bare => bytes.as_slice(),
    };
    let fields = wire_inspect::inspect(kind.descriptor(), body)
        .with_context(|| format!("Failed to inspect {}", kind))?;

    match settings.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&fields)?),
        OutputFormat::Table => {
            println!("{}", kind.descriptor().full_name.bold());
            print!("{}", wire_inspect::render(&fields));
        }
    }
    Ok(())
}

/// Validate a message read as JSON or wire bytes
pub fn validate(
    kind: MessageKind,
    input: Option<&Path>,
    wire: bool,
    hex: bool,
    settings: &Settings,
) -> Result<()> {
    let message = if wire {
        let bytes = read_wire(input, hex)?;
        let (message, report) = codec_for(settings)
            .decode_any(kind, &bytes, settings.framing)
            .with_context(|| format!("Failed to decode {}", kind))?;
        print_report(&report);
        message
    } else {
        let json = String::from_utf8(read_input(input)?).context("JSON input is not valid UTF-8")?;
        AnyPlanning::from_json(kind, &json)
            .with_context(|| format!("Failed to parse {} JSON", kind))?
    };

    let issues = message.validate();
    if issues.is_empty() {
        if settings.format == OutputFormat::Json {
            println!("[]");
        }
        print_success(&format!("{} has no issues", kind));
        return Ok(());
    }

    let rows: Vec<IssueRow> = issues
        .iter()
        .map(|issue| IssueRow {
            path: if issue.path.is_empty() {
                "(root)".to_string()
            } else {
                issue.path.clone()
            },
            message: issue.message.clone(),
        })
        .collect();
    print_table(&rows, settings.format);
    bail!("{} validation issue(s) found", issues.len())
}

fn print_report(report: &DecodeReport) {
    for mismatch in &report.mismatches {
        print_warning(&format!("Dropped field: {}", mismatch));
    }
    for unknown in &report.unknown_fields {
        let fate = if unknown.retained { "kept" } else { "skipped" };
        print_info(&format!(
            "Unknown tag {} in {} at byte {} ({})",
            unknown.tag, unknown.message, unknown.offset, fate
        ));
    }
    for value in &report.unrecognized_enums {
        print_info(&format!(
            "{}.{} holds value {} with no {} symbol",
            value.message, value.field, value.value, value.enum_name
        ));
    }
}

fn summary(message: &AnyPlanning) -> Vec<SummaryRow> {
    match message {
        AnyPlanning::PodPlanning(pod) => pod_summary(pod),
        AnyPlanning::ControllerPlanning(controller) => controller_summary(controller),
        AnyPlanning::ContainerPlanning(container) => vec![
            SummaryRow::new("name", &container.name),
            SummaryRow::new("limit_plannings", container.limit_plannings.len()),
            SummaryRow::new("request_plannings", container.request_plannings.len()),
            SummaryRow::new("initial_limit_plannings", container.initial_limit_plannings.len()),
            SummaryRow::new(
                "initial_request_plannings",
                container.initial_request_plannings.len(),
            ),
        ],
        AnyPlanning::CreatePodPlanningsRequest(request) => {
            let mut rows = vec![
                SummaryRow::new("pod_plannings", request.pod_plannings.len()),
                SummaryRow::new("granularity", format!("{}s", request.effective_granularity())),
            ];
            rows.extend(request.pod_plannings.iter().enumerate().map(|(i, pod)| {
                let name = pod
                    .namespaced_name
                    .as_ref()
                    .map_or_else(|| "-".to_string(), ToString::to_string);
                SummaryRow::new(&format!("pod_plannings[{}]", i), name)
            }));
            rows
        }
        AnyPlanning::CreateControllerPlanningsRequest(request) => vec![
            SummaryRow::new("controller_plannings", request.controller_plannings.len()),
            SummaryRow::new("granularity", format!("{}s", request.effective_granularity())),
        ],
    }
}

fn pod_summary(pod: &PodPlanning) -> Vec<SummaryRow> {
    let samples: usize = pod
        .container_plannings
        .iter()
        .flat_map(|c| c.limit_plannings.iter().chain(&c.request_plannings))
        .map(|series| series.data.len())
        .sum();

    vec![
        SummaryRow::new("planning_id", &pod.planning_id),
        SummaryRow::new(
            "planning_type",
            color_symbol(pod.planning_type.as_str_name(), pod.planning_type.to_raw()),
        ),
        SummaryRow::new(
            "pod",
            pod.namespaced_name
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
        ),
        SummaryRow::new("apply_planning_now", pod.apply_planning_now),
        SummaryRow::new("containers", pod.container_plannings.len()),
        SummaryRow::new("planned_samples", samples),
        SummaryRow::new("start_time", format_timestamp(pod.start_time.as_ref(), "unset")),
        SummaryRow::new("end_time", format_timestamp(pod.end_time.as_ref(), "open-ended")),
        SummaryRow::new(
            "top_controller",
            pod.top_controller
                .as_ref()
                .and_then(|c| c.namespaced_name.as_ref())
                .map_or_else(|| "-".to_string(), ToString::to_string),
        ),
        SummaryRow::new("total_cost", pod.total_cost),
    ]
}

fn controller_summary(controller: &ControllerPlanning) -> Vec<SummaryRow> {
    let replicas = |current: i32, desired: i32| format!("{} -> {}", current, desired);
    vec![
        SummaryRow::new(
            "planning_type",
            color_symbol(
                controller.planning_type.as_str_name(),
                controller.planning_type.to_raw(),
            ),
        ),
        SummaryRow::new(
            "ctl_planning_type",
            color_symbol(
                controller.ctl_planning_type.as_str_name(),
                controller.ctl_planning_type.to_raw(),
            ),
        ),
        SummaryRow::new(
            "ctl_planning_spec",
            controller.ctl_planning_spec.as_ref().map_or_else(
                || "absent".to_string(),
                |spec| replicas(spec.current_replicas, spec.desired_replicas),
            ),
        ),
        SummaryRow::new(
            "ctl_planning_spec_k8s",
            controller.ctl_planning_spec_k8s.as_ref().map_or_else(
                || "absent".to_string(),
                |spec| replicas(spec.current_replicas, spec.desired_replicas),
            ),
        ),
    ]
}
