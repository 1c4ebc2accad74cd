//! Terminal output helpers for consistent CLI formatting

use devgroup_core::{Completion, DeviceRecord, GroupCandidate, Outcome, RunReport, Stage};
use serde::Serialize;

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message (green checkmark)
pub fn print_success(message: &str) {
    if use_color() {
        println!("\x1b[32m✓\x1b[0m {}", message);
    } else {
        println!("OK: {}", message);
    }
}

/// Print an info message (blue) to stderr.
pub fn print_info(message: &str) {
    if use_color() {
        eprintln!("\x1b[34mℹ\x1b[0m {}", message);
    } else {
        eprintln!("Info: {}", message);
    }
}

/// Truncate a string for table display, handling Unicode safely.
///
/// If the string exceeds `max_len`, it is truncated with "..." appended.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Candidate device table, keyed by inventory identifier.
pub fn device_table(devices: &[DeviceRecord]) -> String {
    let mut out = format!(
        "{:<38} {:<20} {:<30} {:<12} {:<18}\n",
        "INVENTORY ID", "DEVICE NAME", "OWNER", "OS", "MODEL"
    );
    out.push_str(&"-".repeat(122));
    out.push('\n');

    for device in devices {
        out.push_str(&format!(
            "{:<38} {:<20} {:<30} {:<12} {:<18}\n",
            device.inventory_id,
            truncate(or_dash(device.display_name.as_deref()), 20),
            truncate(or_dash(device.owner_principal_name.as_deref()), 30),
            truncate(or_dash(device.operating_system.as_deref()), 12),
            truncate(or_dash(device.model.as_deref()), 18),
        ));
    }
    out
}

/// Eligible group table, keyed by object identifier.
pub fn group_table(groups: &[GroupCandidate]) -> String {
    let mut out = format!(
        "{:<38} {:<25} {:<40}\n",
        "ID", "DISPLAY NAME", "DESCRIPTION"
    );
    out.push_str(&"-".repeat(105));
    out.push('\n');

    for group in groups {
        out.push_str(&format!(
            "{:<38} {:<25} {:<40}\n",
            group.object_id,
            truncate(&group.display_name, 25),
            truncate(or_dash(group.description.as_deref()), 40),
        ));
    }
    out
}

/// Human summary of a successful run.
pub fn print_completion(completion: &Completion) {
    let device = completion.device.label();
    let group = &completion.group.display_name;
    if completion.applied {
        print_success(&format!("Added {device} to {group}"));
    } else {
        print_info(&format!("Dry run: {device} would be added to {group}"));
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    status: &'static str,
    exit_code: i32,
    path: &'a [Stage],
    #[serde(skip_serializing_if = "Option::is_none")]
    completion: Option<&'a Completion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<JsonFailure>,
}

#[derive(Debug, Serialize)]
struct JsonFailure {
    stage: Stage,
    reason: String,
}

/// Machine-readable report.
pub fn report_json(report: &RunReport) -> serde_json::Result<String> {
    let (status, completion, failure) = match &report.outcome {
        Outcome::Done(completion) => ("done", Some(completion), None),
        Outcome::Failed(failure) => (
            "failed",
            None,
            Some(JsonFailure {
                stage: failure.stage,
                reason: failure.kind.to_string(),
            }),
        ),
    };

    serde_json::to_string_pretty(&JsonReport {
        status,
        exit_code: report.outcome.exit_code(),
        path: &report.path,
        completion,
        failure,
    })
}
