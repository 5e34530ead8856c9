//! Workflow YAML validation.
//!
//! Checks GitHub Actions workflow content for structural problems (missing
//! triggers, jobs without `runs-on`, ...) and best-practice suggestions.
//! Validation never fails: malformed input is reported through the returned
//! [`ValidationReport`] instead of an error.

use schemars::JsonSchema;
use serde::Serialize;
use serde_yaml::Value;

const CHECKOUT_SUGGESTION: &str =
    "Consider adding actions/checkout step to access repository files";

/// Result of validating a workflow file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ValidationReport {
    /// False when the file cannot work at all: unparseable, empty, missing
    /// triggers, or missing jobs. Advisory findings leave this true.
    pub valid: bool,
    /// Problems found, in the order the checks run.
    pub warnings: Vec<String>,
    /// Best-practice suggestions.
    pub suggestions: Vec<String>,
}

impl ValidationReport {
    fn invalid(warning: String) -> Self {
        Self {
            valid: false,
            warnings: vec![warning],
            suggestions: Vec::new(),
        }
    }
}

/// Validates GitHub Actions workflow YAML content.
///
/// A bare `on:` key parses as the string `"on"` under YAML 1.2 but as the
/// boolean `true` under YAML 1.1 parsers; both spellings are accepted as the
/// trigger section.
#[must_use]
pub fn validate_workflow(content: &str) -> ValidationReport {
    let document = match serde_yaml::from_str::<Value>(content) {
        Ok(document) => document,
        Err(err) => return ValidationReport::invalid(format!("Invalid YAML: {err}")),
    };

    if is_empty_value(&document) {
        return ValidationReport::invalid("Empty workflow file".to_string());
    }

    let Some(root) = document.as_mapping() else {
        return ValidationReport::invalid(
            "Validation error: workflow document must be a mapping".to_string(),
        );
    };

    let mut report = ValidationReport {
        valid: true,
        warnings: Vec::new(),
        suggestions: Vec::new(),
    };

    if !root.contains_key(Value::from("name")) {
        report.warnings.push("Missing workflow name".to_string());
    }

    let has_trigger = root.keys().any(|key| match key {
        Value::Bool(true) => true,
        Value::String(s) => s == "on",
        _ => false,
    });
    if !has_trigger {
        report.valid = false;
        report
            .warnings
            .push("Missing trigger events (on:)".to_string());
    }

    let Some(jobs_value) = root.get(Value::from("jobs")) else {
        report.valid = false;
        report.warnings.push("Missing jobs section".to_string());
        return report;
    };

    let Some(jobs) = jobs_value.as_mapping() else {
        report.valid = false;
        report
            .warnings
            .push("Validation error: jobs section must be a mapping".to_string());
        return report;
    };

    for (key, job) in jobs {
        let job_id = key_label(key);

        if is_empty_value(job) {
            report.warnings.push(format!("Empty job: {job_id}"));
            continue;
        }

        let fields = job.as_mapping();
        if !fields.is_some_and(|f| f.contains_key(Value::from("runs-on"))) {
            report
                .warnings
                .push(format!("Missing runs-on in job: {job_id}"));
        }
        if !fields.is_some_and(|f| f.contains_key(Value::from("steps"))) {
            report
                .warnings
                .push(format!("Missing steps in job: {job_id}"));
        }
    }

    if !jobs.is_empty() && !has_checkout_step(jobs) {
        report.suggestions.push(CHECKOUT_SUGGESTION.to_string());
    }

    report
}

/// Mirrors falsiness of the values a YAML document can hold: null, false,
/// and empty strings, sequences, and mappings all count as empty.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        Value::Number(_) | Value::Tagged(_) => false,
    }
}

/// Scans every job's steps for a `uses: actions/checkout@...` entry,
/// stopping at the first match. Jobs without a step list contribute nothing.
fn has_checkout_step(jobs: &serde_yaml::Mapping) -> bool {
    jobs.values().any(|job| {
        job.as_mapping()
            .and_then(|fields| fields.get(Value::from("steps")))
            .and_then(Value::as_sequence)
            .is_some_and(|steps| {
                steps.iter().any(|step| {
                    step.as_mapping()
                        .and_then(|fields| fields.get(Value::from("uses")))
                        .and_then(Value::as_str)
                        .is_some_and(|uses| uses.starts_with("actions/checkout@"))
                })
            })
    })
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other)
            .map_or_else(|_| String::new(), |s| s.trim_end().to_string()),
    }
}
