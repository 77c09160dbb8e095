//! JSON shapes exchanged with the extraction backend.

use review_core::{Confidence, FieldLabel, FieldRow, JobProgress, PhaseProgress};
use serde::Deserialize;
use serde_json::Value;

use crate::{FailureKind, JobError, TimeReport};

#[derive(Debug, Deserialize)]
struct WirePhase {
    #[serde(default)]
    progress: f64,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct WireProgress {
    ocr: Option<WirePhase>,
    main: Option<WirePhase>,
}

#[derive(Debug, Deserialize)]
struct WireRow {
    id: String,
    #[serde(default)]
    expected: Value,
    #[serde(default)]
    received: Value,
    #[serde(default)]
    confidence: Value,
}

impl From<WirePhase> for PhaseProgress {
    fn from(phase: WirePhase) -> Self {
        PhaseProgress::new(phase.progress, phase.status)
    }
}

/// Parses a `/progress` body. Missing phases read as zero.
pub(crate) fn parse_progress(body: &[u8]) -> Result<JobProgress, JobError> {
    let value = parse_json(body)?;
    backend_error(&value)?;
    let wire: WireProgress = serde_json::from_value(value)
        .map_err(|err| JobError::new(FailureKind::Decode, err.to_string()))?;
    Ok(JobProgress::new(
        wire.ocr.map(PhaseProgress::from).unwrap_or_default(),
        wire.main.map(PhaseProgress::from).unwrap_or_default(),
    ))
}

/// Parses a `/run-script` body: a row array, or an `{error}` object.
/// Rows with unknown ids are dropped.
pub(crate) fn parse_rows(body: &[u8]) -> Result<Vec<FieldRow>, JobError> {
    let value = parse_json(body)?;
    backend_error(&value)?;
    let rows: Vec<WireRow> = serde_json::from_value(value)
        .map_err(|err| JobError::new(FailureKind::Decode, err.to_string()))?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let id = FieldLabel::from_wire(&row.id)?;
            Some(FieldRow {
                id,
                expected: text(&row.expected),
                received: text(&row.received),
                confidence: confidence(&row.confidence),
            })
        })
        .collect())
}

pub(crate) fn parse_file_list(body: &[u8]) -> Result<Vec<String>, JobError> {
    let value = parse_json(body)?;
    backend_error(&value)?;
    serde_json::from_value(value).map_err(|err| JobError::new(FailureKind::Decode, err.to_string()))
}

/// Extracts the message of an `{ "error": ... }` body, if any.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("error")? {
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn run_script_body(filename: &str) -> Vec<u8> {
    serde_json::json!({ "filename": filename }).to_string().into_bytes()
}

pub(crate) fn time_report_body(report: &TimeReport) -> Vec<u8> {
    serde_json::json!({
        "filename": report.filename,
        "duration": report.duration_secs,
        "action": report.action.wire_name(),
    })
    .to_string()
    .into_bytes()
}

fn parse_json(body: &[u8]) -> Result<Value, JobError> {
    serde_json::from_slice(body).map_err(|err| JobError::new(FailureKind::Decode, err.to_string()))
}

fn backend_error(value: &Value) -> Result<(), JobError> {
    match value.get("error") {
        Some(Value::String(message)) => Err(JobError::new(FailureKind::Backend, message.clone())),
        Some(other) => Err(JobError::new(FailureKind::Backend, other.to_string())),
        None => Ok(()),
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn confidence(value: &Value) -> Confidence {
    match value {
        Value::Number(number) => number
            .as_f64()
            .map_or(Confidence::NotComputed, Confidence::from_number),
        Value::String(raw) => Confidence::parse(raw),
        _ => Confidence::NotComputed,
    }
}
