use review_core::{
    AppViewModel, Decision, FieldRowView, LocateGate, PhaseIndicator, PhaseView, SessionState,
};

const FIELD_TITLE: &str = "Felt";
const EXPECTED_TITLE: &str = "Forventet";
const RECEIVED_TITLE: &str = "Modtaget";
const CONFIDENCE_TITLE: &str = "Sikkerhed";

/// Renders the whole view model as terminal text.
pub fn render(view: &AppViewModel) -> String {
    let mut lines = Vec::new();

    if !view.files.is_empty() {
        lines.push("Documents:".to_string());
        for (index, file) in view.files.iter().enumerate() {
            let marker = if view.filename.as_deref() == Some(file.name.as_str()) {
                '>'
            } else {
                ' '
            };
            lines.push(format!(
                "{marker} {:>2}. {:<32} {}",
                index + 1,
                file.name,
                decision_label(file.decision)
            ));
        }
        lines.push(String::new());
    }

    let Some(filename) = view.filename.as_deref() else {
        lines.push("No document selected. Use `open <name|number>`.".to_string());
        return lines.join("\n");
    };
    let page = if view.on_review_page { ", reviewing" } else { "" };
    lines.push(format!("{filename} [{}{page}]", session_label(view.session)));

    if let Some(progress) = &view.progress {
        lines.push(phase_line("OCR", &progress.ocr));
        lines.push(phase_line("Analyse", &progress.main));
    }

    lines.extend(field_table(&view.rows));

    if let Some(error) = &view.job_error {
        lines.push(format!("Error: {error}"));
    }
    if let Some(notice) = &view.notice {
        lines.push(format!("Note: {notice}"));
    }
    lines.join("\n")
}

fn session_label(session: SessionState) -> String {
    match session {
        SessionState::Idle => "idle".to_string(),
        SessionState::Running => "extracting".to_string(),
        SessionState::FieldsReady => "fields ready".to_string(),
        SessionState::Locating(field) => format!("locating {field}"),
        SessionState::Decided(decision) => decision_label(decision).to_string(),
    }
}

fn decision_label(decision: Decision) -> &'static str {
    match decision {
        Decision::Accepted => "accepted",
        Decision::Rejected => "rejected",
        Decision::Pending => "pending",
    }
}

fn phase_line(title: &str, phase: &PhaseView) -> String {
    let state = match phase.indicator {
        PhaseIndicator::Indeterminate { .. } => "working",
        PhaseIndicator::Held => "waiting",
        PhaseIndicator::Complete => "done",
    };
    format!(
        "  {title:<8} {:>4} {state:<8} {}",
        phase.indicator.label(),
        phase.status
    )
}

fn field_table(rows: &[FieldRowView]) -> Vec<String> {
    let width = |title: &str, cell: fn(&FieldRowView) -> &str| {
        rows.iter()
            .map(|row| cell(row).chars().count())
            .chain(std::iter::once(title.chars().count()))
            .max()
            .unwrap_or(0)
    };
    let expected_w = width(EXPECTED_TITLE, |row| row.expected.as_str());
    let received_w = width(RECEIVED_TITLE, |row| row.received.as_str());

    let mut lines = vec![format!(
        "     {FIELD_TITLE:<9} {EXPECTED_TITLE:<expected_w$}  {RECEIVED_TITLE:<received_w$}  {CONFIDENCE_TITLE:<9}"
    )];
    for (index, row) in rows.iter().enumerate() {
        let action = match row.gate {
            LocateGate::Disabled => "-".to_string(),
            LocateGate::Unreliable => format!("[{}] (uncertain)", row.locate_label),
            LocateGate::Reliable => format!("[{}]", row.locate_label),
        };
        lines.push(format!(
            "  {}. {:<9} {:<expected_w$}  {:<received_w$}  {:<9} {action}",
            index + 1,
            row.field.to_string(),
            row.expected,
            row.received,
            row.confidence,
        ));
    }
    lines
}
