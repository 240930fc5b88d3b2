//! Text rendering for maintenance records.
//!
//! The list view prints one summary line per record; the card view prints a
//! single record grouped by form section, with checklist items under their
//! catalog group headings.

use busmaint_core::checklist::tally;
use busmaint_core::{CheckItem, ChecklistKind, FormData, MaintenanceRecord, RecordStatus};

const LABEL_WIDTH: usize = 36;

// ── List ──

/// One line per record: id, status, plate, date, km, type, technician.
pub fn render_list(records: &[&MaintenanceRecord]) -> String {
    let mut out = String::new();
    if records.is_empty() {
        line(&mut out, "No maintenance records.");
        return out;
    }
    line(
        &mut out,
        &format!(
            "{:<15} {:<10} {:<14} {:<12} {:>10}  {:<10} {}",
            "ID", "STATUS", "PLATE", "DATE", "KM", "TYPE", "TECHNICIAN"
        ),
    );
    for r in records {
        let f = &r.form;
        line(
            &mut out,
            &format!(
                "{:<15} {:<10} {:<14} {:<12} {:>10}  {:<10} {}",
                r.id,
                r.status.to_string(),
                or_dash(&f.plate),
                or_dash(&f.date),
                or_dash(&f.km),
                f.kind.label(),
                or_dash(&f.technician),
            ),
        );
    }
    line(&mut out, &format!("\n{} record(s)", records.len()));
    out
}

// ── Card ──

/// A single record as a vertical card.
pub fn render_card(record: &MaintenanceRecord) -> String {
    let f = &record.form;
    let mut out = String::new();

    line(&mut out, &format!("=== {} ===", or_dash(&f.plate)));
    let marker = match record.status {
        RecordStatus::Completed => "[completed]",
        RecordStatus::Pending => "[pending]",
    };
    line(&mut out, &format!("{marker} {}\n", f.kind.label()));

    line(&mut out, "General");
    field(&mut out, "id", &record.id.to_string());
    field(&mut out, "date", or_dash(&f.date));
    field(&mut out, "km", or_dash(&f.km));
    field(&mut out, "technician", or_dash(&f.technician));
    out.push('\n');

    render_checklist(&mut out, f, ChecklistKind::Checks);

    line(&mut out, "Work performed");
    if f.completed_work.trim().is_empty() {
        line(&mut out, "  -");
    } else {
        for work in f.completed_work.lines() {
            line(&mut out, &format!("  {work}"));
        }
    }
    out.push('\n');

    render_checklist(&mut out, f, ChecklistKind::PostTests);

    let issues = f.validate();
    if !issues.is_empty() {
        line(&mut out, "Failed items without notes");
        for issue in issues {
            let label = issue.kind.spec(issue.key).map_or(issue.key, |s| s.label);
            line(&mut out, &format!("  ! {label} ({})", issue.kind));
        }
    }
    out
}

fn render_checklist(out: &mut String, form: &FormData, kind: ChecklistKind) {
    let list = form.checklist(kind);
    let t = tally(list);
    line(
        out,
        &format!(
            "{} ({} passed, {} failed, {} open)",
            kind.title(),
            t.passed,
            t.failed,
            t.unset
        ),
    );

    let mut group = "";
    for spec in kind.catalog() {
        if spec.group != group {
            group = spec.group;
            line(out, &format!("  {group}"));
        }
        let item = list.get(spec.key).cloned().unwrap_or_default();
        let mut row = format!("    {:<LABEL_WIDTH$} {}", spec.label, answer(&item));
        if item.status == Some(false) && !item.notes.trim().is_empty() {
            row.push_str("  ");
            row.push_str(item.notes.trim());
        }
        line(out, &row);
    }
    out.push('\n');
}

// ── Catalog ──

/// Every checklist key with its label, for use with `busmaint check`.
pub fn render_catalog() -> String {
    let mut out = String::new();
    for kind in ChecklistKind::ALL {
        line(&mut out, &format!("{} [{kind}]", kind.title()));
        let mut group = "";
        for spec in kind.catalog() {
            if spec.group != group {
                group = spec.group;
                line(&mut out, &format!("  {group}"));
            }
            line(&mut out, &format!("    {:<18} {}", spec.key, spec.label));
        }
        out.push('\n');
    }
    out
}

// ── Helpers ──

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn field(out: &mut String, name: &str, value: &str) {
    line(out, &format!("  {name:<12} {value}"));
}

fn answer(item: &CheckItem) -> &'static str {
    match item.status {
        Some(true) => "OK",
        Some(false) => "FAIL",
        None => "-",
    }
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() { "-" } else { s }
}
