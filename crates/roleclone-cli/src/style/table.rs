//! Table formatting using comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

/// Outcome shown in the status column of a policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Planned,
    Applied,
    Failed,
}

fn base_table() -> Table {
    let mut table = Table::new();

    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table
}

fn header_cell(text: &str) -> Cell {
    if super::no_color() {
        Cell::new(text)
    } else {
        Cell::new(text).add_attribute(Attribute::Bold).fg(Color::Cyan)
    }
}

fn status_cell(status: Status) -> Cell {
    let (text, color) = match status {
        Status::Planned => ("planned", Color::DarkGrey),
        Status::Applied => ("✓ applied", Color::Green),
        Status::Failed => ("✗ failed", Color::Red),
    };

    if super::no_color() {
        Cell::new(text)
    } else {
        Cell::new(text).fg(color)
    }
}

/// Creates a key-value info table (two columns: key and value).
pub fn info_table(entries: &[(&str, String)]) -> Table {
    let mut table = base_table();

    for (key, value) in entries {
        let key_cell = if super::no_color() {
            Cell::new(key)
        } else {
            Cell::new(key).fg(Color::DarkGrey)
        };
        table.add_row(vec![key_cell, Cell::new(value)]);
    }

    table
}

/// A row of a policy table: kind, policy, status, detail.
pub struct PolicyRow<'a> {
    pub kind: &'a str,
    pub policy: &'a str,
    pub status: Status,
    pub detail: &'a str,
}

/// Creates a table listing policies with their replication status.
pub fn policy_table(rows: &[PolicyRow<'_>]) -> Table {
    let mut table = base_table();

    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Policy"),
        header_cell("Status"),
        header_cell("Detail"),
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(row.kind),
            Cell::new(row.policy),
            status_cell(row.status),
            Cell::new(row.detail),
        ]);
    }

    table
}
