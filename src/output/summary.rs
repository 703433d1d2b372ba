use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, TableComponent,
    modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL,
};

use crate::runner::RunSummary;

fn header_cell(text: &str, use_color: bool) -> Cell {
    let mut cell = Cell::new(text).add_attribute(Attribute::Bold);
    if use_color {
        cell = cell.fg(Color::Cyan);
    }
    cell
}

fn right_cell(value: usize) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

/// Replace the double-line header separator with a single line
fn normalize_header_separator(table: &mut Table) {
    table.set_style(TableComponent::HeaderLines, '─');
    table.set_style(TableComponent::LeftHeaderIntersection, '├');
    table.set_style(TableComponent::MiddleHeaderIntersections, '┼');
    table.set_style(TableComponent::RightHeaderIntersection, '┤');
}

pub(super) fn render_summary(summary: &RunSummary, use_color: bool) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    normalize_header_separator(&mut table);
    table.set_header(vec![
        header_cell("Result file", use_color),
        header_cell("Usernames", use_color),
    ]);

    for (file, count) in &summary.counts {
        table.add_row(vec![Cell::new(file), right_cell(*count)]);
    }

    let mut total = Cell::new("Total").add_attribute(Attribute::Bold);
    let mut remaining = Cell::new("Still pending");
    if use_color {
        total = total.fg(Color::Green);
        if summary.remaining > 0 {
            remaining = remaining.fg(Color::Yellow);
        }
    }
    table.add_row(vec![total, right_cell(summary.processed())]);
    table.add_row(vec![remaining, right_cell(summary.remaining)]);

    let mut out = table.to_string();
    out.push_str(&format!(
        "\n  {} session(s), {} failed",
        summary.sessions,
        summary.failed_sessions.len()
    ));
    for (session, reason) in &summary.failed_sessions {
        out.push_str(&format!("\n    {session}: {reason}"));
    }
    if summary.unsaved > 0 {
        out.push_str(&format!(
            "\n  {} result(s) could not be written and stay pending",
            summary.unsaved
        ));
    }
    out
}

pub(crate) fn print_summary(summary: &RunSummary, use_color: bool) {
    println!("\n{}\n", render_summary(summary, use_color));
}
