use crossterm::style::{Color, Stylize, style};

use crate::model::priority::Priority;
use crate::model::task::Note;
use crate::model::view::{ProjectTable, View, ViewItem};
use crate::util::unicode::{display_width, padding_for};

/// Printed instead of any table when nothing is left to show
pub const ALL_COMPLETED: &str = "All tasks completed!";

const HEADERS: [&str; 4] = ["ID", "Due", "Content", "Labels"];

/// Header cells get at least this much room beyond their text
const HEADER_PADDING: usize = 2;

// ---------------------------------------------------------------------------
// Priority colors
// ---------------------------------------------------------------------------

fn priority_color(priority: Priority) -> Option<Color> {
    match priority.display() {
        1 => Some(Color::Red),
        2 => Some(Color::Yellow),
        3 => Some(Color::Magenta),
        _ => None,
    }
}

/// Wrap text in the color for its priority: 1 red, 2 yellow, 3 magenta.
pub fn paint(text: &str, priority: Priority, color: bool) -> String {
    match priority_color(priority) {
        Some(c) if color && !text.is_empty() => style(text).with(c).to_string(),
        _ => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn row_cells(item: &ViewItem) -> [String; 4] {
    [
        format!("{:x}", item.id),
        item.due_label.clone(),
        item.content.clone(),
        item.labels.clone(),
    ]
}

fn rule(widths: &[usize], left: &str, fill: &str, mid: &str, right: &str) -> String {
    let segments: Vec<String> = widths.iter().map(|w| fill.repeat(w + 2)).collect();
    format!("{}{}{}", left, segments.join(mid), right)
}

fn row_line(cells: &[String], widths: &[usize], paint_cell: impl Fn(&str) -> String) -> String {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!(" {}{} ", paint_cell(cell.as_str()), padding_for(cell, *w)))
        .collect();
    format!("│{}│", parts.join("│"))
}

/// Render one project's rows as a box-drawn grid
pub fn format_table(items: &[ViewItem], color: bool) -> Vec<String> {
    let rows: Vec<[String; 4]> = items.iter().map(row_cells).collect();
    let widths: Vec<usize> = HEADERS
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .map(|r| display_width(&r[col]))
                .fold(display_width(header) + HEADER_PADDING, usize::max)
        })
        .collect();

    let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let mut lines = vec![
        rule(&widths, "╒", "═", "╤", "╕"),
        row_line(&headers, &widths, str::to_string),
        rule(&widths, "╞", "═", "╪", "╡"),
    ];
    for (i, (row, item)) in rows.iter().zip(items).enumerate() {
        if i > 0 {
            lines.push(rule(&widths, "├", "─", "┼", "┤"));
        }
        lines.push(row_line(row, &widths, |cell| paint(cell, item.priority, color)));
    }
    lines.push(rule(&widths, "╘", "═", "╧", "╛"));
    lines
}

/// Project name, its table, then a blank line
pub fn format_project_table(table: &ProjectTable, color: bool) -> Vec<String> {
    let mut lines = vec![table.name.clone()];
    lines.extend(format_table(&table.items, color));
    lines.push(String::new());
    lines
}

/// Every table of the view, or the all-completed line when it is empty
pub fn format_view(view: &View, color: bool) -> Vec<String> {
    if view.is_empty() {
        return vec![ALL_COMPLETED.to_string()];
    }
    view.tables
        .iter()
        .filter(|t| !t.items.is_empty())
        .flat_map(|t| format_project_table(t, color))
        .collect()
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

/// `posted:` then the note body, then a blank line
pub fn format_note(note: &Note) -> Vec<String> {
    vec![
        format!("{}:", note.posted.as_deref().unwrap_or("")),
        note.content.clone().unwrap_or_default(),
        String::new(),
    ]
}
