//! Reusable UI component helpers

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};

use super::{accent, danger, header, text_dim};
use crate::board::Entry;

/// Width of the moving segment in the progress bar
const SEGMENT_WIDTH: usize = 12;

/// Indeterminate progress bar: a segment sweeping across `width` cells
pub fn progress_line(frame: u64, width: u16) -> Line<'static> {
    let width = usize::from(width);
    if width == 0 {
        return Line::default();
    }

    let segment = SEGMENT_WIDTH.min(width);
    let travel = width + segment;
    let head = (frame as usize).wrapping_mul(2) % travel;
    let start = head.saturating_sub(segment);
    let end = head.min(width);

    let before = "─".repeat(start);
    let bar = "━".repeat(end - start);
    let after = "─".repeat(width - end);

    Line::from(vec![
        Span::styled(before, Style::default().fg(text_dim())),
        Span::styled(bar, Style::default().fg(accent())),
        Span::styled(after, Style::default().fg(text_dim())),
    ])
}

/// One complaint as a list item: title over body, or a lone placeholder
pub fn entry_item(entry: &Entry<'_>) -> ListItem<'static> {
    if entry.is_placeholder() {
        return ListItem::new(vec![
            Line::from(Span::styled(
                entry.heading().to_string(),
                Style::default().fg(text_dim()),
            )),
            Line::from(""),
        ]);
    }

    let mut lines = vec![Line::from(Span::styled(
        entry.heading().to_string(),
        Style::default().fg(header()).add_modifier(Modifier::BOLD),
    ))];
    if let Some(body) = entry.body {
        for line in body.lines() {
            lines.push(Line::from(Span::raw(format!("  {}", line))));
        }
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
}

/// Error banner shown above the form
pub fn error_line(message: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("✗ ", Style::default().fg(danger()).add_modifier(Modifier::BOLD)),
        Span::styled(message.to_string(), Style::default().fg(danger())),
    ])
}
