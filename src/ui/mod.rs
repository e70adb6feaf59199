mod components;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListState, Paragraph, Wrap},
    Frame,
};
use std::sync::OnceLock;

use crate::app::{App, Focus, Popup};
use crate::board::{ListArea, EMPTY_MESSAGE, LOADING_MESSAGE};
use crate::theme::Theme;

// Theme is chosen once at startup from the config file
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme. Only the first call has any effect.
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let body_height = if area.height < 30 { 5 } else { 7 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),                // Progress / info line
            Constraint::Length(1),                // Error message
            Constraint::Length(body_height + 8),  // Form box
            Constraint::Min(4),                   // Complaints list
            Constraint::Length(1),                // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_error_line(f, app, chunks[1]);
    draw_form(f, app, chunks[2], body_height);
    draw_list(f, app, chunks[3]);
    draw_footer(f, app, chunks[4]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: progress bar > status message > ready
    if app.board.show_progress() {
        let bar = Paragraph::new(components::progress_line(app.frame_count, area.width));
        f.render_widget(bar, area);
        return;
    }

    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(warning())))
    } else {
        Line::from(Span::styled("Ready", Style::default().fg(text_dim())))
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_error_line(f: &mut Frame, app: &App, area: Rect) {
    if let Some(message) = app.board.error_message() {
        f.render_widget(Paragraph::new(components::error_line(message)), area);
    }
}

fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { accent() } else { inactive() })
}

fn draw_form(f: &mut Frame, app: &App, area: Rect, body_height: u16) {
    let block = Block::default()
        .title(Span::styled(
            " Submit a Complaint ",
            Style::default().fg(accent()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));
    f.render_widget(block, area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(body_height),
            Constraint::Length(3),
        ])
        .split(area);

    let form = &app.board.form;

    // Title input
    let title_focused = app.focus == Focus::Title;
    let title_text = if form.title.is_empty() && !title_focused {
        Line::from(Span::styled("Complaint title here...", Style::default().fg(text_dim())))
    } else {
        let cursor = if title_focused { "_" } else { "" };
        Line::from(Span::styled(format!("{}{}", form.title, cursor), Style::default().fg(text())))
    };
    let title_input = Paragraph::new(title_text).block(
        Block::default()
            .title(" Complaint Title ")
            .borders(Borders::ALL)
            .border_style(border_style(title_focused)),
    );
    f.render_widget(title_input, inner[0]);

    // Body textarea
    let body_focused = app.focus == Focus::Body;
    let mut body_lines: Vec<Line> = if form.body.is_empty() && !body_focused {
        vec![Line::from(Span::styled(
            "Enter your complaint here...",
            Style::default().fg(text_dim()),
        ))]
    } else {
        form.body
            .split('\n')
            .map(|line| Line::styled(line.to_string(), Style::default().fg(text())))
            .collect()
    };
    if body_focused {
        if let Some(last) = body_lines.last_mut() {
            last.spans.push(Span::styled("█", Style::default().fg(accent())));
        }
    }
    // Keep the cursor line visible once the text outgrows the box
    let visible = usize::from(body_height.saturating_sub(2)).max(1);
    let scroll = body_lines.len().saturating_sub(visible);
    let body_input = Paragraph::new(body_lines)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
        .block(
            Block::default()
                .title(" Complaint Details ")
                .borders(Borders::ALL)
                .border_style(border_style(body_focused)),
        );
    f.render_widget(body_input, inner[1]);

    // Submit button
    let submit_focused = app.focus == Focus::Submit;
    let label_style = if app.board.is_saving() {
        Style::default().fg(text_dim())
    } else if submit_focused {
        Style::default().fg(success()).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(success()).add_modifier(Modifier::BOLD)
    };
    let button = Paragraph::new(Line::from(Span::styled(
        format!(" {} ", app.board.submit_label()),
        label_style,
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(submit_focused)),
    );
    f.render_widget(button, inner[2]);
}

fn draw_list(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::List;
    let block = Block::default()
        .title(Span::styled(
            " Complaints List ",
            Style::default().fg(if focused { accent() } else { inactive() }).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(border_style(focused));

    match app.board.list_area() {
        ListArea::Loading => {
            let loading = Paragraph::new(Span::styled(LOADING_MESSAGE, Style::default().fg(text_dim())))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(loading, area);
        }
        ListArea::Empty => {
            let empty = Paragraph::new(Span::styled(EMPTY_MESSAGE, Style::default().fg(text_dim())))
                .block(block);
            f.render_widget(empty, area);
        }
        ListArea::Entries(entries) => {
            let items: Vec<_> = entries.iter().map(components::entry_item).collect();
            let highlight = if focused {
                Style::default().bg(bg_selected()).fg(text())
            } else {
                Style::default()
            };
            let list = List::new(items).block(block).highlight_style(highlight);
            let mut state = ListState::default().with_selected(Some(app.selected));
            f.render_stateful_widget(list, area, &mut state);
        }
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.focus {
        Focus::Title | Focus::Body => vec![
            ("Tab", "Next"),
            ("Ctrl+S", "Submit"),
            ("F5", "Refresh"),
            ("F1", "Help"),
            ("Esc", "Quit"),
        ],
        Focus::Submit => vec![
            ("Enter", "Submit"),
            ("Tab", "Next"),
            ("F1", "Help"),
            ("Esc", "Quit"),
        ],
        Focus::List => vec![
            ("↑↓", "Nav"),
            ("r", "Refresh"),
            ("Tab", "Next"),
            ("F1", "Help"),
            ("Esc", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 3 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 90 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let key_line = |key: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), Style::default().fg(accent())),
            Span::styled(action, Style::default().fg(text())),
        ])
    };

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("═══ Form ═══", Style::default().fg(header()).add_modifier(Modifier::BOLD))),
        key_line("Tab", "Next field"),
        key_line("Shift+Tab", "Previous field"),
        key_line("Enter", "Title: go to details, Details: new line"),
        key_line("Ctrl+S", "Submit the complaint"),
        Line::from(""),
        Line::from(Span::styled("═══ List ═══", Style::default().fg(header()).add_modifier(Modifier::BOLD))),
        key_line("↑/↓ j/k", "Move selection"),
        key_line("r / F5", "Reload complaints"),
        Line::from(""),
        key_line("Esc", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("F1", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" complaint-board Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
