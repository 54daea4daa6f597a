//! UI rendering for the TUI.
//!
//! Handles layout and widget rendering using ratatui.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
    Frame,
};

use crate::app::AppMode;
use crate::navigator::NavState;
use crate::App;

/// Draw the main UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with breadcrumb
            Constraint::Min(6),    // Current step
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);

    match app.state() {
        NavState::Browsing { .. } => draw_browsing(frame, app, chunks[1]),
        NavState::Terminal { id } => {
            let text = app.navigator.result().unwrap_or_default();
            draw_outcome(
                frame,
                chunks[1],
                " Result ",
                app.theme.success,
                vec![
                    Line::from(Span::styled(
                        text.to_string(),
                        Style::default().fg(app.theme.text).add_modifier(Modifier::BOLD),
                    )),
                    Line::default(),
                    Line::from(Span::styled(
                        format!("Reached at step {id}"),
                        Style::default().fg(app.theme.text_dim),
                    )),
                ],
            );
        }
        NavState::MissingStep { from, target } => draw_outcome(
            frame,
            chunks[1],
            " Missing step ",
            app.theme.error,
            vec![
                Line::from(format!("Step {from} leads to step {target},")),
                Line::from("which does not exist in this key."),
                Line::default(),
                Line::from(Span::styled(
                    "The OCR text probably lost or misread that step.",
                    Style::default().fg(app.theme.text_dim),
                )),
            ],
        ),
        NavState::GotoCycle { id } => draw_outcome(
            frame,
            chunks[1],
            " Loop ",
            app.theme.warning,
            vec![
                Line::from(format!("Following the steps from {id} leads back to {id}.")),
                Line::from("The key cannot be resolved from here."),
            ],
        ),
        NavState::Empty => draw_outcome(
            frame,
            chunks[1],
            " Empty key ",
            app.theme.warning,
            vec![Line::from("This key has no steps.")],
        ),
    }

    draw_status_bar(frame, app, chunks[2]);

    if app.mode == AppMode::Help {
        draw_help_overlay(frame, app);
    }
}

/// Draw the header with the key name and breadcrumb.
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let mut spans = Vec::new();
    for (i, id) in app.navigator.path().into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" › ", Style::default().fg(theme.accent)));
        }
        spans.push(Span::styled(id.to_string(), Style::default().fg(theme.text)));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .title(format!(" {} ", app.title))
            .title_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD))
            .title_bottom(
                Line::from(format!(" {} steps ", app.navigator.store().len())).right_aligned(),
            ),
    );

    frame.render_widget(header, area);
}

/// Draw the current step and its options.
fn draw_browsing(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    if let Some(node) = app.navigator.current() {
        let current = Paragraph::new(node.text.as_str())
            .style(Style::default().fg(theme.text_dim))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border))
                    .title(format!(" Step {} ", node.id)),
            );
        frame.render_widget(current, chunks[0]);
    }

    let items: Vec<ListItem> = app
        .navigator
        .options()
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let mut spans =
                vec![Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(theme.accent))];
            if app.show_ids {
                spans.push(Span::styled(
                    format!("[{}] ", node.id),
                    Style::default().fg(theme.text_dim),
                ));
            }
            spans.push(Span::styled(node.text.clone(), Style::default().fg(theme.text)));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.primary))
                .title(" Choose ")
                .padding(Padding::horizontal(1)),
        )
        .highlight_style(Style::default().bg(theme.selected_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

/// Draw a final state panel.
fn draw_outcome(frame: &mut Frame, area: Rect, title: &str, color: Color, lines: Vec<Line>) {
    let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title)
            .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .padding(Padding::uniform(1)),
    );
    frame.render_widget(panel, area);
}

/// Draw the status bar.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let line = if let Some(ref message) = app.status_message {
        Line::from(Span::styled(format!(" {message}"), Style::default().fg(theme.accent)))
    } else {
        let mut hints = vec![" ↑↓ move", "⏎/1-9 choose"];
        if app.can_go_back() {
            hints.push("⌫ back");
        }
        hints.extend(["r restart", "? help", "q quit"]);
        Line::from(Span::styled(hints.join("  "), Style::default().fg(theme.text_dim)))
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = centered_rect(50, 60, frame.area());

    let lines = vec![
        help_line("↑ / k", "previous option", theme),
        help_line("↓ / j", "next option", theme),
        help_line("Enter", "choose highlighted option", theme),
        help_line("1-9", "choose option by number", theme),
        help_line("⌫ / ←", "back to previous step", theme),
        help_line("r", "restart from the first step", theme),
        help_line("q / Esc", "quit", theme),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .title(" Help ")
            .padding(Padding::uniform(1)),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}

fn help_line<'a>(key: &'a str, description: &'a str, theme: &crate::tui::Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{key:>9}  "), Style::default().fg(theme.accent)),
        Span::styled(description, Style::default().fg(theme.text)),
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}
