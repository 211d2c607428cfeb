//! Modal dialogs and overlays

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::core::{ConfirmDialog, InputDialog, Modal};
use crate::state::columns::ColumnConfig;

/// Calculate centered rectangle for popups
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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

pub fn render_modal(frame: &mut Frame, area: Rect, modal: &Modal, scroll: u16) {
    match modal {
        Modal::Confirm(dialog) => render_confirm(frame, area, dialog),
        Modal::Input(dialog) => render_input(frame, area, dialog),
        Modal::Error(message) => render_error(frame, area, message),
        Modal::Document { title, body } => render_document(frame, area, title, body, scroll),
    }
}

fn render_confirm(frame: &mut Frame, area: Rect, dialog: &ConfirmDialog) {
    let popup_area = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("[y] {}", dialog.confirm_label),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled(
                format!("[n] {}", dialog.cancel_label),
                Style::default().fg(Color::Gray),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!(" {} ", dialog.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

fn render_input(frame: &mut Frame, area: Rect, dialog: &InputDialog) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(dialog.prompt.as_str()),
        Line::from(Span::styled(
            format!("> {}█", dialog.value),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Create   [Esc] Cancel",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" {} ", dialog.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(paragraph, popup_area);
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup_area);

    let mut lines: Vec<Line> = message.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter or Esc to dismiss",
        Style::default().fg(Color::Gray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup_area);
}

fn render_document(frame: &mut Frame, area: Rect, title: &str, body: &str, scroll: u16) {
    let popup_area = centered_rect(85, 85, area);
    frame.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(body)
        .block(
            Block::default()
                .title(format!(" {} (↑/↓ scroll, Esc close) ", title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .scroll((scroll, 0));
    frame.render_widget(paragraph, popup_area);
}

/// Toggle list of the non-essential columns of the active table
pub fn render_column_picker(
    frame: &mut Frame,
    area: Rect,
    columns: &[ColumnConfig],
    highlighted: usize,
    resizable: bool,
) {
    let popup_area = centered_rect(40, 60, area);
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = columns
        .iter()
        .filter(|c| !c.essential)
        .map(|c| {
            let mark = if c.visible { "[x]" } else { "[ ]" };
            let text = if resizable {
                format!("{} {} ({})", mark, c.label, c.width)
            } else {
                format!("{} {}", mark, c.label)
            };
            ListItem::new(text)
        })
        .collect();

    let help = if resizable {
        " Space toggle  a all  n none  </> width  Esc close "
    } else {
        " Space toggle  a all  n none  Esc close "
    };
    let list = List::new(items)
        .block(
            Block::default()
                .title(" Columns ")
                .title_bottom(Line::from(help).alignment(Alignment::Center))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default();
    state.select(Some(highlighted));
    frame.render_stateful_widget(list, popup_area, &mut state);
}

pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    // Create a centered popup (60% width, 80% height)
    let popup_area = centered_rect(60, 80, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let help_text = r#"Keyboard Shortcuts

Navigation:
  1 - 5             Jump to tab (Containers, Images, Volumes, Networks, Terminal)
  Tab / Shift+Tab   Next / previous tab
  ↑ / ↓ or j / k    Move cursor

Lists:
  /                 Search (Esc clears)
  Space             Select row (every member on a group header)
  a                 Select all visible / clear
  r                 Refresh
  d                 Remove selected (asks first)
  c                 Column picker

Containers:
  Enter             Expand or collapse a group
  s / x / R         Start / stop / restart (a group header targets the group)
  p / u             Pause / unpause
  l                 Logs     e  Exec     i  Inspect

Volumes:
  n                 Create volume

Terminal:
  Enter             Run     Tab  Complete     ↑ / ↓  History
  Ctrl+T / Ctrl+W   New / close session     Ctrl+N / Ctrl+P  Switch

Global:
  q                 Quit application
  Ctrl+C            Force quit
  ?                 Toggle this help screen
"#;

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help (Press any key to close) ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false });

    frame.render_widget(help, popup_area);
}
