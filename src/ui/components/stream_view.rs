//! Log and exec overlay

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::state::stream::{StreamKind, StreamView};
use crate::ui::components::modal::centered_rect;

fn title(view: &StreamView) -> String {
    match &view.kind {
        StreamKind::Logs => {
            let mode = if view.ended {
                "[ENDED]"
            } else if view.is_following() {
                "[FOLLOW]"
            } else {
                "[PAUSED]"
            };
            format!(" Logs: {} {} ", view.container_name, mode)
        }
        StreamKind::Exec { shell } => {
            let status = match (shell, view.running) {
                (None, _) if view.ended => "unavailable",
                (None, _) => "connecting...",
                (Some(_), true) => "running",
                (Some(_), false) => "ready",
            };
            format!(" Exec: {} [{}] ", view.container_name, status)
        }
    }
}

/// Render the overlay
pub fn render_stream(frame: &mut Frame, area: Rect, view: &StreamView) {
    // Use 90% of screen for the overlay
    let popup_area = centered_rect(90, 90, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(title(view))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if view.is_logs() { Color::Cyan } else { Color::Magenta }));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let (output_area, input_area) = if view.is_logs() {
        (inner, None)
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        (chunks[0], Some(chunks[1]))
    };

    let height = output_area.height as usize;
    let total = view.lines.len();
    let end = total.saturating_sub(view.scroll_offset.min(total));
    let start = end.saturating_sub(height);

    let lines: Vec<Line> = if total == 0 {
        vec![Line::from(Span::styled(
            "Waiting for output...",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        view.lines
            .range(start..end)
            .map(|line| {
                let style = if line.is_error {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(Span::styled(line.text.clone(), style))
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines), output_area);

    if let Some(input_area) = input_area {
        let prompt = Line::from(vec![
            Span::styled("# ", Style::default().fg(Color::Magenta)),
            Span::raw(format!("{}█", view.input)),
        ]);
        frame.render_widget(Paragraph::new(prompt), input_area);
    }
}
