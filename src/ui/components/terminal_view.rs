//! Terminal tab: session bar, entry log and prompt

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::state::terminal::{TerminalEntry, TerminalSession, TerminalTabs};

fn entry_lines(entry: &TerminalEntry) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("[{}] ", entry.timestamp.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled("$ ", Style::default().fg(Color::Green)),
        Span::raw(entry.command.clone()),
    ])];

    if entry.executing {
        lines.push(Line::from(Span::styled(
            "running...",
            Style::default().fg(Color::Yellow),
        )));
        return lines;
    }

    if let Some(output) = &entry.output {
        lines.extend(output.stdout.lines().map(|l| Line::from(l.to_string())));
        lines.extend(output.stderr.lines().map(|l| {
            Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Red)))
        }));
        if !output.success {
            if let Some(code) = output.exit_code.filter(|c| *c != 0) {
                lines.push(Line::from(Span::styled(
                    format!("exit code {}", code),
                    Style::default().fg(Color::Red),
                )));
            }
        }
    }
    lines
}

fn render_log(frame: &mut Frame, area: Rect, session: &TerminalSession) {
    let lines: Vec<Line> = session.entries.iter().flat_map(entry_lines).collect();
    // Keep the newest output in view
    let overflow = lines.len().saturating_sub(area.height as usize);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((overflow.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);
}

fn render_prompt(frame: &mut Frame, area: Rect, session: &TerminalSession) {
    let (marker, style) = if session.is_executing() {
        ("… ", Style::default().fg(Color::DarkGray))
    } else {
        ("$ ", Style::default().fg(Color::Green))
    };
    let prompt = Line::from(vec![
        Span::styled(format!("{} ", session.cwd), Style::default().fg(Color::Blue)),
        Span::styled(marker, style.add_modifier(Modifier::BOLD)),
        Span::raw(format!("{}█", session.draft)),
    ]);
    frame.render_widget(
        Paragraph::new(prompt).block(Block::default().borders(Borders::TOP)),
        area,
    );
}

pub fn render_terminal(frame: &mut Frame, area: Rect, tabs: &TerminalTabs) {
    let block = Block::default()
        .title(" Terminal ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(inner);

    let titles: Vec<Line> = tabs
        .sessions()
        .iter()
        .map(|s| {
            let busy = if s.is_executing() { " *" } else { "" };
            Line::from(format!("{}{}", s.title, busy))
        })
        .collect();
    let session_bar = Tabs::new(titles)
        .select(tabs.active_index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .divider("|");
    frame.render_widget(session_bar, chunks[0]);

    let session = tabs.active();
    render_log(frame, chunks[1], session);
    render_prompt(frame, chunks[2], session);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TerminalOutput;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_renders_sessions_and_output() {
        let mut tabs = TerminalTabs::new("/srv");
        tabs.active_mut()
            .entries
            .push(TerminalEntry::finished("echo hi", TerminalOutput::local("hi\n")));
        tabs.open("/tmp");

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| render_terminal(f, f.area(), &tabs)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Terminal 1"));
        assert!(text.contains("Terminal 2"));
        assert!(text.contains("/tmp $"));
    }
}
