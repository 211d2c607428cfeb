//! Header line with connection and host resource figures

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::format::{format_bytes, format_percent};
use crate::state::stats::StatsStore;

fn usage_color(percent: f64) -> Color {
    if percent >= 90.0 {
        Color::Red
    } else if percent >= 70.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Spans for host CPU, memory and disk; empty until the first sample
pub fn system_spans(stats: &StatsStore) -> Vec<Span<'static>> {
    let Some(system) = &stats.system else {
        return vec![];
    };
    let label = Style::default().fg(Color::Gray);
    let disk_percent = if system.disk_total == 0 {
        0.0
    } else {
        system.disk_used as f64 / system.disk_total as f64 * 100.0
    };

    vec![
        Span::styled("CPU ", label),
        Span::styled(
            format_percent(system.cpu_percentage),
            Style::default().fg(usage_color(system.cpu_percentage)),
        ),
        Span::styled("  MEM ", label),
        Span::styled(
            format!(
                "{}/{}",
                format_bytes(system.memory_used),
                format_bytes(system.memory_total)
            ),
            Style::default().fg(usage_color(system.memory_percentage())),
        ),
        Span::styled("  DISK ", label),
        Span::styled(
            format!(
                "{}/{}",
                format_bytes(system.disk_used),
                format_bytes(system.disk_total)
            ),
            Style::default().fg(usage_color(disk_percent)),
        ),
    ]
}

pub fn render_header(frame: &mut Frame, area: Rect, connected: bool, stats: &StatsStore) {
    let status_indicator = if connected {
        ("●", Color::Green)
    } else {
        ("○", Color::Red)
    };

    let mut spans = vec![
        Span::styled(
            " dockdeck ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("| "),
        Span::styled(status_indicator.0, Style::default().fg(status_indicator.1)),
        Span::styled(
            if connected { " Connected " } else { " Disconnected " },
            Style::default().fg(status_indicator.1),
        ),
    ];
    if let Some(info) = &stats.docker_info {
        spans.push(Span::styled(
            format!(
                "(Docker {}, {} running) ",
                info.server_version, info.containers_running
            ),
            Style::default().fg(Color::Gray),
        ));
    }
    let system = system_spans(stats);
    if !system.is_empty() {
        spans.push(Span::raw("| "));
        spans.extend(system);
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SystemStats;

    #[test]
    fn test_no_spans_before_first_sample() {
        assert!(system_spans(&StatsStore::new()).is_empty());
    }

    #[test]
    fn test_spans_show_host_figures() {
        let mut stats = StatsStore::new();
        stats.set_system(SystemStats {
            cpu_percentage: 95.0,
            cpu_count: 8,
            memory_used: 1024 * 1024 * 1024,
            memory_total: 4 * 1024 * 1024 * 1024,
            disk_used: 0,
            disk_total: 0,
        });

        let spans = system_spans(&stats);
        let text: String = spans.iter().map(|s| s.content.to_string()).collect();
        assert!(text.contains("CPU 95.0%"));
        assert_eq!(spans[1].style.fg, Some(Color::Red));
    }
}
