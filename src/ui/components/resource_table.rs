//! Resource tables rendered from the active column configuration

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::core::{ContainerInfo, ContainerState};
use crate::format::truncate;
use crate::state::columns::{CellContext, ColumnConfig, ColumnDef};
use crate::state::grouping::ContainerRow;
use crate::state::{ListView, Resource, ResourceView};

const CHECK_WIDTH: u16 = 3;
const COLUMN_SPACING: u16 = 1;
/// Left and right border of the table block
const BORDERS: u16 = 2;

/// Colour for a container state badge
pub fn state_color(state: ContainerState) -> Color {
    match state {
        ContainerState::Running => Color::Green,
        ContainerState::Paused => Color::Yellow,
        ContainerState::Restarting | ContainerState::Created => Color::Cyan,
        ContainerState::Exited | ContainerState::Dead => Color::Red,
        ContainerState::Removing | ContainerState::Unknown => Color::Gray,
    }
}

fn checkbox<T: Resource>(view: &ResourceView<T>, item: &T) -> &'static str {
    if item.is_protected() {
        " - "
    } else if view.selection.contains(item.key()) {
        "[x]"
    } else {
        "[ ]"
    }
}

type Visible<'c, T> = Vec<(&'c ColumnDef<T>, &'c ColumnConfig)>;

/// Leading columns that fit in `width` at their configured widths. Columns
/// past the edge are dropped instead of squeezing the ones before them.
fn fitting<'c, T>(visible: Visible<'c, T>, width: u16) -> Visible<'c, T> {
    let mut used = CHECK_WIDTH;
    let mut fit = Vec::with_capacity(visible.len());
    for (def, config) in visible {
        used = used.saturating_add(COLUMN_SPACING + config.width);
        if used > width && !fit.is_empty() {
            break;
        }
        fit.push((def, config));
    }
    fit
}

fn header_row<T>(visible: &[(&ColumnDef<T>, &ColumnConfig)], check: &'static str) -> Row<'static> {
    let mut cells = vec![Cell::from(check)];
    cells.extend(visible.iter().map(|(_, config)| Cell::from(config.label)));
    Row::new(cells).style(Style::default().add_modifier(Modifier::BOLD))
}

fn widths<T>(visible: &[(&ColumnDef<T>, &ColumnConfig)]) -> Vec<Constraint> {
    std::iter::once(Constraint::Length(CHECK_WIDTH))
        .chain(
            visible
                .iter()
                .map(|(_, config)| Constraint::Length(config.width)),
        )
        .collect()
}

fn cells<'a, T>(
    visible: &[(&ColumnDef<T>, &ColumnConfig)],
    item: &T,
    ctx: &CellContext<'_>,
) -> Vec<Cell<'a>> {
    visible
        .iter()
        .map(|(def, config)| Cell::from(truncate(&(def.cell)(item, ctx), config.width as usize)))
        .collect()
}

/// Block, search line and error line shared by every table
fn render_frame(
    frame: &mut Frame,
    area: Rect,
    view: &dyn ListView,
    title: &str,
    filter_active: bool,
    table: Table<'_>,
    cursor: usize,
) {
    let loading = if view.is_loading() { " ⟳" } else { "" };
    let block = Block::default()
        .title(format!(
            " {} ({}/{}){} ",
            title,
            view.visible_count(),
            view.total(),
            loading
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let show_search = filter_active || !view.filter_text().is_empty();
    let mut constraints = vec![];
    if show_search {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(1));
    if view.load_error().is_some() {
        constraints.push(Constraint::Length(2));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut next = 0;
    if show_search {
        let cursor_mark = if filter_active { "█" } else { "" };
        let search = Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}{}", view.filter_text(), cursor_mark)),
        ]);
        frame.render_widget(Paragraph::new(search), chunks[next]);
        next += 1;
    }

    let table_area = chunks[next];
    if view.visible_count() == 0 && view.load_error().is_none() {
        let message = if !view.has_loaded() {
            "Loading..."
        } else if view.total() > 0 {
            "No matches for the current search"
        } else {
            "Nothing here yet"
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
            table_area,
        );
    } else {
        let mut state = TableState::default();
        if view.visible_count() > 0 {
            state.select(Some(cursor));
        }
        frame.render_stateful_widget(table, table_area, &mut state);
    }

    if let Some(error) = view.load_error() {
        let error = Paragraph::new(vec![
            Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))),
            Line::from(Span::styled(
                "Press r to retry",
                Style::default().fg(Color::DarkGray),
            )),
        ]);
        frame.render_widget(error, chunks[next + 1]);
    }
}

fn highlight() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

/// Images, volumes and networks: one row per item
pub fn render_resource_table<T: Resource>(
    frame: &mut Frame,
    area: Rect,
    view: &ResourceView<T>,
    ctx: &CellContext<'_>,
    title: &str,
    filter_active: bool,
) {
    let visible = fitting(view.columns.visible(), area.width.saturating_sub(BORDERS));
    let rows: Vec<Row> = view
        .filtered()
        .into_iter()
        .map(|item| {
            let mut row = vec![Cell::from(checkbox(view, item))];
            row.extend(cells(&visible, item, ctx));
            let style = if view.is_busy(item.key()) {
                Style::default().fg(Color::DarkGray)
            } else if item.is_protected() {
                Style::default().fg(Color::Gray)
            } else {
                Style::default()
            };
            Row::new(row).style(style)
        })
        .collect();

    let table = Table::new(rows, widths(&visible))
        .header(header_row(&visible, view.header().symbol()))
        .column_spacing(COLUMN_SPACING)
        .row_highlight_style(highlight());

    render_frame(frame, area, view, title, filter_active, table, view.cursor());
}

/// Containers: project group headers followed by members, then standalone rows
pub fn render_container_table(
    frame: &mut Frame,
    area: Rect,
    view: &ResourceView<ContainerInfo>,
    rows: &[ContainerRow<'_>],
    ctx: &CellContext<'_>,
    filter_active: bool,
) {
    let visible = fitting(view.columns.visible(), area.width.saturating_sub(BORDERS));
    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| match row {
            ContainerRow::Group { group, expanded } => {
                let marker = if *expanded { "▾" } else { "▸" };
                let label = format!("{} {} ({})", marker, group.name, group.summary());
                let width = visible.first().map(|(_, c)| c.width).unwrap_or(24) as usize;
                let check = view.selection.group_check(&group.member_keys());
                let mut cells = vec![Cell::from(check.symbol()), Cell::from(truncate(&label, width))];
                cells.extend(std::iter::repeat(Cell::from("")).take(visible.len().saturating_sub(1)));
                Row::new(cells).style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            }
            ContainerRow::Member(container) | ContainerRow::Standalone(container) => {
                let mut cells = vec![Cell::from(checkbox(view, *container))];
                let indent = matches!(row, ContainerRow::Member(_));
                for (i, (def, config)) in visible.iter().enumerate() {
                    let mut text = (def.cell)(container, ctx);
                    if i == 0 && indent {
                        text = format!("  {}", text);
                    }
                    let text = truncate(&text, config.width as usize);
                    let cell = if def.id == "status" {
                        Cell::from(text).style(Style::default().fg(state_color(container.state)))
                    } else {
                        Cell::from(text)
                    };
                    cells.push(cell);
                }
                let style = if view.is_busy(&container.id) {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                Row::new(cells).style(style)
            }
        })
        .collect();

    let table = Table::new(table_rows, widths(&visible))
        .header(header_row(&visible, view.header().symbol()))
        .column_spacing(COLUMN_SPACING)
        .row_highlight_style(highlight());

    render_frame(frame, area, view, "Containers", filter_active, table, view.cursor());
}
