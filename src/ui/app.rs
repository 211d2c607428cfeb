//! UI Application logic

use chrono::Utc;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use tracing::{debug, info};

use crate::controller::{ContainerAction, Request};
use crate::core::{Modal, NotificationLevel, Tab};
use crate::state::columns::CellContext;
use crate::state::AppState;
use crate::ui::components::{
    render_column_picker, render_container_table, render_header, render_help_overlay,
    render_modal, render_resource_table, render_stream, render_terminal,
};

const PAGE: usize = 10;

/// UI Application controller
pub struct UiApp {
    pub state: AppState,
    pub should_quit: bool,
    pub mouse_enabled: bool,
}

impl UiApp {
    /// Create a new UI app
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            should_quit: false,
            mouse_enabled: true,
        }
    }

    /// Handle a terminal event; returns the bridge work it triggered
    pub fn handle_event(&mut self, event: Event) -> Vec<Request> {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event),
            Event::Mouse(mouse) if self.mouse_enabled => {
                self.handle_mouse_event(mouse);
                vec![]
            }
            Event::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
                vec![]
            }
            _ => vec![],
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        let delta = match mouse.kind {
            MouseEventKind::ScrollDown => 1,
            MouseEventKind::ScrollUp => -1,
            _ => return,
        };
        if let Some(stream) = self.state.stream.as_mut() {
            if delta > 0 {
                stream.scroll_down(3);
            } else {
                stream.scroll_up(3);
            }
        } else if self.state.modal.is_none() {
            self.state.move_cursor(delta);
        }
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) -> Vec<Request> {
        // Only handle key press events (not release or repeat)
        if key.kind != KeyEventKind::Press {
            return vec![];
        }

        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            info!("Ctrl+C pressed");
            self.should_quit = true;
            return vec![];
        }

        // If help is showing, any key closes it
        if self.state.show_help {
            self.state.show_help = false;
            return vec![];
        }

        if self.state.modal.is_some() {
            return self.handle_modal_key(key);
        }
        if self.state.column_picker.is_some() {
            self.handle_picker_key(key);
            return vec![];
        }
        if self.state.stream.is_some() {
            return self.handle_stream_key(key);
        }
        if self.state.current_tab == Tab::Terminal {
            return self.handle_terminal_key(key);
        }
        if self.state.filter_active {
            self.handle_filter_key(key);
            return vec![];
        }
        self.handle_list_key(key)
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Vec<Request> {
        let Some(modal) = self.state.modal.as_ref() else {
            return vec![];
        };
        match modal {
            Modal::Confirm(_) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.state.confirm(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.state.cancel_modal();
                    vec![]
                }
                _ => vec![],
            },
            Modal::Input(_) => match key.code {
                KeyCode::Enter => self.state.submit_input(),
                KeyCode::Esc => {
                    self.state.cancel_modal();
                    vec![]
                }
                KeyCode::Backspace => {
                    self.state.input_backspace();
                    vec![]
                }
                KeyCode::Char(c) => {
                    self.state.input_char(c);
                    vec![]
                }
                _ => vec![],
            },
            Modal::Error(_) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                    self.state.cancel_modal();
                }
                vec![]
            }
            Modal::Document { .. } => {
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.state.document_scroll = self.state.document_scroll.saturating_add(1)
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.state.document_scroll = self.state.document_scroll.saturating_sub(1)
                    }
                    KeyCode::PageDown => {
                        self.state.document_scroll =
                            self.state.document_scroll.saturating_add(PAGE as u16)
                    }
                    KeyCode::PageUp => {
                        self.state.document_scroll =
                            self.state.document_scroll.saturating_sub(PAGE as u16)
                    }
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.state.cancel_modal(),
                    _ => {}
                }
                vec![]
            }
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('q') => self.state.column_picker = None,
            KeyCode::Down | KeyCode::Char('j') => self.state.move_picker(1),
            KeyCode::Up | KeyCode::Char('k') => self.state.move_picker(-1),
            KeyCode::Char(' ') | KeyCode::Enter => self.state.toggle_picked_column(),
            KeyCode::Char('a') => self.state.show_all_columns(),
            KeyCode::Char('n') => self.state.hide_all_columns(),
            KeyCode::Char('>') | KeyCode::Right => self.state.resize_picked_column(2),
            KeyCode::Char('<') | KeyCode::Left => self.state.resize_picked_column(-2),
            _ => {}
        }
    }

    fn handle_stream_key(&mut self, key: KeyEvent) -> Vec<Request> {
        let is_logs = self.state.stream.as_ref().map(|s| s.is_logs()).unwrap_or(false);
        if key.code == KeyCode::Esc || (is_logs && key.code == KeyCode::Char('q')) {
            return self.state.close_stream();
        }
        if !is_logs && key.code == KeyCode::Enter {
            return self.state.submit_exec();
        }
        let Some(stream) = self.state.stream.as_mut() else {
            return vec![];
        };
        match key.code {
            KeyCode::PageUp => stream.scroll_up(PAGE),
            KeyCode::PageDown => stream.scroll_down(PAGE),
            KeyCode::Up if is_logs => stream.scroll_up(1),
            KeyCode::Down if is_logs => stream.scroll_down(1),
            KeyCode::End | KeyCode::Char('f') if is_logs => stream.scroll_offset = 0,
            KeyCode::Backspace if !is_logs => {
                stream.input.pop();
            }
            KeyCode::Char(c) if !is_logs => stream.input.push(c),
            _ => {}
        }
        vec![]
    }

    fn handle_terminal_key(&mut self, key: KeyEvent) -> Vec<Request> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('t') => self.state.open_terminal(),
                KeyCode::Char('w') => self.state.close_terminal(),
                KeyCode::Char('n') => self.state.terminals.next(),
                KeyCode::Char('p') => self.state.terminals.previous(),
                KeyCode::Char('l') => self.state.terminals.active_mut().entries.clear(),
                _ => {}
            }
            return vec![];
        }

        match key.code {
            KeyCode::Esc => {
                self.switch_tab(Tab::Containers);
                return vec![];
            }
            KeyCode::Enter => return self.state.submit_terminal(),
            _ => {}
        }

        let session = self.state.terminals.active_mut();
        match key.code {
            KeyCode::Backspace => session.backspace(),
            KeyCode::Up => session.history_up(),
            KeyCode::Down => session.history_down(),
            KeyCode::Tab => {
                session.complete();
            }
            KeyCode::Char(c) => session.type_char(c),
            _ => {}
        }
        vec![]
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.clear_filter(),
            KeyCode::Enter | KeyCode::Down | KeyCode::Up => self.state.filter_active = false,
            KeyCode::Backspace => self.state.pop_filter(),
            KeyCode::Char(c) => self.state.push_filter(c),
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Vec<Request> {
        let on_containers = self.state.current_tab == Tab::Containers;
        match key.code {
            // Quit
            KeyCode::Char('q') if key.modifiers.is_empty() => {
                info!("Quit key pressed");
                self.should_quit = true;
            }

            // Tab switching with number keys
            KeyCode::Char('1') => self.switch_tab(Tab::Containers),
            KeyCode::Char('2') => self.switch_tab(Tab::Images),
            KeyCode::Char('3') => self.switch_tab(Tab::Volumes),
            KeyCode::Char('4') => self.switch_tab(Tab::Networks),
            KeyCode::Char('5') => self.switch_tab(Tab::Terminal),
            KeyCode::Tab | KeyCode::Right => self.next_tab(),
            KeyCode::BackTab | KeyCode::Left => self.previous_tab(),

            // Cursor
            KeyCode::Down | KeyCode::Char('j') => self.state.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.state.move_cursor(-1),
            KeyCode::PageDown => self.state.move_cursor(PAGE as isize),
            KeyCode::PageUp => self.state.move_cursor(-(PAGE as isize)),

            // Lists
            KeyCode::Char('/') => self.state.filter_active = true,
            KeyCode::Esc => self.state.clear_filter(),
            KeyCode::Char(' ') => self.state.toggle_current(),
            KeyCode::Enter if on_containers => {
                if !self.state.toggle_expansion() {
                    self.state.toggle_current();
                }
            }
            KeyCode::Char('a') => self.state.toggle_all(),
            KeyCode::Char('r') => return self.state.refresh_current(),
            KeyCode::Char('d') | KeyCode::Delete => self.state.request_remove(),
            KeyCode::Char('c') => self.state.open_column_picker(),
            KeyCode::Char('n') if self.state.current_tab == Tab::Volumes => {
                self.state.open_create_volume()
            }

            // Containers
            KeyCode::Char('s') if on_containers => {
                return self.state.container_action(ContainerAction::Start)
            }
            KeyCode::Char('x') if on_containers => {
                return self.state.container_action(ContainerAction::Stop)
            }
            KeyCode::Char('R') if on_containers => {
                return self.state.container_action(ContainerAction::Restart)
            }
            KeyCode::Char('p') if on_containers => {
                return self.state.container_action(ContainerAction::Pause)
            }
            KeyCode::Char('u') if on_containers => {
                return self.state.container_action(ContainerAction::Unpause)
            }
            KeyCode::Char('l') if on_containers => return self.state.open_logs(),
            KeyCode::Char('e') if on_containers => return self.state.open_exec(),
            KeyCode::Char('i') if on_containers => return self.state.inspect_current(),

            // Help
            KeyCode::Char('?') => self.state.show_help = true,

            _ => {
                debug!("Unhandled key: {:?}", key);
            }
        }
        vec![]
    }

    /// Switch to a specific tab
    fn switch_tab(&mut self, tab: Tab) {
        self.state.switch_tab(tab);
    }

    /// Move to next tab (circular)
    fn next_tab(&mut self) {
        let tabs = Tab::all();
        let current_idx = tabs
            .iter()
            .position(|t| *t == self.state.current_tab)
            .unwrap_or(0);
        self.switch_tab(tabs[(current_idx + 1) % tabs.len()]);
    }

    /// Move to previous tab (circular)
    fn previous_tab(&mut self) {
        let tabs = Tab::all();
        let current_idx = tabs
            .iter()
            .position(|t| *t == self.state.current_tab)
            .unwrap_or(0);
        self.switch_tab(tabs[(current_idx + tabs.len() - 1) % tabs.len()]);
    }

    /// Render the UI
    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        // Create the main layout
        let main_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(3),    // Main content (at least 3 lines)
                Constraint::Length(1), // Footer
            ])
            .split(area);

        render_header(
            frame,
            main_layout[0],
            self.state.docker_connected,
            &self.state.stats,
        );
        self.render_main_content(frame, main_layout[1]);
        self.render_footer(frame, main_layout[2]);

        // Overlays, bottom to top
        if let Some(stream) = &self.state.stream {
            render_stream(frame, area, stream);
        }
        if let (Some(highlighted), Some(view)) = (self.state.column_picker, self.state.list_view()) {
            let resizable = match self.state.current_tab {
                Tab::Containers => self.state.containers.columns.is_resizable(),
                Tab::Volumes => self.state.volumes.columns.is_resizable(),
                _ => false,
            };
            render_column_picker(frame, area, &view.column_configs(), highlighted, resizable);
        }
        if let Some(modal) = &self.state.modal {
            render_modal(frame, area, modal, self.state.document_scroll);
        }
        if self.state.show_help {
            render_help_overlay(frame, area);
        }
    }

    /// Render the main content area
    fn render_main_content(&self, frame: &mut Frame, area: Rect) {
        // Use min 12 chars for sidebar, max 20
        let sidebar_width = (area.width / 5).clamp(12, 20);

        let content_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(sidebar_width), // Sidebar
                Constraint::Min(0),                // Main panel
            ])
            .split(area);

        self.render_sidebar(frame, content_layout[0]);
        self.render_main_panel(frame, content_layout[1]);
    }

    /// Render the sidebar with tabs
    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = Tab::all()
            .iter()
            .map(|tab| {
                let is_selected = self.state.current_tab == *tab;
                let style = if is_selected {
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let marker = if is_selected { "▶" } else { " " };
                Line::from(Span::styled(
                    format!("{} {}:{}", marker, tab.shortcut(), tab.name()),
                    style,
                ))
            })
            .collect();

        let sidebar = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::RIGHT).border_style(Color::DarkGray));

        frame.render_widget(sidebar, area);
    }

    /// Render the main panel based on current tab
    fn render_main_panel(&self, frame: &mut Frame, area: Rect) {
        let ctx = CellContext {
            now: Utc::now(),
            stats: &self.state.stats,
        };
        let filter_active = self.state.filter_active;
        match self.state.current_tab {
            Tab::Containers => {
                let rows = self.state.container_rows();
                render_container_table(frame, area, &self.state.containers, &rows, &ctx, filter_active)
            }
            Tab::Images => {
                render_resource_table(frame, area, &self.state.images, &ctx, "Images", filter_active)
            }
            Tab::Volumes => {
                render_resource_table(frame, area, &self.state.volumes, &ctx, "Volumes", filter_active)
            }
            Tab::Networks => render_resource_table(
                frame,
                area,
                &self.state.networks,
                &ctx,
                "Networks",
                filter_active,
            ),
            Tab::Terminal => render_terminal(frame, area, &self.state.terminals),
        }
    }

    /// Render the footer: latest notification, otherwise key hints
    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        if let Some(notification) = self.state.notifications.last() {
            let color = match notification.level {
                NotificationLevel::Info => Color::Cyan,
                NotificationLevel::Success => Color::Green,
                NotificationLevel::Warning => Color::Yellow,
                NotificationLevel::Error => Color::Red,
            };
            let footer = Paragraph::new(format!(" {} ", notification.message))
                .style(Style::default().fg(color).bg(Color::Black));
            frame.render_widget(footer, area);
            return;
        }

        let help_text = match self.state.current_tab {
            Tab::Containers => {
                " [Space]:Select | [Enter]:Fold | [s/x/R]:Start/Stop/Restart | [l]:Logs | [e]:Exec | [d]:Remove | [?]:Help "
            }
            Tab::Volumes => " [n]:New | [d]:Remove | [c]:Columns | [/]:Search | [?]:Help | [q]:Quit ",
            Tab::Terminal => " [Enter]:Run | [Tab]:Complete | [Ctrl+T/W]:New/Close | [Esc]:Back ",
            _ => " [Space]:Select | [d]:Remove | [c]:Columns | [/]:Search | [?]:Help | [q]:Quit ",
        };

        let footer = Paragraph::new(help_text)
            .style(Style::default().fg(Color::Gray).bg(Color::Black));

        frame.render_widget(footer, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::AppEvent;
    use crate::core::{ContainerInfo, ContainerState, ResourceKind, VolumeInfo};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn press(app: &mut UiApp, code: KeyCode) -> Vec<Request> {
        app.handle_event(Event::Key(KeyEvent::from(code)))
    }

    fn with_volumes(names: &[&str]) -> UiApp {
        let mut app = UiApp::new(AppState::default());
        let Request::LoadVolumes(ticket) = app.state.refresh(ResourceKind::Volume) else {
            unreachable!()
        };
        let volumes = names
            .iter()
            .map(|n| VolumeInfo {
                name: n.to_string(),
                ..Default::default()
            })
            .collect();
        app.state.apply(AppEvent::VolumesLoaded(ticket, Ok(volumes)));
        app.state.switch_tab(Tab::Volumes);
        app
    }

    #[test]
    fn test_quit_key() {
        let mut app = UiApp::new(AppState::default());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c() {
        let mut app = UiApp::new(AppState::default());
        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_switching() {
        let mut app = UiApp::new(AppState::default());
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.state.current_tab, Tab::Images);

        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.state.current_tab, Tab::Terminal);
    }

    #[test]
    fn test_terminal_tab_keeps_digits() {
        let mut app = UiApp::new(AppState::default());
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('q'));

        assert_eq!(app.state.current_tab, Tab::Terminal);
        assert_eq!(app.state.terminals.active().draft, "1q");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_filter_typing_does_not_trigger_shortcuts() {
        let mut app = with_volumes(&["data", "cache"]);
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('q'));

        assert!(!app.should_quit);
        assert!(app.state.modal.is_none());
        assert_eq!(app.state.volumes.filter(), "dq");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.volumes.filter(), "");
        assert!(!app.state.filter_active);
    }

    #[test]
    fn test_remove_flow_through_keys() {
        let mut app = with_volumes(&["data"]);
        assert!(press(&mut app, KeyCode::Char('d')).is_empty());
        assert!(matches!(app.state.modal, Some(Modal::Confirm(_))));

        let requests = press(&mut app, KeyCode::Char('y'));
        assert!(matches!(requests.as_slice(), [Request::Remove { .. }]));
        assert!(app.state.modal.is_none());
    }

    #[test]
    fn test_column_picker_toggles_driver() {
        let mut app = with_volumes(&["data"]);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.state.column_picker, Some(0));

        // First toggleable volume column is `driver`
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.state.volumes.columns.is_visible("driver"));
        press(&mut app, KeyCode::Char('a'));
        assert!(app.state.volumes.columns.is_visible("driver"));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.column_picker, None);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = UiApp::new(AppState::default());
        press(&mut app, KeyCode::Char('?'));
        assert!(app.state.show_help);
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.state.show_help);
    }

    #[test]
    fn test_rendering() {
        let mut app = UiApp::new(AppState::default());
        let Request::LoadContainers(ticket) = app.state.refresh(ResourceKind::Container) else {
            unreachable!()
        };
        app.state.apply(AppEvent::ContainersLoaded(
            ticket,
            Ok(vec![ContainerInfo {
                id: "abc".into(),
                name: "web".into(),
                state: ContainerState::Running,
                ..Default::default()
            }]),
        ));

        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("dockdeck"));
        assert!(text.contains("web"));

        press(&mut app, KeyCode::Char('?'));
        terminal.draw(|f| app.draw(f)).unwrap();
    }
}
