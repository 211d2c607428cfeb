//! Main application coordinator

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, EventStream};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::bridge::{Bridge, EventHub};
use crate::config::Config;
use crate::controller::{perform, AppEvent, Request};
use crate::state::AppState;
use crate::ui::UiApp;

/// Redraw cadence while nothing else happens; also drains pushed stream events
const FRAME_RATE: Duration = Duration::from_millis(250);

/// Spawns bridge work and routes its results back to the loop
struct Dispatcher {
    bridge: Arc<dyn Bridge>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Dispatcher {
    /// Run every request in the background; results come back as events
    fn dispatch(&self, requests: Vec<Request>) {
        for request in requests {
            debug!("Dispatching {:?}", request);
            let bridge = Arc::clone(&self.bridge);
            let tx = self.events_tx.clone();
            tokio::spawn(async move {
                if let Some(event) = perform(bridge, request).await {
                    // Receiver is gone only during shutdown
                    let _ = tx.send(event);
                }
            });
        }
    }
}

/// Main application struct
pub struct App {
    config: Config,
    hub: EventHub,
    dispatcher: Dispatcher,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    /// Create a new application instance around a connected bridge
    pub fn new(config: Config, bridge: Arc<dyn Bridge>, hub: EventHub) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            hub,
            dispatcher: Dispatcher { bridge, events_tx },
            events_rx,
        }
    }

    /// Run the main application loop
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting main application loop");

        let mut state = AppState::new(self.hub.clone(), &self.config);
        let initial = state.initial_requests();
        let mut ui_app = UiApp::new(state);
        ui_app.mouse_enabled = self.config.ui.mouse_enabled;
        self.dispatcher.dispatch(initial);

        let mut terminal = setup_terminal(self.config.ui.mouse_enabled)?;
        let result = self.run_event_loop(&mut terminal, &mut ui_app).await;
        restore_terminal(&mut terminal)?;

        self.shutdown(&mut ui_app.state).await;
        result
    }

    async fn run_event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        ui_app: &mut UiApp,
    ) -> Result<()> {
        let mut input = EventStream::new();

        let mut frame = interval(FRAME_RATE);
        let mut stats = interval(Duration::from_millis(self.config.general.stats_interval_ms));
        let mut system =
            interval(Duration::from_millis(self.config.general.system_stats_interval_ms));
        for timer in [&mut frame, &mut stats, &mut system] {
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }
        // The initial requests already cover the first tick of each poller
        stats.tick().await;
        system.tick().await;

        let ttl = self.config.general.notification_ttl_seconds;

        while !ui_app.should_quit {
            terminal.draw(|f| ui_app.draw(f))?;

            tokio::select! {
                event = input.next() => match event {
                    Some(Ok(event)) => {
                        let requests = ui_app.handle_event(event);
                        self.dispatcher.dispatch(requests);
                    }
                    Some(Err(e)) => warn!("Terminal input error: {}", e),
                    None => {
                        info!("Terminal input closed");
                        break;
                    }
                },
                Some(event) = self.events_rx.recv() => {
                    let requests = ui_app.state.apply(event);
                    self.dispatcher.dispatch(requests);
                    // Settle everything that is already waiting before redrawing
                    while let Ok(event) = self.events_rx.try_recv() {
                        let requests = ui_app.state.apply(event);
                        self.dispatcher.dispatch(requests);
                    }
                }
                _ = stats.tick() => {
                    let requests = ui_app.state.stats_tick();
                    self.dispatcher.dispatch(requests);
                }
                _ = system.tick() => {
                    let requests = ui_app.state.system_tick();
                    self.dispatcher.dispatch(requests);
                }
                _ = frame.tick() => {
                    ui_app.state.clear_old_notifications(ttl);
                }
            }

            ui_app.state.poll_stream();
        }

        info!("Quit signal received, exiting event loop");
        Ok(())
    }

    /// Stop live streams and drop list data before exit
    async fn shutdown(&mut self, state: &mut AppState) {
        for request in state.close_stream() {
            perform(Arc::clone(&self.dispatcher.bridge), request).await;
        }
        state.teardown();
        info!("Application state torn down");
    }
}

/// Setup the terminal for TUI
fn setup_terminal(mouse: bool) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    info!("Setting up terminal");

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        crossterm::execute!(stdout, EnableMouseCapture)?;
    }

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    info!("Terminal setup complete");
    Ok(terminal)
}

/// Restore terminal to original state
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    info!("Restoring terminal");

    terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("Terminal restored");
    Ok(())
}
