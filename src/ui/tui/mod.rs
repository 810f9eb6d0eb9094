pub mod help;
pub mod input;
pub mod render;
pub mod state;

use std::io::{self, Stdout};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sniffle::{CaptureEngine, CaptureEvent, CapturedPacket, DisplayBuffer, EngineState};

use crate::ui::stats::{print_packet_summary, ProtocolStats};
use state::UiState;

pub use state::UiMode;

/// Upper bound on how long a frame waits for keyboard input.
const TICK: Duration = Duration::from_millis(50);

pub struct App {
    pub engine: CaptureEngine,
    pub buffer: DisplayBuffer,
    pub stats: ProtocolStats,
    pub ui: UiState,
    pub interface: Option<String>,
    pub loopback: bool,
    pub filter: String,
    pub quit: bool,
}

impl App {
    pub fn new(engine: CaptureEngine, buffer: DisplayBuffer, interface: Option<String>, filter: String) -> Self {
        let loopback = interface
            .as_deref()
            .is_some_and(crate::ui::filter::looks_like_loopback);
        App {
            engine,
            buffer,
            stats: ProtocolStats::default(),
            ui: UiState::new(),
            interface,
            loopback,
            filter,
            quit: false,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.engine.state() == EngineState::Running
    }

    /// Moves everything queued into the display buffer.
    pub fn ingest(&mut self) {
        while let Some(packet) = self.engine.try_pop() {
            self.stats.record(packet.summary());
            self.buffer.insert(packet);
        }
    }

    pub fn handle_event(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::PacketsAvailable => self.ingest(),
            CaptureEvent::Terminated(reason) => {
                self.ingest();
                self.ui.set_error(reason.to_string());
            }
        }
    }

    /// (Re)starts capturing on the current interface with the current
    /// filter. Rows from the previous session are discarded.
    pub fn start_capture(&mut self) {
        let Some(interface) = self.interface.clone() else {
            self.ui.set_error("No interface selected (press i)");
            return;
        };

        self.stop_capture();
        self.ingest();
        self.buffer.clear();
        self.stats.clear();
        self.ui.follow_latest();

        match self.engine.start(&interface, &self.filter) {
            Ok(()) => self.ui.set_info(format!("Capturing on {}", interface)),
            Err(e) => self.ui.set_error(e.to_string()),
        }
    }

    pub fn stop_capture(&mut self) {
        if self.engine.state() == EngineState::Idle && self.engine.session().is_none() {
            return;
        }
        let outcome = self.engine.stop();
        tracing::debug!(?outcome, "capture stopped from the UI");
        self.ingest();
    }

    pub fn toggle_capture(&mut self) {
        if self.is_capturing() {
            self.stop_capture();
            self.ui.set_info("Capture stopped");
        } else {
            self.start_capture();
        }
    }

    pub fn selected_packet(&self) -> Option<&CapturedPacket> {
        self.ui
            .selected_index(&self.buffer)
            .and_then(|index| self.buffer.row(index))
    }

    pub fn selected_layer_count(&self) -> usize {
        self.selected_packet().map_or(0, |packet| packet.layers().count())
    }
}

pub fn run(mut app: App, events: Receiver<CaptureEvent>) -> io::Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app, &events);
    restore_terminal(&mut terminal)?;

    app.engine.stop();
    print_packet_summary(&app.stats);
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    events: &Receiver<CaptureEvent>,
) -> io::Result<()> {
    while !app.quit {
        for event in events.try_iter() {
            app.handle_event(event);
        }

        terminal.draw(|f| render::draw(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(app, key);
            }
        }
    }
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sniffle::CaptureConfig;

    fn app(interface: Option<&str>) -> App {
        let (engine, _events) = CaptureEngine::new(CaptureConfig::default());
        App::new(engine, DisplayBuffer::with_capacity(8), interface.map(str::to_string), String::new())
    }

    #[test]
    fn test_start_without_interface_reports_error() {
        let mut app = app(None);
        app.start_capture();
        assert!(app.ui.error_msg.is_some());
        assert!(!app.is_capturing());
    }

    #[test]
    fn test_start_with_bad_filter_reports_error() {
        let mut app = app(Some("lo"));
        app.filter = "tcp port".to_string();
        app.start_capture();
        assert!(app.ui.error_msg.as_deref().is_some_and(|msg| msg.contains("tcp port")));
        assert!(!app.is_capturing());
    }

    #[test]
    fn test_loopback_guess() {
        assert!(app(Some("lo")).loopback);
        assert!(!app(Some("eth0")).loopback);
    }
}
