//! Terminal monitor for a playing patch
//!
//! Shows the output waveform and spectrum, engine liveness and recent
//! notifications. The patch file can be reloaded while audio keeps running.

mod spectrum;
mod status;
mod waveform;

use std::{path::PathBuf, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use flowgraph::ControlHandle;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use tracing::{info, warn};

use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_events, render_status, StatusView};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

pub struct Monitor {
    handle: ControlHandle,
    scope_rx: Consumer<f32>,
    scope: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    status: StatusView,
    patch_path: PathBuf,
    should_quit: bool,
}

impl Monitor {
    pub fn new(handle: ControlHandle, scope_rx: Consumer<f32>, patch_path: PathBuf, sample_rate: f32) -> Self {
        Self {
            handle,
            scope_rx,
            scope: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            status: StatusView::new(patch_path.display().to_string()),
            patch_path,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            self.poll_engine();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    fn poll_scope(&mut self) {
        let before = self.scope.len();
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
        }
        if self.scope.len() > VIS_BUFFER_SIZE {
            let excess = self.scope.len() - VIS_BUFFER_SIZE;
            self.scope.drain(0..excess);
        }
        if self.scope.len() != before || before == VIS_BUFFER_SIZE {
            self.spectrum.update(&self.scope);
        }
    }

    fn poll_engine(&mut self) {
        while let Some(notification) = self.handle.poll_notification() {
            self.status.record(notification);
        }
        self.handle.collect_garbage();
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(),
            KeyCode::Char('c') | KeyCode::Char('C') => match self.handle.clear() {
                Ok(()) => self.status.note("graph cleared"),
                Err(err) => self.status.note(format!("clear failed: {err}")),
            },
            _ => {}
        }
    }

    /// Re-read the patch file and send it. Unchanged nodes keep their state.
    fn reload(&mut self) {
        let result = crate::load_patch(&self.patch_path)
            .and_then(|patch| self.handle.update_graph(&patch).map_err(Into::into));
        match result {
            Ok(()) => {
                info!(path = %self.patch_path.display(), "patch reloaded");
                self.status.note("patch reloaded");
            }
            Err(err) => {
                warn!(%err, "patch reload failed");
                self.status.note(format!("reload failed: {err}"));
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(8), // Waveform
                Constraint::Min(6),    // Spectrum
                Constraint::Length(8), // Events
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_status(frame, chunks[0], &self.status);
        render_waveform(frame, chunks[1], &self.scope);
        render_spectrum(frame, chunks[2], self.spectrum.data());
        render_events(frame, chunks[3], &self.status);

        let help = Paragraph::new(" [Q] Quit  [R] Reload patch  [C] Clear graph")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
