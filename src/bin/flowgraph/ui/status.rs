//! Engine liveness and notification log

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use flowgraph::Notification;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// No heartbeat for this long and the renderer is considered stalled.
const STALL_AFTER: Duration = Duration::from_secs(3);

const LOG_LINES: usize = 32;

pub struct StatusView {
    patch: String,
    started: Instant,
    last_heartbeat: Option<Instant>,
    frame_count: u64,
    audio_seconds: f64,
    sample_triggers: u64,
    log: VecDeque<String>,
}

impl StatusView {
    pub fn new(patch: String) -> Self {
        Self {
            patch,
            started: Instant::now(),
            last_heartbeat: None,
            frame_count: 0,
            audio_seconds: 0.0,
            sample_triggers: 0,
            log: VecDeque::with_capacity(LOG_LINES),
        }
    }

    pub fn record(&mut self, notification: Notification) {
        match notification {
            Notification::Heartbeat {
                frame_count,
                timestamp,
            } => {
                self.last_heartbeat = Some(Instant::now());
                self.frame_count = frame_count;
                self.audio_seconds = timestamp;
            }
            Notification::SampleTrigger { node_id, sample_id } => {
                self.sample_triggers += 1;
                self.note(format!("trigger {node_id} -> {sample_id}"));
            }
        }
    }

    pub fn note(&mut self, line: impl Into<String>) {
        if self.log.len() == LOG_LINES {
            self.log.pop_front();
        }
        self.log.push_back(line.into());
    }

    fn stalled(&self) -> bool {
        let since = self.last_heartbeat.unwrap_or(self.started);
        since.elapsed() > STALL_AFTER
    }
}

pub fn render_status(frame: &mut Frame, area: Rect, status: &StatusView) {
    let (health, color) = if status.stalled() {
        ("STALLED", Color::Red)
    } else {
        ("running", Color::Green)
    };
    let line = Line::from(vec![
        Span::styled(format!(" {health} "), Style::default().fg(color)),
        Span::raw(format!(
            "  {:.1}s audio  {} frames  {} triggers  ",
            status.audio_seconds, status.frame_count, status.sample_triggers
        )),
        Span::styled(status.patch.as_str(), Style::default().fg(Color::DarkGray)),
    ]);
    let block = Block::default().title(" Engine ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

pub fn render_events(frame: &mut Frame, area: Rect, status: &StatusView) {
    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = status
        .log
        .iter()
        .rev()
        .take(visible)
        .map(|line| ListItem::new(line.as_str()))
        .collect();
    let block = Block::default().title(" Events ").borders(Borders::ALL);
    frame.render_widget(List::new(items).block(block), area);
}
