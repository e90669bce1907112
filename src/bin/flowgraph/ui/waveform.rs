//! Oscilloscope of the left output channel

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

pub fn render_waveform(frame: &mut Frame, area: Rect, scope: &[f32]) {
    let peak = scope.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    let color = if peak >= 1.0 { Color::Red } else { Color::Cyan };
    let block = Block::default()
        .title(format!(" Output  peak {peak:.2} "))
        .borders(Borders::ALL);

    let len = scope.len().max(1) as f64;
    let points: Vec<(f64, f64)> = scope
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 / len, s as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let axis_style = Style::default().fg(Color::DarkGray);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(Axis::default().bounds([0.0, 1.0]).style(axis_style))
        .y_axis(Axis::default().bounds([-1.0, 1.0]).style(axis_style));

    frame.render_widget(chart, area);
}
