//! Progress bar rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::PlaybackInfo;
use super::utils::on_off;

pub fn render_progress_bar(
    frame: &mut Frame,
    area: Rect,
    playback: &PlaybackInfo,
) {
    let snapshot = &playback.snapshot;

    let status_text = match (&snapshot.current_id, playback.audio_active) {
        (Some(id), true) => format!(" ▶ {id}"),
        (Some(id), false) => format!(" ⏸  {id}"),
        (None, _) if snapshot.is_playing => " ▶ Narrating".to_string(),
        (None, _) => " ⏸  Stopped".to_string(),
    };

    let controls_info = format!(
        " Speed: {}x | Easy read: {} | Images: {} ",
        snapshot.speed,
        on_off(playback.flags.easy_read),
        on_off(playback.flags.describe_images),
    );

    let label = match snapshot.queue_len {
        Some(len) => format!("{} / {}", (snapshot.position.max(0) as usize).min(len), len),
        None => "-".to_string(),
    };

    let inner_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Length(3)])
        .split(area);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(playback.progress_ratio())
        .label(label);

    frame.render_widget(gauge, inner_chunks[0]);
}
