//! Layout rendering (top bar, status line)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{PlaybackInfo, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),        // Page title
            Constraint::Length(16),    // Language
        ])
        .split(area);

    let title_text = if playback.title.is_empty() {
        "Untitled page"
    } else {
        &playback.title
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Page ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(title, chunks[0]);

    let lang = Paragraph::new(format!("🌐 {}", playback.lang))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Language "));
    frame.render_widget(lang, chunks[1]);
}

pub fn render_status_line(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let line = Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(ui_state.status_line.clone(), Style::default().fg(Color::DarkGray)),
        Span::styled("   H for help", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
