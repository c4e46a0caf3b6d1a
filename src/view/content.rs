//! Page content rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{DisplayItem, PlaybackInfo};
use crate::narration::ItemKind;
use super::utils::{calculate_num_width, kind_icon, render_scrollable_list, truncate_string};

pub fn render_page_items(
    frame: &mut Frame,
    area: Rect,
    items: &[DisplayItem],
    marked: &[String],
    playback: &PlaybackInfo,
) {
    let border_style = if playback.snapshot.is_playing {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if items.is_empty() {
        let empty = Paragraph::new("Nothing on this page can be narrated in the current language and mode.")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Content ")
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let num_width = calculate_num_width(items.len());
    // borders + padding + marker + number + icon + spacing
    let text_width = (area.width as usize).saturating_sub(2 + 2 + 2 + num_width + 4);
    let position = usize::try_from(playback.snapshot.position).ok();

    let list_items: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let is_marked = marked.iter().any(|id| id == &item.id);
            let at_position = position == Some(i);
            let skipped_image = item.kind == ItemKind::Image && !playback.flags.describe_images;

            let style = if is_marked {
                Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
            } else if at_position {
                Style::default().fg(Color::Green)
            } else if skipped_image {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };

            let marker = if is_marked {
                "▶"
            } else if at_position {
                "›"
            } else {
                " "
            };

            ListItem::new(Line::from(vec![
                Span::raw(format!("{marker} ")),
                Span::styled(format!("{:>width$}", i + 1, width = num_width), Style::default().fg(Color::DarkGray)),
                Span::raw(format!(" {} ", kind_icon(item.kind))),
                Span::raw(truncate_string(&item.text, text_width)),
            ]))
            .style(style)
        })
        .collect();

    let title = format!(" Content ({} items) ", items.len());
    render_scrollable_list(
        frame,
        area,
        list_items,
        position.filter(|p| *p < items.len()),
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding::horizontal(1))
            .border_style(border_style),
    );
}
