//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Every string on screen comes from
//! the locale table through [`PresentationState`], and badges are derived
//! per frame.
//!
//! Layout, top to bottom: header, deal list, detail line for the selected
//! deal, status bar, help/footer.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, ExportStatus};
use crate::deal::{Badge, Deal, Urgency};
use crate::locale::{arg, Key};
use crate::state::{Phase, PresentationState};

/// Shown in place of an image the terminal cannot display.
const IMAGE_GLYPH: &str = "▣";
const PLACEHOLDER_GLYPH: &str = "□";

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [header_area, list_area, detail_area, status_area, help_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(&app.state, frame, header_area);
    draw_deal_list(app, frame, list_area);
    draw_detail(app, frame, detail_area);
    draw_status_bar(app, frame, status_area);
    draw_help(&app.state, frame, help_area);
}

fn draw_header(state: &PresentationState, frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {}", state.text(Key::AppTitle)),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(state.text(Key::AppSubtitle), Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", state.text(Key::LanguageName)),
            Style::default().fg(Color::Cyan),
        ),
    ]));
    frame.render_widget(header, area);
}

pub fn badge_color(badge: &Badge) -> Color {
    match (badge.urgency, badge.days_left) {
        (Urgency::LastDay, _) => Color::Red,
        (Urgency::Tomorrow | Urgency::Urgent, _) => Color::Yellow,
        (Urgency::Normal, Some(_)) => Color::Green,
        (Urgency::Normal, None) => Color::DarkGray,
    }
}

fn deal_line<'a>(state: &PresentationState, deal: &'a Deal) -> Line<'a> {
    let badge = state.badge(deal);
    let glyph = if deal.image_url.is_some() {
        IMAGE_GLYPH
    } else {
        PLACEHOLDER_GLYPH
    };

    Line::from(vec![
        Span::styled(glyph, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("{:<16}", state.badge_text(&badge)),
            Style::default().fg(badge_color(&badge)),
        ),
        Span::raw(" "),
        Span::styled(
            format!("{:<12}", state.expiry_text(deal)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(deal.title.as_str(), Style::default().fg(Color::White)),
    ])
}

/// Render the scrollable deal list, or the loading / empty message.
fn draw_deal_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let state = &app.state;
    let block = Block::default()
        .title(format!(" {} ", state.text(Key::AppSubtitle)))
        .borders(Borders::ALL);

    if state.deals().is_empty() {
        let message = match state.phase() {
            Phase::Loading => state.text(Key::Loading),
            Phase::Ready | Phase::Error => state.text(Key::EmptyList),
        };
        let paragraph = Paragraph::new(Line::styled(message, Style::default().fg(Color::Gray)))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let list_items: Vec<ListItem> = state
        .deals()
        .iter()
        .map(|deal| ListItem::new(deal_line(state, deal)))
        .collect();

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// The selected deal's link and image, if any.
fn draw_detail(app: &App, frame: &mut Frame, area: Rect) {
    let Some(deal) = app.selected_deal() else {
        return;
    };
    let image = match &deal.image_url {
        Some(url) => format!("{IMAGE_GLYPH} {url}"),
        None => format!("{PLACEHOLDER_GLYPH} {}", app.state.text(Key::ImageMissing)),
    };
    let detail = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(
            deal.preferred_link().unwrap_or("-").to_string(),
            Style::default().fg(Color::Blue),
        ),
        Span::raw("  "),
        Span::styled(image, Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(detail, area);
}

/// Error banner, export progress, or the deal count.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let state = &app.state;
    let mut spans = vec![Span::raw(" ")];

    if let Some(message) = state.error_message() {
        spans.push(Span::styled(
            message,
            Style::default().fg(Color::White).bg(Color::Red),
        ));
        spans.push(Span::raw("  "));
    }

    spans.push(Span::styled(
        state.resolve(Key::DealCount, &[arg("count", state.deals().len())]),
        Style::default().fg(Color::Green),
    ));

    if let Some(status) = &app.export_status {
        let (text, color) = match status {
            ExportStatus::Running => (state.text(Key::Exporting), Color::Yellow),
            ExportStatus::Done(path) => (
                state.resolve(Key::ExportDone, &[arg("path", path.display())]),
                Color::Green,
            ),
            ExportStatus::Failed(error) => (
                state.resolve(Key::ExportFailed, &[arg("error", error)]),
                Color::Red,
            ),
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(text, Style::default().fg(color)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(state: &PresentationState, frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::raw(state.text(Key::Help)),
        Span::raw("   "),
        Span::styled(state.text(Key::Footer), Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(help, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
