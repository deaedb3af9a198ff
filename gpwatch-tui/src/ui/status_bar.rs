//! Bottom lines — refresh countdown, key hints and the transient notice.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};
use ratatui::Frame;

use gpwatch_core::{Notice, NoticeLevel, Progress};

use crate::theme;

pub const TABLE_HINTS: &[(&str, &str)] = &[
    ("↑/w", "Up"),
    ("↓/s", "Down"),
    ("Enter", "Chart"),
    ("q", "Quit"),
];

pub const CHART_HINTS: &[(&str, &str)] = &[("Esc", "Back to table"), ("q", "Quit")];

pub fn render_progress(f: &mut Frame, area: Rect, progress: &Progress) {
    let gauge = Gauge::default()
        .gauge_style(theme::accent())
        .use_unicode(true)
        .ratio(progress.fraction.clamp(0.0, 1.0))
        .label(Span::styled(
            format!("Next refresh in {}s", progress.remaining_secs),
            theme::header(),
        ));
    f.render_widget(gauge, area);
}

pub fn render(f: &mut Frame, area: Rect, notice: Option<&Notice>, hints: &[(&str, &str)]) {
    let mut spans: Vec<Span> = Vec::new();

    for (key, label) in hints {
        spans.push(Span::styled(format!(" {key}"), theme::accent()));
        spans.push(Span::styled(format!(":{label}"), theme::muted()));
    }

    if let Some(notice) = notice {
        spans.push(Span::raw(" | "));
        let style = match notice.level {
            NoticeLevel::Info => theme::accent(),
            NoticeLevel::Warning => theme::warning(),
        };
        spans.push(Span::styled(notice.message.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
