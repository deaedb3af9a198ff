//! Fullscreen price chart for one symbol.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use gpwatch_core::ChartView;

use crate::theme;

/// Columns reserved for y-axis labels.
pub const Y_AXIS_WIDTH: u16 = 10;

pub fn render(f: &mut Frame, area: Rect, view: &ChartView) {
    let stats = &view.stats;
    let padding = ((stats.high - stats.low).abs() * 0.05).max(0.01);
    let y_min = stats.low - padding;
    let y_max = stats.high + padding;
    let x_max = view.points.len().saturating_sub(1) as f64;

    let data: Vec<(f64, f64)> = view
        .points
        .iter()
        .enumerate()
        .map(|(i, (_, price))| (i as f64, *price))
        .collect();

    let line_color = theme::Theme::default().pnl_color(stats.change);
    let dataset = Dataset::default()
        .name(view.symbol.to_string())
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(line_color))
        .graph_type(GraphType::Line)
        .data(&data);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border())
        .title(format!(" {} ({}) ", view.symbol, view.currency))
        .title_style(theme::panel_title());

    let x_labels: Vec<Span> = view
        .axis_labels()
        .into_iter()
        .map(|label| Span::styled(label.to_string(), theme::muted()))
        .collect();

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(view.currency.clone(), theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{:.2}", y_min), theme::muted()),
                    Span::styled(format!("{:.2}", (y_min + y_max) / 2.0), theme::muted()),
                    Span::styled(format!("{:.2}", y_max), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

/// One-line summary under the chart.
pub fn render_stats(f: &mut Frame, area: Rect, view: &ChartView) {
    let s = &view.stats;
    let sign = if s.is_up() { "+" } else { "" };
    let currency = view.currency.as_str();
    let line = Line::from(vec![
        Span::styled(" Current ", theme::muted()),
        Span::raw(format!("{:.2} {currency}", s.current)),
        Span::styled("  High ", theme::muted()),
        Span::raw(format!("{:.2}", s.high)),
        Span::styled("  Low ", theme::muted()),
        Span::raw(format!("{:.2}", s.low)),
        Span::styled("  Change ", theme::muted()),
        Span::styled(
            format!("{sign}{:.2} ({sign}{:.2}%)", s.change, s.change_pct),
            theme::pnl(s.change),
        ),
        Span::styled("  Points ", theme::muted()),
        Span::raw(s.count.to_string()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
