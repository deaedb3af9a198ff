//! Screen layouts — the price table and the fullscreen chart.

pub mod chart_panel;
pub mod status_bar;
pub mod table_panel;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use gpwatch_core::{ChartView, TableView};

/// Draw the table screen: table, refresh countdown, key hints, notice.
pub fn draw_table(f: &mut Frame, view: &TableView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    table_panel::render(f, chunks[0], view);
    status_bar::render_progress(f, chunks[1], &view.progress);
    status_bar::render(f, chunks[2], view.notice.as_ref(), status_bar::TABLE_HINTS);
}

/// Draw the chart screen.
pub fn draw_chart(f: &mut Frame, view: &ChartView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1), Constraint::Length(1)])
        .split(f.area());

    let chart_area = fit_rect(
        chunks[0],
        view.max_width.saturating_add(chart_panel::Y_AXIS_WIDTH + 2),
        view.max_height.saturating_add(4),
    );
    chart_panel::render(f, chart_area, view);
    chart_panel::render_stats(f, chunks[1], view);
    status_bar::render(f, chunks[2], None, status_bar::CHART_HINTS);
}

/// Shrink `area` to at most `width` x `height`, keeping its top-left corner.
pub fn fit_rect(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x,
        y: area.y,
        width: area.width.min(width),
        height: area.height.min(height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(fit_rect(area, 120, 30), area);
        assert_eq!(fit_rect(area, 40, 10), Rect::new(0, 0, 40, 10));
    }
}
