//! Price table — one row per symbol, portfolio order.

use ratatui::layout::{Constraint, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use gpwatch_core::{RowView, TableView};

use crate::theme;

const COLUMNS: [&str; 6] = ["", "Symbol", "Name", "Price", "P/L %", "P/L"];

pub fn render(f: &mut Frame, area: Rect, view: &TableView) {
    let title = if view.updated_at.is_empty() {
        " GPW Watch ".to_string()
    } else {
        format!(" GPW Watch · updated {} ", view.updated_at)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border())
        .title(title)
        .title_style(theme::panel_title());

    let header = Row::new(COLUMNS.iter().map(|c| Cell::from(*c))).style(theme::header());
    let rows: Vec<Row> = view.rows.iter().map(build_row).collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(10),
            Constraint::Min(16),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(block)
    .column_spacing(1);

    f.render_widget(table, area);
}

fn build_row(row: &RowView) -> Row<'static> {
    let marker = if row.selected { "▶" } else { "" };
    let symbol = Span::styled(row.symbol.to_string(), theme::accent());

    let (name, price) = match (&row.quote, row.errored) {
        (Some(quote), false) => (
            Span::raw(quote.display_name.clone()),
            Span::raw(format!("{:.2} {}", quote.price, quote.currency)),
        ),
        // Last good price, flagged as stale.
        (Some(quote), true) => (
            Span::styled(format!("{} (stale)", quote.display_name), theme::warning()),
            Span::styled(format!("{:.2} {}", quote.price, quote.currency), theme::warning()),
        ),
        (None, true) => (
            Span::styled("Error fetching data", theme::negative()),
            Span::styled("-", theme::muted()),
        ),
        (None, false) => (
            Span::styled("Loading...", theme::muted()),
            Span::styled("-", theme::muted()),
        ),
    };

    let (pnl_percent, pnl_amount) = match (&row.profit_loss, row.currency()) {
        (Some(pl), Some(currency)) => (
            Span::styled(pl.format_percent(), theme::pnl(pl.amount)),
            Span::styled(pl.format_amount(currency), theme::pnl(pl.amount)),
        ),
        _ => (
            Span::styled("-", theme::muted()),
            Span::styled("-", theme::muted()),
        ),
    };

    let cells = vec![
        Cell::from(Span::styled(marker, theme::accent())),
        Cell::from(symbol),
        Cell::from(Line::from(name)),
        Cell::from(Line::from(price).right_aligned()),
        Cell::from(Line::from(pnl_percent).right_aligned()),
        Cell::from(Line::from(pnl_amount).right_aligned()),
    ];
    let style = if row.selected {
        theme::selected_row()
    } else {
        ratatui::style::Style::default()
    };
    Row::new(cells).style(style)
}
