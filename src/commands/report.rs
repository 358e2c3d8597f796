use crate::args::{OutputFormat, ReportArgs, SortArgs, ViewArgs};
use crate::commands::render::{self, money, Align, Grid, Rendered};
use crate::commands::{load_snapshot, Out};
use crate::earnings::{EarningsPage, EarningsTable, EarningsView};
use crate::model::{Snapshot, MONTH_NAMES};
use crate::{Config, Result};
use chrono::Local;

/// Prints the earnings table of a snapshot, by default the most recent one.
pub async fn report(config: &Config, args: &ReportArgs) -> Result<Out<EarningsPage>> {
    let snapshot = load_snapshot(config, args.snapshot()).await?;
    let page = earnings_page(&snapshot, args.sort(), args.view(), config.page_size());
    let rendered = render_earnings(&page, args.view().format())?;
    Ok(Out::new(describe(&page), page).with_output(rendered))
}

/// Groups, filters, sorts and pages the snapshot's transactions in the local timezone.
pub fn earnings_page(
    snapshot: &Snapshot,
    sort: &SortArgs,
    view: &ViewArgs,
    default_page_size: usize,
) -> EarningsPage {
    let table = EarningsTable::from_snapshot(snapshot, &Local);
    let view = EarningsView::new(
        view.search(),
        sort.sort_state(),
        view.page(),
        view.page_size().unwrap_or(default_page_size),
    );
    view.apply(&table, &snapshot.labels())
}

pub(super) fn describe(page: &EarningsPage) -> String {
    format!(
        "Earnings for {} sorted by {} {}. {}",
        page.year(),
        page.sort(),
        page.direction(),
        page.page().summary()
    )
}

pub(super) fn render_earnings(page: &EarningsPage, format: OutputFormat) -> Result<Rendered> {
    let mut headers = vec![("Campaign / Niche".to_string(), Align::Left)];
    headers.extend(MONTH_NAMES.iter().map(|m| (m.to_string(), Align::Right)));
    headers.push(("Year Total".to_string(), Align::Right));
    let mut grid = Grid::new(headers);

    for line in page.page().items() {
        let mut cells = vec![line.label().to_string()];
        cells.extend(
            line.row()
                .monthly_totals()
                .iter()
                .map(|amount| money(*amount, format)),
        );
        cells.push(money(line.row().year_total(), format));
        grid.push(cells);
    }

    let totals = page.totals();
    let mut cells = vec!["Grand Total".to_string()];
    cells.extend(
        totals
            .monthly_grand_totals()
            .iter()
            .map(|amount| money(*amount, format)),
    );
    cells.push(money(totals.grand_total(), format));
    grid.push_footer(cells);
    grid.set_caption(page.page().summary());

    render::render(&grid, page, format)
}
