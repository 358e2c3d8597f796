//! Paged listings of the raw records in a snapshot.

use crate::args::{ListArgs, OutputFormat, ViewArgs};
use crate::commands::render::{self, money, Align, Grid};
use crate::commands::{load_snapshot, Out};
use crate::model::{Campaign, Labels, Niche, Transaction};
use crate::table::{self, Page, Searchable};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;

/// Lists the transactions of a snapshot, matching `--search` against description and id.
pub async fn transactions(config: &Config, args: &ListArgs) -> Result<Out<Page<Transaction>>> {
    let snapshot = load_snapshot(config, args.snapshot()).await?;
    let labels = snapshot.labels();
    let page = page_of(snapshot.transactions(), args.view(), config.page_size());
    let format = args.view().format();

    let mut grid = Grid::new([
        ("Id", Align::Right),
        ("Created", Align::Left),
        ("Campaign / Niche", Align::Left),
        ("Description", Align::Left),
        ("Amount", Align::Right),
    ]);
    for t in page.items() {
        grid.push(vec![
            t.id().to_string(),
            t.created_at().unwrap_or_default().to_string(),
            entity(&labels, t),
            t.description().to_string(),
            money(t.amount(), format),
        ]);
    }
    finish("transactions", grid, page, format)
}

/// Lists the campaigns of a snapshot, matching `--search` against name and id.
pub async fn campaigns(config: &Config, args: &ListArgs) -> Result<Out<Page<Campaign>>> {
    let snapshot = load_snapshot(config, args.snapshot()).await?;
    let labels = snapshot.labels();
    let page = page_of(snapshot.campaigns(), args.view(), config.page_size());

    let mut grid = Grid::new([
        ("Id", Align::Right),
        ("Name", Align::Left),
        ("Niche", Align::Left),
    ]);
    for c in page.items() {
        let niche = c
            .niche_id()
            .map(|id| labels.niche(id).map_or_else(|| id.to_string(), str::to_string))
            .unwrap_or_default();
        grid.push(vec![c.id().to_string(), c.name().to_string(), niche]);
    }
    finish("campaigns", grid, page, args.view().format())
}

/// Lists the niches of a snapshot, matching `--search` against name and id.
pub async fn niches(config: &Config, args: &ListArgs) -> Result<Out<Page<Niche>>> {
    let snapshot = load_snapshot(config, args.snapshot()).await?;
    let page = page_of(snapshot.niches(), args.view(), config.page_size());

    let mut grid = Grid::new([("Id", Align::Right), ("Name", Align::Left)]);
    for n in page.items() {
        grid.push(vec![n.id().to_string(), n.name().to_string()]);
    }
    finish("niches", grid, page, args.view().format())
}

fn page_of<T>(items: &[T], view: &ViewArgs, default_page_size: usize) -> Page<T>
where
    T: Searchable + Clone,
{
    let matching: Vec<T> = table::filter(items, view.search())
        .into_iter()
        .cloned()
        .collect();
    Page::new(
        &matching,
        view.page(),
        view.page_size().unwrap_or(default_page_size),
    )
}

fn entity(labels: &Labels, t: &Transaction) -> String {
    labels.entity(t.campaign_id(), t.niche_id())
}

fn finish<T>(
    what: &str,
    mut grid: Grid,
    page: Page<T>,
    format: OutputFormat,
) -> Result<Out<Page<T>>>
where
    T: Serialize + Clone + Debug,
{
    grid.set_caption(page.summary());
    let rendered = render::render(&grid, &page, format)?;
    Ok(Out::new(format!("Listed {what}. {}", page.summary()), page).with_output(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Rendered;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_transactions_paged() {
        let env = TestEnv::new().await;
        let args = ListArgs::new(None, ViewArgs::new(None, 2, Some(4), OutputFormat::Table));
        let out = transactions(env.config(), &args).await.unwrap();
        let page = out.structure().unwrap();
        assert_eq!(page.total_count(), TestEnv::TRANSACTION_COUNT);
        assert_eq!(page.items().len(), 4);
        assert_eq!(page.items()[0].id(), 5);
        assert!(out.message().contains("Page 2 of 3"));
    }

    #[tokio::test]
    async fn test_transactions_search() {
        let env = TestEnv::new().await;
        let args = ListArgs::new(
            None,
            ViewArgs::new(Some("REFUND".to_string()), 1, None, OutputFormat::Table),
        );
        let out = transactions(env.config(), &args).await.unwrap();
        let page = out.structure().unwrap();
        assert_eq!(page.total_count(), 1);
        let Some(Rendered::Table(table)) = out.output() else {
            panic!("expected a markdown table");
        };
        assert!(table.contains("Budget Drains"));
        assert!(table.contains("-$5.00"));
    }

    #[tokio::test]
    async fn test_campaigns_and_niches() {
        let env = TestEnv::new().await;
        let args = ListArgs::new(None, ViewArgs::new(None, 1, None, OutputFormat::Csv));
        let out = campaigns(env.config(), &args).await.unwrap();
        let Some(Rendered::Csv(csv)) = out.output() else {
            panic!("expected csv");
        };
        assert!(csv.starts_with("Id,Name,Niche\n1,Acme Plumbing,Plumbing\n"));

        let args = ListArgs::new(
            None,
            ViewArgs::new(Some("20".to_string()), 1, None, OutputFormat::Json),
        );
        let out = niches(env.config(), &args).await.unwrap();
        let page = out.structure().unwrap();
        assert_eq!(page.items(), &[Niche::new(20, "Roofing")]);
    }
}
