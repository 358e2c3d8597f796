//! Turns tables into markdown, CSV or JSON text for stdout.

use crate::args::OutputFormat;
use crate::model::Amount;
use crate::Result;
use anyhow::{anyhow, Context};
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{Cell, CellAlignment, Table};
use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};

/// A table rendered in the requested output format.
#[derive(Clone)]
pub enum Rendered {
    /// The structured output, pretty-printed when displayed.
    Json(serde_json::Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rendered {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rendered::Json(v) => write!(f, "Rendered::Json({v:?})"),
            Rendered::Table(s) => write!(f, "Rendered::Table({} chars)", s.len()),
            Rendered::Csv(s) => write!(f, "Rendered::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rendered {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rendered::Json(v) => match serde_json::to_string_pretty(v) {
                Ok(s) => write!(f, "{s}"),
                Err(_) => write!(f, "{v}"),
            },
            Rendered::Table(s) => write!(f, "{s}"),
            Rendered::Csv(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Right,
}

/// Rows of cells under a header, plus footer rows such as a grand total.
#[derive(Debug, Clone, Default)]
pub(crate) struct Grid {
    headers: Vec<(String, Align)>,
    rows: Vec<Vec<String>>,
    footer: Vec<Vec<String>>,
    caption: Option<String>,
}

impl Grid {
    pub(crate) fn new<S>(headers: impl IntoIterator<Item = (S, Align)>) -> Self
    where
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(|(h, a)| (h.into(), a)).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub(crate) fn push_footer(&mut self, row: Vec<String>) {
        self.footer.push(row);
    }

    /// A line printed under the markdown table, e.g. the page summary.
    pub(crate) fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = Some(caption.into());
    }

    fn markdown(&self) -> String {
        let mut table = Table::new();
        table.load_preset(ASCII_MARKDOWN);
        table.set_header(self.headers.iter().map(|(h, _)| Cell::new(h)));
        for row in self.rows.iter().chain(self.footer.iter()) {
            table.add_row(row.iter().map(|c| Cell::new(escape(c))));
        }
        for (ix, (_, align)) in self.headers.iter().enumerate() {
            if let Some(column) = table.column_mut(ix) {
                column.set_cell_alignment(match align {
                    Align::Left => CellAlignment::Left,
                    Align::Right => CellAlignment::Right,
                });
            }
        }

        match &self.caption {
            Some(caption) => format!("{table}\n\n{caption}"),
            None => table.to_string(),
        }
    }

    fn csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(self.headers.iter().map(|(h, _)| h.as_str()))
            .context("Unable to write CSV header")?;
        for row in self.rows.iter().chain(self.footer.iter()) {
            writer
                .write_record(row)
                .context("Unable to write CSV record")?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Unable to finish CSV output: {e}"))?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|")
}

/// Formats money for a table cell. CSV gets plain decimals so spreadsheets can sum them.
pub(crate) fn money(amount: Amount, format: OutputFormat) -> String {
    match format {
        OutputFormat::Csv => format!("{:.2}", amount.value()),
        _ => amount.to_string(),
    }
}

/// Renders `grid` as a markdown table or CSV, or `structure` as JSON.
pub(crate) fn render<T>(grid: &Grid, structure: &T, format: OutputFormat) -> Result<Rendered>
where
    T: Serialize,
{
    Ok(match format {
        OutputFormat::Table => Rendered::Table(grid.markdown()),
        OutputFormat::Csv => Rendered::Csv(grid.csv()?),
        OutputFormat::Json => Rendered::Json(
            serde_json::to_value(structure).context("Unable to serialize the output")?,
        ),
    })
}
