//! These structs provide the CLI interface for the earnings CLI.

use crate::earnings::{SortColumn, SortDirection, SortState};
use crate::model::DateRange;
use crate::Result;
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

const DEFAULT_INTERVAL_SECS: u64 = 60;

/// earnings: A command-line tool for reporting lead-generation earnings.
///
/// The program downloads transactions, campaigns and niches from your LocalSites backend into
/// local snapshot files, then reports earnings per campaign and niche, month by month, for the
/// year the snapshot covers.
///
/// Start with `earnings init --api-url <url>`, then `earnings fetch`, then `earnings report`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. Decide what directory you want to store data in
    /// and pass it as --earnings-home (defaults to $HOME/earnings). If the backend requires a
    /// token, put it in $EARNINGS_HOME/.secrets/token.txt afterwards.
    Init(InitArgs),
    /// Download transactions, campaigns and niches for a date range and save them as a snapshot.
    Fetch(FetchArgs),
    /// Print the earnings table of a snapshot.
    Report(ReportArgs),
    /// List the transactions of a snapshot.
    Transactions(ListArgs),
    /// List the campaigns of a snapshot.
    Campaigns(ListArgs),
    /// List the niches of a snapshot.
    Niches(ListArgs),
    /// Poll the backend and print a fresh earnings table every time new data arrives.
    Watch(WatchArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where earnings snapshots and configuration are held. Defaults to ~/earnings
    #[arg(long, env = "EARNINGS_HOME", default_value_t = default_earnings_home())]
    earnings_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, earnings_home: PathBuf) -> Self {
        Self {
            log_level,
            earnings_home: earnings_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn earnings_home(&self) -> &DisplayPath {
        &self.earnings_home
    }
}

/// (Not shown): Args for the `earnings init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the backend REST API, e.g. https://api.localsites.example/v1
    #[arg(long)]
    api_url: String,
}

impl InitArgs {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// A date range given as optional `--from` and `--to` dates.
///
/// - Neither: the current calendar year.
/// - Only `--from`: from that date to the end of its year.
/// - Only `--to`: from the start of its year to that date.
#[derive(Debug, Default, Parser, Clone)]
pub struct RangeArgs {
    /// First day to fetch, YYYY-MM-DD
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to fetch, YYYY-MM-DD
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn range(&self) -> Result<DateRange> {
        match (self.from, self.to) {
            (None, None) => DateRange::this_year(),
            (Some(from), Some(to)) => DateRange::new(from, to),
            (Some(from), None) => {
                let year = DateRange::calendar_year(from.year())?;
                DateRange::new(from, year.end())
            }
            (None, Some(to)) => {
                let year = DateRange::calendar_year(to.year())?;
                DateRange::new(year.start(), to)
            }
        }
    }
}

/// (Not shown): Args for the `earnings fetch` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct FetchArgs {
    #[clap(flatten)]
    range: RangeArgs,
}

impl FetchArgs {
    pub fn new(range: RangeArgs) -> Self {
        Self { range }
    }

    pub fn range(&self) -> &RangeArgs {
        &self.range
    }
}

/// How a table is printed.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// A markdown table
    #[default]
    Table,
    Json,
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// Search, paging and format options shared by every table.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// Only show rows where some field contains this text, ignoring case
    #[arg(long)]
    search: Option<String>,

    /// The 1-based page to show
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Rows per page. Defaults to `page_size` in config.json
    #[arg(long)]
    page_size: Option<usize>,

    /// One of: table, json, csv
    #[arg(long, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl Default for ViewArgs {
    /// The same values clap fills in when no flags are given.
    fn default() -> Self {
        Self::new(None, 1, None, OutputFormat::Table)
    }
}

impl ViewArgs {
    pub fn new(
        search: Option<String>,
        page: usize,
        page_size: Option<usize>,
        format: OutputFormat,
    ) -> Self {
        Self {
            search,
            page,
            page_size,
            format,
        }
    }

    pub fn search(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Sort options of the earnings table.
#[derive(Debug, Default, Parser, Clone)]
pub struct SortArgs {
    /// The column to sort by: entity, yearTotal, or month-N where N is 0 (Jan) through 11 (Dec)
    #[arg(long, default_value_t = SortColumn::YearTotal)]
    sort: SortColumn,

    /// One of: asc, desc
    #[arg(long, default_value_t = SortDirection::Desc)]
    direction: SortDirection,
}

impl SortArgs {
    pub fn new(sort: SortColumn, direction: SortDirection) -> Self {
        Self { sort, direction }
    }

    pub fn sort_state(&self) -> SortState {
        SortState::new(self.sort, self.direction)
    }
}

/// (Not shown): Args for the `earnings report` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ReportArgs {
    /// A snapshot file to report on. Defaults to the most recent snapshot.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[clap(flatten)]
    sort: SortArgs,

    #[clap(flatten)]
    view: ViewArgs,
}

impl ReportArgs {
    pub fn new(snapshot: Option<PathBuf>, sort: SortArgs, view: ViewArgs) -> Self {
        Self {
            snapshot,
            sort,
            view,
        }
    }

    pub fn snapshot(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    pub fn sort(&self) -> &SortArgs {
        &self.sort
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }
}

/// (Not shown): Args for the `earnings transactions`, `campaigns` and `niches` commands.
#[derive(Debug, Default, Parser, Clone)]
pub struct ListArgs {
    /// A snapshot file to list from. Defaults to the most recent snapshot.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[clap(flatten)]
    view: ViewArgs,
}

impl ListArgs {
    pub fn new(snapshot: Option<PathBuf>, view: ViewArgs) -> Self {
        Self { snapshot, view }
    }

    pub fn snapshot(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }
}

/// (Not shown): Args for the `earnings watch` command.
#[derive(Debug, Parser, Clone)]
pub struct WatchArgs {
    #[clap(flatten)]
    range: RangeArgs,

    /// Seconds between fetches
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    interval_secs: u64,

    /// Stop after printing this many reports. Runs until interrupted when not given.
    #[arg(long)]
    count: Option<usize>,

    #[clap(flatten)]
    sort: SortArgs,

    #[clap(flatten)]
    view: ViewArgs,
}

impl WatchArgs {
    pub fn new(
        range: RangeArgs,
        interval_secs: u64,
        count: Option<usize>,
        sort: SortArgs,
        view: ViewArgs,
    ) -> Self {
        Self {
            range,
            interval_secs,
            count,
            sort,
            view,
        }
    }

    pub fn range(&self) -> &RangeArgs {
        &self.range
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn sort(&self) -> &SortArgs {
        &self.sort
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }
}

fn default_earnings_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("earnings"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --earnings-home or EARNINGS_HOME instead of relying on the \
                default earnings home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("earnings")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
