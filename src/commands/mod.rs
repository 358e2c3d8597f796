//! Command handlers for the earnings CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod fetch;
mod init;
mod list;
mod render;
mod report;
mod watch;

use crate::model::Snapshot;
use crate::Config;
use crate::Result;
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

pub use fetch::{fetch, FetchSummary};
pub use init::init;
pub use list::{campaigns, niches, transactions};
pub use render::Rendered;
pub use report::{earnings_page, report};
pub use watch::{watch, WatchSummary};

/// The output type for a command. This allows the command to return a consistent message,
/// optionally structured data, and optionally rendered text meant for stdout.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// A table or document to print to stdout, e.g. a rendered report.
    #[serde(skip)]
    output: Option<Rendered>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            output: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            output: None,
        }
    }

    /// Attaches text to be written to stdout by `print`.
    pub fn with_output(mut self, output: Rendered) -> Self {
        self.output = Some(output);
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    pub fn output(&self) -> Option<&Rendered> {
        self.output.as_ref()
    }

    /// Print the rendered output (if it exists) to stdout, the message to `info!` and the
    /// structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        if let Some(output) = self.output() {
            println!("{output}");
        }
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Loads the snapshot at `path`, or the most recent one when `path` is `None`.
async fn load_snapshot(config: &Config, path: Option<&Path>) -> Result<Snapshot> {
    let store = config.snapshot_store();
    match path {
        Some(path) => store.load(path).await,
        None => store.latest().await,
    }
}
