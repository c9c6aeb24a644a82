//! Command handlers for the ledger-tree CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod export;
mod init;
mod months;
mod tree;

use crate::api::Ledger;
use crate::args::ViewArgs;
use crate::error::{ErrorType, IntoResult};
use crate::model::{LedgerData, MonthKey};
use crate::tree::Query;
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Debug;
use tracing::{debug, info};

pub use export::{export, Exported};
pub use init::init;
pub use months::months;
pub use tree::{tree, TreeView, ViewNode};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
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
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Fetches a project's ledger data, tagging any failure as a fetch error.
async fn fetch(ledger: &mut (dyn Ledger + Send), project: &str) -> Result<LedgerData> {
    let data = ledger
        .get_data(project)
        .await
        .with_context(|| format!("Unable to fetch the ledger data of project '{project}'"))
        .pub_result(ErrorType::Fetch)?;
    debug!(
        "Fetched {} records for project {project}",
        data.records.len()
    );
    Ok(data)
}

/// Builds the tree query from the command line, falling back to the configured sort.
fn query(view: &ViewArgs, config: &Config) -> Result<Query> {
    let months = view
        .months()
        .iter()
        .map(|m| m.parse::<MonthKey>())
        .collect::<Result<BTreeSet<MonthKey>>>()
        .pub_result(ErrorType::Request)?;
    Ok(Query {
        months,
        search: view.search().unwrap_or_default().to_string(),
        sort: view.sort().unwrap_or_else(|| config.sort()),
    })
}
