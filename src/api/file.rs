//! Implements the `Ledger` trait by reading JSON files.

use crate::api::{decode, Ledger};
use crate::model::LedgerData;
use crate::{utils, Result};
use anyhow::Context;
use std::path::PathBuf;

/// Reads ledger data from a JSON file. When the path is a directory, the project's data is read
/// from `<dir>/<project>.json`.
pub(crate) struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn resolve(&self, project: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{project}.json"))
        } else {
            self.path.clone()
        }
    }
}

#[async_trait::async_trait]
impl Ledger for FileLedger {
    async fn get_data(&mut self, project: &str) -> Result<LedgerData> {
        let path = self.resolve(project);
        let body = utils::read(&path).await?;
        decode(&body).with_context(|| format!("Bad ledger data in {}", path.display()))
    }
}
