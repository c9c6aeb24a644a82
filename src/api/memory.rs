//! Implements the `Ledger` trait using in-memory data.

use crate::api::Ledger;
use crate::model::LedgerData;
use crate::Result;
use anyhow::anyhow;
use std::collections::HashMap;

/// Serves fixed data per project. A project that was never added fails like an unreachable
/// server would.
#[derive(Debug, Default, Clone)]
pub(crate) struct MemoryLedger {
    projects: HashMap<String, LedgerData>,
}

impl MemoryLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_project(mut self, project: impl Into<String>, data: LedgerData) -> Self {
        self.projects.insert(project.into(), data);
        self
    }
}

#[async_trait::async_trait]
impl Ledger for MemoryLedger {
    async fn get_data(&mut self, project: &str) -> Result<LedgerData> {
        self.projects
            .get(project)
            .cloned()
            .ok_or_else(|| anyhow!("Project '{project}' not found"))
    }
}
