//! Sources of ledger data.
//!
//! A `Ledger` fetches everything needed to build one project's expense tree. The HTTP
//! implementation talks to the ledger API configured in `config.json`; the file implementation
//! reads the same JSON from disk.

mod file;
mod http;
#[cfg(test)]
mod memory;

use crate::model::LedgerData;
use crate::{Config, Result};
use anyhow::{bail, Context};
use std::path::Path;
use tracing::debug;

pub(crate) use file::FileLedger;
pub(crate) use http::HttpLedger;
#[cfg(test)]
pub(crate) use memory::MemoryLedger;

/// A source of ledger data. Fetches are not retried.
#[async_trait::async_trait]
pub(crate) trait Ledger {
    /// Fetches the ledger lines, labels and totals of `project`.
    async fn get_data(&mut self, project: &str) -> Result<LedgerData>;
}

/// Chooses the ledger source for a command: a local file or directory when `file` is given,
/// otherwise the configured API.
pub(crate) fn ledger(config: &Config, file: Option<&Path>) -> Result<Box<dyn Ledger + Send>> {
    if let Some(path) = file {
        debug!("Reading ledger data from {}", path.display());
        return Ok(Box::new(FileLedger::new(path)));
    }
    match config.api_url() {
        Some(url) => {
            debug!("Fetching ledger data from {url}");
            Ok(Box::new(HttpLedger::new(
                url.clone(),
                config.api_token().map(str::to_string),
            )))
        }
        None => bail!(
            "No api_url is configured in '{}' and no --file was given",
            config.config_path().display()
        ),
    }
}

/// Decodes a ledger payload. Sources either send the full object or a bare array of records.
pub(crate) fn decode(body: &str) -> Result<LedgerData> {
    let value: serde_json::Value =
        serde_json::from_str(body).context("The ledger payload is not valid JSON")?;
    let value = match value {
        serde_json::Value::Array(records) => serde_json::json!({ "records": records }),
        other => other,
    };
    serde_json::from_value(value).context("The ledger payload does not have the expected shape")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[test]
    fn test_decode_object() {
        let data = decode(r#"{"records": [{"nature": "0060", "descri": "Bolsas"}]}"#).unwrap();
        assert_eq!(data.records.len(), 1);
    }

    #[test]
    fn test_decode_bare_array() {
        let data = decode(r#"[{"nature": "00600001", "value": "1.5", "debcrd": "2"}]"#).unwrap();
        assert_eq!(data.records.len(), 1);
        assert!(data.records[0].is_valid_debit());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode("<html>").is_err());
        assert!(decode(r#"{"records": 5}"#).is_err());
    }

    #[tokio::test]
    async fn test_ledger_requires_a_source() {
        let env = TestEnv::new().await;
        assert!(ledger(&env.config(), None).is_err());
        assert!(ledger(&env.config(), Some(Path::new("ledger.json"))).is_ok());
    }
}
