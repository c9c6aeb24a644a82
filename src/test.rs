//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api;
use crate::model::LedgerData;
use crate::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A small project in the source's wire format: three mothers, five children, one reversal and
/// dates spread over February to April 2024.
pub(crate) const SEED_LEDGER: &str = r#"{
    "records": [
        {"nature": "0060", "descri": "Bolsas", "value": 0},
        {"nature": "0062", "descri": "Diárias", "value": 0},
        {"nature": "0070", "descri": "Material de consumo", "value": 0},
        {"nature": "00600001", "descri": "", "value": "400.00", "debcrd": "2",
         "histor": "BOLSA ENSINO JOAO", "date": "20240310"},
        {"nature": "00600001", "descri": "", "value": "400.00", "debcrd": "2",
         "histor": "BOLSA ENSINO ANA", "date": "20240410"},
        {"nature": "00600002", "descri": "", "value": "600.00", "debcrd": "2",
         "histor": "BOLSA COORDENAÇÃO MARIA", "date": "20240315"},
        {"nature": "00620001", "descri": "", "value": "1500.00", "debcrd": "2",
         "histor": "DIARIA VIAGEM CAMPO", "emissao": "20240301", "baixa": "20240320"},
        {"nature": "00620001", "descri": "", "value": "900.00", "debcrd": "1",
         "histor": "ESTORNO DIARIA"},
        {"nature": "00700001", "descri": "Papel A4", "value": "120.50", "debcrd": "2",
         "date": "20240405"},
        {"nature": "00700002", "descri": "", "value": 80, "debcrd": 2,
         "histor": "ATIVIDADE DE CAMPO MATERIAL", "date": "20240220"}
    ],
    "intermediateLabels": {
        "00600001": "Bolsa ensino",
        "00600002": "Bolsa coordenação",
        "00620001": "Diárias e passagens"
    },
    "total": "3100.50",
    "totalCount": 6
}"#;

/// The decoded `SEED_LEDGER`.
pub(crate) fn seed_data() -> LedgerData {
    api::decode(SEED_LEDGER).unwrap()
}

/// Test environment with a home directory and Config. No API is configured, so commands read
/// from a `MemoryLedger` or a file.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ledger-tree");
        let config = Config::create(&root, None).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// The home directory.
    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// Writes `SEED_LEDGER` next to the home directory and returns its path.
    pub async fn write_seed_file(&self) -> PathBuf {
        let path = self._temp_dir.path().join("PRJ-001.json");
        tokio::fs::write(&path, SEED_LEDGER).await.unwrap();
        path
    }
}
