//! Ledger records as delivered by a `Ledger` source and validated at the fetch boundary.
//!
//! Sources send loosely-typed JSON using the ERP's short column names (`nature`, `descri`,
//! `debcrd`, `histor`, `emissao`, `baixa`) or the descriptive names used when this crate serializes
//! the same data. Both are accepted. Everything past this module works with the strict types.

use crate::model::{Amount, LedgerDate};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::Formatter;
use tracing::trace;

/// The debit/credit flag value that marks a countable ledger debit.
pub const VALID_DEBIT: &str = "2";

/// A single ledger line.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    nature_code: String,
    description: String,
    value: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    debit_credit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<LedgerDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emission_date: Option<LedgerDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settlement_date: Option<LedgerDate>,
}

impl TransactionRecord {
    pub fn new(
        nature_code: impl Into<String>,
        description: impl Into<String>,
        value: impl Into<Amount>,
    ) -> Self {
        Self {
            nature_code: nature_code.into().trim().to_string(),
            description: description.into().trim().to_string(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_debit_credit(mut self, flag: impl Into<String>) -> Self {
        self.debit_credit = Some(flag.into().trim().to_string());
        self
    }

    pub fn with_history(mut self, history: impl Into<String>) -> Self {
        self.history = Some(history.into());
        self
    }

    /// Sets the movement date from a raw `YYYYMMDD` string. Invalid strings clear it.
    pub fn with_date(mut self, date: &str) -> Self {
        self.date = LedgerDate::parse(date);
        self
    }

    pub fn with_emission_date(mut self, date: &str) -> Self {
        self.emission_date = LedgerDate::parse(date);
        self
    }

    pub fn with_settlement_date(mut self, date: &str) -> Self {
        self.settlement_date = LedgerDate::parse(date);
        self
    }

    pub fn nature_code(&self) -> &str {
        &self.nature_code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn debit_credit(&self) -> Option<&str> {
        self.debit_credit.as_deref()
    }

    pub fn history(&self) -> Option<&str> {
        self.history.as_deref()
    }

    pub fn date(&self) -> Option<LedgerDate> {
        self.date
    }

    pub fn emission_date(&self) -> Option<LedgerDate> {
        self.emission_date
    }

    pub fn settlement_date(&self) -> Option<LedgerDate> {
        self.settlement_date
    }

    /// True when the debit/credit flag marks a valid ledger debit. Only such records are counted.
    pub fn is_valid_debit(&self) -> bool {
        self.debit_credit() == Some(VALID_DEBIT)
    }

    /// The date a leaf contributes to the month filter: the movement date, else the settlement
    /// date, else the emission date.
    pub fn effective_date(&self) -> Option<LedgerDate> {
        self.date.or(self.settlement_date).or(self.emission_date)
    }
}

/// A pre-aggregated row from sources that only provide `code -> value/count` without the
/// intermediate nature code. Used by the two-level fallback.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    #[serde(alias = "nature", deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(default, alias = "descri", deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default)]
    pub value: Amount,
    #[serde(default)]
    pub count: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<String>,
}

/// Everything a `Ledger` returns for one project.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLedgerData", rename_all = "camelCase")]
pub struct LedgerData {
    /// Validated ledger lines.
    pub records: Vec<TransactionRecord>,
    /// Descriptions keyed by intermediate ("child nature") code.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub intermediate_labels: BTreeMap<String, String>,
    /// Legacy two-level aggregates, present only for sources without intermediate codes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aggregates: Vec<AggregateRow>,
    /// Reconciliation total reported by the source, for display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Amount>,
    /// Reconciliation record count reported by the source, for display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl LedgerData {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, code: impl Into<String>, label: impl Into<String>) -> Self {
        self.intermediate_labels.insert(code.into(), label.into());
        self
    }
}

/// The loosely-typed wire form of `LedgerData`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLedgerData {
    #[serde(default, alias = "movements")]
    records: Vec<RawRecord>,
    #[serde(default, alias = "labels", alias = "dataBySubrub")]
    intermediate_labels: BTreeMap<String, String>,
    #[serde(default)]
    aggregates: Vec<AggregateRow>,
    #[serde(default)]
    total: Option<Amount>,
    #[serde(default, alias = "totalTransactions")]
    total_count: Option<u64>,
}

impl From<RawLedgerData> for LedgerData {
    fn from(raw: RawLedgerData) -> Self {
        let received = raw.records.len();
        let records: Vec<TransactionRecord> =
            raw.records.into_iter().filter_map(RawRecord::validate).collect();
        trace!(
            "Validated {} of {} records at the fetch boundary",
            records.len(),
            received
        );
        Self {
            records,
            intermediate_labels: raw
                .intermediate_labels
                .into_iter()
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .collect(),
            aggregates: raw.aggregates,
            total: raw.total,
            total_count: raw.total_count,
        }
    }
}

/// The loosely-typed wire form of `TransactionRecord`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(default, alias = "nature", deserialize_with = "lenient_string")]
    nature_code: String,
    #[serde(default, alias = "descri", deserialize_with = "lenient_string")]
    description: String,
    #[serde(default)]
    value: Amount,
    #[serde(default, alias = "debcrd", deserialize_with = "lenient_opt_string")]
    debit_credit: Option<String>,
    #[serde(default, alias = "histor")]
    history: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    date: Option<String>,
    #[serde(default, alias = "emissao", deserialize_with = "lenient_opt_string")]
    emission_date: Option<String>,
    #[serde(default, alias = "baixa", deserialize_with = "lenient_opt_string")]
    settlement_date: Option<String>,
}

impl RawRecord {
    /// Converts to a strict record. Records without a nature code cannot be placed in the
    /// hierarchy and are dropped.
    fn validate(self) -> Option<TransactionRecord> {
        let nature_code = self.nature_code.trim().to_string();
        if nature_code.is_empty() {
            trace!("Dropping record without nature code: {:?}", self.description);
            return None;
        }
        Some(TransactionRecord {
            nature_code,
            description: self.description.trim().to_string(),
            value: self.value,
            debit_credit: self
                .debit_credit
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            history: self.history.filter(|s| !s.trim().is_empty()),
            date: LedgerDate::parse_opt(self.date.as_deref()),
            emission_date: LedgerDate::parse_opt(self.emission_date.as_deref()),
            settlement_date: LedgerDate::parse_opt(self.settlement_date.as_deref()),
        })
    }
}

/// Deserializes a string that sources sometimes send as a number or `null`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("a string, a number or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}
