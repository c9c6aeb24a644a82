use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the failure surfaced by a public command so that callers can distinguish, for
/// example, a failed fetch (nothing to show) from a failed export (the tree is still intact).
///
/// The tag is attached as `anyhow` context, so it can be recovered with
/// `err.downcast_ref::<ErrorType>()`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The configuration or home directory could not be created, read or validated.
    Config,
    /// The ledger could not be fetched or decoded.
    Fetch,
    /// The tree could not be serialized or written.
    Export,
    /// The request itself was invalid, e.g. a malformed month key.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// Tags a result's error with an `ErrorType` before it leaves a public command.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Result<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.context(error_type))
    }
}

/// Returns the `ErrorType` attached to `e`, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_pub_result_tags_error() {
        let result: Result<()> = Err(anyhow!("connection refused"));
        let err = result.pub_result(ErrorType::Fetch).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Fetch));
        assert_eq!(err.to_string(), "fetch");
        assert!(format!("{err:#}").contains("connection refused"));
    }

    #[test]
    fn test_untagged_error() {
        let err = anyhow!("plain");
        assert_eq!(error_type(&err), None);
    }

    #[test]
    fn test_error_type_from_str() {
        use std::str::FromStr;
        assert_eq!(ErrorType::from_str("export").unwrap(), ErrorType::Export);
    }
}
