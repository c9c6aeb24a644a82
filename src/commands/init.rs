use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory and an initial `config.json`.
///
/// # Arguments
/// - `home` - The directory that will be the home directory, e.g. `$HOME/ledger-tree`
/// - `api_url` - The base URL of the ledger API, if there is one.
///
/// # Errors
/// - Returns an error if the URL is invalid, the home directory is already initialized, or any
///   file operation fails.
pub async fn init(home: &Path, api_url: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(home, api_url)
        .await
        .context("Unable to create the home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the ledger-tree config at {}",
        config.config_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let out = init(&home, Some("https://erp.example.org/api")).await.unwrap();
        assert!(out.message().contains("config.json"));
        assert!(home.join("config.json").is_file());

        let err = init(&home, None).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Config));
    }
}
