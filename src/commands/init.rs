use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and an initial `config.json` file using
/// `api_url` along with default settings.
///
/// # Arguments
/// - `earnings_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/earnings`
/// - `api_url` - The base URL of the backend REST API, e.g. `https://api.localsites.example/v1`
///
/// # Errors
/// - Returns an error if `api_url` is invalid or if any file operations fail.
pub async fn init(earnings_home: &Path, api_url: &str) -> Result<Out<()>> {
    let config = Config::create(earnings_home, api_url)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the earnings directory and config at {}. If the backend needs a \
        token, save it to {}",
        config.root().display(),
        config.token_path().display()
    )
    .into())
}
